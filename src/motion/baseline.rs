use std::time::{Duration, Instant};

use image::GrayImage;
use log::debug;

/// Owns the grayscale reference frame and its refresh policy.
///
/// The baseline is replaced wholesale in three situations: first use,
/// expiry of the refresh interval, and a forced refresh at episode end.
/// The interval bound keeps a newly static object from being silently
/// absorbed into the background for longer than the interval; the possible
/// single-frame blip right after a refresh is an accepted tradeoff.
pub struct BaselineManager {
    baseline: Option<GrayImage>,
    set_at: Option<Instant>,
    refresh_interval: Duration,
}

impl BaselineManager {
    pub fn new(refresh_interval: Duration) -> Self {
        Self {
            baseline: None,
            set_at: None,
            refresh_interval,
        }
    }

    /// First use stores the candidate unconditionally and returns it.
    pub fn get_or_init(&mut self, candidate: &GrayImage, now: Instant) -> &GrayImage {
        if self.baseline.is_none() {
            self.replace(candidate, now);
        }
        self.baseline.as_ref().expect("baseline set above")
    }

    /// Replaces the baseline when the refresh interval has elapsed, then
    /// returns the (possibly updated) reference. Initializes on first use.
    pub fn maybe_refresh(&mut self, candidate: &GrayImage, now: Instant) -> &GrayImage {
        let expired = match self.set_at {
            Some(set_at) => now.duration_since(set_at) > self.refresh_interval,
            None => true,
        };
        if expired {
            debug!("baseline refresh (interval {:?})", self.refresh_interval);
            self.replace(candidate, now);
        }
        self.baseline.as_ref().expect("baseline set above")
    }

    /// Unconditional replacement, used at episode end so the next episode
    /// compares against a clean background.
    pub fn force_refresh(&mut self, candidate: &GrayImage, now: Instant) {
        debug!("baseline force refresh");
        self.replace(candidate, now);
    }

    fn replace(&mut self, candidate: &GrayImage, now: Instant) {
        self.baseline = Some(candidate.clone());
        self.set_at = Some(now);
    }

    #[cfg(test)]
    fn current(&self) -> Option<&GrayImage> {
        self.baseline.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(value: u8) -> GrayImage {
        GrayImage::from_pixel(8, 8, image::Luma([value]))
    }

    #[test]
    fn test_first_use_stores_candidate() {
        let mut manager = BaselineManager::new(Duration::from_secs(5));
        let now = Instant::now();

        let reference = manager.get_or_init(&gray(100), now);
        assert_eq!(reference.get_pixel(0, 0)[0], 100);
    }

    #[test]
    fn test_no_refresh_inside_interval() {
        let mut manager = BaselineManager::new(Duration::from_secs(5));
        let start = Instant::now();

        manager.get_or_init(&gray(100), start);
        let reference = manager.maybe_refresh(&gray(200), start + Duration::from_secs(4));

        assert_eq!(reference.get_pixel(0, 0)[0], 100);
    }

    #[test]
    fn test_refresh_after_interval() {
        let mut manager = BaselineManager::new(Duration::from_secs(5));
        let start = Instant::now();

        manager.get_or_init(&gray(100), start);
        let reference = manager.maybe_refresh(&gray(200), start + Duration::from_secs(6));

        assert_eq!(reference.get_pixel(0, 0)[0], 200);
    }

    #[test]
    fn test_refresh_resets_timer() {
        let mut manager = BaselineManager::new(Duration::from_secs(5));
        let start = Instant::now();

        manager.get_or_init(&gray(100), start);
        manager.maybe_refresh(&gray(150), start + Duration::from_secs(6));
        // Only 4s since the last replacement, so no further refresh.
        let reference = manager.maybe_refresh(&gray(200), start + Duration::from_secs(10));

        assert_eq!(reference.get_pixel(0, 0)[0], 150);
    }

    #[test]
    fn test_force_refresh_ignores_interval() {
        let mut manager = BaselineManager::new(Duration::from_secs(5));
        let start = Instant::now();

        manager.get_or_init(&gray(100), start);
        manager.force_refresh(&gray(200), start + Duration::from_secs(1));

        assert_eq!(manager.current().unwrap().get_pixel(0, 0)[0], 200);
    }
}
