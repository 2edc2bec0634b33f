use std::fs;
use std::path::{Path, PathBuf};

use image::RgbImage;
use log::{debug, warn};

use crate::motion::error::Result;

/// Persists candidate frames for an in-progress episode, one directory per
/// destination key, files named by the session's monotonic counter.
///
/// The representative pick is the temporal midpoint of everything captured
/// so far: neither the first nor the last frame, so an early or late outlier
/// never becomes the alert image.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn area(&self, destination: &str) -> PathBuf {
        self.root.join(destination)
    }

    /// Writes `frame` as `<root>/<destination>/<counter>.png`, creating the
    /// area on demand.
    pub fn store_candidate(
        &self,
        destination: &str,
        counter: u64,
        frame: &RgbImage,
    ) -> Result<PathBuf> {
        let area = self.area(destination);
        fs::create_dir_all(&area)?;

        let path = area.join(format!("{counter}.png"));
        frame.save(&path)?;
        debug!("stored candidate {}", path.display());
        Ok(path)
    }

    /// Lists the area in numeric file order and returns the middle element
    /// (`floor(count / 2)`), or `None` when nothing was stored.
    pub fn pick_representative(&self, destination: &str) -> Option<PathBuf> {
        let mut numbered = list_numbered(&self.area(destination));
        if numbered.is_empty() {
            return None;
        }
        numbered.sort_by_key(|(n, _)| *n);
        let mid = numbered.len() / 2;
        Some(numbered.swap_remove(mid).1)
    }

    /// Deletes the whole storage area for `destination`. A missing area is a
    /// no-op; other filesystem errors are returned for the caller to log.
    pub fn purge(&self, destination: &str) -> Result<()> {
        let area = self.area(destination);
        match fs::remove_dir_all(&area) {
            Ok(()) => {
                debug!("purged {}", area.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Collects `<n>.png` entries with their parsed counter values. Unreadable
/// directories yield an empty list; stray files are skipped.
fn list_numbered(area: &Path) -> Vec<(u64, PathBuf)> {
    let entries = match fs::read_dir(area) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    entries
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            let stem = path.file_stem()?.to_str()?;
            match stem.parse::<u64>() {
                Ok(n) => Some((n, path)),
                Err(_) => {
                    warn!("skipping stray snapshot file {}", path.display());
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn frame(value: u8) -> RgbImage {
        RgbImage::from_pixel(16, 16, Rgb([value, value, value]))
    }

    #[test]
    fn test_store_names_by_counter() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());

        let path = store.store_candidate("alice@example.com", 7, &frame(10)).unwrap();

        assert_eq!(path, dir.path().join("alice@example.com").join("7.png"));
        assert!(path.exists());
    }

    #[test]
    fn test_pick_is_midpoint() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let dest = "bob";

        for counter in 1..=3 {
            store.store_candidate(dest, counter, &frame(counter as u8)).unwrap();
        }

        let pick = store.pick_representative(dest).unwrap();
        assert_eq!(pick.file_name().unwrap(), "2.png");
    }

    #[test]
    fn test_pick_orders_numerically() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let dest = "bob";

        // 9, 10, 11: a lexicographic sort would put 10 and 11 before 9.
        for counter in 9..=11 {
            store.store_candidate(dest, counter, &frame(counter as u8)).unwrap();
        }

        let pick = store.pick_representative(dest).unwrap();
        assert_eq!(pick.file_name().unwrap(), "10.png");
    }

    #[test]
    fn test_pick_idempotent_after_episode() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let dest = "carol";

        for counter in 1..=4 {
            store.store_candidate(dest, counter, &frame(counter as u8)).unwrap();
        }

        let first = store.pick_representative(dest);
        let second = store.pick_representative(dest);
        assert_eq!(first, second);
        assert_eq!(first.unwrap().file_name().unwrap(), "3.png");
    }

    #[test]
    fn test_pick_empty_area_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        assert!(store.pick_representative("nobody").is_none());
    }

    #[test]
    fn test_purge_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let dest = "dave";

        store.store_candidate(dest, 1, &frame(1)).unwrap();
        store.purge(dest).unwrap();
        assert!(!dir.path().join(dest).exists());
        // Second purge on the missing area is a no-op.
        store.purge(dest).unwrap();
    }
}
