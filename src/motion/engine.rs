use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::Utc;
use image::RgbImage;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::motion::baseline::BaselineManager;
use crate::motion::classifier::{Classification, MotionClassifier, Region};
use crate::motion::differ::FrameDiffer;
use crate::motion::episode::{self, EpisodeTracker};
use crate::motion::notify::{AlertJob, NotificationSink};
use crate::motion::overlay;
use crate::motion::snapshot::SnapshotStore;

/// Detection policy. The thresholds mirror the classic
/// grayscale+blur+absdiff pipeline; the area floor and refresh interval are
/// the two knobs worth tuning per deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Absolute-difference cutoff on the 8-bit grayscale scale.
    pub diff_threshold: u8,
    /// Dilation passes applied to the thresholded mask.
    pub dilate_iterations: u32,
    /// Minimum connected-region pixel count that counts as motion.
    pub min_region_area: u64,
    /// How long a baseline may age before it is replaced.
    pub baseline_refresh: Duration,
    /// Root directory for per-destination snapshot areas.
    pub snapshot_root: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            diff_threshold: 60,
            dilate_iterations: 2,
            min_region_area: 10_000,
            baseline_refresh: Duration::from_secs(5),
            snapshot_root: PathBuf::from("images"),
        }
    }
}

/// Alert routing, shared with the control path. The UI may rewrite this
/// while frames are being processed; the engine reads it once per frame
/// under the lock.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatchTarget {
    /// Destination address; empty means detect but never persist or alert.
    pub destination: String,
    /// IANA timezone name for alert timestamps; unknown names mean UTC.
    pub timezone: String,
}

pub type SharedWatchTarget = Arc<Mutex<WatchTarget>>;

pub fn shared_target(target: WatchTarget) -> SharedWatchTarget {
    Arc::new(Mutex::new(target))
}

/// Per-frame result handed back to the caller.
#[derive(Debug, Clone)]
pub struct FrameOutcome {
    /// Input frame with green boxes over each qualifying region.
    pub annotated: RgbImage,
    pub regions: Vec<Region>,
    /// Status of this frame: qualifying motion present.
    pub motion: bool,
    /// True exactly when a motion episode just ended.
    pub motion_ended: bool,
    /// Representative snapshot of the ended episode, if one was stored.
    pub representative: Option<PathBuf>,
    /// Formatted end-of-episode timestamp in the configured timezone.
    pub timestamp: Option<String>,
}

/// Composition root: one engine per active stream session. Frames must be
/// fed strictly sequentially; the engine holds all transient session state
/// and none of it survives the session.
pub struct MotionEngine {
    differ: FrameDiffer,
    baseline: BaselineManager,
    classifier: MotionClassifier,
    tracker: EpisodeTracker,
    store: SnapshotStore,
    target: SharedWatchTarget,
    sink: Option<NotificationSink>,
    /// Names persisted candidates; starts at 1 and never resets.
    frame_counter: u64,
    representative: Option<PathBuf>,
    /// At most one alert per episode end; re-armed by the next episode's
    /// first motion-positive frame.
    notified: bool,
}

impl MotionEngine {
    pub fn new(config: EngineConfig, target: SharedWatchTarget) -> Self {
        Self {
            differ: FrameDiffer::new(config.diff_threshold, config.dilate_iterations),
            baseline: BaselineManager::new(config.baseline_refresh),
            classifier: MotionClassifier::new(config.min_region_area),
            tracker: EpisodeTracker::new(),
            store: SnapshotStore::new(config.snapshot_root),
            target,
            sink: None,
            frame_counter: 1,
            representative: None,
            notified: false,
        }
    }

    /// Routes episode-end alerts to a background notification worker.
    pub fn with_notifications(mut self, sink: NotificationSink) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn snapshot_store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Feeds one frame using the real clock.
    pub fn process_frame(&mut self, frame: &RgbImage) -> FrameOutcome {
        self.process_frame_at(frame, Instant::now())
    }

    /// Feeds one frame at a caller-supplied instant (simulated clocks in
    /// tests; the wall clock otherwise).
    pub fn process_frame_at(&mut self, frame: &RgbImage, now: Instant) -> FrameOutcome {
        let target = self
            .target
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();

        let candidate = self.differ.grayscale_blur(frame);
        let reference = self.baseline.maybe_refresh(&candidate, now);
        let mask = self.differ.diff_mask(reference, &candidate);
        let classification = self.classifier.classify(frame, &mask);

        let ended = self.tracker.push(classification.motion);
        if self.tracker.active() {
            // A new episode re-arms the alert.
            self.notified = false;
            self.persist_candidate(&target.destination, frame);
        }
        let (representative, timestamp) = if ended {
            self.conclude_episode(&target, &candidate, now)
        } else {
            (None, None)
        };

        let Classification {
            motion,
            regions,
            annotated,
        } = classification;

        FrameOutcome {
            annotated,
            regions,
            motion,
            motion_ended: ended,
            representative,
            timestamp,
        }
    }

    /// Stores the raw (un-annotated) frame as an episode candidate and
    /// recomputes the representative pick. Storage failures are logged and
    /// tolerated; detection continues either way.
    fn persist_candidate(&mut self, destination: &str, frame: &RgbImage) {
        if destination.trim().is_empty() {
            return;
        }
        match self
            .store
            .store_candidate(destination, self.frame_counter, frame)
        {
            Ok(_) => {
                self.frame_counter += 1;
                self.representative = self.store.pick_representative(destination);
            }
            Err(e) => warn!("snapshot store failed for {destination}: {e}"),
        }
    }

    fn conclude_episode(
        &mut self,
        target: &WatchTarget,
        candidate: &image::GrayImage,
        now: Instant,
    ) -> (Option<PathBuf>, Option<String>) {
        let text = episode::format_timestamp(&target.timezone, Utc::now());
        // Next episode starts comparison fresh from the current background.
        self.baseline.force_refresh(candidate, now);

        // Taken, not cloned: each episode starts over with no representative,
        // so an episode that persisted nothing reports an absent image.
        let representative = self.representative.take();
        match &representative {
            Some(path) => {
                if let Err(e) = overlay::stamp_timestamp(path, &text) {
                    warn!("timestamp stamp failed for {}: {e}", path.display());
                }
                if !self.notified && !target.destination.trim().is_empty() {
                    if let Some(sink) = &self.sink {
                        sink.dispatch(AlertJob {
                            image: path.clone(),
                            destination: target.destination.clone(),
                            timestamp: text.clone(),
                        });
                        self.notified = true;
                    }
                }
                info!("motion episode ended at {text}");
            }
            None => info!("motion episode ended at {text} (no snapshot, alert skipped)"),
        }

        (representative, Some(text))
    }
}
