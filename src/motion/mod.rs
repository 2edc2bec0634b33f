//! Frame-differencing motion detection with episode tracking.
//!
//! Core strategy:
//! 1. Frame differencing - grayscale + heavy blur, absolute difference
//!    against a baseline, fixed threshold, dilation
//! 2. Baseline refresh - the reference frame is replaced periodically and at
//!    every episode end
//! 3. Region filter - connected regions below the area floor are noise
//! 4. Episode tracking - a two-sample status history marks the 1->0
//!    transition as the reportable episode end
//! 5. Snapshot alerts - the temporal-midpoint candidate is stamped with a
//!    timestamp and delivered off the frame path

pub mod baseline;
pub mod classifier;
pub mod differ;
pub mod engine;
pub mod episode;
pub mod error;
pub mod notify;
pub mod overlay;
pub mod snapshot;

pub use baseline::BaselineManager;
pub use classifier::{Classification, MotionClassifier, Region};
pub use differ::FrameDiffer;
pub use engine::{
    shared_target, EngineConfig, FrameOutcome, MotionEngine, SharedWatchTarget, WatchTarget,
};
pub use episode::{format_timestamp, EpisodeTracker};
pub use error::{MotionError, Result};
pub use notify::{AlertJob, NotificationSink, NotificationWorker, Notifier};
pub use snapshot::SnapshotStore;
