//! camwatch - frame-differencing motion detector with episode tracking and
//! snapshot alerts.
//!
//! Feed color frames into a [`motion::MotionEngine`] one at a time; each call
//! returns the annotated frame plus an episode-end signal carrying the
//! representative snapshot and a formatted timestamp. Alert delivery and
//! post-send cleanup run on a background notification worker so the frame
//! path never blocks on transport.

pub mod motion;

pub use motion::{EngineConfig, FrameOutcome, MotionEngine, WatchTarget};

/// Installs the env_logger backend. Call once from the host binary; the
/// library itself only logs through the `log` facade.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .try_init();
}
