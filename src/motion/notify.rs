//! Background alert delivery. Episode-end events are handed to a dedicated
//! worker thread so transport latency and failures never touch the frame
//! loop; after a successful send the worker purges the destination's
//! snapshot area.

use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use log::{error, info, warn};

use crate::motion::error::MotionError;
use crate::motion::snapshot::SnapshotStore;

/// Transport for delivering an alert. The host owns the actual mechanism
/// (SMTP, webhook, ...); the core never retries on its failure.
pub trait Notifier: Send + Sync + 'static {
    fn notify(
        &self,
        image: &std::path::Path,
        destination: &str,
        timestamp: &str,
    ) -> Result<(), MotionError>;
}

/// One episode-end alert.
#[derive(Debug, Clone)]
pub struct AlertJob {
    pub image: PathBuf,
    pub destination: String,
    pub timestamp: String,
}

enum WorkerMsg {
    Job(AlertJob),
    Shutdown,
}

/// Cloneable handle the engine uses to fire-and-forget alert jobs.
#[derive(Clone)]
pub struct NotificationSink {
    tx: mpsc::Sender<WorkerMsg>,
}

impl NotificationSink {
    pub fn dispatch(&self, job: AlertJob) {
        if self.tx.send(WorkerMsg::Job(job)).is_err() {
            warn!("notification worker gone, dropping alert");
        }
    }
}

/// Owns the worker thread. Dropping the worker without `shutdown` detaches
/// the thread; `shutdown` drains queued jobs and joins.
pub struct NotificationWorker {
    tx: mpsc::Sender<WorkerMsg>,
    handle: thread::JoinHandle<()>,
}

impl NotificationWorker {
    pub fn spawn(notifier: Arc<dyn Notifier>, store: SnapshotStore) -> Self {
        let (tx, rx) = mpsc::channel::<WorkerMsg>();
        let handle = thread::spawn(move || {
            for msg in rx {
                match msg {
                    WorkerMsg::Job(job) => deliver(notifier.as_ref(), &store, job),
                    WorkerMsg::Shutdown => break,
                }
            }
        });
        Self { tx, handle }
    }

    pub fn sink(&self) -> NotificationSink {
        NotificationSink {
            tx: self.tx.clone(),
        }
    }

    /// Delivers everything already queued, then joins the worker thread.
    pub fn shutdown(self) {
        let _ = self.tx.send(WorkerMsg::Shutdown);
        if self.handle.join().is_err() {
            error!("notification worker panicked");
        }
    }
}

fn deliver(notifier: &dyn Notifier, store: &SnapshotStore, job: AlertJob) {
    match notifier.notify(&job.image, &job.destination, &job.timestamp) {
        Ok(()) => {
            info!("alert sent to {} ({})", job.destination, job.timestamp);
            if let Err(e) = store.purge(&job.destination) {
                warn!("post-send purge failed for {}: {e}", job.destination);
            }
        }
        Err(e) => error!("alert to {} failed: {e}", job.destination),
    }
}
