//! Process I/O statistics collection.

pub mod io;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::LiveConfig;

pub use io::IoSample;

/// Samples process I/O counters on the configured cadence.
///
/// The collector holds its own [`LiveConfig`] clone and re-reads it every
/// pass, so interval and proc-path changes take effect on the next tick
/// without restarting the task.
pub struct IoCollector {
    config: LiveConfig,
    samples: mpsc::Sender<IoSample>,
}

impl IoCollector {
    /// Creates a collector publishing samples into `samples`.
    pub fn new(config: LiveConfig, samples: mpsc::Sender<IoSample>) -> Self {
        Self { config, samples }
    }

    /// Runs the sampling loop until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        loop {
            let snapshot = self.config.current();
            let interval = snapshot.monitoring.interval();
            let proc_path = snapshot.monitoring.proc_path.clone();
            drop(snapshot);

            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("io collector stopped");
                    return;
                }
                _ = tokio::time::sleep(interval) => {}
            }

            match io::sample(&proc_path) {
                Ok(sample) => {
                    debug!(
                        read_bytes = sample.read_bytes,
                        write_bytes = sample.write_bytes,
                        processes = sample.processes,
                        "collected io sample"
                    );
                    if self.samples.send(sample).await.is_err() {
                        debug!("sample channel closed, stopping collector");
                        return;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "io sampling pass failed");
                }
            }
        }
    }
}
