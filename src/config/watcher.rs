//! Configuration hot-reload: file watching and the reload loop.

use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::ConfigError;

use super::loader;
use super::source::ConfigSource;
use super::store::ConfigSlot;

/// Outcome of one reload attempt, emitted by the watch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadEvent {
    /// A fresh document was published.
    Reloaded,
    /// The reload failed; the previous document is still active.
    Failed,
}

/// One running watch loop bound to a config slot and a cancellation token.
///
/// The underlying OS watch handle is owned by the background task and is
/// dropped exactly once when the task exits, whether the exit was triggered
/// by cancellation or by the notification channel closing.
#[derive(Debug)]
pub struct WatchSession {
    task: JoinHandle<()>,
}

impl WatchSession {
    /// Waits for the watch loop to terminate.
    pub async fn join(self) {
        let _ = self.task.await;
    }
}

/// Sets up the file watch and spawns the reload loop.
///
/// Returns once the watch handle is established and the path registered.
/// If either step fails, no background work is started.
pub(super) fn spawn(
    slot: ConfigSlot,
    source: ConfigSource,
    cancel: CancellationToken,
    outcomes: Option<mpsc::Sender<ReloadEvent>>,
) -> Result<WatchSession, ConfigError> {
    let (tx, events) = mpsc::unbounded_channel();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            if let Ok(event) = res {
                let _ = tx.send(event);
            }
        },
        notify::Config::default(),
    )
    .map_err(|e| ConfigError::WatchSetupFailed {
        path: source.path().to_path_buf(),
        source: e,
    })?;

    watcher
        .watch(source.path(), RecursiveMode::NonRecursive)
        .map_err(|e| ConfigError::WatchSetupFailed {
            path: source.path().to_path_buf(),
            source: e,
        })?;

    info!(path = %source.path().display(), "config watcher started");

    let task = tokio::spawn(run_loop(watcher, events, slot, source, cancel, outcomes));
    Ok(WatchSession { task })
}

/// The reload loop: waits on the next filesystem event or cancellation,
/// whichever comes first. Events are handled strictly one at a time.
async fn run_loop(
    watcher: RecommendedWatcher,
    mut events: mpsc::UnboundedReceiver<Event>,
    slot: ConfigSlot,
    source: ConfigSource,
    cancel: CancellationToken,
    outcomes: Option<mpsc::Sender<ReloadEvent>>,
) {
    // Keeps the OS watch handle alive for the lifetime of the loop; dropping
    // it on exit closes the notification channel.
    let _watcher = watcher;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("config watcher stopped: cancelled");
                break;
            }
            event = events.recv() => {
                match event {
                    None => {
                        warn!("config watcher stopped: notification channel closed");
                        break;
                    }
                    Some(event) if triggers_reload(&event.kind) => {
                        let outcome = match loader::load(&source) {
                            Ok(config) => {
                                slot.publish(config);
                                info!(path = %source.path().display(), "configuration reloaded");
                                ReloadEvent::Reloaded
                            }
                            Err(e) => {
                                warn!(error = %e, "configuration reload failed, keeping previous version");
                                ReloadEvent::Failed
                            }
                        };
                        if let Some(outcomes) = &outcomes {
                            let _ = outcomes.send(outcome).await;
                        }
                    }
                    Some(event) => {
                        debug!(kind = ?event.kind, "ignoring filesystem event");
                    }
                }
            }
        }
    }
}

/// Only content writes and creations trigger a reload. Metadata changes,
/// renames, and deletions are observed but ignored.
fn triggers_reload(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, MetadataKind, RemoveKind, RenameMode};

    #[test]
    fn writes_and_creates_trigger_reload() {
        assert!(triggers_reload(&EventKind::Create(CreateKind::File)));
        assert!(triggers_reload(&EventKind::Modify(ModifyKind::Data(
            DataChange::Any
        ))));
        assert!(triggers_reload(&EventKind::Modify(ModifyKind::Data(
            DataChange::Content
        ))));
        assert!(triggers_reload(&EventKind::Modify(ModifyKind::Any)));
    }

    #[test]
    fn metadata_rename_and_remove_are_ignored() {
        assert!(!triggers_reload(&EventKind::Modify(ModifyKind::Metadata(
            MetadataKind::Any
        ))));
        assert!(!triggers_reload(&EventKind::Modify(ModifyKind::Name(
            RenameMode::Any
        ))));
        assert!(!triggers_reload(&EventKind::Remove(RemoveKind::File)));
        assert!(!triggers_reload(&EventKind::Access(
            notify::event::AccessKind::Any
        )));
    }
}
