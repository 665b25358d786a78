//! Configuration loading, live snapshots, and hot reload.
//!
//! # Data flow
//! ```text
//! CONF_PATH env var
//!     → source.rs (resolve path)
//!     → loader.rs (read & deserialize YAML)
//!     → AgentConfig (immutable document)
//!     → store.rs (lock-free slot)
//!     → LiveConfig::current() readers
//!
//! On file change:
//!     watcher.rs receives the notification
//!     → loader.rs loads a fresh document
//!     → atomic pointer swap into the slot
//!     → readers pick up the new document on their next read
//! ```
//!
//! A failed reload never disturbs the published document; readers stay on
//! the last known-good configuration.

pub mod loader;
pub mod model;
pub mod source;
mod store;
pub mod watcher;

use tokio_util::sync::CancellationToken;

use crate::error::ConfigError;

pub use model::AgentConfig;
pub use source::{ConfigSource, CONFIG_PATH_ENV};
pub use watcher::{ReloadEvent, WatchSession};

use store::ConfigSlot;

/// Shared handle to the currently published configuration.
///
/// Cloning is cheap and every clone reads from the same slot; components are
/// handed a clone rather than reaching for global state. The watch loop is
/// the sole writer.
#[derive(Clone)]
pub struct LiveConfig {
    slot: ConfigSlot,
    source: ConfigSource,
}

impl LiveConfig {
    /// Resolves the source from the environment, performs the initial load,
    /// and constructs the handle. Fails without constructing anything if
    /// resolution or the load fails.
    pub fn open() -> Result<Self, ConfigError> {
        Self::open_with(ConfigSource::from_env()?)
    }

    /// Like [`open`](Self::open) with an explicit source.
    pub fn open_with(source: ConfigSource) -> Result<Self, ConfigError> {
        let initial = loader::load(&source)?;
        Ok(Self {
            slot: ConfigSlot::new(initial),
            source,
        })
    }

    /// Returns the presently published document.
    ///
    /// Safe from any number of concurrent readers and never blocks on the
    /// watch loop; the returned snapshot stays valid even if a reload is
    /// published while it is held.
    pub fn current(&self) -> std::sync::Arc<AgentConfig> {
        self.slot.current()
    }

    /// The source this handle was opened from.
    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    /// Starts the background reload loop bound to this handle.
    ///
    /// Returns once the file watch is established, or fails without spawning
    /// anything if it cannot be. Cancelling `cancel` stops the loop; await
    /// the returned [`WatchSession`] to observe termination.
    pub fn watch(&self, cancel: CancellationToken) -> Result<WatchSession, ConfigError> {
        watcher::spawn(self.slot.clone(), self.source.clone(), cancel, None)
    }

    /// Like [`watch`](Self::watch), additionally reporting the outcome of
    /// every reload attempt on `outcomes` (for metrics or operator surfaces).
    pub fn watch_with_events(
        &self,
        cancel: CancellationToken,
        outcomes: tokio::sync::mpsc::Sender<ReloadEvent>,
    ) -> Result<WatchSession, ConfigError> {
        watcher::spawn(
            self.slot.clone(),
            self.source.clone(),
            cancel,
            Some(outcomes),
        )
    }
}
