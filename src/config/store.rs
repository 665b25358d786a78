//! Lock-free slot holding the currently published configuration.

use std::sync::Arc;

use arc_swap::ArcSwap;

use super::model::AgentConfig;

/// The swappable holder behind [`LiveConfig`](super::LiveConfig).
///
/// Reads and the publish are independent whole-pointer operations: a reader
/// either gets the document published before its call or a later one, never
/// a document with fields from two reload generations. Clones share the
/// same slot.
#[derive(Clone)]
pub(super) struct ConfigSlot {
    inner: Arc<ArcSwap<AgentConfig>>,
}

impl ConfigSlot {
    pub(super) fn new(initial: AgentConfig) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(initial)),
        }
    }

    /// Returns the presently published document. Never blocks on the writer.
    pub(super) fn current(&self) -> Arc<AgentConfig> {
        self.inner.load_full()
    }

    /// Replaces the published document wholesale.
    pub(super) fn publish(&self, config: AgentConfig) {
        self.inner.store(Arc::new(config));
    }
}
