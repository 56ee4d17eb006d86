use crate::error::ApiResult;
use crate::models::ArtifactStore;
use std::sync::Arc;

/// Whether a store mutation created a new definition or replaced one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreUpdateType {
    Add,
    Update,
}

/// Change notifications emitted around every committed mutation.
///
/// Events carry `Arc`-wrapped store values so they stay cheap to clone into
/// broadcast channels. `Storing`/`Deleting` fire before the in-memory commit,
/// their past-tense counterparts after it; the enable/disable pair fires in
/// addition to `Storing`/`Stored` when an update flips the `disabled` flag.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    Storing {
        update: StoreUpdateType,
        original: Option<Arc<ArtifactStore>>,
        store: Arc<ArtifactStore>,
    },
    Stored {
        update: StoreUpdateType,
        original: Option<Arc<ArtifactStore>>,
        store: Arc<ArtifactStore>,
    },
    Enabling(Arc<ArtifactStore>),
    Enabled(Arc<ArtifactStore>),
    Disabling(Arc<ArtifactStore>),
    Disabled(Arc<ArtifactStore>),
    Deleting(Arc<ArtifactStore>),
    Deleted(Arc<ArtifactStore>),
}

impl StoreEvent {
    /// The store the event is about (the new value for store events).
    pub fn store(&self) -> &Arc<ArtifactStore> {
        match self {
            StoreEvent::Storing { store, .. } | StoreEvent::Stored { store, .. } => store,
            StoreEvent::Enabling(s)
            | StoreEvent::Enabled(s)
            | StoreEvent::Disabling(s)
            | StoreEvent::Disabled(s)
            | StoreEvent::Deleting(s)
            | StoreEvent::Deleted(s) => s,
        }
    }
}

/// Synchronous collaborator hook (content indexer, browse-cache invalidation,
/// auto-proxy rule triggers). Delivery is best effort: a returned error is
/// logged by the engine and never rolls back the mutation that triggered it.
pub trait StoreEventListener: Send + Sync {
    fn on_event(&self, event: &StoreEvent) -> ApiResult<()>;
}
