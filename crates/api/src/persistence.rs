use crate::error::ApiResult;
use crate::models::{ArtifactStore, StoreKey};

/// Durable backend for store definitions.
///
/// `load_all` runs once at startup to seed the in-memory registry before the
/// membership index is rebuilt. `persist`/`remove` are invoked after each
/// successful in-memory mutation; the engine treats them as fire-and-forget
/// and only logs failures.
pub trait PersistenceHook: Send + Sync {
    fn load_all(&self) -> ApiResult<Vec<ArtifactStore>>;

    fn persist(&self, store: &ArtifactStore) -> ApiResult<()>;

    fn remove(&self, key: &StoreKey) -> ApiResult<()>;
}
