pub mod error;
pub mod events;
pub mod models;
pub mod persistence;

// Re-export commonly used types
pub use error::{ApiError, ApiResult};
pub use events::{StoreEvent, StoreEventListener, StoreUpdateType};
pub use models::*;
pub use persistence::PersistenceHook;
