pub mod engine;
pub mod error;
pub mod index;
pub mod logging;
pub mod registry;
pub mod resolver;

pub use engine::{DepotEngine, DepotEngineBuilder};
pub use error::{DepotError, Result};
pub use index::MembershipIndex;
pub use registry::StoreRegistry;
