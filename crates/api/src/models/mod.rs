pub mod key;
pub mod store;

pub use key::*;
pub use store::*;
