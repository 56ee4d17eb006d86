use depot_api::models::{StoreKey, StoreKeyParseError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DepotError {
    #[error("Invalid store key: {0}")]
    Key(#[from] StoreKeyParseError),
    #[error("Validation failed for {key}: {reason}")]
    Validation { key: StoreKey, reason: String },
    #[error("Store {0} is readonly; modify it to non-readonly before deleting")]
    ReadOnly(StoreKey),
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, DepotError>;
