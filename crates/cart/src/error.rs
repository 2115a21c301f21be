use doc_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CartError {
    #[error("no principal is signed in")]
    AuthRequired,

    #[error("increment must be at least 1, got {increment}")]
    InvalidIncrement { increment: u32 },

    #[error("document store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, CartError>;
