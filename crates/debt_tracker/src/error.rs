use debt_store::StoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TrackerError>;

#[derive(Debug, Error)]
pub enum TrackerError {
    /// Local pre-flight rejection. No remote call was made and the cache
    /// is untouched; shown inline next to the triggering control.
    #[error("{0}")]
    Validation(String),

    /// The store rejected a mutation. By the time this surfaces the cache
    /// has already been resynchronized from the store.
    #[error("Remote store error: {0}")]
    Remote(#[from] StoreError),
}
