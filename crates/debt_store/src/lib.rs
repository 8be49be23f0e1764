pub mod error;
pub mod repository;

pub use error::{Result, StoreError};
pub use repository::{DebtStore, SupabaseStore};
