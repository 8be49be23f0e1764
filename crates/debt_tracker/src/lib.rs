pub mod command;
pub mod error;
pub mod tracker;

pub use command::{AdjustKind, Command, ModalKind, StatusFilter};
pub use error::{Result, TrackerError};
pub use tracker::DebtTracker;
