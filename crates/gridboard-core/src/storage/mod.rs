//! Layout persistence abstraction.
//!
//! The store only depends on [`LayoutPersistence`]; the host application
//! decides where and how the widget list is kept.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::widget::Widget;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Save/load contract for the widget list.
///
/// `save` receives the complete layout after every committed mutation. The
/// store does not retry or inspect failures beyond logging them. `load` is
/// called once when a store is opened and returns `None` when nothing has
/// been saved yet.
pub trait LayoutPersistence: Send + Sync {
    /// Persist the full widget list.
    fn save(&self, widgets: &[Widget]) -> StorageResult<()>;

    /// Load the last saved widget list, if any.
    fn load(&self) -> StorageResult<Option<Vec<Widget>>>;
}
