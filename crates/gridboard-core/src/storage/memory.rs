//! In-memory storage implementation.

use super::{LayoutPersistence, StorageError, StorageResult};
use crate::widget::Widget;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    widgets: RwLock<Option<Vec<Widget>>>,
    saves: AtomicUsize,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage that already holds a layout.
    pub fn with_layout(widgets: Vec<Widget>) -> Self {
        Self {
            widgets: RwLock::new(Some(widgets)),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of times `save` has been called.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }

    /// The most recently saved layout.
    pub fn last_saved(&self) -> Option<Vec<Widget>> {
        self.widgets.read().ok().and_then(|widgets| widgets.clone())
    }
}

impl LayoutPersistence for MemoryStorage {
    fn save(&self, widgets: &[Widget]) -> StorageResult<()> {
        let mut stored = self
            .widgets
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        *stored = Some(widgets.to_vec());
        self.saves.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn load(&self) -> StorageResult<Option<Vec<Widget>>> {
        let stored = self
            .widgets
            .read()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        Ok(stored.clone())
    }
}
