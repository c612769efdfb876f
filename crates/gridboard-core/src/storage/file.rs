//! File-based storage implementation.

use super::{LayoutPersistence, StorageError, StorageResult};
use crate::widget::Widget;
use std::fs;
use std::path::{Path, PathBuf};

/// File-based storage.
///
/// Stores one layout as a pretty-printed JSON array in `<base>/<id>.json`.
pub struct FileStorage {
    /// Base directory for layout files.
    base_path: PathBuf,
    /// Layout identifier, already sanitized for use as a file name.
    layout_id: String,
}

impl FileStorage {
    /// Create a new file storage for `layout_id` in the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf, layout_id: &str) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self {
            base_path,
            layout_id: sanitize_id(layout_id),
        })
    }

    /// Create file storage in the default location.
    ///
    /// On Unix: `~/.local/share/gridboard/layouts/`
    /// On Windows: `%LOCALAPPDATA%\gridboard\layouts\`
    pub fn default_location(layout_id: &str) -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        Self::new(base.join("gridboard").join("layouts"), layout_id)
    }

    /// Path of the layout file.
    pub fn layout_path(&self) -> PathBuf {
        self.base_path.join(format!("{}.json", self.layout_id))
    }

    /// Get the base path.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

fn sanitize_id(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

impl LayoutPersistence for FileStorage {
    fn save(&self, widgets: &[Widget]) -> StorageResult<()> {
        let path = self.layout_path();
        let json = serde_json::to_string_pretty(widgets)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        fs::write(&path, json)
            .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", path.display(), e)))
    }

    fn load(&self) -> StorageResult<Option<Vec<Widget>>> {
        let path = self.layout_path();
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path)
            .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))?;

        serde_json::from_str(&json).map(Some).map_err(|e| {
            StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
        })
    }
}
