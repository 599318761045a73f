//! # Page Storage
//!
//! A fixed-size page file access layer. A page file is a flat byte stream made
//! of equally sized pages with no header, no metadata page and no checksums.
//! Page `p` lives at bytes `[p * page_size, (p + 1) * page_size)`.
//!
//! ## Architecture
//!
//! - **Page File** (`storage::page_file`): create, open, close and destroy
//!   the on-disk file. An open file is represented by a [`FileHandle`] that
//!   tracks the page count and a page cursor.
//! - **Block Accessor** (`storage::block_accessor`): read and write whole
//!   pages by number or relative to the cursor, and grow the file with
//!   zero-filled pages.
//!
//! Every call goes straight to the device; there is no caching at this layer.
//! A buffer pool or index layer builds on top through [`BlockAccess`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use page_storage::{Config, FileHandle, PageBuf, PageId};
//!
//! let config = Config::default();
//! FileHandle::create("pages.bin", &config)?;
//! let mut handle = FileHandle::open("pages.bin", &config)?;
//!
//! handle.ensure_capacity(4)?;
//! let page = PageBuf::from_bytes(b"0123456789");
//! handle.write_block(PageId::new(2), &page)?;
//!
//! let mut buf = PageBuf::zeroed(config.page_size)?;
//! handle.read_block(PageId::new(2), &mut buf)?;
//! handle.close()?;
//! ```

pub mod error;
pub mod page;
pub mod storage;
pub mod types;

pub use error::{error_message, Result, StorageError};
pub use page::PageBuf;
pub use storage::{BlockAccess, FileHandle};
pub use types::{PageId, PAGE_SIZE};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Page file configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Size of every page in bytes (default: [`PAGE_SIZE`])
    pub page_size: usize,
    /// Whether to sync writes to the device immediately (default: false)
    pub sync_on_write: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            sync_on_write: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    /// Enable sync on write for durability
    pub fn sync_on_write(mut self, enabled: bool) -> Self {
        self.sync_on_write = enabled;
        self
    }

    /// Parse and validate a configuration from JSON
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(text)
            .map_err(|e| StorageError::invalid_config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| StorageError::FileNotFound {
            path: path.display().to_string(),
            source: Some(source),
        })?;
        Self::from_json(&text)
    }

    /// Check that the configuration can describe a page file
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(StorageError::invalid_config("pageSize must be positive"));
        }
        Ok(())
    }
}
