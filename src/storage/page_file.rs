//! Page file lifecycle.
//!
//! A page file holds `total_num_pages * page_size` bytes. Creating a file
//! writes a single zero page; opening derives the page count from the file
//! length. Nothing else is stored on disk.

use crate::error::{Result, StorageError};
use crate::page::PageBuf;
use crate::Config;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// An open page file.
///
/// The handle exclusively owns the underlying [`File`]. Block operations
/// update the page count and the cursor as a side effect. After
/// [`FileHandle::close`] the handle stays inspectable, but any further I/O
/// fails with [`StorageError::FileHandleNotInit`].
#[derive(Debug)]
pub struct FileHandle {
    pub(super) file_name: PathBuf,
    pub(super) total_num_pages: u32,
    /// Page last accessed. Signed because cursor-relative reads compute
    /// targets below zero.
    pub(super) cur_page_pos: i64,
    pub(super) page_size: usize,
    pub(super) sync_on_write: bool,
    pub(super) file: Option<File>,
}

impl FileHandle {
    /// Create a page file holding exactly one zero-filled page.
    ///
    /// An existing file with the same name is truncated and reset.
    pub fn create(path: impl AsRef<Path>, config: &Config) -> Result<()> {
        let path = path.as_ref();
        require_name(path)?;
        config.validate()?;

        let zeros = PageBuf::zeroed(config.page_size)?;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|source| {
                warn!(path = %path.display(), error = %source, "cannot create page file");
                StorageError::FileCreation {
                    path: path.display().to_string(),
                    source,
                }
            })?;

        let commit = |file: &mut File| -> std::io::Result<()> {
            file.write_all(&zeros)?;
            if config.sync_on_write {
                file.sync_all()?;
            }
            Ok(())
        };
        commit(&mut file).map_err(|source| {
            warn!(path = %path.display(), error = %source, "cannot write initial page");
            StorageError::WriteError {
                path: path.display().to_string(),
                source,
            }
        })?;

        debug!(path = %path.display(), page_size = config.page_size, "created page file");
        Ok(())
    }

    /// Open an existing page file for reading and writing.
    ///
    /// The page count is the file length divided by the page size. A
    /// trailing partial page is not counted and is left on disk untouched.
    pub fn open(path: impl AsRef<Path>, config: &Config) -> Result<Self> {
        let path = path.as_ref();
        require_name(path)?;
        config.validate()?;

        let not_found = |source: std::io::Error| {
            warn!(path = %path.display(), error = %source, "cannot open page file");
            StorageError::FileNotFound {
                path: path.display().to_string(),
                source: Some(source),
            }
        };

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(not_found)?;
        let len = file.metadata().map_err(not_found)?.len();

        let page_size = config.page_size as u64;
        let total_num_pages = u32::try_from(len / page_size).map_err(|_| {
            StorageError::invalid_config(format!(
                "{} holds more than {} pages of {} bytes",
                path.display(),
                u32::MAX,
                page_size
            ))
        })?;
        if len % page_size != 0 {
            debug!(
                path = %path.display(),
                trailing_bytes = len % page_size,
                "ignoring trailing partial page"
            );
        }

        debug!(path = %path.display(), total_num_pages, "opened page file");
        Ok(Self {
            file_name: path.to_path_buf(),
            total_num_pages,
            cur_page_pos: 0,
            page_size: config.page_size,
            sync_on_write: config.sync_on_write,
            file: Some(file),
        })
    }

    /// Release the underlying file.
    ///
    /// Data is flushed to the device before the file is dropped. Closing a
    /// handle twice fails with [`StorageError::NullParameter`].
    pub fn close(&mut self) -> Result<()> {
        let file = self.file.take().ok_or_else(|| {
            StorageError::null_parameter(format!(
                "{} is already closed",
                self.file_name.display()
            ))
        })?;

        file.sync_all().map_err(|source| {
            warn!(path = %self.file_name.display(), error = %source, "cannot release page file");
            StorageError::FileNotFound {
                path: self.file_name.display().to_string(),
                source: Some(source),
            }
        })?;
        drop(file);

        debug!(path = %self.file_name.display(), "closed page file");
        Ok(())
    }

    /// Remove a page file from storage.
    ///
    /// Handles still open on the file keep working on the unlinked inode
    /// until they are closed, but the name no longer resolves.
    pub fn destroy(path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        require_name(path)?;

        fs::remove_file(path).map_err(|source| {
            warn!(path = %path.display(), error = %source, "cannot destroy page file");
            StorageError::FileNotFound {
                path: path.display().to_string(),
                source: Some(source),
            }
        })?;

        debug!(path = %path.display(), "destroyed page file");
        Ok(())
    }

    /// Path the handle was opened with
    pub fn file_name(&self) -> &Path {
        &self.file_name
    }

    /// Number of complete pages in the file
    pub fn total_num_pages(&self) -> u32 {
        self.total_num_pages
    }

    /// Raw cursor value
    pub fn cur_page_pos(&self) -> i64 {
        self.cur_page_pos
    }

    /// Page size the handle was opened with
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Whether the underlying file is still held
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }
}

fn require_name(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(StorageError::null_parameter("file name is empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PAGE_SIZE;
    use tempfile::tempdir;

    #[test]
    fn test_create_then_open() -> Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");
        let config = Config::default();

        FileHandle::create(&path, &config)?;
        assert_eq!(fs::read(&path).unwrap(), vec![0u8; PAGE_SIZE]);

        let handle = FileHandle::open(&path, &config)?;
        assert_eq!(handle.total_num_pages(), 1);
        assert_eq!(handle.cur_page_pos(), 0);
        assert_eq!(handle.file_name(), path.as_path());
        assert!(handle.is_open());

        Ok(())
    }

    #[test]
    fn test_create_truncates_existing_file() -> Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");
        fs::write(&path, vec![0xAB; 5 * PAGE_SIZE]).unwrap();

        FileHandle::create(&path, &Config::default())?;
        assert_eq!(fs::read(&path).unwrap(), vec![0u8; PAGE_SIZE]);

        Ok(())
    }

    #[test]
    fn test_create_in_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("test.bin");

        let err = FileHandle::create(&path, &Config::default()).unwrap_err();
        assert!(matches!(err, StorageError::FileCreation { .. }));
    }

    #[test]
    fn test_empty_name_is_null_parameter() {
        let config = Config::default();
        assert!(matches!(
            FileHandle::create("", &config),
            Err(StorageError::NullParameter(_))
        ));
        assert!(matches!(
            FileHandle::open("", &config),
            Err(StorageError::NullParameter(_))
        ));
        assert!(matches!(
            FileHandle::destroy(""),
            Err(StorageError::NullParameter(_))
        ));
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempdir().unwrap();
        let err = FileHandle::open(dir.path().join("missing.bin"), &Config::default()).unwrap_err();
        assert!(matches!(err, StorageError::FileNotFound { .. }));
    }

    #[test]
    fn test_open_ignores_trailing_partial_page() -> Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");
        fs::write(&path, vec![1u8; 3 * PAGE_SIZE + 4]).unwrap();

        let handle = FileHandle::open(&path, &Config::default())?;
        assert_eq!(handle.total_num_pages(), 3);
        // No truncation happens on open
        assert_eq!(fs::metadata(&path).unwrap().len(), 3 * PAGE_SIZE as u64 + 4);

        Ok(())
    }

    #[test]
    fn test_page_count_follows_configured_page_size() -> Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");
        let config = Config::new().page_size(4096).sync_on_write(true);

        FileHandle::create(&path, &config)?;
        assert_eq!(fs::metadata(&path).unwrap().len(), 4096);

        let handle = FileHandle::open(&path, &config)?;
        assert_eq!(handle.total_num_pages(), 1);
        assert_eq!(handle.page_size(), 4096);

        // The same bytes seen with the reference page size
        let handle = FileHandle::open(&path, &Config::default())?;
        assert_eq!(handle.total_num_pages(), 409);

        Ok(())
    }

    #[test]
    fn test_close_twice() -> Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");
        let config = Config::default();
        FileHandle::create(&path, &config)?;

        let mut handle = FileHandle::open(&path, &config)?;
        handle.close()?;
        assert!(!handle.is_open());

        let err = handle.close().unwrap_err();
        assert!(matches!(err, StorageError::NullParameter(_)));

        Ok(())
    }

    #[test]
    fn test_destroy_open_handle() -> Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");
        let config = Config::default();
        FileHandle::create(&path, &config)?;

        let _handle = FileHandle::open(&path, &config)?;
        FileHandle::destroy(&path)?;
        assert!(!path.exists());

        let err = FileHandle::open(&path, &config).unwrap_err();
        assert!(matches!(err, StorageError::FileNotFound { .. }));

        let err = FileHandle::destroy(&path).unwrap_err();
        assert!(matches!(err, StorageError::FileNotFound { .. }));

        Ok(())
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");
        let config = Config::new().page_size(0);

        let err = FileHandle::create(&path, &config).unwrap_err();
        assert!(matches!(err, StorageError::InvalidConfig(_)));
        assert!(!path.exists());
    }
}
