//! Block accessor.
//!
//! Page-granular reads and writes on an open [`FileHandle`], addressed either
//! by page number or relative to the handle's cursor, plus the operations
//! that grow a file with zero-filled pages.
//!
//! Range rules:
//! - reads accept `0 <= page <= total_num_pages`. The upper bound is
//!   inclusive, so reading page `total_num_pages` of a well-formed file gets
//!   past the range check and then fails with [`StorageError::ReadError`]
//!   because the transfer comes up short.
//! - writes accept `page < total_num_pages` only. New pages come from
//!   [`FileHandle::append_empty_block`] or [`FileHandle::ensure_capacity`].

use super::page_file::FileHandle;
use crate::error::{Result, StorageError};
use crate::page::PageBuf;
use crate::types::PageId;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::{debug, trace, warn};

/// Page-number addressed access to a page store.
///
/// This is the surface a buffer pool or index layer is expected to build on.
/// Every call is a direct device access; implementations do not cache.
pub trait BlockAccess {
    /// Size of every page in bytes
    fn page_size(&self) -> usize;

    /// Number of allocated pages
    fn total_num_pages(&self) -> u32;

    /// Read a page into `buf`
    fn read_block(&mut self, page: PageId, buf: &mut [u8]) -> Result<()>;

    /// Overwrite an allocated page with `buf`
    fn write_block(&mut self, page: PageId, buf: &[u8]) -> Result<()>;

    /// Allocate one more zero-filled page
    fn append_empty_block(&mut self) -> Result<()>;

    /// Grow the store to at least `pages` pages
    fn ensure_capacity(&mut self, pages: u32) -> Result<()>;
}

impl FileHandle {
    /// Read page `page` into `buf` and move the cursor there
    pub fn read_block(&mut self, page: PageId, buf: &mut [u8]) -> Result<()> {
        self.read_at_position(i64::from(page.value()), buf)
    }

    /// Read page 0 and move the cursor there
    pub fn read_first_block(&mut self, buf: &mut [u8]) -> Result<()> {
        self.read_at_position(0, buf)
    }

    /// Read page `cur_page_pos - 2`.
    ///
    /// The offset of two is relative to the raw cursor value and only lands
    /// on the page before the last one read when the caller has already
    /// advanced the cursor once more. Callers track that convention
    /// themselves; see the tests for the exact walk.
    pub fn read_previous_block(&mut self, buf: &mut [u8]) -> Result<()> {
        self.read_at_position(self.cur_page_pos - 2, buf)
    }

    /// Re-read the page under the cursor
    pub fn read_current_block(&mut self, buf: &mut [u8]) -> Result<()> {
        self.read_at_position(self.cur_page_pos, buf)
    }

    /// Read the page after the cursor and advance the cursor to it
    pub fn read_next_block(&mut self, buf: &mut [u8]) -> Result<()> {
        self.read_at_position(self.cur_page_pos + 1, buf)
    }

    /// Read page `total_num_pages`, the inclusive upper bound of the read
    /// range.
    ///
    /// On a file whose length matches its page count this page has no bytes
    /// and the call fails with [`StorageError::ReadError`].
    pub fn read_last_block(&mut self, buf: &mut [u8]) -> Result<()> {
        self.read_at_position(i64::from(self.total_num_pages), buf)
    }

    /// Current cursor as a page number
    pub fn get_block_position(&self) -> Result<PageId> {
        PageId::try_from(self.cur_page_pos).map_err(|_| {
            StorageError::null_parameter(format!("cursor is out of range: {}", self.cur_page_pos))
        })
    }

    /// Overwrite the allocated page `page` with `buf`. The cursor is not
    /// moved.
    pub fn write_block(&mut self, page: PageId, buf: &[u8]) -> Result<()> {
        self.write_at_position(i64::from(page.value()), buf)
    }

    /// Overwrite the page under the cursor
    pub fn write_current_block(&mut self, buf: &[u8]) -> Result<()> {
        self.write_at_position(self.cur_page_pos, buf)
    }

    /// Append one zero-filled page and advance the cursor by one
    pub fn append_empty_block(&mut self) -> Result<()> {
        let new_total = self.total_num_pages.checked_add(1).ok_or(
            StorageError::WriteNonExistingPage {
                page: i64::from(u32::MAX) + 1,
                total_pages: self.total_num_pages,
            },
        )?;
        self.grow_to(new_total)?;
        self.cur_page_pos += 1;
        Ok(())
    }

    /// Grow the file to `pages` pages, appending all missing zero pages in a
    /// single write, and move the cursor to the new page count.
    ///
    /// Nothing happens when the file already has at least `pages` pages.
    pub fn ensure_capacity(&mut self, pages: u32) -> Result<()> {
        if pages <= self.total_num_pages {
            return Ok(());
        }
        self.grow_to(pages)?;
        self.cur_page_pos = i64::from(self.total_num_pages);
        Ok(())
    }

    /// Flush written pages to the device
    pub fn sync(&mut self) -> Result<()> {
        let file = held_file(&mut self.file, &self.file_name)?;
        file.sync_data().map_err(|source| StorageError::WriteFailed {
            offset: PageId::new(self.total_num_pages).file_offset(self.page_size),
            source,
        })
    }

    fn read_at_position(&mut self, pos: i64, buf: &mut [u8]) -> Result<()> {
        let total_pages = self.total_num_pages;
        let page = match PageId::try_from(pos) {
            Ok(page) if page.value() <= total_pages => page,
            _ => {
                warn!(page = pos, total_pages, "read of non-existing page");
                return Err(StorageError::ReadNonExistingPage {
                    page: pos,
                    total_pages,
                });
            }
        };
        check_buffer(self.page_size, buf.len())?;

        let offset = page.file_offset(self.page_size);
        let file = held_file(&mut self.file, &self.file_name)?;

        file.seek(SeekFrom::Start(offset))
            .map_err(|_| StorageError::ReadNonExistingPage {
                page: pos,
                total_pages,
            })?;
        file.read_exact(buf).map_err(|source| {
            warn!(page = page.value(), error = %source, "short page read");
            StorageError::ReadError { page, source }
        })?;

        self.cur_page_pos = pos;
        trace!(page = page.value(), "read block");
        Ok(())
    }

    fn write_at_position(&mut self, pos: i64, buf: &[u8]) -> Result<()> {
        let total_pages = self.total_num_pages;
        let page = match PageId::try_from(pos) {
            Ok(page) if page.value() < total_pages => page,
            _ => {
                warn!(page = pos, total_pages, "write of non-existing page");
                return Err(StorageError::WriteNonExistingPage {
                    page: pos,
                    total_pages,
                });
            }
        };
        check_buffer(self.page_size, buf.len())?;

        let offset = page.file_offset(self.page_size);
        let file = held_file(&mut self.file, &self.file_name)?;

        file.seek(SeekFrom::Start(offset))
            .map_err(|source| StorageError::SeekFailure { offset, source })?;
        write_pages(file, buf, self.sync_on_write)
            .map_err(|source| StorageError::WriteFailed { offset, source })?;

        trace!(page = page.value(), "wrote block");
        Ok(())
    }

    /// Zero-fill pages `[total_num_pages, new_total)`.
    ///
    /// The write starts at the end of the last complete page, so a trailing
    /// partial page left by an earlier failure is overwritten rather than
    /// shifting every new page off its boundary.
    fn grow_to(&mut self, new_total: u32) -> Result<()> {
        let extra = new_total - self.total_num_pages;
        let zeros = PageBuf::zeroed_pages(extra, self.page_size)?;

        let offset = PageId::new(self.total_num_pages).file_offset(self.page_size);
        let file = held_file(&mut self.file, &self.file_name)?;

        file.seek(SeekFrom::Start(offset))
            .map_err(|source| StorageError::SeekFailure { offset, source })?;
        write_pages(file, &zeros, self.sync_on_write).map_err(|source| {
            warn!(offset, pages = extra, error = %source, "cannot append pages");
            StorageError::WriteFailed { offset, source }
        })?;
        self.total_num_pages = new_total;

        file.seek(SeekFrom::End(0))
            .map_err(|source| StorageError::SeekFailure { offset, source })?;

        debug!(
            path = %self.file_name.display(),
            added = extra,
            total_num_pages = new_total,
            "grew page file"
        );
        Ok(())
    }
}

impl BlockAccess for FileHandle {
    fn page_size(&self) -> usize {
        FileHandle::page_size(self)
    }

    fn total_num_pages(&self) -> u32 {
        FileHandle::total_num_pages(self)
    }

    fn read_block(&mut self, page: PageId, buf: &mut [u8]) -> Result<()> {
        FileHandle::read_block(self, page, buf)
    }

    fn write_block(&mut self, page: PageId, buf: &[u8]) -> Result<()> {
        FileHandle::write_block(self, page, buf)
    }

    fn append_empty_block(&mut self) -> Result<()> {
        FileHandle::append_empty_block(self)
    }

    fn ensure_capacity(&mut self, pages: u32) -> Result<()> {
        FileHandle::ensure_capacity(self, pages)
    }
}

fn held_file<'a>(file: &'a mut Option<File>, file_name: &Path) -> Result<&'a mut File> {
    file.as_mut()
        .ok_or_else(|| StorageError::FileHandleNotInit(file_name.display().to_string()))
}

fn check_buffer(page_size: usize, len: usize) -> Result<()> {
    if len != page_size {
        return Err(StorageError::InvalidBufferSize {
            expected: page_size,
            actual: len,
        });
    }
    Ok(())
}

fn write_pages(file: &mut File, data: &[u8], sync: bool) -> std::io::Result<()> {
    file.write_all(data)?;
    if sync {
        file.sync_data()?;
    }
    Ok(())
}
