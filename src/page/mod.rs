//! Page buffers.
//!
//! The block accessor reads into and writes from caller-owned slices. `PageBuf`
//! is an owned slice of exactly one page, and `PageBuf::zeroed` is also how the
//! accessor obtains the zero-filled scratch space used to grow a file.

use crate::error::{Result, StorageError};

/// A raw page buffer
#[derive(Clone, PartialEq, Eq)]
pub struct PageBuf {
    data: Box<[u8]>,
}

impl PageBuf {
    /// Allocate a zero-filled buffer of `len` bytes.
    ///
    /// Allocation failure is reported as [`StorageError::Memory`] rather than
    /// aborting the process.
    pub fn zeroed(len: usize) -> Result<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| StorageError::Memory(len))?;
        data.resize(len, 0);
        Ok(Self {
            data: data.into_boxed_slice(),
        })
    }

    /// Allocate a zero-filled buffer for `pages` pages of `page_size` bytes
    pub fn zeroed_pages(pages: u32, page_size: usize) -> Result<Self> {
        let len = (pages as usize)
            .checked_mul(page_size)
            .ok_or(StorageError::Memory(usize::MAX))?;
        Self::zeroed(len)
    }

    /// Create a page buffer from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            data: bytes.into(),
        }
    }

    /// Check whether every byte is zero
    pub fn is_zeroed(&self) -> bool {
        self.data.iter().all(|&b| b == 0)
    }

    /// Get a reference to the raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Get a mutable reference to the raw bytes
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl std::fmt::Debug for PageBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageBuf").field("len", &self.data.len()).finish()
    }
}

impl std::ops::Deref for PageBuf {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl std::ops::DerefMut for PageBuf {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

impl AsRef<[u8]> for PageBuf {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl AsMut<[u8]> for PageBuf {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PAGE_SIZE;

    #[test]
    fn test_zeroed_buffer() -> Result<()> {
        let buf = PageBuf::zeroed(PAGE_SIZE)?;
        assert_eq!(buf.len(), PAGE_SIZE);
        assert!(buf.is_zeroed());

        let batch = PageBuf::zeroed_pages(3, PAGE_SIZE)?;
        assert_eq!(batch.len(), 3 * PAGE_SIZE);
        Ok(())
    }

    #[test]
    fn test_oversized_allocation_is_memory_error() {
        let err = PageBuf::zeroed(usize::MAX).unwrap_err();
        assert!(matches!(err, StorageError::Memory(_)));

        let err = PageBuf::zeroed_pages(u32::MAX, usize::MAX / 2).unwrap_err();
        assert!(matches!(err, StorageError::Memory(_)));
    }

    #[test]
    fn test_mutation_through_deref() {
        let mut buf = PageBuf::from_bytes(b"abc");
        buf[1] = b'X';
        assert_eq!(buf.as_bytes(), b"aXc");
        assert!(!buf.is_zeroed());
    }
}
