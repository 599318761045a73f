//! Error types for the page storage layer.
//!
//! Every variant maps onto a stable numeric result code so that callers
//! which log or persist outcomes can use `code()` and `error_message()`.

use crate::types::PageId;
use thiserror::Error;

/// Result type alias for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;

/// Result code of a successful operation
pub const RC_OK: i32 = 0;
pub const RC_FILE_NOT_FOUND: i32 = 1;
pub const RC_FILE_HANDLE_NOT_INIT: i32 = 2;
pub const RC_WRITE_FAILED: i32 = 3;
pub const RC_READ_NON_EXISTING_PAGE: i32 = 4;
pub const RC_FILE_CREATION_FAILED: i32 = 6;
pub const RC_MEMORY_ERROR: i32 = 501;
pub const RC_WRITE_ERROR: i32 = 502;
pub const RC_NULL_ERROR: i32 = 503;
pub const RC_READ_ERROR: i32 = 504;
pub const RC_WRITE_NON_EXISTING_PAGE: i32 = 505;
pub const RC_SEEK_FAILURE: i32 = 506;
pub const RC_GENERAL_ERROR: i32 = 619;

/// Errors that can occur in the page storage layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// A required name or handle resource was absent
    #[error("Null parameter: {0}")]
    NullParameter(String),

    /// The named file could not be located, opened or released
    #[error("File not found: {path}")]
    FileNotFound {
        path: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// The named file could not be created
    #[error("Failed to create file {path}")]
    FileCreation {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Block operation on a handle whose file was already closed
    #[error("File handle for {0} is not initialized")]
    FileHandleNotInit(String),

    /// Read addressed a page outside the readable range
    #[error("Cannot read non-existing page {page} (file has {total_pages} pages)")]
    ReadNonExistingPage { page: i64, total_pages: u32 },

    /// Write addressed a page outside the allocated range
    #[error("Cannot write non-existing page {page} (file has {total_pages} pages)")]
    WriteNonExistingPage { page: i64, total_pages: u32 },

    /// Fewer than a full page of bytes could be read
    #[error("Short read of page {page}")]
    ReadError {
        page: PageId,
        #[source]
        source: std::io::Error,
    },

    /// The initial page of a new file could not be committed
    #[error("Failed to write initial page of {path}")]
    WriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A block write or extension transferred fewer bytes than required
    #[error("Write failed at byte offset {offset}")]
    WriteFailed {
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    /// Positioning the underlying stream failed
    #[error("Seek to byte offset {offset} failed")]
    SeekFailure {
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    /// A zero-filled buffer of the requested size could not be allocated
    #[error("Cannot allocate {0} bytes for zero-filled pages")]
    Memory(usize),

    /// Caller-supplied buffer does not match the page size
    #[error("Page buffer must be {expected} bytes, got {actual}")]
    InvalidBufferSize { expected: usize, actual: usize },

    /// Configuration was rejected
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl StorageError {
    /// Create a null parameter error with a message
    pub fn null_parameter(msg: impl Into<String>) -> Self {
        Self::NullParameter(msg.into())
    }

    /// Create a file-not-found error without an underlying I/O cause
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound {
            path: path.into(),
            source: None,
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Numeric result code of this error
    pub fn code(&self) -> i32 {
        match self {
            Self::NullParameter(_) => RC_NULL_ERROR,
            Self::FileNotFound { .. } => RC_FILE_NOT_FOUND,
            Self::FileCreation { .. } => RC_FILE_CREATION_FAILED,
            Self::FileHandleNotInit(_) => RC_FILE_HANDLE_NOT_INIT,
            Self::ReadNonExistingPage { .. } => RC_READ_NON_EXISTING_PAGE,
            Self::WriteNonExistingPage { .. } => RC_WRITE_NON_EXISTING_PAGE,
            Self::ReadError { .. } => RC_READ_ERROR,
            Self::WriteError { .. } => RC_WRITE_ERROR,
            Self::WriteFailed { .. } => RC_WRITE_FAILED,
            Self::SeekFailure { .. } => RC_SEEK_FAILURE,
            Self::Memory(_) => RC_MEMORY_ERROR,
            Self::InvalidBufferSize { .. } | Self::InvalidConfig(_) => RC_GENERAL_ERROR,
        }
    }
}

/// Human-readable description of a numeric result code
pub fn error_message(code: i32) -> &'static str {
    match code {
        RC_OK => "OK",
        RC_FILE_NOT_FOUND => "file not found",
        RC_FILE_HANDLE_NOT_INIT => "file handle not initialized",
        RC_WRITE_FAILED => "write failed",
        RC_READ_NON_EXISTING_PAGE => "read of non-existing page",
        RC_FILE_CREATION_FAILED => "file creation failed",
        RC_MEMORY_ERROR => "memory allocation failed",
        RC_WRITE_ERROR => "write error",
        RC_NULL_ERROR => "null parameter",
        RC_READ_ERROR => "read error",
        RC_WRITE_NON_EXISTING_PAGE => "write of non-existing page",
        RC_SEEK_FAILURE => "seek failure",
        RC_GENERAL_ERROR => "general error",
        _ => "unknown result code",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_codes_and_messages() {
        let err = StorageError::ReadNonExistingPage {
            page: 7,
            total_pages: 3,
        };
        assert_eq!(err.code(), RC_READ_NON_EXISTING_PAGE);
        assert_eq!(error_message(err.code()), "read of non-existing page");

        assert_eq!(StorageError::null_parameter("name").code(), 503);
        assert_eq!(StorageError::file_not_found("x").code(), 1);
        assert_eq!(StorageError::Memory(10).code(), 501);
        assert_eq!(error_message(RC_OK), "OK");
        assert_eq!(error_message(-42), "unknown result code");
    }

    #[test]
    fn test_io_source_is_exposed() {
        let err = StorageError::SeekFailure {
            offset: 40,
            source: std::io::Error::new(std::io::ErrorKind::Other, "boom"),
        };
        assert_eq!(err.to_string(), "Seek to byte offset 40 failed");
        assert_eq!(err.source().map(|s| s.to_string()), Some("boom".to_string()));

        assert!(StorageError::file_not_found("gone.bin").source().is_none());
    }
}
