//! Storage layer: page files and block access.
//!
//! `page_file` owns the lifecycle of the on-disk file, `block_accessor`
//! implements page-granular I/O on an open [`FileHandle`].

mod block_accessor;
mod page_file;

pub use block_accessor::BlockAccess;
pub use page_file::FileHandle;
