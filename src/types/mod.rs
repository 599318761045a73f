//! Common types used throughout the storage layer.

mod page_id;

pub use page_id::PageId;

/// Page size in bytes of the reference configuration.
///
/// Deployments pick their own size through [`crate::Config::page_size`];
/// a file must always be reopened with the size it was written with.
pub const PAGE_SIZE: usize = 10;
