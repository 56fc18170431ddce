//! Core domain entities.
//!
//! - [`UrlRecord`] - A persisted original URL to short code mapping
//! - [`BatchItem`] - Transient unit for bulk shortening and owner listings
//! - [`Stats`] - Aggregate counts

pub mod batch_item;
pub mod stats;
pub mod url_record;

pub use batch_item::BatchItem;
pub use stats::Stats;
pub use url_record::UrlRecord;
