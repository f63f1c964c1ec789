//! Core library for the comic shelf: a catalog of comic files and page extraction for them.

#![deny(missing_debug_implementations)]

pub mod catalog;
pub mod codec;
pub mod config;
pub mod fs;
pub mod library;
pub mod log;
pub mod session;
pub mod source;
pub mod types;

pub type Result<T> = std::result::Result<T, anyhow::Error>;

pub use catalog::{CatalogError, CatalogStore, Upsert};
pub use config::ShelfConfig;
pub use session::{PageCursor, ReadingSession};
pub use source::{EntryFailure, ExtractOptions, Extraction, PageExtractor};
pub use types::{
    CatalogEntry, EntryId, ImageDimensions, Page, PageOrder, PageSequence, Rating, SourceFormat,
};

/// Returns the version of the core crate for diagnostics.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
