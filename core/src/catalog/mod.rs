//! Persistent catalog of known comic files.

mod store;

use std::path::PathBuf;

use crate::types::EntryId;

pub use store::{CatalogStore, Upsert};

/// Errors surfaced by [`CatalogStore`] operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("no catalog entry with id {0}")]
    NotFound(EntryId),
    #[error("catalog database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("preparing catalog location {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CatalogError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
