//! Adding files to the catalog.

use std::path::Path;

use tracing::{info, warn};

use crate::catalog::{self, CatalogStore, Upsert};
use crate::source::PageExtractor;
use crate::types::SourceFormat;

/// Catalogue `path` under its base name, detecting its format and page count up front.
///
/// Adding a path that is already catalogued leaves the existing record alone.
pub fn add_file(
    store: &CatalogStore,
    extractor: &PageExtractor,
    path: &Path,
) -> catalog::Result<Upsert> {
    let format = SourceFormat::from_path(path);
    let display_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());
    let total = extractor.count_pages(path, format);
    let total = u32::try_from(total).unwrap_or(u32::MAX);

    let upsert = store.upsert_entry(&path.to_string_lossy(), &display_name, total, format)?;
    if upsert.inserted {
        info!(target: "library", id = %upsert.id, %format, pages = total, name = %display_name, "added file");
    }
    Ok(upsert)
}

/// Add several files, logging and skipping any that the store rejects. Returns how many were new.
pub fn add_files<P: AsRef<Path>>(
    store: &CatalogStore,
    extractor: &PageExtractor,
    paths: impl IntoIterator<Item = P>,
) -> usize {
    let mut inserted = 0;
    for path in paths {
        let path = path.as_ref();
        match add_file(store, extractor, path) {
            Ok(upsert) if upsert.inserted => inserted += 1,
            Ok(_) => {}
            Err(err) => warn!(target: "library", ?path, "could not add file: {err}"),
        }
    }
    inserted
}
