//! Format-polymorphic page extraction.
//!
//! [`PageExtractor`] turns a catalogued file into pages.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::fs;
use crate::types::{PageOrder, PageSequence, SourceFormat};

/// Rasterization resolution used for documents when nothing else is configured.
pub const DEFAULT_RENDER_DPI: f32 = 150.0;

/// Tunables for [`PageExtractor`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    pub render_dpi: f32,
    pub page_order: PageOrder,
    /// Directory holding the pdfium shared library; `None` uses the system search path.
    pub pdfium_library_dir: Option<PathBuf>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            render_dpi: DEFAULT_RENDER_DPI,
            page_order: PageOrder::default(),
            pdfium_library_dir: None,
        }
    }
}

/// An entry that could not be turned into a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFailure {
    pub entry: String,
    pub cause: String,
}

impl EntryFailure {
    pub fn new(entry: impl Into<String>, cause: &anyhow::Error) -> Self {
        Self { entry: entry.into(), cause: format!("{cause:#}") }
    }
}

impl fmt::Display for EntryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.entry, self.cause)
    }
}

/// Pages produced by one extraction plus everything that failed along the way.
#[derive(Debug, Default)]
pub struct Extraction {
    pub pages: PageSequence,
    pub failures: Vec<EntryFailure>,
}

impl Extraction {
    /// Whether every entry that was found also made it into `pages`.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    fn failed(entry: &Path, cause: &anyhow::Error) -> Self {
        Self {
            pages: Vec::new(),
            failures: vec![EntryFailure::new(entry.to_string_lossy(), cause)],
        }
    }
}

/// Stateless page source; every call re-reads the file from scratch.
#[derive(Debug, Clone, Default)]
pub struct PageExtractor {
    options: ExtractOptions,
}

impl PageExtractor {
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Best-effort page count. Any failure yields 0, as does the single-image fallback.
    pub fn count_pages(&self, path: &Path, format: SourceFormat) -> usize {
        let counted = match format {
            SourceFormat::Document => fs::document::count(path, self.library_dir()),
            SourceFormat::ZipArchive => fs::archive::count(path),
            SourceFormat::RarArchive => fs::rar::count(path),
            SourceFormat::SingleImage => return 0,
        };

        match counted {
            Ok(count) => {
                debug!(target: "source::count", ?path, %format, count, "counted pages");
                count
            }
            Err(err) => {
                warn!(target: "source::count", ?path, %format, "page count failed: {err:#}");
                0
            }
        }
    }

    /// Materialize every page in reading order.
    pub fn extract_pages(&self, path: &Path, format: SourceFormat) -> Extraction {
        let extracted = match format {
            SourceFormat::Document => {
                fs::document::extract(path, self.options.render_dpi, self.library_dir())
            }
            SourceFormat::ZipArchive => fs::archive::extract(path, self.options.page_order),
            SourceFormat::RarArchive => fs::rar::extract(path, self.options.page_order),
            SourceFormat::SingleImage => fs::single::extract(path),
        };

        let extraction = match extracted {
            Ok(extraction) => {
                for failure in &extraction.failures {
                    warn!(
                        target: "source::extract",
                        ?path,
                        entry = %failure.entry,
                        "skipped entry: {}",
                        failure.cause
                    );
                }
                extraction
            }
            Err(err) => {
                warn!(target: "source::extract", ?path, %format, "extraction failed: {err:#}");
                Extraction::failed(path, &err)
            }
        };
        debug!(
            target: "source::extract",
            ?path,
            %format,
            pages = extraction.pages.len(),
            failures = extraction.failures.len(),
            "extracted pages"
        );
        extraction
    }

    fn library_dir(&self) -> Option<&Path> {
        self.options.pdfium_library_dir.as_deref()
    }
}
