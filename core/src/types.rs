//! Shared data structures exchanged between the catalog, the page sources, and the shell.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Row identifier of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(i64);

impl EntryId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Star rating, always within `0..=MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    pub const MAX: u8 = 5;

    /// Clamp an arbitrary integer into the valid star range.
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(0, Self::MAX as i64) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

/// How a catalogued file is turned into pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    /// Paginated document rendered through pdfium.
    Document,
    ZipArchive,
    RarArchive,
    /// Anything else: the whole file is one page.
    SingleImage,
}

impl SourceFormat {
    /// Resolve the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()).map(|s| s.to_ascii_lowercase()) {
            Some(ref ext) if ext == "pdf" => SourceFormat::Document,
            Some(ref ext) if ext == "cbz" || ext == "zip" => SourceFormat::ZipArchive,
            Some(ref ext) if ext == "cbr" || ext == "rar" => SourceFormat::RarArchive,
            _ => SourceFormat::SingleImage,
        }
    }

    /// Tag persisted in the catalog's `format` column.
    pub fn as_tag(self) -> &'static str {
        match self {
            SourceFormat::Document => "document",
            SourceFormat::ZipArchive => "zip",
            SourceFormat::RarArchive => "rar",
            SourceFormat::SingleImage => "image",
        }
    }

    /// Inverse of [`SourceFormat::as_tag`]. Unknown tags fall back to a single image.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "document" => SourceFormat::Document,
            "zip" => SourceFormat::ZipArchive,
            "rar" => SourceFormat::RarArchive,
            _ => SourceFormat::SingleImage,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// One persisted catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub id: EntryId,
    pub path: String,
    pub display_name: String,
    pub rating: Rating,
    pub last_page: u32,
    pub total_pages: u32,
    pub format: SourceFormat,
}

impl CatalogEntry {
    /// Page index a new session should start from, given the freshly extracted page count.
    ///
    /// Stored progress may point past the end when the file shrank since the last read.
    pub fn resume_index(&self, page_count: usize) -> usize {
        if page_count == 0 { 0 } else { (self.last_page as usize).min(page_count - 1) }
    }
}

/// Ordering applied to archive entry names before they become pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageOrder {
    /// Plain string order: `p1, p10, p2`.
    #[default]
    Lexicographic,
    /// Digit runs compare numerically: `p1, p2, p10`.
    Natural,
}

/// A single extracted page image.
#[derive(Clone, PartialEq, Eq)]
pub struct Page {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Page {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), bytes }
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page").field("name", &self.name).field("len", &self.bytes.len()).finish()
    }
}

/// Ordered, zero-indexed pages of one reading session.
pub type PageSequence = Vec<Page>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}
