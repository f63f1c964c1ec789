//! Fallback for files with no recognised container: the file itself is the only page.

use std::fs;
use std::path::Path;

use anyhow::Context;

use crate::source::Extraction;
use crate::types::Page;

use super::Result;

pub fn extract(path: &Path) -> Result<Extraction> {
    let bytes = fs::read(path).with_context(|| format!("reading image {:?}", path))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());

    let mut extraction = Extraction::default();
    extraction.pages.push(Page::new(name, bytes));
    Ok(extraction)
}
