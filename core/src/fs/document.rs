//! Paginated document (PDF) handling through a runtime-bound pdfium library.

use std::path::Path;

use anyhow::anyhow;
use pdfium_render::prelude::*;

use crate::codec;
use crate::source::{EntryFailure, Extraction};
use crate::types::Page;

use super::Result;

/// Points per inch in PDF user space.
const PDF_POINTS_PER_INCH: f32 = 72.0;

/// Native page count reported by the document.
pub fn count(path: &Path, library_dir: Option<&Path>) -> Result<usize> {
    let pdfium = bind(library_dir)?;
    let document = pdfium
        .load_pdf_from_file(path, None)
        .map_err(|err| anyhow!("opening document {:?}: {}", path, err))?;
    Ok(document.pages().len() as usize)
}

/// Rasterize every page at `dpi` and encode each one as PNG.
pub fn extract(path: &Path, dpi: f32, library_dir: Option<&Path>) -> Result<Extraction> {
    let pdfium = bind(library_dir)?;
    let document = pdfium
        .load_pdf_from_file(path, None)
        .map_err(|err| anyhow!("opening document {:?}: {}", path, err))?;

    let config = PdfRenderConfig::new().scale_page_by_factor(dpi / PDF_POINTS_PER_INCH);
    let mut extraction = Extraction::default();
    for (index, page) in document.pages().iter().enumerate() {
        let name = page_name(index);
        let rendered = page
            .render_with_config(&config)
            .map_err(|err| anyhow!("rendering: {}", err))
            .and_then(|bitmap| {
                let width = u32::try_from(bitmap.width())?;
                let height = u32::try_from(bitmap.height())?;
                codec::encode_png(width, height, bitmap.as_rgba_bytes())
            });
        match rendered {
            Ok(bytes) => extraction.pages.push(Page::new(name, bytes)),
            Err(err) => extraction.failures.push(EntryFailure::new(name, &err)),
        }
    }
    Ok(extraction)
}

fn bind(library_dir: Option<&Path>) -> Result<Pdfium> {
    let bindings = match library_dir {
        Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)),
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|err| anyhow!("binding pdfium library: {}", err))?;
    Ok(Pdfium::new(bindings))
}

fn page_name(index: usize) -> String {
    format!("page-{:04}.png", index + 1)
}
