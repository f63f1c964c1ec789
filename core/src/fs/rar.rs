//! RAR/CBR archive handling through the bundled unrar library.

use std::path::Path;

use anyhow::anyhow;
use unrar::Archive;

use crate::source::{EntryFailure, Extraction};
use crate::types::{Page, PageOrder};

use super::{Result, util};

/// Number of page images listed in the archive headers.
pub fn count(path: &Path) -> Result<usize> {
    Ok(list_names(path)?.len())
}

/// Read every page image in reading order.
///
/// RAR is a solid stream, so entries are read in header order and reordered afterwards.
/// Entries sharing a name keep their header order.
pub fn extract(path: &Path, order: PageOrder) -> Result<Extraction> {
    let listed = list_names(path)?;

    let mut read: Vec<Result<Vec<u8>>> = Vec::with_capacity(listed.len());
    let mut archive = Archive::new(path)
        .open_for_processing()
        .map_err(|err| anyhow!("opening rar {:?}: {}", path, err))?;

    loop {
        let header = match archive.read_header() {
            Ok(Some(header)) => header,
            Ok(None) => break,
            Err(err) => {
                // A broken header ends the stream; whatever was not read yet is reported below.
                tracing::debug!(target: "fs::rar", "header read failed in {:?}: {err}", path);
                break;
            }
        };

        let name = entry_name(&header.entry().filename);
        let wanted = header.entry().is_file() && util::is_page_image(&name);
        archive = if wanted {
            match header.read() {
                Ok((bytes, rest)) => {
                    read.push(Ok(bytes));
                    rest
                }
                Err(err) => {
                    read.push(Err(anyhow!("{}", err)));
                    break;
                }
            }
        } else {
            match header.skip() {
                Ok(rest) => rest,
                Err(err) => {
                    tracing::debug!(target: "fs::rar", "skipping {name:?} failed in {:?}: {err}", path);
                    break;
                }
            }
        };
    }

    // Both passes walk the same headers with the same filter, so `read` lines up with a
    // prefix of `listed`.
    let mut read = read.into_iter();
    let mut entries: Vec<(String, Result<Vec<u8>>)> = listed
        .into_iter()
        .map(|name| {
            let outcome = read
                .next()
                .unwrap_or_else(|| Err(anyhow!("entry listed but never reached while reading")));
            (name, outcome)
        })
        .collect();
    entries.sort_by(|a, b| util::compare_names(&a.0, &b.0, order));

    let mut extraction = Extraction::default();
    for (name, outcome) in entries {
        match outcome {
            Ok(bytes) => extraction.pages.push(Page::new(name, bytes)),
            Err(err) => extraction.failures.push(EntryFailure::new(name, &err)),
        }
    }
    Ok(extraction)
}

fn list_names(path: &Path) -> Result<Vec<String>> {
    let archive = Archive::new(path)
        .open_for_listing()
        .map_err(|err| anyhow!("listing rar {:?}: {}", path, err))?;

    let mut names = Vec::new();
    for header in archive {
        let header = header.map_err(|err| anyhow!("reading rar header: {}", err))?;
        if !header.is_file() {
            continue;
        }
        let name = entry_name(&header.filename);
        if util::is_page_image(&name) {
            names.push(name);
        }
    }
    Ok(names)
}

fn entry_name(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
