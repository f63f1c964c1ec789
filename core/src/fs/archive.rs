//! ZIP/CBZ archive handling.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, anyhow};
use zip::read::ZipArchive;

use crate::source::{EntryFailure, Extraction};
use crate::types::{Page, PageOrder};

use super::{Result, util};

/// Number of page images listed in the archive directory.
pub fn count(path: &Path) -> Result<usize> {
    let mut archive = open(path)?;
    Ok(collect_entries(&mut archive, PageOrder::Lexicographic)?.len())
}

/// Read every page image in reading order. Unreadable entries are reported, not dropped.
pub fn extract(path: &Path, order: PageOrder) -> Result<Extraction> {
    let mut archive = open(path)?;
    let entries = collect_entries(&mut archive, order)?;

    let mut extraction = Extraction::default();
    for (index, name) in entries {
        match read_entry(&mut archive, index) {
            Ok(bytes) => extraction.pages.push(Page::new(name, bytes)),
            Err(err) => extraction.failures.push(EntryFailure::new(name, &err)),
        }
    }
    Ok(extraction)
}

fn open(path: &Path) -> Result<ZipArchive<File>> {
    let file = File::open(path).with_context(|| format!("opening archive {:?}", path))?;
    ZipArchive::new(file).map_err(|err| anyhow!("reading zip directory of {:?}: {}", path, err))
}

/// Image entries as `(index, name)` pairs, sorted by name.
fn collect_entries(archive: &mut ZipArchive<File>, order: PageOrder) -> Result<Vec<(usize, String)>> {
    let mut entries = Vec::new();
    for idx in 0..archive.len() {
        let file = archive.by_index(idx).map_err(|err| anyhow!("{}", err))?;
        if file.is_dir() || !util::is_page_image(file.name()) {
            continue;
        }
        entries.push((idx, file.name().to_string()));
    }

    entries.sort_by(|a, b| util::compare_names(&a.1, &b.1, order));
    Ok(entries)
}

fn read_entry(archive: &mut ZipArchive<File>, index: usize) -> Result<Vec<u8>> {
    let mut file = archive.by_index(index).map_err(|err| anyhow!("{}", err))?;
    // The declared size comes from the archive and is not trusted for allocation.
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).context("decompressing entry")?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::CompressionMethod;
    use zip::write::FileOptions;

    #[test]
    fn lists_image_entries_in_name_order() {
        let dir = tempdir().unwrap();
        let archive_path = dir.path().join("demo.cbz");
        create_zip(&archive_path, &["p2.png", "p1.png", "notes.txt", "p10.png"]);

        let extraction = extract(&archive_path, PageOrder::Lexicographic).expect("extract");
        let names: Vec<&str> = extraction.pages.iter().map(|page| page.name.as_str()).collect();
        assert_eq!(names, vec!["p1.png", "p10.png", "p2.png"]);
        assert!(extraction.failures.is_empty());
        assert_eq!(count(&archive_path).unwrap(), 3);
    }

    #[test]
    fn skips_directories_and_keeps_entry_bytes() {
        let dir = tempdir().unwrap();
        let archive_path = dir.path().join("demo.cbz");
        create_zip(&archive_path, &["pages/", "pages/cover.JPG", "pages/thumb.gif"]);

        let extraction = extract(&archive_path, PageOrder::Lexicographic).expect("extract");
        assert_eq!(extraction.pages.len(), 1);
        assert_eq!(extraction.pages[0].name, "pages/cover.JPG");
        assert_eq!(extraction.pages[0].bytes, b"pages/cover.JPG");
    }

    #[test]
    fn rejects_non_zip_input() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.cbz");
        std::fs::write(&path, b"definitely not a zip").unwrap();

        assert!(count(&path).is_err());
        assert!(extract(&path, PageOrder::Lexicographic).is_err());
    }

    #[test]
    fn oversized_header_does_not_preallocate() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("huge.cbz");
        std::fs::write(&path, zip64_with_declared_size(b"a.png", b"abc", 1 << 62)).unwrap();

        assert_eq!(count(&path).unwrap(), 1);
        let extraction = extract(&path, PageOrder::Lexicographic).expect("extract");
        assert_eq!(extraction.pages.len() + extraction.failures.len(), 1);
    }

    /// Stored single-entry zip whose central directory claims `declared` uncompressed bytes
    /// through a zip64 extra field.
    fn zip64_with_declared_size(name: &[u8], data: &[u8], declared: u64) -> Vec<u8> {
        let crc = crc32(data);
        let mut out = Vec::new();

        out.extend_from_slice(&0x0403_4b50u32.to_le_bytes());
        out.extend_from_slice(&45u16.to_le_bytes());
        out.extend_from_slice(&[0; 4]); // flags, method
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0x5a21u16.to_le_bytes());
        out.extend_from_slice(&crc.to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(name);
        out.extend_from_slice(data);

        let directory_start = out.len();
        out.extend_from_slice(&0x0201_4b50u32.to_le_bytes());
        out.extend_from_slice(&45u16.to_le_bytes());
        out.extend_from_slice(&45u16.to_le_bytes());
        out.extend_from_slice(&[0; 4]);
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0x5a21u16.to_le_bytes());
        out.extend_from_slice(&crc.to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&u32::MAX.to_le_bytes());
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&12u16.to_le_bytes());
        out.extend_from_slice(&[0; 10]); // comment length, disk, attributes
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(name);
        out.extend_from_slice(&0x0001u16.to_le_bytes());
        out.extend_from_slice(&8u16.to_le_bytes());
        out.extend_from_slice(&declared.to_le_bytes());
        let directory_len = out.len() - directory_start;

        out.extend_from_slice(&0x0605_4b50u32.to_le_bytes());
        out.extend_from_slice(&[0; 4]);
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&(directory_len as u32).to_le_bytes());
        out.extend_from_slice(&(directory_start as u32).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out
    }

    fn crc32(data: &[u8]) -> u32 {
        let mut crc = !0u32;
        for &byte in data {
            crc ^= u32::from(byte);
            for _ in 0..8 {
                crc = if crc & 1 == 1 { (crc >> 1) ^ 0xedb8_8320 } else { crc >> 1 };
            }
        }
        !crc
    }

    fn create_zip(path: &Path, files: &[&str]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for &name in files {
            if name.ends_with('/') {
                zip.add_directory(name.trim_end_matches('/'), options).unwrap();
            } else {
                zip.start_file(name, options).unwrap();
                zip.write_all(name.as_bytes()).unwrap();
            }
        }

        zip.finish().unwrap();
    }
}
