use std::fs::File;
use std::io::Write;
use std::path::Path;

use shelf_core::library::{add_file, add_files};
use shelf_core::{CatalogStore, EntryId, PageExtractor, ReadingSession, SourceFormat};
use tempfile::tempdir;
use zip::CompressionMethod;
use zip::write::FileOptions;

fn create_zip(path: &Path, files: &[&str]) {
    let file = File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    for &name in files {
        zip.start_file(name, options).unwrap();
        zip.write_all(name.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

#[test]
fn add_file_detects_format_and_page_count() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Saga 01.cbz");
    create_zip(&path, &["1.png", "2.png", "3.png"]);

    let store = CatalogStore::open_in_memory().unwrap();
    let extractor = PageExtractor::default();
    let upsert = add_file(&store, &extractor, &path).unwrap();
    assert!(upsert.inserted);

    let entry = store.get_entry(upsert.id).unwrap();
    assert_eq!(entry.display_name, "Saga 01.cbz");
    assert_eq!(entry.total_pages, 3);
    assert_eq!(entry.format, SourceFormat::ZipArchive);

    store.rename_entry(upsert.id, "Saga #1").unwrap();
    let again = add_file(&store, &extractor, &path).unwrap();
    assert!(!again.inserted);
    assert_eq!(store.get_entry(upsert.id).unwrap().display_name, "Saga #1");
}

#[test]
fn add_files_counts_only_new_entries() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.cbz");
    let b = dir.path().join("b.png");
    create_zip(&a, &["1.png"]);
    std::fs::write(&b, b"img").unwrap();

    let store = CatalogStore::open_in_memory().unwrap();
    let extractor = PageExtractor::default();
    assert_eq!(add_files(&store, &extractor, [&a, &b, &a]), 2);
    assert_eq!(store.len().unwrap(), 2);
}

#[test]
fn session_navigates_and_persists_progress() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("issue.cbz");
    create_zip(&path, &["p2.png", "p1.png", "p10.png"]);

    let store = CatalogStore::open_in_memory().unwrap();
    let extractor = PageExtractor::default();
    let id = add_file(&store, &extractor, &path).unwrap().id;

    let mut session = ReadingSession::open(&store, &extractor, id).unwrap();
    assert_eq!(session.len(), 3);
    assert_eq!(session.index(), 0);
    assert_eq!(session.current_page().unwrap().name, "p1.png");

    assert!(!session.retreat(&store).unwrap());
    assert!(session.advance(&store).unwrap());
    assert!(session.advance(&store).unwrap());
    assert_eq!(session.current_page().unwrap().name, "p2.png");
    assert_eq!(store.get_entry(id).unwrap().last_page, 2);

    assert!(!session.advance(&store).unwrap());
    assert_eq!(session.index(), 2);

    assert!(session.retreat(&store).unwrap());
    assert_eq!(store.get_entry(id).unwrap().last_page, 1);

    // A new session resumes where the last one stopped.
    let resumed = ReadingSession::open(&store, &extractor, id).unwrap();
    assert_eq!(resumed.index(), 1);
    assert_eq!(resumed.current_page().unwrap().name, "p10.png");
}

#[test]
fn stale_progress_is_clamped_on_open() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("short.cbz");
    create_zip(&path, &["a.png", "b.png"]);

    let store = CatalogStore::open_in_memory().unwrap();
    let extractor = PageExtractor::default();
    let id = add_file(&store, &extractor, &path).unwrap().id;
    store.record_progress(id, 40).unwrap();

    let session = ReadingSession::open(&store, &extractor, id).unwrap();
    assert_eq!(session.index(), 1);
    assert_eq!(store.get_entry(id).unwrap().last_page, 1);
}

#[test]
fn corrupt_document_resets_page_count() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.pdf");
    std::fs::write(&path, b"%PDF-1.7 nothing usable").unwrap();

    let store = CatalogStore::open_in_memory().unwrap();
    let extractor = PageExtractor::default();
    let id = store
        .upsert_entry(&path.to_string_lossy(), "broken.pdf", 12, SourceFormat::Document)
        .unwrap()
        .id;

    let mut session = ReadingSession::open(&store, &extractor, id).unwrap();
    assert!(session.is_empty());
    assert!(session.current_page().is_none());
    assert!(!session.advance(&store).unwrap());
    assert_eq!(store.get_entry(id).unwrap().total_pages, 0);
}

#[test]
fn single_image_session_updates_count_to_one() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("poster.jpg");
    std::fs::write(&path, b"jpeg-ish").unwrap();

    let store = CatalogStore::open_in_memory().unwrap();
    let extractor = PageExtractor::default();
    let id = add_file(&store, &extractor, &path).unwrap().id;
    assert_eq!(store.get_entry(id).unwrap().total_pages, 0);

    let mut session = ReadingSession::open(&store, &extractor, id).unwrap();
    assert_eq!(session.pages()[0].bytes, b"jpeg-ish");
    assert!(!session.jump_to(&store, 5).unwrap());
    assert_eq!(store.get_entry(id).unwrap().total_pages, 1);
}

#[test]
fn opening_unknown_entry_is_not_found() {
    let store = CatalogStore::open_in_memory().unwrap();
    let err = ReadingSession::open(&store, &PageExtractor::default(), EntryId::new(9)).unwrap_err();
    assert!(err.is_not_found());
}
