//! Reading sessions: one extraction, a pagination cursor, and progress written back on every move.

use std::path::Path;

use tracing::info;

use crate::catalog::{self, CatalogStore};
use crate::source::{EntryFailure, PageExtractor};
use crate::types::{CatalogEntry, EntryId, Page, PageSequence};

/// Zero-based position within a page sequence. Moves clamp at both ends; there is no wraparound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageCursor {
    index: usize,
    len: usize,
}

impl PageCursor {
    /// Cursor over `len` pages starting at `index`, clamped into range.
    pub fn new(len: usize, index: usize) -> Self {
        Self { index: index.min(len.saturating_sub(1)), len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Step forward. Returns `false` (and stays put) on the last page.
    pub fn advance(&mut self) -> bool {
        if self.index + 1 < self.len {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// Step back. Returns `false` (and stays put) on the first page.
    pub fn retreat(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to `index`, clamped. Returns whether the position changed.
    pub fn seek(&mut self, index: usize) -> bool {
        let target = index.min(self.len.saturating_sub(1));
        let moved = target != self.index;
        self.index = target;
        moved
    }
}

/// Pages of one catalog entry held for the lifetime of a viewer.
#[derive(Debug)]
pub struct ReadingSession {
    entry: CatalogEntry,
    pages: PageSequence,
    failures: Vec<EntryFailure>,
    cursor: PageCursor,
}

impl ReadingSession {
    /// Extract every page of `id`, refresh its page count, and resume at the stored page.
    pub fn open(
        store: &CatalogStore,
        extractor: &PageExtractor,
        id: EntryId,
    ) -> catalog::Result<Self> {
        let entry = store.get_entry(id)?;
        let extraction = extractor.extract_pages(Path::new(&entry.path), entry.format);
        let page_count = extraction.pages.len();

        store.record_page_count(id, to_u32(page_count))?;

        let cursor = PageCursor::new(page_count, entry.resume_index(page_count));
        if !cursor.is_empty() {
            store.record_progress(id, to_u32(cursor.index()))?;
        }

        info!(
            target: "session",
            %id,
            path = %entry.path,
            pages = page_count,
            failures = extraction.failures.len(),
            start = cursor.index(),
            "opened reading session"
        );

        Ok(Self { entry, pages: extraction.pages, failures: extraction.failures, cursor })
    }

    pub fn entry(&self) -> &CatalogEntry {
        &self.entry
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Entries that were found but could not be read.
    pub fn failures(&self) -> &[EntryFailure] {
        &self.failures
    }

    pub fn index(&self) -> usize {
        self.cursor.index()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Page under the cursor, `None` when the file produced no pages.
    pub fn current_page(&self) -> Option<&Page> {
        self.pages.get(self.cursor.index())
    }

    /// Next page, persisting progress if the cursor moved.
    pub fn advance(&mut self, store: &CatalogStore) -> catalog::Result<bool> {
        let moved = self.cursor.advance();
        self.persist_if(moved, store)
    }

    /// Previous page, persisting progress if the cursor moved.
    pub fn retreat(&mut self, store: &CatalogStore) -> catalog::Result<bool> {
        let moved = self.cursor.retreat();
        self.persist_if(moved, store)
    }

    /// Jump to `index` (clamped), persisting progress if the cursor moved.
    pub fn jump_to(&mut self, store: &CatalogStore, index: usize) -> catalog::Result<bool> {
        let moved = self.cursor.seek(index);
        self.persist_if(moved, store)
    }

    fn persist_if(&self, moved: bool, store: &CatalogStore) -> catalog::Result<bool> {
        if moved {
            store.record_progress(self.entry.id, to_u32(self.cursor.index()))?;
        }
        Ok(moved)
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_stops_at_last_page() {
        let mut cursor = PageCursor::new(3, 1);
        assert!(cursor.advance());
        assert_eq!(cursor.index(), 2);
        assert!(!cursor.advance());
        assert_eq!(cursor.index(), 2);
    }

    #[test]
    fn retreat_stops_at_first_page() {
        let mut cursor = PageCursor::new(3, 1);
        assert!(cursor.retreat());
        assert!(!cursor.retreat());
        assert_eq!(cursor.index(), 0);
    }

    #[test]
    fn empty_cursor_never_moves() {
        let mut cursor = PageCursor::new(0, 5);
        assert_eq!(cursor.index(), 0);
        assert!(!cursor.advance());
        assert!(!cursor.retreat());
        assert!(!cursor.seek(3));
    }

    #[test]
    fn construction_and_seek_clamp() {
        let mut cursor = PageCursor::new(4, 10);
        assert_eq!(cursor.index(), 3);
        assert!(cursor.seek(0));
        assert!(!cursor.seek(0));
        assert!(cursor.seek(99));
        assert_eq!(cursor.index(), 3);
    }
}
