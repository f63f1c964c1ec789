//! SQLite-backed catalog store.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::{debug, info, warn};

use crate::types::{CatalogEntry, EntryId, Rating, SourceFormat};

use super::{CatalogError, Result};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS comics (
    id          INTEGER PRIMARY KEY,
    path        TEXT UNIQUE NOT NULL,
    display_name TEXT NOT NULL,
    rating      INTEGER DEFAULT 0,
    last_page   INTEGER DEFAULT 0,
    total_pages INTEGER DEFAULT 0,
    format      TEXT NOT NULL DEFAULT 'image'
)";

const ENTRY_COLUMNS: &str = "id, COALESCE(path, ''), COALESCE(display_name, path, ''), \
     COALESCE(rating, 0), COALESCE(last_page, 0), COALESCE(total_pages, 0), format";

/// Outcome of [`CatalogStore::upsert_entry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Upsert {
    pub id: EntryId,
    /// `false` when the path was already catalogued and nothing changed.
    pub inserted: bool,
}

/// Owns the single connection to the catalog database. Every write auto-commits.
#[derive(Debug)]
pub struct CatalogStore {
    conn: Connection,
    location: Option<PathBuf>,
}

impl CatalogStore {
    /// Open (or create) the catalog at `path`, creating parent directories as needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|source| CatalogError::Io { path: parent.to_path_buf(), source })?;
        }

        let conn = Connection::open(path)?;
        let store = Self { conn, location: Some(path.to_path_buf()) };
        store.init_schema()?;
        info!(target: "catalog", path = %path.display(), entries = store.len()?, "opened catalog");
        Ok(store)
    }

    /// Private catalog that disappears with the store.
    pub fn open_in_memory() -> Result<Self> {
        let store = Self { conn: Connection::open_in_memory()?, location: None };
        store.init_schema()?;
        Ok(store)
    }

    /// Database file backing the store, if any.
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute(SCHEMA, [])?;

        // Catalogs written before formats were stored lack the column. Adding it and
        // backfilling commit together so a failed backfill is retried on the next open.
        if !self.has_column("format")? {
            let tx = self.conn.unchecked_transaction()?;
            tx.execute("ALTER TABLE comics ADD COLUMN format TEXT NOT NULL DEFAULT 'image'", [])?;
            let backfilled = backfill_formats(&tx)?;
            tx.commit()?;
            info!(target: "catalog", backfilled, "added format column to legacy catalog");
        }
        Ok(())
    }

    fn has_column(&self, name: &str) -> Result<bool> {
        let mut stmt = self.conn.prepare("PRAGMA table_info(comics)")?;
        let columns = stmt.query_map([], |row| row.get::<_, String>(1))?;
        for column in columns {
            if column? == name {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Number of catalogued files.
    pub fn len(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM comics", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Insert a record for `path` unless one already exists; an existing record is left untouched.
    pub fn upsert_entry(
        &self,
        path: &str,
        display_name: &str,
        total_pages: u32,
        format: SourceFormat,
    ) -> Result<Upsert> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO comics (path, display_name, total_pages, format)
             VALUES (?1, ?2, ?3, ?4)",
            params![path, display_name, total_pages, format.as_tag()],
        )?;

        let id: i64 =
            self.conn.query_row("SELECT id FROM comics WHERE path = ?1", [path], |row| row.get(0))?;
        let upsert = Upsert { id: EntryId::new(id), inserted: changed > 0 };
        debug!(target: "catalog", path, id, inserted = upsert.inserted, "upserted entry");
        Ok(upsert)
    }

    pub fn rename_entry(&self, id: EntryId, new_name: &str) -> Result<()> {
        self.update(id, "UPDATE comics SET display_name = ?1 WHERE id = ?2", new_name)
    }

    /// Store a star rating, clamped into `0..=5`. Returns the value actually stored.
    pub fn rate_entry(&self, id: EntryId, value: i64) -> Result<Rating> {
        let rating = Rating::clamped(value);
        if i64::from(rating.value()) != value {
            warn!(target: "catalog", %id, value, stored = rating.value(), "rating out of range, clamped");
        }
        self.update(id, "UPDATE comics SET rating = ?1 WHERE id = ?2", rating.value())?;
        Ok(rating)
    }

    pub fn record_progress(&self, id: EntryId, last_page: u32) -> Result<()> {
        self.update(id, "UPDATE comics SET last_page = ?1 WHERE id = ?2", last_page)
    }

    pub fn record_page_count(&self, id: EntryId, total_pages: u32) -> Result<()> {
        self.update(id, "UPDATE comics SET total_pages = ?1 WHERE id = ?2", total_pages)
    }

    fn update(&self, id: EntryId, sql: &str, value: impl rusqlite::ToSql) -> Result<()> {
        let changed = self.conn.execute(sql, params![value, id.as_i64()])?;
        if changed == 0 {
            return Err(CatalogError::NotFound(id));
        }
        Ok(())
    }

    /// All entries ordered by display name; ties keep insertion order.
    pub fn list_entries(&self) -> Result<Vec<CatalogEntry>> {
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM comics ORDER BY display_name, id");
        let mut stmt = self.conn.prepare(&sql)?;
        let entries = stmt.query_map([], entry_from_row)?.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    pub fn get_entry(&self, id: EntryId) -> Result<CatalogEntry> {
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM comics WHERE id = ?1");
        self.conn
            .query_row(&sql, [id.as_i64()], entry_from_row)
            .optional()?
            .ok_or(CatalogError::NotFound(id))
    }

    pub fn find_by_path(&self, path: &str) -> Result<Option<CatalogEntry>> {
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM comics WHERE path = ?1");
        Ok(self.conn.query_row(&sql, [path], entry_from_row).optional()?)
    }
}

/// Derive `format` from each path's extension. Legacy rows may lack a path.
fn backfill_formats(conn: &Connection) -> Result<usize> {
    let rows: Vec<(i64, String)> = {
        let mut stmt = conn.prepare("SELECT id, path FROM comics WHERE path IS NOT NULL")?;
        let mapped = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        mapped.collect::<rusqlite::Result<_>>()?
    };

    for (id, path) in &rows {
        let format = SourceFormat::from_path(Path::new(path));
        conn.execute("UPDATE comics SET format = ?1 WHERE id = ?2", params![format.as_tag(), id])?;
    }
    Ok(rows.len())
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<CatalogEntry> {
    let format: String = row.get(6)?;
    Ok(CatalogEntry {
        id: EntryId::new(row.get(0)?),
        path: row.get(1)?,
        display_name: row.get(2)?,
        rating: Rating::clamped(row.get(3)?),
        last_page: non_negative(row.get(4)?),
        total_pages: non_negative(row.get(5)?),
        format: SourceFormat::from_tag(&format),
    })
}

fn non_negative(value: i64) -> u32 {
    u32::try_from(value).unwrap_or(if value < 0 { 0 } else { u32::MAX })
}
