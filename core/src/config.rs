//! User configuration: where the catalog lives and how pages are extracted.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::Result;
use crate::source::{DEFAULT_RENDER_DPI, ExtractOptions};
use crate::types::PageOrder;

pub(crate) const APP_QUALIFIER: &str = "com";
pub(crate) const APP_ORGANISATION: &str = "ComicShelf";
pub(crate) const APP_NAME: &str = "comic-shelf";

pub const ENV_DATABASE: &str = "SHELF_DB";
pub const ENV_PDFIUM_DIR: &str = "SHELF_PDFIUM_DIR";
pub const ENV_RENDER_DPI: &str = "SHELF_RENDER_DPI";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShelfConfig {
    pub database_path: PathBuf,
    pub render_dpi: f32,
    pub page_order: PageOrder,
    pub pdfium_library_dir: Option<PathBuf>,
    pub log_directory: Option<PathBuf>,
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self {
            database_path: data_dir().join("comics.db"),
            render_dpi: DEFAULT_RENDER_DPI,
            page_order: PageOrder::default(),
            pdfium_library_dir: None,
            log_directory: None,
        }
    }
}

impl ShelfConfig {
    /// Read `path` (a missing file means defaults), then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let config = match fs::read(path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("parsing config {}", path.display()))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(err) => {
                return Err(err).with_context(|| format!("reading config {}", path.display()));
            }
        };
        config.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `SHELF_*` overrides read through `lookup`.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(db) = lookup(ENV_DATABASE) {
            self.database_path = PathBuf::from(db);
        }
        if let Some(dir) = lookup(ENV_PDFIUM_DIR) {
            self.pdfium_library_dir = Some(PathBuf::from(dir));
        }
        if let Some(dpi) = lookup(ENV_RENDER_DPI) {
            self.render_dpi = dpi
                .trim()
                .parse()
                .with_context(|| format!("{ENV_RENDER_DPI} is not a number: {dpi:?}"))?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.render_dpi.is_finite() && self.render_dpi > 0.0) {
            return Err(anyhow!("render_dpi must be a positive number, got {}", self.render_dpi));
        }
        Ok(())
    }

    /// Write the config as pretty JSON, replacing any existing file atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)
            .with_context(|| format!("creating config directory {}", parent.display()))?;

        let data = serde_json::to_vec_pretty(self)?;
        let mut temp = NamedTempFile::new_in(parent)?;
        temp.write_all(&data)?;
        temp.flush()?;
        temp.persist(path).map_err(|err| anyhow!(err.error))?;
        Ok(())
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            render_dpi: self.render_dpi,
            page_order: self.page_order,
            pdfium_library_dir: self.pdfium_library_dir.clone(),
        }
    }
}

/// Default location of the config file.
pub fn default_config_path() -> PathBuf {
    ProjectDirs::from(APP_QUALIFIER, APP_ORGANISATION, APP_NAME)
        .map(|dirs| dirs.config_dir().join("config.json"))
        .unwrap_or_else(|| PathBuf::from("shelf.json"))
}

/// Per-user data directory holding the catalog and logs.
pub fn data_dir() -> PathBuf {
    ProjectDirs::from(APP_QUALIFIER, APP_ORGANISATION, APP_NAME)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join(APP_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = ShelfConfig::default()
            .with_env_overrides(|_| None)
            .expect("defaults are valid");
        assert_eq!(config.render_dpi, 150.0);
        assert!(config.database_path.ends_with("comics.db"));

        let loaded = ShelfConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded.page_order, PageOrder::Lexicographic);
    }

    #[test]
    fn save_then_load_preserves_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cfg").join("config.json");
        let config = ShelfConfig {
            database_path: dir.path().join("x.db"),
            render_dpi: 200.0,
            page_order: PageOrder::Natural,
            pdfium_library_dir: Some(dir.path().join("lib")),
            log_directory: None,
        };
        config.save(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"natural\""));
        let parsed: ShelfConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let parsed: ShelfConfig = serde_json::from_str(r#"{"render_dpi": 96}"#).unwrap();
        assert_eq!(parsed.render_dpi, 96.0);
        assert_eq!(parsed.page_order, PageOrder::Lexicographic);
    }

    #[test]
    fn env_overrides_apply_and_validate() {
        let config = ShelfConfig::default()
            .with_env_overrides(|key| match key {
                ENV_DATABASE => Some("/tmp/other.db".into()),
                ENV_RENDER_DPI => Some(" 300 ".into()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/other.db"));
        assert_eq!(config.render_dpi, 300.0);

        let err = ShelfConfig::default()
            .with_env_overrides(|key| (key == ENV_RENDER_DPI).then(|| "-5".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("positive"));
    }

    #[test]
    fn extract_options_follow_config() {
        let config = ShelfConfig { render_dpi: 72.0, ..ShelfConfig::default() };
        assert_eq!(config.extract_options().render_dpi, 72.0);
    }
}
