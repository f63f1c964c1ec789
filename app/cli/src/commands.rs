use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use shelf_core::codec::{probe_dimensions, sniff_extension};
use shelf_core::library::add_files;
use shelf_core::{CatalogEntry, CatalogStore, EntryId, PageExtractor, ReadingSession, ShelfConfig};

use crate::cli::Command;

pub fn run(command: Command, config: &ShelfConfig, config_path: &Path) -> Result<()> {
    let open = || -> Result<(CatalogStore, PageExtractor)> {
        let store = CatalogStore::open(&config.database_path)
            .with_context(|| format!("opening catalog {}", config.database_path.display()))?;
        Ok((store, PageExtractor::new(config.extract_options())))
    };

    match command {
        Command::Config { init } => show_config(config, config_path, init),
        Command::Add { paths } => {
            let (store, extractor) = open()?;
            add(&store, &extractor, paths)
        }
        Command::List => list(&open()?.0),
        Command::Show { id } => show(&open()?.0, EntryId::new(id)),
        Command::Rename { id, name } => {
            let name = name.trim();
            if name.is_empty() {
                bail!("display name cannot be empty");
            }
            open()?.0.rename_entry(EntryId::new(id), name)?;
            println!("renamed {id} to {name:?}");
            Ok(())
        }
        Command::Rate { id, stars } => {
            let rating = open()?.0.rate_entry(EntryId::new(id), stars)?;
            println!("{} {}", stars_label(rating.value()), rating.value());
            Ok(())
        }
        Command::Read { id, page } => {
            let (store, extractor) = open()?;
            read(&store, &extractor, EntryId::new(id), page)
        }
        Command::Export { id, dir } => {
            let (store, extractor) = open()?;
            export(&store, &extractor, EntryId::new(id), &dir)
        }
    }
}

fn add(store: &CatalogStore, extractor: &PageExtractor, paths: Vec<PathBuf>) -> Result<()> {
    let requested = paths.len();
    let resolved: Vec<PathBuf> = paths
        .into_iter()
        .map(|path| fs::canonicalize(&path).unwrap_or(path))
        .collect();
    let inserted = add_files(store, extractor, &resolved);
    println!("added {inserted} of {requested} file(s)");
    Ok(())
}

fn list(store: &CatalogStore) -> Result<()> {
    let entries = store.list_entries()?;
    if entries.is_empty() {
        println!("catalog is empty; add files with `shelf add <path>`");
        return Ok(());
    }

    println!("{:>5}  {:<5}  {:>5}  name", "id", "stars", "pages");
    for entry in entries {
        println!(
            "{:>5}  {:<5}  {:>5}  {}",
            entry.id.as_i64(),
            stars_label(entry.rating.value()),
            entry.total_pages,
            entry.display_name
        );
    }
    Ok(())
}

fn show(store: &CatalogStore, id: EntryId) -> Result<()> {
    let entry = store.get_entry(id)?;
    print_entry(&entry);
    Ok(())
}

fn print_entry(entry: &CatalogEntry) {
    println!("{}", entry.display_name);
    println!("  id:        {}", entry.id);
    println!("  path:      {}", entry.path);
    println!("  format:    {}", entry.format);
    println!("  rating:    {} ({})", stars_label(entry.rating.value()), entry.rating.value());
    println!("  pages:     {}", entry.total_pages);
    println!("  last page: {}", entry.last_page + 1);
}

fn read(
    store: &CatalogStore,
    extractor: &PageExtractor,
    id: EntryId,
    start: Option<usize>,
) -> Result<()> {
    let mut session = ReadingSession::open(store, extractor, id)?;
    report_failures(&session);
    if session.is_empty() {
        println!("no pages");
        return Ok(());
    }
    if let Some(page) = start {
        session.jump_to(store, page.saturating_sub(1))?;
    }

    print_page(&session);
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        match line.trim() {
            "" | "n" => {
                if !session.advance(store)? {
                    println!("(last page)");
                    continue;
                }
            }
            "p" => {
                if !session.retreat(store)? {
                    println!("(first page)");
                    continue;
                }
            }
            "q" => break,
            other => match other.parse::<usize>() {
                Ok(page) => {
                    session.jump_to(store, page.saturating_sub(1))?;
                }
                Err(_) => {
                    println!("n/enter: next, p: previous, <number>: go to page, q: quit");
                    continue;
                }
            },
        }
        print_page(&session);
    }
    Ok(())
}

fn print_page(session: &ReadingSession) {
    let Some(page) = session.current_page() else {
        return;
    };
    let size = probe_dimensions(&page.bytes)
        .map(|dims| format!("{}x{}", dims.width, dims.height))
        .unwrap_or_else(|_| "?x?".to_string());
    print!("[{}/{}] {} {} > ", session.index() + 1, session.len(), page.name, size);
    let _ = io::stdout().flush();
}

fn export(store: &CatalogStore, extractor: &PageExtractor, id: EntryId, dir: &Path) -> Result<()> {
    let session = ReadingSession::open(store, extractor, id)?;
    report_failures(&session);
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    for (index, page) in session.pages().iter().enumerate() {
        let ext = sniff_extension(&page.bytes)
            .or_else(|| Path::new(&page.name).extension().and_then(|ext| ext.to_str()))
            .unwrap_or("bin");
        let target = dir.join(format!("{:04}.{ext}", index + 1));
        fs::write(&target, &page.bytes).with_context(|| format!("writing {}", target.display()))?;
    }
    println!("exported {} page(s) to {}", session.len(), dir.display());
    Ok(())
}

fn report_failures(session: &ReadingSession) {
    for failure in session.failures() {
        eprintln!("warning: skipped {failure}");
    }
}

fn show_config(config: &ShelfConfig, config_path: &Path, init: bool) -> Result<()> {
    if init {
        if config_path.exists() {
            println!("config already exists at {}", config_path.display());
        } else {
            ShelfConfig::default().save(config_path)?;
            println!("wrote default config to {}", config_path.display());
        }
    }
    println!("# {}", config_path.display());
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

fn stars_label(stars: u8) -> String {
    (0..5).map(|i| if i < stars { '*' } else { '.' }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stars_label_fills_from_left() {
        assert_eq!(stars_label(0), ".....");
        assert_eq!(stars_label(3), "***..");
        assert_eq!(stars_label(5), "*****");
    }
}
