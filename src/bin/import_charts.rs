//! Bulk-import chord charts into the song catalog.
//!
//! Usage: import-charts <charts.txt> [--catalog songs.json] [--dry-run]
//!
//! Each chart line reads `Title - Artist: | G % | C / | D |`. Songs are
//! inserted in file order (replacing same-titled entries) and the catalog is
//! saved once at the end.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

use jerry_songbook::catalog::{JsonFileStore, SongCatalog, DEFAULT_CATALOG_PATH};
use jerry_songbook::models::Song;
use jerry_songbook::progress::{
    create_progress_bar, create_spinner, format_duration, init_logging, log_progress,
    set_log_only,
};
use jerry_songbook::safety::validate_catalog_path;
use jerry_songbook::tokenize::parse_chart_line;

#[derive(Parser)]
#[command(name = "import-charts")]
#[command(about = "Import chord charts from a text file into the song catalog")]
struct Args {
    charts: PathBuf,

    #[arg(long, env = "JERRY_CATALOG", default_value = DEFAULT_CATALOG_PATH)]
    catalog: PathBuf,

    /// Source credited on imported songs
    #[arg(long)]
    source: Option<String>,

    /// Parse and report without writing the catalog
    #[arg(long)]
    dry_run: bool,

    /// Hide progress bars, log only
    #[arg(long)]
    log_only: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    set_log_only(args.log_only);
    init_logging();

    validate_catalog_path(&args.catalog, &[args.charts.as_path()])?;

    let start = Instant::now();
    let text = fs::read_to_string(&args.charts)
        .with_context(|| format!("Failed to read charts file {}", args.charts.display()))?;
    let lines: Vec<&str> = text.lines().collect();
    let total = lines.len() as u64;

    let store = JsonFileStore::new(&args.catalog);
    let mut catalog = if args.dry_run {
        SongCatalog::load_read_only(store)
    } else {
        SongCatalog::load(store)
    };
    let before = catalog.len();

    let pb = create_progress_bar(total, "Importing charts");
    let mut imported = 0usize;
    let mut replaced = 0usize;
    let mut skipped = 0usize;

    for (i, line) in lines.iter().enumerate() {
        match parse_chart_line(line) {
            Some(entry) => {
                let mut song =
                    Song::with_default_source(entry.title, entry.artist, entry.progression);
                if let Some(source) = &args.source {
                    song.source = source.clone();
                }
                if catalog.insert(song).is_some() {
                    replaced += 1;
                }
                imported += 1;
            }
            None => {
                let trimmed = line.trim();
                if !trimmed.is_empty() && !trimmed.starts_with('#') {
                    warn!("Skipping line {}: no chart found", i + 1);
                }
                skipped += 1;
            }
        }
        pb.inc(1);
        log_progress("import", i as u64 + 1, total, 100);
    }
    pb.finish_with_message(format!("Parsed {} charts", imported));

    if args.dry_run {
        info!("Dry run: catalog not written");
    } else {
        let spinner = create_spinner("Saving catalog");
        catalog
            .save()
            .with_context(|| format!("Failed to save catalog {}", args.catalog.display()))?;
        spinner.finish_with_message(format!("Saved {}", args.catalog.display()));
    }

    println!("\n{:=<60}", "");
    println!("Import complete!");
    println!("  Imported: {} ({} replaced)", imported, replaced);
    println!("  Skipped lines: {}", skipped);
    println!("  Catalog: {} -> {} songs", before, catalog.len());
    println!("  Elapsed: {}", format_duration(start.elapsed()));
    println!("{:=<60}", "");

    Ok(())
}
