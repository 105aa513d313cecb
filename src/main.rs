use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use jerry_songbook::catalog::{JsonFileStore, SongCatalog, DEFAULT_CATALOG_PATH};
use jerry_songbook::matcher::find_similar;
use jerry_songbook::models::{Song, DEFAULT_SOURCE, DEFAULT_TOP_N};
use jerry_songbook::progress::{init_logging, set_log_only};
use jerry_songbook::tokenize::parse_progression;

#[derive(Parser)]
#[command(name = "jerry-songbook")]
#[command(about = "Match chord progressions against the Jerry Garcia songbook")]
struct Args {
    /// Path to the JSON song catalog
    #[arg(long, env = "JERRY_CATALOG", default_value = DEFAULT_CATALOG_PATH, global = true)]
    catalog: PathBuf,

    /// Hide progress bars, log only
    #[arg(long, global = true)]
    log_only: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Suggest songs (and what comes next) for the chords being played
    Match {
        /// Chord chart text, e.g. `G C G D` or `| D % | G |`
        #[arg(required = true)]
        chords: Vec<String>,

        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top: usize,
    },
    /// Search songs by title or artist
    Search { query: String },
    /// Add a song, replacing any song with the same title
    Add {
        #[arg(long)]
        title: String,

        #[arg(long)]
        artist: String,

        #[arg(long, default_value = DEFAULT_SOURCE)]
        source: String,

        /// Chord chart text for the song's loop
        chart: String,
    },
    /// Print the chord tokens parsed from chart text
    Parse { text: String },
    /// List every song in catalog order
    List,
}

fn print_song(song: &Song) {
    println!(
        "{} - {} [{}] ({})",
        song.title,
        song.artist,
        song.progression.join(" "),
        song.source
    );
}

fn open_catalog(path: &Path) -> SongCatalog<JsonFileStore> {
    SongCatalog::load(JsonFileStore::new(path))
}

fn main() -> Result<()> {
    let args = Args::parse();
    set_log_only(args.log_only);
    init_logging();

    match args.command {
        Command::Match { chords, top } => {
            let catalog = open_catalog(&args.catalog);
            let current = parse_progression(&chords.join(" "));
            if current.is_empty() {
                bail!("No chords found in '{}'", chords.join(" "));
            }

            let results = find_similar(&catalog, &current, top);
            if results.is_empty() {
                println!("No matching songs for {}", current.join(" "));
            }
            for result in results {
                println!(
                    "{} - {}  similarity={:.2}  next: {}",
                    result.song.title,
                    result.song.artist,
                    result.similarity,
                    result.next_chords.join(" ")
                );
            }
        }
        Command::Search { query } => {
            let catalog = open_catalog(&args.catalog);
            let hits = catalog.search(&query);
            if hits.is_empty() {
                println!("No results found.");
            }
            for song in hits {
                print_song(song);
            }
        }
        Command::Add {
            title,
            artist,
            source,
            chart,
        } => {
            let progression = parse_progression(&chart);
            if progression.is_empty() {
                bail!("No chords found in chart '{}'", chart);
            }
            let mut catalog = open_catalog(&args.catalog);
            catalog
                .add(&title, &artist, progression, &source)
                .with_context(|| format!("Failed to save catalog {}", args.catalog.display()))?;
            println!("Saved '{}' ({} songs)", title, catalog.len());
        }
        Command::Parse { text } => {
            println!("{}", parse_progression(&text).join(" "));
        }
        Command::List => {
            for song in open_catalog(&args.catalog).iter() {
                print_song(song);
            }
        }
    }

    Ok(())
}
