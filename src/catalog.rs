//! Song catalog with insertion-ordered storage and JSON persistence.
//!
//! The catalog owns every [`Song`]. Lookups go through a title index keyed by
//! the lower-cased title, while iteration follows insertion order so that
//! matcher tie-breaks are reproducible across reloads.

use rustc_hash::FxHashMap;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::Song;

/// Default catalog location, relative to the working directory.
pub const DEFAULT_CATALOG_PATH: &str = "jerry_in_a_box/data/songs.json";

// ============================================================================
// Storage
// ============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("catalog I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed catalog data: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where catalog records are read from and written to.
pub trait SongStore {
    fn read(&self) -> Result<Vec<Song>, StoreError>;
    fn write(&self, songs: &[Song]) -> Result<(), StoreError>;
}

/// Persists the catalog as a pretty-printed JSON array of song records.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SongStore for JsonFileStore {
    fn read(&self) -> Result<Vec<Song>, StoreError> {
        let data = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        Ok(serde_json::from_str(&data)?)
    }

    fn write(&self, songs: &[Song]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }
        let json = serde_json::to_string_pretty(songs)?;
        fs::write(&self.path, json).map_err(|e| self.io_error(e))
    }
}

// ============================================================================
// Seed Data
// ============================================================================

fn chords(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Built-in sample songs used when no usable catalog is on disk.
pub fn seed_songs() -> Vec<Song> {
    vec![
        Song::with_default_source(
            "Ripple",
            "Grateful Dead",
            chords(&["G", "C", "G", "D", "G", "C", "G", "D", "C", "G", "D", "G"]),
        ),
        Song::with_default_source(
            "Friend of the Devil",
            "Grateful Dead",
            chords(&["Am", "C", "G", "D", "Am", "C", "G", "D", "F", "C", "G", "D"]),
        ),
        Song::with_default_source(
            "Scarlet Begonias",
            "Grateful Dead",
            chords(&["G", "C", "G", "D", "C", "G", "D", "G"]),
        ),
    ]
}

// ============================================================================
// Catalog
// ============================================================================

/// Catalog key for a title (case-insensitive).
pub fn normalize_title(title: &str) -> String {
    title.to_lowercase()
}

pub struct SongCatalog<S: SongStore> {
    store: S,
    songs: Vec<Song>,
    index: FxHashMap<String, usize>,
}

impl<S: SongStore> SongCatalog<S> {
    /// Load the catalog from `store`.
    ///
    /// Missing or malformed storage is replaced by [`seed_songs`], which are
    /// persisted right away. This never fails: a seed that can't be written
    /// is still served from memory.
    pub fn load(store: S) -> Self {
        let (catalog, seeded) = Self::read_or_seed(store);
        if seeded {
            if let Err(e) = catalog.save() {
                warn!("Failed to persist seed catalog: {}", e);
            }
        }
        catalog
    }

    /// Like [`SongCatalog::load`], but a seed fallback stays in memory and
    /// the store is never written.
    pub fn load_read_only(store: S) -> Self {
        Self::read_or_seed(store).0
    }

    /// Returns the catalog and whether it fell back to the seed songs.
    fn read_or_seed(store: S) -> (Self, bool) {
        let mut catalog = Self {
            store,
            songs: Vec::new(),
            index: FxHashMap::default(),
        };

        match catalog.store.read() {
            Ok(songs) => {
                for song in songs {
                    catalog.insert(song);
                }
                info!("Loaded {} songs from catalog", catalog.len());
                (catalog, false)
            }
            Err(e) => {
                warn!("Catalog unavailable ({}), using seed songs", e);
                for song in seed_songs() {
                    catalog.insert(song);
                }
                (catalog, true)
            }
        }
    }

    /// Write every song, in catalog order, back to the store.
    pub fn save(&self) -> Result<(), StoreError> {
        self.store.write(&self.songs)?;
        debug!("Saved {} songs", self.songs.len());
        Ok(())
    }

    /// Insert or replace by normalized title without persisting.
    ///
    /// A replaced song keeps its original position in catalog order.
    /// Returns the previous record, if any.
    pub fn insert(&mut self, song: Song) -> Option<Song> {
        let key = normalize_title(&song.title);
        match self.index.get(&key) {
            Some(&pos) => Some(std::mem::replace(&mut self.songs[pos], song)),
            None => {
                self.index.insert(key, self.songs.len());
                self.songs.push(song);
                None
            }
        }
    }

    /// Insert or replace a song, then persist the whole catalog.
    pub fn add(
        &mut self,
        title: &str,
        artist: &str,
        progression: Vec<String>,
        source: &str,
    ) -> Result<(), StoreError> {
        if self
            .insert(Song::new(title, artist, progression, source))
            .is_some()
        {
            info!("Replaced song '{}'", title);
        } else {
            info!("Added song '{}'", title);
        }
        self.save()
    }

    /// Songs whose title or artist contains `query`, case-insensitively.
    pub fn search(&self, query: &str) -> Vec<&Song> {
        let query = query.to_lowercase();
        self.songs
            .iter()
            .filter(|song| {
                song.title.to_lowercase().contains(&query)
                    || song.artist.to_lowercase().contains(&query)
            })
            .collect()
    }

    pub fn get(&self, title: &str) -> Option<&Song> {
        self.index
            .get(&normalize_title(title))
            .map(|&pos| &self.songs[pos])
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Song> {
        self.songs.iter()
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<'a, S: SongStore> IntoIterator for &'a SongCatalog<S> {
    type Item = &'a Song;
    type IntoIter = std::slice::Iter<'a, Song>;

    fn into_iter(self) -> Self::IntoIter {
        self.songs.iter()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::DEFAULT_SOURCE;
    use std::cell::RefCell;
    use tempfile::tempdir;

    /// In-memory store; `None` simulates missing storage.
    #[derive(Default)]
    pub(crate) struct MemoryStore {
        pub data: RefCell<Option<Vec<Song>>>,
        pub writes: RefCell<usize>,
    }

    impl MemoryStore {
        pub fn with_songs(songs: Vec<Song>) -> Self {
            Self {
                data: RefCell::new(Some(songs)),
                writes: RefCell::new(0),
            }
        }
    }

    impl SongStore for MemoryStore {
        fn read(&self) -> Result<Vec<Song>, StoreError> {
            self.data.borrow().clone().ok_or_else(|| StoreError::Io {
                path: PathBuf::from("<memory>"),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        }

        fn write(&self, songs: &[Song]) -> Result<(), StoreError> {
            *self.data.borrow_mut() = Some(songs.to_vec());
            *self.writes.borrow_mut() += 1;
            Ok(())
        }
    }

    fn song(title: &str, artist: &str, progression: &[&str]) -> Song {
        Song::with_default_source(title, artist, chords(progression))
    }

    #[test]
    fn test_missing_storage_falls_back_to_seed() {
        let catalog = SongCatalog::load(MemoryStore::default());
        assert_eq!(catalog.len(), 3);
        let titles: Vec<&str> = catalog.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Ripple", "Friend of the Devil", "Scarlet Begonias"]);
        // Seed is persisted
        assert_eq!(*catalog.store().writes.borrow(), 1);
        assert_eq!(catalog.store().data.borrow().as_ref().unwrap().len(), 3);
    }

    #[test]
    fn test_load_existing_songs_in_order() {
        let store = MemoryStore::with_songs(vec![
            song("Deal", "Jerry Garcia", &["C", "G"]),
            song("Sugaree", "Jerry Garcia", &["B", "E"]),
        ]);
        let catalog = SongCatalog::load(store);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.songs()[0].title, "Deal");
        assert_eq!(catalog.songs()[1].title, "Sugaree");
        assert_eq!(*catalog.store().writes.borrow(), 0);
    }

    #[test]
    fn test_add_replaces_by_normalized_title() {
        let mut catalog = SongCatalog::load(MemoryStore::default());
        let before = catalog.len();
        catalog
            .add("RIPPLE", "Grateful Dead", chords(&["D", "A"]), DEFAULT_SOURCE)
            .unwrap();
        assert_eq!(catalog.len(), before);
        let ripple = catalog.get("ripple").unwrap();
        assert_eq!(ripple.progression, chords(&["D", "A"]));
        assert_eq!(ripple.title, "RIPPLE");
        // Keeps its slot in catalog order
        assert_eq!(catalog.songs()[0].title, "RIPPLE");
    }

    #[test]
    fn test_add_new_song_appends_and_persists() {
        let mut catalog = SongCatalog::load(MemoryStore::with_songs(vec![]));
        catalog
            .add("Deal", "Jerry Garcia", chords(&["C", "G"]), "Live Book")
            .unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("DEAL").unwrap().source, "Live Book");
        assert_eq!(*catalog.store().writes.borrow(), 1);
        assert_eq!(catalog.store().data.borrow().as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_search_title_and_artist_case_insensitive() {
        let store = MemoryStore::with_songs(vec![
            song("Ripple", "Grateful Dead", &["G"]),
            song("Deal", "Jerry Garcia", &["C"]),
            song("Sugaree", "Jerry Garcia Band", &["B"]),
        ]);
        let catalog = SongCatalog::load(store);

        let hits: Vec<&str> = catalog.search("GARCIA").iter().map(|s| s.title.as_str()).collect();
        assert_eq!(hits, vec!["Deal", "Sugaree"]);

        let hits: Vec<&str> = catalog.search("ripp").iter().map(|s| s.title.as_str()).collect();
        assert_eq!(hits, vec!["Ripple"]);

        assert!(catalog.search("zeppelin").is_empty());
    }

    #[test]
    fn test_json_store_round_trip_and_default_source() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("songs.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            r#"[{"title": "Deal", "artist": "Jerry Garcia", "progression": ["C", "G"]}]"#,
        )
        .unwrap();

        let mut catalog = SongCatalog::load(JsonFileStore::new(&path));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("deal").unwrap().source, DEFAULT_SOURCE);

        catalog
            .add("Sugaree", "Jerry Garcia", chords(&["B", "E"]), DEFAULT_SOURCE)
            .unwrap();

        let reloaded = SongCatalog::load(JsonFileStore::new(&path));
        let titles: Vec<&str> = reloaded.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Deal", "Sugaree"]);
    }

    #[test]
    fn test_json_store_null_optional_fields_keep_user_songs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("songs.json");
        let data = r#"[{"title": "Deal", "artist": "Jerry Garcia", "progression": ["C", "G"],
            "all_chords": null, "sections": null},
            {"title": "Sugaree", "artist": "Jerry Garcia", "progression": ["B", "E"],
            "sections": {"verse": "B E", "chorus": ["A", "E"]}}]"#;
        fs::write(&path, data).unwrap();

        let catalog = SongCatalog::load(JsonFileStore::new(&path));
        let titles: Vec<&str> = catalog.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Deal", "Sugaree"]);
        // Nothing was seeded, so the user's file is untouched
        assert_eq!(fs::read_to_string(&path).unwrap(), data);
    }

    #[test]
    fn test_read_only_load_leaves_malformed_file_alone() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("songs.json");
        fs::write(&path, "{ not json").unwrap();

        let catalog = SongCatalog::load_read_only(JsonFileStore::new(&path));
        assert_eq!(catalog.len(), 3);
        assert_eq!(fs::read(&path).unwrap(), b"{ not json");
    }

    #[test]
    fn test_read_only_load_does_not_create_missing_file() {
        let catalog = SongCatalog::load_read_only(MemoryStore::default());
        assert_eq!(catalog.len(), 3);
        assert_eq!(*catalog.store().writes.borrow(), 0);
        assert!(catalog.store().data.borrow().is_none());
    }

    #[test]
    fn test_json_store_missing_file_writes_seed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("songs.json");

        let catalog = SongCatalog::load(JsonFileStore::new(&path));
        assert_eq!(catalog.len(), 3);
        assert!(path.exists());

        let persisted: Vec<Song> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(persisted.len(), 3);
        assert_eq!(persisted[0].title, "Ripple");
    }

    #[test]
    fn test_json_store_malformed_file_writes_seed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("songs.json");
        fs::write(&path, "{ not json").unwrap();

        let catalog = SongCatalog::load(JsonFileStore::new(&path));
        assert_eq!(catalog.len(), 3);
        assert!(JsonFileStore::new(&path).read().is_ok());
    }

    #[test]
    fn test_duplicate_titles_in_storage_collapse() {
        let store = MemoryStore::with_songs(vec![
            song("Deal", "A", &["C"]),
            song("deal", "B", &["G"]),
        ]);
        let catalog = SongCatalog::load(store);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("Deal").unwrap().artist, "B");
    }
}
