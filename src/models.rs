//! Core data models for the songbook.
//!
//! This module contains the catalog record and the result types produced by
//! the progression matcher.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Constants
// ============================================================================

/// Source attributed to songs that don't name one.
pub const DEFAULT_SOURCE: &str = "Jerry Garcia Song Book";

/// Number of chords suggested after a matched segment.
pub const NEXT_CHORD_COUNT: usize = 5;

/// Default number of ranked suggestions returned to callers.
pub const DEFAULT_TOP_N: usize = 5;

fn default_source() -> String {
    DEFAULT_SOURCE.to_string()
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Catalog Models
// ============================================================================

/// A catalog entry.
///
/// `progression` is the song's repeating loop and is treated as cyclic by the
/// matcher. `all_chords` and `sections` are descriptive only; every record
/// owns its own (possibly empty) containers. Section bodies are kept as raw
/// JSON since charts lay them out in different shapes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub title: String,
    pub artist: String,
    pub progression: Vec<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub all_chords: Vec<String>,
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub sections: BTreeMap<String, serde_json::Value>,
}

impl Song {
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        progression: Vec<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            progression,
            all_chords: Vec::new(),
            source: source.into(),
            sections: BTreeMap::new(),
        }
    }

    /// Build a song credited to [`DEFAULT_SOURCE`].
    pub fn with_default_source(
        title: impl Into<String>,
        artist: impl Into<String>,
        progression: Vec<String>,
    ) -> Self {
        Self::new(title, artist, progression, DEFAULT_SOURCE)
    }
}

// ============================================================================
// Matching Models
// ============================================================================

/// Best circular alignment of a query pattern inside one song's progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BestMatch {
    /// Offset into the progression where the run starts; `None` when no
    /// offset matched the first pattern chord.
    pub start_index: Option<usize>,
    pub match_length: usize,
}

impl BestMatch {
    pub const NONE: BestMatch = BestMatch {
        start_index: None,
        match_length: 0,
    };

    pub fn is_match(&self) -> bool {
        self.start_index.is_some() && self.match_length > 0
    }
}

/// A ranked suggestion from [`crate::matcher::find_similar`].
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarSong<'a> {
    pub song: &'a Song,
    /// Fraction of the query matched consecutively, in `(0, 1]`.
    pub similarity: f64,
    /// Predicted continuation after the matched segment (with wraparound).
    pub next_chords: Vec<String>,
}

// ============================================================================
// Import Models
// ============================================================================

/// One parsed line of a chord-chart import file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartEntry {
    pub title: String,
    pub artist: String,
    pub progression: Vec<String>,
}
