//! Chord-chart tokenization.
//!
//! Turns song-book chord notation ("| G % | C / | D |") into the flat chord
//! token sequences the matcher works on. Only the chord root and an optional
//! accidental survive; quality suffixes ("m", "7", "maj7") are dropped.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::ChartEntry;

// ============================================================================
// REGEX PATTERNS
// ============================================================================

/// A chord root with optional accidental, or one of the chart markers.
pub static CHORD_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Ga-g][#b]?|[/%|]").unwrap());

/// Artist used for import lines that only name a title.
pub const UNKNOWN_ARTIST: &str = "Unknown";

// ============================================================================
// PROGRESSION PARSING
// ============================================================================

/// Parse a chord progression from song-book chart text.
///
/// `|` is a bar line and contributes nothing. `%` and `/` repeat the previous
/// chord, and are ignored when nothing has been emitted yet.
pub fn parse_progression(text: &str) -> Vec<String> {
    let mut progression: Vec<String> = Vec::new();

    for token in CHORD_TOKEN.find_iter(text) {
        match token.as_str() {
            "|" => {}
            "%" | "/" => {
                if let Some(last) = progression.last().cloned() {
                    progression.push(last);
                }
            }
            chord => progression.push(chord.to_uppercase()),
        }
    }

    progression
}

/// Parse one line of an import file: `Title - Artist: <chart>`.
///
/// The artist part is optional. Blank lines, `#` comments, lines without a
/// `:` separator and charts yielding no chords return `None`.
pub fn parse_chart_line(line: &str) -> Option<ChartEntry> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (header, chart) = line.split_once(':')?;
    let (title, artist) = match header.split_once(" - ") {
        Some((title, artist)) => (title.trim(), artist.trim()),
        None => (header.trim(), UNKNOWN_ARTIST),
    };
    let artist = if artist.is_empty() { UNKNOWN_ARTIST } else { artist };
    if title.is_empty() {
        return None;
    }

    let progression = parse_progression(chart);
    if progression.is_empty() {
        return None;
    }

    Some(ChartEntry {
        title: title.to_string(),
        artist: artist.to_string(),
        progression,
    })
}

// ============================================================================
// TESTS
// ============================================================================
