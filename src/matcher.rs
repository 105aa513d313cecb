//! Progression matching and ranking.
//!
//! Progressions are loops, so a query may line up with a song across its
//! end-to-start boundary. For each song the matcher finds the longest greedy
//! run of the query starting at any offset, scores it as a fraction of the
//! query, and suggests the chords that follow the run.

use std::cmp::Ordering;

use tracing::debug;

use crate::models::{BestMatch, SimilarSong, Song, NEXT_CHORD_COUNT};

// ============================================================================
// Alignment
// ============================================================================

/// Case-insensitive chord comparison without allocating.
fn chord_eq(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Find the best circular alignment of `pattern` inside `progression`.
///
/// Each start offset counts how many leading pattern chords match
/// consecutively, reading the progression with wraparound for at most one
/// extra lap. A single mismatch ends the run. The lowest offset with the
/// longest run wins.
pub fn find_best_match(pattern: &[String], progression: &[String]) -> BestMatch {
    let n = progression.len();
    let window = 2 * n;
    let mut best = BestMatch::NONE;

    for i in 0..n {
        let mut match_length = 0;
        for (j, chord) in pattern.iter().enumerate() {
            if i + j >= window || !chord_eq(&progression[(i + j) % n], chord) {
                break;
            }
            match_length += 1;
        }

        if match_length > best.match_length {
            best = BestMatch {
                start_index: Some(i),
                match_length,
            };
        }
    }

    best
}

// ============================================================================
// Scoring
// ============================================================================

/// Fraction of the query matched, clamped to 1.0.
pub fn similarity_score(match_length: usize, query_len: usize) -> f64 {
    if query_len == 0 {
        return 0.0;
    }
    (match_length as f64 / query_len as f64).min(1.0)
}

/// `count` chords of `progression` starting at `from`, wrapping around.
pub fn next_chords(progression: &[String], from: usize, count: usize) -> Vec<String> {
    if progression.is_empty() {
        return Vec::new();
    }
    let n = progression.len();
    (0..count)
        .map(|k| progression[(from + k) % n].clone())
        .collect()
}

// ============================================================================
// Ranking
// ============================================================================

/// Rank `songs` by how well they continue `current_progression`.
///
/// Songs with an empty progression or no matching chord are left out.
/// Equal similarities keep the order in which `songs` yields them. At most
/// `top_n` results are returned.
pub fn find_similar<'a, I>(
    songs: I,
    current_progression: &[String],
    top_n: usize,
) -> Vec<SimilarSong<'a>>
where
    I: IntoIterator<Item = &'a Song>,
{
    if current_progression.is_empty() {
        return Vec::new();
    }

    let mut results: Vec<SimilarSong<'a>> = Vec::new();

    for song in songs {
        let progression = &song.progression;
        if progression.is_empty() {
            continue;
        }

        let best = find_best_match(current_progression, progression);
        let Some(start) = best.start_index.filter(|_| best.is_match()) else {
            continue;
        };

        let similarity = similarity_score(best.match_length, current_progression.len());
        let from = (start + best.match_length) % progression.len();
        debug!(
            "'{}': match at {} len {} similarity {:.2}",
            song.title, start, best.match_length, similarity
        );

        results.push(SimilarSong {
            song,
            similarity,
            next_chords: next_chords(progression, from, NEXT_CHORD_COUNT),
        });
    }

    // sort_by is stable, so ties stay in catalog order
    results.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
    });
    results.truncate(top_n);
    results
}

// ============================================================================
// TESTS
// ============================================================================
