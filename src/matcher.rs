//! Fuzzy title matching.
//!
//! The schedule site and the rating service name the same movie differently:
//! different case, a stray letter, a missing punctuation mark. Two titles are
//! considered the same movie when, after normalization, they are equal or
//! within a small Levenshtein distance of each other.

use unicode_normalization::UnicodeNormalization;

/// Largest edit distance at which two titles still name the same movie.
pub const DEFAULT_MATCH_THRESHOLD: usize = 3;

/// Normalize a title for comparison: NFC composition, then lowercase.
#[must_use]
pub fn normalize(title: &str) -> String {
    title.nfc().collect::<String>().to_lowercase()
}

/// Levenshtein distance between `a` and `b`, counted in Unicode scalar values.
///
/// Insertions, deletions and substitutions each cost one. Runs in
/// `O(n * m)` time and keeps only two rows of `min(n, m) + 1` cells.
///
/// # Examples
///
/// ```
/// use cinerank::matcher::levenshtein;
///
/// assert_eq!(levenshtein("Barbie", "Barbei"), 2);
/// assert_eq!(levenshtein("kitten", "sitting"), 3);
/// assert_eq!(levenshtein("", "abc"), 3);
/// ```
#[must_use]
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    // Rows are indexed by the shorter string.
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let n = short.len();

    let mut previous: Vec<usize> = (0..=n).collect();
    let mut current: Vec<usize> = vec![0; n + 1];

    for (i, long_ch) in long.iter().enumerate() {
        current[0] = i + 1;

        for (j, short_ch) in short.iter().enumerate() {
            let insert = previous[j + 1] + 1;
            let delete = current[j] + 1;
            let substitute = previous[j] + usize::from(short_ch != long_ch);
            current[j + 1] = insert.min(delete).min(substitute);
        }

        std::mem::swap(&mut previous, &mut current);
    }

    previous[n]
}

/// Whether `a` and `b` name the same entity.
///
/// Both are normalized with [`normalize`]; equal titles match outright,
/// otherwise the edit distance must not exceed `threshold`.
///
/// # Examples
///
/// ```
/// use cinerank::matcher::{matches, DEFAULT_MATCH_THRESHOLD};
///
/// assert!(matches("Oppenheimer", "oppenheimer", DEFAULT_MATCH_THRESHOLD));
/// assert!(matches("Barbie", "Barbei", DEFAULT_MATCH_THRESHOLD));
/// assert!(!matches("Barbie", "Oppenheimer", DEFAULT_MATCH_THRESHOLD));
/// ```
#[must_use]
pub fn matches(a: &str, b: &str, threshold: usize) -> bool {
    let a = normalize(a);
    let b = normalize(b);

    if a == b {
        return true;
    }

    let distance = levenshtein(&a, &b);
    log::trace!("Edit distance between '{a}' and '{b}': {distance}");
    distance <= threshold
}
