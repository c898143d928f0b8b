//! Case-insensitive edit-distance similarity.
//!
//! Strings are compared as sequences of Unicode scalar values after
//! lowercasing. Nothing else is normalized: punctuation, whitespace and
//! accents all count as edits.

/// Levenshtein distance between two strings, counted in `char`s.
///
/// Comparison is exact; callers that want case-insensitivity lowercase first
/// (see [`similarity`]).
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    levenshtein_chars(&a, &b)
}

/// Two-row DP over pre-split characters.
pub(crate) fn levenshtein_chars(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j]
            } else {
                1 + prev[j].min(curr[j]).min(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Lowercased character sequence used for scoring.
pub(crate) fn fold(text: &str) -> Vec<char> {
    text.chars().flat_map(char::to_lowercase).collect()
}

/// Normalized similarity in `[0, 1]`: `1 - distance / max_len`.
///
/// Two empty strings are identical and score `1.0`. Lengths are taken after
/// lowercasing, so characters whose lowercase form expands still keep the
/// score inside the unit interval.
pub fn similarity(a: &str, b: &str) -> f64 {
    similarity_chars(&fold(a), &fold(b))
}

pub(crate) fn similarity_chars(a: &[char], b: &[char]) -> f64 {
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 1.0;
    }
    let distance = levenshtein_chars(a, b);
    1.0 - distance as f64 / max_len as f64
}

/// Highest similarity two strings of these lengths could reach.
///
/// Any edit script needs at least `|len_a - len_b|` insertions or deletions.
/// The bound is evaluated with the same expression as [`similarity`] so a
/// score can never round above it.
pub fn similarity_upper_bound(len_a: usize, len_b: usize) -> f64 {
    let max_len = len_a.max(len_b);
    if max_len == 0 {
        return 1.0;
    }
    let min_distance = max_len - len_a.min(len_b);
    1.0 - min_distance as f64 / max_len as f64
}
