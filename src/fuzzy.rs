//! Case-insensitive fuzzy matching used to filter and rank processes by name.
//!
//! Everything here is pure: no I/O, no dependency on the rest of the crate.

/// Similarity at or above which a non-substring candidate still matches.
pub const DEFAULT_THRESHOLD: f64 = 0.3;

/// Levenshtein distance between `a` and `b` after ASCII lower-casing.
///
/// Insertion, deletion and substitution each cost 1.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().map(|c| c.to_ascii_lowercase()).collect();
    let b: Vec<char> = b.chars().map(|c| c.to_ascii_lowercase()).collect();
    distance(&a, &b)
}

fn distance(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // two rows of the DP table; `prev` is row i - 1
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1)
                .min(curr[j] + 1)
                .min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Normalized similarity in `[0, 1]`: `1 - distance / max(len)`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().map(|c| c.to_ascii_lowercase()).collect();
    let b: Vec<char> = b.chars().map(|c| c.to_ascii_lowercase()).collect();
    similarity_chars(&a, &b)
}

fn similarity_chars(a: &[char], b: &[char]) -> f64 {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return 1.0,
        (true, false) | (false, true) => return 0.0,
        _ => {}
    }
    let max_len = a.len().max(b.len());
    1.0 - distance(a, b) as f64 / max_len as f64
}

/// Whether `text` matches `query`.
///
/// An empty query always matches. A literal (case-insensitive) substring
/// matches without computing the edit distance; otherwise the similarity must
/// reach `threshold`.
pub fn matches(text: &str, query: &str, threshold: f64) -> bool {
    if query.is_empty() {
        return true;
    }

    let text = text.to_ascii_lowercase();
    let query = query.to_ascii_lowercase();
    if text.contains(&query) {
        return true;
    }

    similarity(&text, &query) >= threshold
}

/// Ranking score of `text` against `query`; higher is better.
///
/// Substring hits score `1 + 1/position` (1-based position in characters) and
/// therefore always outrank pure similarity scores, which stay within `[0, 1]`.
pub fn match_score(text: &str, query: &str) -> f64 {
    if query.is_empty() {
        return 1.0;
    }

    let text = text.to_ascii_lowercase();
    let query = query.to_ascii_lowercase();
    if let Some(byte_pos) = text.find(&query) {
        let position = text[..byte_pos].chars().count() + 1;
        return 1.0 + 1.0 / position as f64;
    }

    similarity(&text, &query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_identity_and_empty() {
        assert_eq!(edit_distance("hello", "hello"), 0);
        assert_eq!(edit_distance("", ""), 0);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("abcd", ""), 4);
    }

    #[test]
    fn distance_simple_edits() {
        assert_eq!(edit_distance("hello", "hallo"), 1);
        assert_eq!(edit_distance("hello", "hell"), 1);
        assert_eq!(edit_distance("hello", "helloo"), 1);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn distance_with_uneven_lengths() {
        assert_eq!(edit_distance("sshd", "ssh-agent"), 6);
        assert_eq!(edit_distance("ssh-agent", "sshd"), 6);
        assert_eq!(edit_distance("a", "kworker/0:1"), 11);
        assert_eq!(edit_distance("saturday", "sunday"), 3);
    }

    #[test]
    fn distance_ignores_ascii_case() {
        assert_eq!(edit_distance("FireFox", "firefox"), 0);
    }

    #[test]
    fn similarity_bounds() {
        assert_eq!(similarity("hello", "hello"), 1.0);
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("", "x"), 0.0);
        assert_eq!(similarity("x", ""), 0.0);

        let sim = similarity("hello", "hallo");
        assert!(sim > 0.7 && sim <= 1.0);

        let sim = similarity("kitten", "sitting");
        assert!(sim > 0.0 && sim < 1.0);
    }

    #[test]
    fn matches_substring_and_fuzzy() {
        assert!(matches("chromium", "chr", DEFAULT_THRESHOLD));
        assert!(matches("firefox", "fire", DEFAULT_THRESHOLD));
        assert!(matches("process_name", "process", DEFAULT_THRESHOLD));
        assert!(matches("chromium", "chromiumm", 0.8));
        assert!(matches("ChRoMiUm", "chrome", DEFAULT_THRESHOLD));
        assert!(matches("FIREFOX", "fire", DEFAULT_THRESHOLD));
    }

    #[test]
    fn matches_rejects_unrelated() {
        assert!(!matches("hello", "xyz", DEFAULT_THRESHOLD));
        assert!(!matches("process", "completely_different", DEFAULT_THRESHOLD));
    }

    #[test]
    fn empty_query_matches_everything() {
        assert!(matches("", "", DEFAULT_THRESHOLD));
        assert!(matches("anything", "", 1.0));
        assert_eq!(match_score("anything", ""), 1.0);
    }

    #[test]
    fn earlier_substring_scores_higher() {
        assert!(match_score("chromium", "chr") > match_score("chromium", "ium"));
        assert_eq!(match_score("exact", "exact"), 2.0);
        assert_eq!(match_score("xxabc", "abc"), 1.0 + 1.0 / 3.0);
    }

    #[test]
    fn non_substring_score_is_similarity() {
        let score = match_score("hello", "hallo");
        assert_eq!(score, similarity("hello", "hallo"));
        assert!(score <= 1.0);
    }

    #[test]
    fn substring_position_counts_characters() {
        // 'é' is two bytes but one position
        assert_eq!(match_score("éab", "ab"), 1.5);
    }
}
