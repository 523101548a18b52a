//! Deterministic content hashing for provenance and optimistic-lock checks.

use sha2::{Digest, Sha256};

/// SHA-256 hex digest of the full content
pub fn hash_content(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// SHA-256 hex digest of an inclusive 1-indexed line range.
///
/// Out-of-bounds bounds are clamped to the file; an inverted or empty
/// range hashes the empty string, which is still deterministic.
pub fn hash_range(content: &str, start_line: usize, end_line: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    if lines.is_empty() || start_line > end_line {
        return hash_content("");
    }

    let start = start_line.max(1) - 1;
    let end = end_line.min(lines.len());
    if start >= end {
        return hash_content("");
    }

    hash_content(&lines[start..end].join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hash_is_deterministic() {
        let a = hash_content("fn main() {}\n");
        let b = hash_content("fn main() {}\n");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_distinct_content_distinct_hash() {
        assert_ne!(hash_content("a"), hash_content("b"));
    }

    #[test]
    fn test_range_hash_selects_lines() {
        let content = "one\ntwo\nthree\nfour";
        assert_eq!(hash_range(content, 2, 3), hash_content("two\nthree"));
        assert_eq!(hash_range(content, 1, 4), hash_content(content));
    }

    #[test]
    fn test_range_hash_clamps_bounds() {
        let content = "one\ntwo";
        assert_eq!(hash_range(content, 1, 99), hash_content("one\ntwo"));
        assert_eq!(hash_range(content, 0, 1), hash_content("one"));
    }

    #[test]
    fn test_empty_and_inverted_ranges() {
        assert_eq!(hash_range("", 1, 5), hash_content(""));
        assert_eq!(hash_range("one\ntwo", 5, 2), hash_content(""));
    }
}
