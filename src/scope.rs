//! Glob-based ownership scope matching.
//!
//! A scope is a list of glob patterns naming the files an intent is allowed
//! to mutate. Matching is full-string anchored: `*` stays within a path
//! segment, `**` crosses segments, `?` matches one character.

use glob::{MatchOptions, Pattern};
use tracing::warn;

use crate::io::PathUtils;

/// Compiled set of scope patterns for one intent
#[derive(Debug, Clone)]
pub struct ScopeMatcher {
    patterns: Vec<Pattern>,
}

impl ScopeMatcher {
    /// Compile the given glob patterns. Invalid patterns are logged and
    /// skipped rather than failing the whole scope.
    pub fn new(globs: &[String]) -> Self {
        let patterns = globs
            .iter()
            .filter_map(|g| match Pattern::new(g) {
                Ok(p) => Some(p),
                Err(e) => {
                    warn!("Skipping invalid scope pattern '{}': {}", g, e);
                    None
                }
            })
            .collect();

        Self { patterns }
    }

    fn match_options() -> MatchOptions {
        MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        }
    }

    /// Whether the path matches at least one scope pattern
    pub fn matches(&self, path: &str) -> bool {
        let normalized = PathUtils::normalize_separators(path);
        self.patterns
            .iter()
            .any(|p| p.matches_with(&normalized, Self::match_options()))
    }

    /// Number of compiled patterns
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(globs: &[&str]) -> ScopeMatcher {
        ScopeMatcher::new(&globs.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn test_double_star_crosses_segments() {
        let m = matcher(&["src/auth/**"]);
        assert!(m.matches("src/auth/login.ts"));
        assert!(m.matches("src/auth/session/token.ts"));
        assert!(!m.matches("src/payments/charge.ts"));
    }

    #[test]
    fn test_single_star_stays_in_segment() {
        let m = matcher(&["src/*.ts"]);
        assert!(m.matches("src/index.ts"));
        assert!(!m.matches("src/auth/login.ts"));
    }

    #[test]
    fn test_match_is_anchored_not_substring() {
        let m = matcher(&["auth/*.ts"]);
        assert!(!m.matches("src/auth/login.ts"));
        assert!(m.matches("auth/login.ts"));
    }

    #[test]
    fn test_question_mark_matches_one_char() {
        let m = matcher(&["src/v?.rs"]);
        assert!(m.matches("src/v1.rs"));
        assert!(!m.matches("src/v12.rs"));
    }

    #[test]
    fn test_backslash_paths_are_normalized() {
        let m = matcher(&["src/auth/**"]);
        assert!(m.matches("src\\auth\\login.ts"));
    }

    #[test]
    fn test_invalid_pattern_is_skipped() {
        let m = matcher(&["[unclosed", "src/**"]);
        assert_eq!(m.len(), 1);
        assert!(m.matches("src/main.rs"));
    }
}
