//! Mutation classification by lightweight structural analysis.
//!
//! Classifies a file mutation into a closed set of classes by comparing
//! declaration counts between the old and new content. Exact grammar is not
//! required: counting declaration keywords is sufficient and deterministic
//! for identical inputs.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Closed classification of a code change's nature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MutationClass {
    AstRefactor,
    IntentEvolution,
    DocsUpdate,
    BugFix,
}

impl std::fmt::Display for MutationClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MutationClass::AstRefactor => "AST_REFACTOR",
            MutationClass::IntentEvolution => "INTENT_EVOLUTION",
            MutationClass::DocsUpdate => "DOCS_UPDATE",
            MutationClass::BugFix => "BUG_FIX",
        };
        f.write_str(s)
    }
}

/// Structural declaration counts for one file version
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct StructuralCounts {
    functions: usize,
    classes: usize,
    interfaces: usize,
    variables: usize,
    imports: usize,
}

impl StructuralCounts {
    /// True when `other` is strictly higher in any category
    fn grew_in_any_category(&self, other: &StructuralCounts) -> bool {
        other.functions > self.functions
            || other.classes > self.classes
            || other.interfaces > self.interfaces
            || other.variables > self.variables
            || other.imports > self.imports
    }
}

/// Classifies mutations and bounds their modified line ranges
#[derive(Debug)]
pub struct SemanticAnalyzer {
    functions: Regex,
    classes: Regex,
    interfaces: Regex,
    variables: Regex,
    imports: Regex,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        // Keyword sets cover the mainstream agent-edited languages; the
        // counts only need to be deterministic, not grammatical
        Self {
            functions: Regex::new(r"\bfn\s+\w+|\bfunction\b|\bdef\s+\w+|=>").unwrap(),
            classes: Regex::new(r"\bclass\s+\w+|\bstruct\s+\w+|\benum\s+\w+").unwrap(),
            interfaces: Regex::new(r"\binterface\s+\w+|\btrait\s+\w+|\btype\s+\w+\s*=").unwrap(),
            variables: Regex::new(r"\b(let|const|var)\s+\w+").unwrap(),
            imports: Regex::new(r"(?m)^\s*(import\b|use\s+\w|from\s+\w+\s+import\b)").unwrap(),
        }
    }

    fn count(&self, content: &str) -> StructuralCounts {
        StructuralCounts {
            functions: self.functions.find_iter(content).count(),
            classes: self.classes.find_iter(content).count(),
            interfaces: self.interfaces.find_iter(content).count(),
            variables: self.variables.find_iter(content).count(),
            imports: self.imports.find_iter(content).count(),
        }
    }

    fn is_test_path(path: &str) -> bool {
        let lower = path.to_lowercase();
        lower.contains("/test/")
            || lower.contains("/tests/")
            || lower.contains(".spec.")
            || lower.contains(".test.")
    }

    fn is_docs_path(path: &str) -> bool {
        let lower = path.to_lowercase();
        lower.ends_with(".md") || lower.ends_with(".txt") || lower.contains("docs/")
    }

    /// Classify a mutation. Path heuristics take priority, then file
    /// creation, then structural count diffing.
    pub fn classify(&self, old: Option<&str>, new: &str, path: &str) -> MutationClass {
        if Self::is_test_path(path) {
            return MutationClass::BugFix;
        }
        if Self::is_docs_path(path) {
            return MutationClass::DocsUpdate;
        }

        let Some(old) = old else {
            return MutationClass::IntentEvolution;
        };

        let old_counts = self.count(old);
        let new_counts = self.count(new);

        if old_counts.grew_in_any_category(&new_counts) {
            return MutationClass::IntentEvolution;
        }

        let line_diff =
            (old.lines().count() as i64 - new.lines().count() as i64).unsigned_abs() as usize;
        let shape_unchanged = old_counts.functions == new_counts.functions
            && old_counts.classes == new_counts.classes;

        if shape_unchanged && line_diff < 10 {
            MutationClass::AstRefactor
        } else if line_diff < 5 {
            MutationClass::BugFix
        } else {
            MutationClass::AstRefactor
        }
    }

    /// First and last differing line (1-indexed, inclusive) between two
    /// versions, via forward/backward scan from both ends. `None` when the
    /// contents are identical.
    pub fn modified_range(old: &str, new: &str) -> Option<(usize, usize)> {
        if old == new {
            return None;
        }

        let old_lines: Vec<&str> = old.lines().collect();
        let new_lines: Vec<&str> = new.lines().collect();

        let mut start = 0;
        while start < old_lines.len()
            && start < new_lines.len()
            && old_lines[start] == new_lines[start]
        {
            start += 1;
        }

        let mut old_end = old_lines.len();
        let mut new_end = new_lines.len();
        while old_end > start && new_end > start && old_lines[old_end - 1] == new_lines[new_end - 1]
        {
            old_end -= 1;
            new_end -= 1;
        }

        // Clamp to the new content so the range always names lines that
        // exist after the change, including pure tail deletions
        let max_line = new_lines.len().max(1);
        let start_line = (start + 1).min(max_line);
        let end_line = new_end.max(start_line).min(max_line);
        Some((start_line, end_line))
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_file_is_intent_evolution() {
        let a = SemanticAnalyzer::new();
        assert_eq!(
            a.classify(None, "export const x = 1;", "new.ts"),
            MutationClass::IntentEvolution
        );
    }

    #[test]
    fn test_test_paths_always_bug_fix() {
        let a = SemanticAnalyzer::new();
        let content = "function f() {}";
        assert_eq!(
            a.classify(Some(content), content, "a.spec.ts"),
            MutationClass::BugFix
        );
        assert_eq!(
            a.classify(None, content, "src/test/helper.ts"),
            MutationClass::BugFix
        );
        assert_eq!(
            a.classify(Some(content), content, "a.test.ts"),
            MutationClass::BugFix
        );
    }

    #[test]
    fn test_docs_paths_are_docs_update() {
        let a = SemanticAnalyzer::new();
        assert_eq!(
            a.classify(Some("old"), "new", "README.md"),
            MutationClass::DocsUpdate
        );
        assert_eq!(
            a.classify(None, "notes", "docs/design.txt"),
            MutationClass::DocsUpdate
        );
    }

    #[test]
    fn test_added_function_is_intent_evolution() {
        let a = SemanticAnalyzer::new();
        let old = "function one() {}\n";
        let new = "function one() {}\nfunction two() {}\n";
        assert_eq!(
            a.classify(Some(old), new, "src/mod.ts"),
            MutationClass::IntentEvolution
        );
    }

    #[test]
    fn test_identical_content_is_refactor() {
        let a = SemanticAnalyzer::new();
        let content = "function one() {}\n";
        assert_eq!(
            a.classify(Some(content), content, "src/mod.ts"),
            MutationClass::AstRefactor
        );
    }

    #[test]
    fn test_small_reshape_without_new_decls_is_refactor() {
        let a = SemanticAnalyzer::new();
        let old = "function one() {\n  return 1;\n}\n";
        let new = "function one() {\n  const y = 1;\n  return y;\n}\n";
        // y adds a variable, so evolution wins
        assert_eq!(
            a.classify(Some(old), new, "src/mod.ts"),
            MutationClass::IntentEvolution
        );

        let old = "function one() {\n  return compute(1, 2);\n}\n";
        let new = "function one() {\n  return compute(2, 1);\n}\n";
        assert_eq!(
            a.classify(Some(old), new, "src/mod.ts"),
            MutationClass::AstRefactor
        );
    }

    #[test]
    fn test_modified_range_basics() {
        let old = "a\nb\nc\nd";
        let new = "a\nB\nC\nd";
        assert_eq!(SemanticAnalyzer::modified_range(old, new), Some((2, 3)));
    }

    #[test]
    fn test_modified_range_identical_is_none() {
        assert_eq!(SemanticAnalyzer::modified_range("a\nb", "a\nb"), None);
    }

    #[test]
    fn test_modified_range_appended_lines() {
        let old = "a\nb";
        let new = "a\nb\nc\nd";
        assert_eq!(SemanticAnalyzer::modified_range(old, new), Some((3, 4)));
    }

    #[test]
    fn test_modified_range_deleted_tail_stays_in_bounds() {
        let old = "a\nb\nc";
        let new = "a";
        // A pure deletion points at the last surviving line
        assert_eq!(SemanticAnalyzer::modified_range(old, new), Some((1, 1)));

        // An emptied file degenerates to line 1
        assert_eq!(SemanticAnalyzer::modified_range("a\nb", ""), Some((1, 1)));
    }

    #[test]
    fn test_serde_wire_names() {
        let json = serde_json::to_string(&MutationClass::IntentEvolution).unwrap();
        assert_eq!(json, r#""INTENT_EVOLUTION""#);
        let parsed: MutationClass = serde_json::from_str(r#""AST_REFACTOR""#).unwrap();
        assert_eq!(parsed, MutationClass::AstRefactor);
    }
}
