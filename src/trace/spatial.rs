//! The spatial map: which intent touched which file, line range and
//! operation. Persisted as a flat JSON array and mirrored to a
//! human-readable Markdown view regenerated on every update.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::trace::store::{JsonLog, WriteStrategy};
use crate::Result;

/// Kind of file access recorded in the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Read,
    Write,
    Modify,
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OperationType::Read => "read",
            OperationType::Write => "write",
            OperationType::Modify => "modify",
        };
        f.write_str(s)
    }
}

/// Inclusive 1-indexed line span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSpan {
    pub start: usize,
    pub end: usize,
}

/// One (tool call × file) ownership record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpatialMapEntry {
    pub file_path: String,
    pub intent_id: String,
    pub operation_type: OperationType,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_range: Option<LineSpan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
}

/// Persisted mapping from file path to intent ownership history
#[derive(Debug)]
pub struct SpatialMap {
    log: JsonLog<SpatialMapEntry>,
    markdown_path: Option<PathBuf>,
}

impl SpatialMap {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            log: JsonLog::new(path, WriteStrategy::RewriteAll),
            markdown_path: None,
        }
    }

    /// Also regenerate a Markdown mirror at the given path on every add
    pub fn with_markdown_mirror(mut self, path: impl AsRef<Path>) -> Self {
        self.markdown_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub async fn load(&mut self) -> Result<usize> {
        self.log.load().await
    }

    /// Append an entry, rewrite the JSON array and refresh the Markdown
    /// mirror. Failures are logged and swallowed like ledger writes.
    pub async fn add(&mut self, entry: SpatialMapEntry) {
        if let Err(e) = self.log.append(entry).await {
            warn!("Failed to persist spatial map entry: {}", e);
            return;
        }

        if let Some(md_path) = self.markdown_path.clone() {
            if let Err(e) = self.write_markdown(&md_path).await {
                warn!("Failed to regenerate intent map markdown: {}", e);
            }
        }
    }

    pub fn entries(&self) -> &[SpatialMapEntry] {
        self.log.entries()
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    pub fn entries_for_file(&self, file_path: &str) -> Vec<&SpatialMapEntry> {
        self.log
            .entries()
            .iter()
            .filter(|e| e.file_path == file_path)
            .collect()
    }

    pub fn entries_for_intent(&self, intent_id: &str) -> Vec<&SpatialMapEntry> {
        self.log
            .entries()
            .iter()
            .filter(|e| e.intent_id == intent_id)
            .collect()
    }

    /// Render the full map as Markdown, grouped by intent, one table per
    /// intent. The file is regenerated, not appended.
    pub fn render_markdown(&self) -> String {
        let mut by_intent: BTreeMap<&str, Vec<&SpatialMapEntry>> = BTreeMap::new();
        for entry in self.log.entries() {
            by_intent.entry(&entry.intent_id).or_default().push(entry);
        }

        let mut out = String::from("# Intent Map\n\nGenerated from spatial_map.json.\n");
        for (intent_id, entries) in by_intent {
            out.push_str(&format!("\n## Intent: {}\n\n", intent_id));
            out.push_str("| File Path | Operation | Lines | Content Hash | Timestamp |\n");
            out.push_str("|---|---|---|---|---|\n");
            for e in entries {
                let lines = e
                    .line_range
                    .map(|r| format!("{}-{}", r.start, r.end))
                    .unwrap_or_else(|| "-".to_string());
                let hash = e
                    .content_hash
                    .as_deref()
                    .map(|h| &h[..h.len().min(12)])
                    .unwrap_or("-");
                out.push_str(&format!(
                    "| {} | {} | {} | {} | {} |\n",
                    e.file_path,
                    e.operation_type,
                    lines,
                    hash,
                    e.timestamp.to_rfc3339()
                ));
            }
        }
        out
    }

    /// Write the Markdown mirror to the given path
    pub async fn write_markdown(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, self.render_markdown()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn entry(file: &str, intent: &str, op: OperationType) -> SpatialMapEntry {
        SpatialMapEntry {
            file_path: file.to_string(),
            intent_id: intent.to_string(),
            operation_type: op,
            timestamp: Utc::now(),
            line_range: Some(LineSpan { start: 1, end: 4 }),
            content_hash: Some("cafebabecafebabe".to_string()),
        }
    }

    #[tokio::test]
    async fn test_add_and_filter() {
        let dir = TempDir::new().unwrap();
        let mut map = SpatialMap::new(dir.path().join("spatial_map.json"));

        map.add(entry("src/auth/a.ts", "auth-1", OperationType::Write))
            .await;
        map.add(entry("src/auth/a.ts", "auth-1", OperationType::Modify))
            .await;
        map.add(entry("src/payments/b.ts", "pay-1", OperationType::Write))
            .await;

        assert_eq!(map.entries_for_file("src/auth/a.ts").len(), 2);
        assert_eq!(map.entries_for_intent("pay-1").len(), 1);
        assert!(map.entries_for_intent("ghost").is_empty());
    }

    #[tokio::test]
    async fn test_disk_format_is_flat_json_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("spatial_map.json");
        let mut map = SpatialMap::new(&path);

        map.add(entry("src/a.ts", "auth-1", OperationType::Write))
            .await;
        map.add(entry("src/b.ts", "auth-1", OperationType::Write))
            .await;

        let on_disk: Vec<SpatialMapEntry> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.len(), 2);
        assert_eq!(on_disk[0].file_path, "src/a.ts");

        let mut reloaded = SpatialMap::new(&path);
        assert_eq!(reloaded.load().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_markdown_mirror_regenerates() {
        let dir = TempDir::new().unwrap();
        let md_path = dir.path().join("intent_map.md");
        let mut map = SpatialMap::new(dir.path().join("spatial_map.json"))
            .with_markdown_mirror(&md_path);

        map.add(entry("src/auth/a.ts", "auth-1", OperationType::Write))
            .await;

        let md = std::fs::read_to_string(&md_path).unwrap();
        assert!(md.contains("## Intent: auth-1"));
        assert!(md.contains("| File Path | Operation | Lines | Content Hash | Timestamp |"));
        assert!(md.contains("src/auth/a.ts"));
        assert!(md.contains("1-4"));
        assert!(md.contains("write"));

        map.add(entry("src/auth/b.ts", "auth-1", OperationType::Modify))
            .await;
        let md = std::fs::read_to_string(&md_path).unwrap();
        assert!(md.contains("src/auth/b.ts"));
    }

    #[test]
    fn test_operation_type_wire_format() {
        assert_eq!(
            serde_json::to_string(&OperationType::Modify).unwrap(),
            r#""modify""#
        );
    }
}
