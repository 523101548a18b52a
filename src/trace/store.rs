//! Generic append-only JSON log with a pluggable write strategy.
//!
//! The trace ledger and the spatial map persist structurally similar data
//! with different durability tradeoffs: the ledger streams one JSON line
//! per record (crash leaves a valid prefix), the spatial map rewrites a
//! single JSON array per add (small volume, one readable file). Both are
//! instances of this log with a different `WriteStrategy`.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::Result;

/// How entries are persisted on each append
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStrategy {
    /// One JSON object per line, appended (JSONL)
    AppendLine,
    /// Entire entry list rewritten as one pretty-printed JSON array
    RewriteAll,
}

/// In-memory mirror of an on-disk JSON log
#[derive(Debug)]
pub struct JsonLog<T> {
    path: PathBuf,
    strategy: WriteStrategy,
    entries: Vec<T>,
}

impl<T> JsonLog<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl AsRef<Path>, strategy: WriteStrategy) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            strategy,
            entries: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reconstruct the in-memory list from disk. A missing file yields an
    /// empty log. Malformed JSONL lines are logged and skipped so one
    /// corrupted line never invalidates the whole history.
    pub async fn load(&mut self) -> Result<usize> {
        if !self.path.exists() {
            self.entries.clear();
            return Ok(0);
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        self.entries.clear();

        match self.strategy {
            WriteStrategy::AppendLine => {
                for (line_no, line) in content.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<T>(line) {
                        Ok(entry) => self.entries.push(entry),
                        Err(e) => warn!(
                            "Skipping malformed line {} in {}: {}",
                            line_no + 1,
                            self.path.display(),
                            e
                        ),
                    }
                }
            }
            WriteStrategy::RewriteAll => {
                if !content.trim().is_empty() {
                    match serde_json::from_str::<Vec<T>>(&content) {
                        Ok(entries) => self.entries = entries,
                        Err(e) => warn!(
                            "Discarding unreadable log {}: {}",
                            self.path.display(),
                            e
                        ),
                    }
                }
            }
        }

        Ok(self.entries.len())
    }

    /// Append one entry to memory and persist it per the write strategy
    pub async fn append(&mut self, entry: T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        match self.strategy {
            WriteStrategy::AppendLine => {
                let mut line = serde_json::to_string(&entry)?;
                line.push('\n');

                let mut file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&self.path)
                    .await?;
                file.write_all(line.as_bytes()).await?;
                file.flush().await?;
                self.entries.push(entry);
            }
            WriteStrategy::RewriteAll => {
                self.entries.push(entry);
                let content = serde_json::to_string_pretty(&self.entries)?;
                tokio::fs::write(&self.path, content).await?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Entry {
        n: usize,
        tag: String,
    }

    fn entry(n: usize) -> Entry {
        Entry {
            n,
            tag: format!("e{}", n),
        }
    }

    #[tokio::test]
    async fn test_jsonl_round_trip_preserves_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.jsonl");

        let mut log = JsonLog::new(&path, WriteStrategy::AppendLine);
        for i in 0..5 {
            log.append(entry(i)).await.unwrap();
        }

        let mut reloaded: JsonLog<Entry> = JsonLog::new(&path, WriteStrategy::AppendLine);
        assert_eq!(reloaded.load().await.unwrap(), 5);
        assert_eq!(reloaded.entries(), log.entries());
        assert_eq!(reloaded.entries()[3].n, 3);
    }

    #[tokio::test]
    async fn test_jsonl_corrupted_trailing_line_keeps_prefix() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.jsonl");

        let mut log = JsonLog::new(&path, WriteStrategy::AppendLine);
        log.append(entry(0)).await.unwrap();
        log.append(entry(1)).await.unwrap();

        // Simulate a torn write
        let mut content = std::fs::read_to_string(&path).unwrap();
        content.push_str("{\"n\": 2, \"tag\": \"trun");
        std::fs::write(&path, content).unwrap();

        let mut reloaded: JsonLog<Entry> = JsonLog::new(&path, WriteStrategy::AppendLine);
        assert_eq!(reloaded.load().await.unwrap(), 2);
        assert_eq!(reloaded.entries()[1], entry(1));
    }

    #[tokio::test]
    async fn test_rewrite_all_produces_json_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.json");

        let mut log = JsonLog::new(&path, WriteStrategy::RewriteAll);
        log.append(entry(0)).await.unwrap();
        log.append(entry(1)).await.unwrap();

        let on_disk: Vec<Entry> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.len(), 2);

        let mut reloaded: JsonLog<Entry> = JsonLog::new(&path, WriteStrategy::RewriteAll);
        assert_eq!(reloaded.load().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let mut log: JsonLog<Entry> =
            JsonLog::new(dir.path().join("absent.jsonl"), WriteStrategy::AppendLine);
        assert_eq!(log.load().await.unwrap(), 0);
        assert!(log.is_empty());
    }
}
