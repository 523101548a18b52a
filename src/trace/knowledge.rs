//! Shared-knowledge file: append-only timestamped Markdown sections that
//! accumulate lessons and decisions across sessions.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::Result;

const FILE_HEADER: &str = "# Shared Agent Knowledge\n\n\
Lessons and decisions recorded by the orchestration engine.\n";

/// Kind of knowledge section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnowledgeKind {
    Lesson,
    Decision,
}

impl std::fmt::Display for KnowledgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            KnowledgeKind::Lesson => "LESSON",
            KnowledgeKind::Decision => "DECISION",
        })
    }
}

/// Append-only Markdown knowledge file (CLAUDE.md)
#[derive(Debug, Clone)]
pub struct KnowledgeFile {
    path: PathBuf,
}

impl KnowledgeFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a timestamped section, creating the file with a header when
    /// it does not exist yet
    pub async fn append_knowledge(&self, kind: KnowledgeKind, content: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut section = String::new();
        if !self.path.exists() {
            section.push_str(FILE_HEADER);
        }
        section.push_str(&format!(
            "\n## [{}] {}\n\n{}\n",
            kind,
            Utc::now().to_rfc3339(),
            content.trim_end()
        ));

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(section.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
