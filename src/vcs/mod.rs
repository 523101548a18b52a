//! VCS metadata via simple git shell-outs.
//!
//! The engine only needs enough metadata to correlate a trace record with a
//! revision. Outside a repository (or on any git failure) every field
//! degrades to a sentinel value instead of erroring.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::debug;

/// Sentinel revision recorded when no VCS is available
pub const NO_VCS_REVISION: &str = "no-vcs";

/// Sentinel for unknown branch/author values
pub const UNKNOWN: &str = "unknown";

/// Snapshot of the repository state at trace time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VcsSnapshot {
    pub revision_id: String,
    pub branch: String,
    pub author: String,
    pub dirty: bool,
}

impl Default for VcsSnapshot {
    fn default() -> Self {
        Self {
            revision_id: NO_VCS_REVISION.to_string(),
            branch: UNKNOWN.to_string(),
            author: UNKNOWN.to_string(),
            dirty: false,
        }
    }
}

/// Queries git for the current revision, branch, author and dirty flag
#[derive(Debug, Clone)]
pub struct GitProvider {
    workdir: PathBuf,
}

impl GitProvider {
    pub fn new(workdir: impl AsRef<Path>) -> Self {
        Self {
            workdir: workdir.as_ref().to_path_buf(),
        }
    }

    /// Run one git subcommand, returning trimmed stdout on success
    async fn git(&self, args: &[&str]) -> Option<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .await
            .ok()?;

        if !output.status.success() {
            debug!("git {:?} exited non-zero", args);
            return None;
        }

        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Current HEAD revision, or the no-vcs sentinel
    pub async fn revision_id(&self) -> String {
        self.git(&["rev-parse", "HEAD"])
            .await
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| NO_VCS_REVISION.to_string())
    }

    /// Full metadata snapshot with sentinel degradation per field
    pub async fn snapshot(&self) -> VcsSnapshot {
        let revision_id = self.revision_id().await;
        if revision_id == NO_VCS_REVISION {
            return VcsSnapshot::default();
        }

        let branch = self
            .git(&["rev-parse", "--abbrev-ref", "HEAD"])
            .await
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| UNKNOWN.to_string());

        let author = self
            .git(&["config", "user.name"])
            .await
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| UNKNOWN.to_string());

        let dirty = self
            .git(&["status", "--porcelain"])
            .await
            .map(|s| !s.is_empty())
            .unwrap_or(false);

        VcsSnapshot {
            revision_id,
            branch,
            author,
            dirty,
        }
    }
}
