use std::path::{Path, PathBuf};

use crate::Result;

/// Path management for the `.orchestration/` directory of a workspace.
///
/// Every on-disk artifact the engine produces or consumes lives under this
/// single workspace-relative root.
#[derive(Debug, Clone)]
pub struct OrchestrationPaths {
    /// Root directory (.orchestration/)
    pub root: PathBuf,
}

impl OrchestrationPaths {
    pub const DIR_NAME: &'static str = ".orchestration";

    /// Create paths for a specific workspace directory
    pub fn for_workspace(workspace_root: &Path) -> Self {
        Self {
            root: workspace_root.join(Self::DIR_NAME),
        }
    }

    /// Create paths using the current working directory as workspace
    pub fn in_current_dir() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        Ok(Self::for_workspace(&cwd))
    }

    /// Input spec listing the declared intents
    pub fn active_intents_file(&self) -> PathBuf {
        self.root.join("active_intents.yaml")
    }

    /// Append-only JSONL ledger of mutation trace records
    pub fn trace_ledger_file(&self) -> PathBuf {
        self.root.join("agent_trace.jsonl")
    }

    /// JSON array mapping files to intent ownership
    pub fn spatial_map_file(&self) -> PathBuf {
        self.root.join("spatial_map.json")
    }

    /// Human-readable Markdown mirror of the spatial map
    pub fn intent_map_file(&self) -> PathBuf {
        self.root.join("intent_map.md")
    }

    /// Shared free-text knowledge file (lessons and decisions)
    pub fn knowledge_file(&self) -> PathBuf {
        self.root.join("CLAUDE.md")
    }

    /// Ensure the root directory exists
    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }
}

/// Utilities for working with tool-supplied paths
pub struct PathUtils;

impl PathUtils {
    /// Check if path is safe (no traversal components)
    pub fn is_safe_path(path: &Path) -> bool {
        !path
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
    }

    /// Normalize separators so glob scopes match on every platform
    pub fn normalize_separators(path: &str) -> String {
        path.replace('\\', "/")
    }
}
