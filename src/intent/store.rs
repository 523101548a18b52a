//! Loads the active-intents spec and tracks the per-session selection.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{OrchestratorError, Result};
use crate::intent::schema::{parse_spec, ActiveIntentsSpec, IntentDefinition, IntentStatus};

/// Ephemeral, per-session pointer into the loaded spec
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedIntent {
    pub intent_id: String,
    pub selected_at: DateTime<Utc>,
    pub context_injected: bool,
}

/// Loads and validates the workspace's active-intents spec, tracks which
/// intent is currently selected, and renders the selection as an injectable
/// context block.
#[derive(Debug)]
pub struct IntentStore {
    path: PathBuf,
    spec: Option<ActiveIntentsSpec>,
    selected: Option<SelectedIntent>,
}

impl IntentStore {
    pub fn new(spec_path: impl AsRef<Path>) -> Self {
        Self {
            path: spec_path.as_ref().to_path_buf(),
            spec: None,
            selected: None,
        }
    }

    /// Read, parse and validate the spec file
    pub async fn load(&mut self) -> Result<()> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            OrchestratorError::Validation(format!(
                "cannot read intent spec {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let spec = parse_spec(&content)?;
        info!(
            "Loaded {} intents from {}",
            spec.active_intents.len(),
            self.path.display()
        );
        self.spec = Some(spec);
        Ok(())
    }

    /// Re-read the spec from disk, keeping the current selection if the
    /// selected intent still exists and is in progress
    pub async fn reload(&mut self) -> Result<()> {
        let previous = self.selected.clone();
        self.load().await?;

        self.selected = previous.filter(|sel| {
            self.spec
                .as_ref()
                .map(|spec| {
                    spec.active_intents
                        .iter()
                        .any(|i| i.id == sel.intent_id && i.status == IntentStatus::InProgress)
                })
                .unwrap_or(false)
        });
        Ok(())
    }

    fn spec(&self) -> Result<&ActiveIntentsSpec> {
        self.spec.as_ref().ok_or_else(|| {
            OrchestratorError::Validation("intent spec queried before load()".to_string())
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.spec.is_some()
    }

    pub fn intent_by_id(&self, id: &str) -> Result<Option<&IntentDefinition>> {
        Ok(self.spec()?.active_intents.iter().find(|i| i.id == id))
    }

    pub fn has_intent(&self, id: &str) -> Result<bool> {
        Ok(self.intent_by_id(id)?.is_some())
    }

    /// Intents currently eligible for selection (status IN_PROGRESS)
    pub fn active_intents(&self) -> Result<Vec<&IntentDefinition>> {
        Ok(self
            .spec()?
            .active_intents
            .iter()
            .filter(|i| i.status == IntentStatus::InProgress)
            .collect())
    }

    /// All declared intents regardless of status
    pub fn all_intents(&self) -> Result<&[IntentDefinition]> {
        Ok(&self.spec()?.active_intents)
    }

    /// Select an intent for this session. Fails when the intent does not
    /// exist or is not in progress. Re-selecting the same in-progress
    /// intent is always legal and resets the injection flag.
    pub fn select_intent(&mut self, id: &str) -> Result<&SelectedIntent> {
        let intent = self.intent_by_id(id)?.ok_or_else(|| {
            OrchestratorError::Validation(format!("intent '{}' does not exist in the spec", id))
        })?;

        if intent.status != IntentStatus::InProgress {
            return Err(OrchestratorError::Validation(format!(
                "intent '{}' has status {}, only IN_PROGRESS intents can be selected",
                id, intent.status
            )));
        }

        debug!("Selected intent '{}'", id);
        self.selected = Some(SelectedIntent {
            intent_id: id.to_string(),
            selected_at: Utc::now(),
            context_injected: false,
        });
        Ok(self.selected.as_ref().unwrap())
    }

    pub fn selected(&self) -> Option<&SelectedIntent> {
        self.selected.as_ref()
    }

    pub fn selected_intent_id(&self) -> Option<&str> {
        self.selected.as_ref().map(|s| s.intent_id.as_str())
    }

    /// Clear the selection (session reset)
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Flip the one-shot injection flag. Idempotent; returns whether the
    /// flag flipped on this call.
    pub fn mark_context_injected(&mut self) -> bool {
        match self.selected.as_mut() {
            Some(sel) if !sel.context_injected => {
                sel.context_injected = true;
                true
            }
            _ => false,
        }
    }

    /// Render an intent's details as a structured text block for LLM
    /// context injection. Defaults to the current selection.
    pub fn context_block(&self, id: Option<&str>) -> Result<String> {
        let id = id
            .or_else(|| self.selected_intent_id())
            .ok_or_else(|| {
                OrchestratorError::Validation(
                    "no intent id given and no intent selected".to_string(),
                )
            })?
            .to_string();

        let intent = self.intent_by_id(&id)?.ok_or_else(|| {
            OrchestratorError::Validation(format!("intent '{}' does not exist in the spec", id))
        })?;

        let mut block = String::new();
        block.push_str("=== ACTIVE INTENT CONTEXT ===\n");
        block.push_str(&format!("Intent: {} ({})\n", intent.name, intent.id));
        block.push_str(&format!("Status: {}\n", intent.status));

        block.push_str("Owned scope:\n");
        for glob in &intent.owned_scope {
            block.push_str(&format!("  - {}\n", glob));
        }

        if !intent.constraints.is_empty() {
            block.push_str("Constraints:\n");
            for c in &intent.constraints {
                block.push_str(&format!("  - {}\n", c));
            }
        }

        if !intent.acceptance_criteria.is_empty() {
            block.push_str("Acceptance criteria:\n");
            for a in &intent.acceptance_criteria {
                block.push_str(&format!("  - {}\n", a));
            }
        }

        block.push_str("=== END INTENT CONTEXT ===");
        Ok(block)
    }
}
