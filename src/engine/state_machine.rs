//! Session-level orchestration state machine.
//!
//! The single authority for whether a tool category is currently legal.
//! It encodes ordering (no mutation before an intent is selected), not
//! content; scope and constraint checks live in the pre hook.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::context::{ToolCall, ToolInput, ToolVocabulary};
use crate::error::{OrchestratorError, Result};

/// Phases of one agent session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrchestrationState {
    Idle,
    Analysis,
    IntentSelected,
    ContextInjected,
    Mutating,
    AwaitingValidation,
}

impl std::fmt::Display for OrchestrationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl OrchestrationState {
    /// States from which mutation tools are legal
    pub fn allows_mutation(&self) -> bool {
        matches!(
            self,
            OrchestrationState::IntentSelected
                | OrchestrationState::ContextInjected
                | OrchestrationState::Mutating
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrchestrationState::Idle => "IDLE",
            OrchestrationState::Analysis => "ANALYSIS",
            OrchestrationState::IntentSelected => "INTENT_SELECTED",
            OrchestrationState::ContextInjected => "CONTEXT_INJECTED",
            OrchestrationState::Mutating => "MUTATING",
            OrchestrationState::AwaitingValidation => "AWAITING_VALIDATION",
        }
    }
}

/// Explicit FSM gating tool categories by session phase
#[derive(Debug, Clone)]
pub struct StateMachine {
    state: OrchestrationState,
    current_intent_id: Option<String>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: OrchestrationState::Idle,
            current_intent_id: None,
        }
    }

    pub fn state(&self) -> OrchestrationState {
        self.state
    }

    pub fn current_intent_id(&self) -> Option<&str> {
        self.current_intent_id.as_deref()
    }

    /// Drive the machine with one tool call. An `Err` means the call is
    /// illegal in the current state and must be blocked.
    pub fn transition(&mut self, call: &ToolCall, vocab: &ToolVocabulary) -> Result<()> {
        if vocab.is_select(&call.name) {
            if self.state == OrchestrationState::Mutating {
                return Err(OrchestratorError::Transition(
                    "finish the current intent before selecting another".to_string(),
                ));
            }

            let intent_id = match ToolInput::from_args(&call.name, &call.args, vocab) {
                ToolInput::SelectIntent { intent_id } => intent_id,
                _ => {
                    return Err(OrchestratorError::Transition(
                        "select_active_intent requires an 'intent_id' argument".to_string(),
                    ))
                }
            };

            debug!("State {} -> INTENT_SELECTED ({})", self.state, intent_id);
            self.state = OrchestrationState::IntentSelected;
            self.current_intent_id = Some(intent_id);
            return Ok(());
        }

        if vocab.is_mutation(&call.name) {
            if !self.state.allows_mutation() {
                return Err(OrchestratorError::Transition(format!(
                    "tool '{}' is a mutation tool but the session is in state {}: \
                     select an intent first",
                    call.name, self.state
                )));
            }
            self.state = OrchestrationState::Mutating;
            return Ok(());
        }

        if vocab.is_terminal(&call.name) {
            debug!("State {} -> AWAITING_VALIDATION", self.state);
            self.state = OrchestrationState::AwaitingValidation;
            return Ok(());
        }

        // Read-only tools move an idle session into analysis and are
        // otherwise state-neutral
        if self.state == OrchestrationState::Idle {
            self.state = OrchestrationState::Analysis;
        }
        Ok(())
    }

    /// Record that intent context was delivered. Only meaningful straight
    /// after selection; a session already mutating stays in `Mutating`.
    pub fn note_context_injected(&mut self) {
        if self.state == OrchestrationState::IntentSelected {
            self.state = OrchestrationState::ContextInjected;
        }
    }

    /// Return to `Idle` with no intent
    pub fn reset(&mut self) {
        self.state = OrchestrationState::Idle;
        self.current_intent_id = None;
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}
