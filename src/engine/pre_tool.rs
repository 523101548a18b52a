//! Pre-tool-use hook: the fail-closed gate every tool call passes before
//! executing. Drives the state machine, enforces intent selection, scope
//! and constraints, snapshots pre-mutation content and delivers one-time
//! context injection.

use tracing::{debug, warn};

use crate::engine::context::{HookContext, HookVerdict, ToolCall};
use crate::engine::EngineCore;
use crate::error::{OrchestratorError, Result};
use crate::intent::IntentStatus;
use crate::scope::ScopeMatcher;

#[derive(Debug, Default)]
pub struct PreToolUseHook;

impl PreToolUseHook {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(
        &self,
        call: &ToolCall,
        ctx: &HookContext,
        core: &mut EngineCore,
    ) -> Result<HookVerdict> {
        // 1. Ordering gate. The pre-transition machine is kept so a call
        //    blocked by a later check does not advance the session phase.
        let before = core.state.clone();
        if let Err(e) = core.state.transition(call, &core.vocab) {
            return Ok(HookVerdict::Block {
                reason: e.to_string(),
            });
        }

        // 2. Intent selection is handled here so the store and the state
        //    machine stay in step
        if core.vocab.is_select(&call.name) {
            let intent_id = core
                .state
                .current_intent_id()
                .unwrap_or_default()
                .to_string();
            return match core.intents.select_intent(&intent_id) {
                Ok(_) => Ok(HookVerdict::Allow),
                Err(e) => {
                    core.state = before;
                    Ok(HookVerdict::Block {
                        reason: e.to_string(),
                    })
                }
            };
        }

        let is_mutation = core.vocab.is_mutation(&call.name);

        // 3. Mutation without a live selection is blocked even if the
        //    state machine was driven out of band
        let Some(intent_id) = core.intents.selected_intent_id().map(str::to_string) else {
            if is_mutation {
                core.state = before;
                let err = OrchestratorError::IntentNotSelected(format!(
                    "call select_active_intent before using '{}'",
                    call.name
                ));
                return Ok(HookVerdict::Block {
                    reason: err.to_string(),
                });
            }
            return Ok(HookVerdict::Allow);
        };

        // 4. Content checks against the selected intent
        {
            let Some(intent) = core.intents.intent_by_id(&intent_id)? else {
                core.state = before;
                return Ok(HookVerdict::Block {
                    reason: format!("selected intent '{}' no longer exists in the spec", intent_id),
                });
            };
            if intent.status != IntentStatus::InProgress {
                core.state = before;
                return Ok(HookVerdict::Block {
                    reason: format!(
                        "selected intent '{}' has status {} and cannot authorize work",
                        intent_id, intent.status
                    ),
                });
            }

            // Path-based constraints talk about modification, so reads are
            // exempt; the shell-ban rule still sees every tool name
            let constrained_path = if is_mutation { ctx.input.path() } else { None };
            let verdict = core
                .constraints
                .validate(&call.name, constrained_path, &intent.constraints);
            if !verdict.valid {
                core.state = before;
                let err = OrchestratorError::Constraint(
                    verdict
                        .reason
                        .unwrap_or_else(|| format!("'{}' violates an intent constraint", call.name)),
                );
                return Ok(HookVerdict::Block {
                    reason: err.to_string(),
                });
            }

            // Owned scope restricts mutation only: reads of out-of-scope
            // paths pass, and tools without a path argument are in scope
            if is_mutation {
                if let Some(path) = ctx.input.path() {
                    let scope = ScopeMatcher::new(&intent.owned_scope);
                    if !scope.matches(path) {
                        core.state = before;
                        let err = OrchestratorError::ScopeViolation(format!(
                            "'{}' is outside the owned scope of intent '{}' ({})",
                            path,
                            intent_id,
                            intent.owned_scope.join(", ")
                        ));
                        return Ok(HookVerdict::Block {
                            reason: err.to_string(),
                        });
                    }
                }
            }
        }

        if is_mutation {
            // Snapshot pre-mutation content for the paired post hook
            if let Some(path) = ctx.input.path() {
                let snapshot = match tokio::fs::read_to_string(core.resolve(path)).await {
                    Ok(content) => Some(content),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
                    Err(e) => {
                        warn!("Could not snapshot '{}' before mutation: {}", path, e);
                        None
                    }
                };
                core.snapshots.insert(path.to_string(), snapshot);
            }

            // One-time context injection per selection
            if core.intents.mark_context_injected() {
                core.state.note_context_injected();
                let context = core.intents.context_block(Some(&intent_id))?;
                debug!("Injecting context for intent '{}'", intent_id);
                return Ok(HookVerdict::Inject {
                    context,
                    args: None,
                });
            }
        }

        Ok(HookVerdict::Allow)
    }
}
