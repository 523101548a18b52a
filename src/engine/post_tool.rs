//! Post-tool-use hook: observability only. Classifies the completed
//! mutation, hashes the affected range and appends to the trace ledger
//! and spatial map. Never blocks and never rolls back.

use tracing::debug;

use crate::engine::context::{HookContext, HookVerdict, ToolCall};
use crate::engine::EngineCore;
use crate::error::Result;
use crate::hash;
use crate::policy::SemanticAnalyzer;
use crate::trace::ledger::{Contributor, Conversation, HashedRange, Relation, TrackedFile};
use crate::trace::spatial::{LineSpan, SpatialMapEntry};
use crate::trace::{OperationType, TraceRecord};

#[derive(Debug, Default)]
pub struct PostToolUseHook;

impl PostToolUseHook {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(
        &self,
        call: &ToolCall,
        ctx: &HookContext,
        core: &mut EngineCore,
    ) -> Result<HookVerdict> {
        let Some(intent_id) = ctx.intent_id.as_deref() else {
            return Ok(HookVerdict::Allow);
        };
        if !core.vocab.is_mutation(&call.name) {
            return Ok(HookVerdict::Allow);
        }
        let Some(path) = ctx.input.path() else {
            return Ok(HookVerdict::Allow);
        };

        let revision_id = core.git.revision_id().await;
        let new_content = tokio::fs::read_to_string(core.resolve(path))
            .await
            .unwrap_or_default();
        let snapshot = core.snapshots.remove(path).flatten();

        let mutation_class = core
            .analyzer
            .classify(snapshot.as_deref(), &new_content, path);

        // Bound the hash to the modified lines when both versions are
        // known, otherwise cover the whole file
        let range = snapshot
            .as_deref()
            .and_then(|old| SemanticAnalyzer::modified_range(old, &new_content))
            .unwrap_or_else(|| (1, new_content.lines().count().max(1)));
        let content_hash = hash::hash_range(&new_content, range.0, range.1);

        let operation = if snapshot.is_none() {
            OperationType::Write
        } else {
            OperationType::Modify
        };

        debug!(
            "Tracing {} of '{}' under intent '{}' as {}",
            operation, path, intent_id, mutation_class
        );

        let record = TraceRecord::new(
            revision_id,
            vec![TrackedFile {
                relative_path: path.to_string(),
                conversations: vec![Conversation {
                    url: ctx
                        .session_id
                        .clone()
                        .unwrap_or_else(|| "unknown".to_string()),
                    contributor: Contributor {
                        entity_type: "ai_agent".to_string(),
                        model_identifier: ctx.model_id.clone(),
                    },
                    ranges: vec![HashedRange {
                        start_line: range.0,
                        end_line: range.1,
                        content_hash: content_hash.clone(),
                    }],
                    related: vec![Relation::specification(intent_id)],
                    mutation_class,
                }],
            }],
        );
        core.ledger.add(record).await;

        core.spatial
            .add(SpatialMapEntry {
                file_path: path.to_string(),
                intent_id: intent_id.to_string(),
                operation_type: operation,
                timestamp: ctx.timestamp,
                line_range: Some(LineSpan {
                    start: range.0,
                    end: range.1,
                }),
                content_hash: Some(content_hash),
            })
            .await;

        Ok(HookVerdict::Allow)
    }
}
