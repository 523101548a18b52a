//! The append-only trace ledger: one record per audited mutation.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::policy::MutationClass;
use crate::trace::store::{JsonLog, WriteStrategy};
use crate::Result;

/// Relation type linking a conversation to the intent that authorized it
pub const SPECIFICATION_RELATION: &str = "specification";

/// VCS coordinates captured at trace time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VcsInfo {
    pub revision_id: String,
}

/// Who produced a change
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Contributor {
    pub entity_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_identifier: Option<String>,
}

/// Hashed line range inside a tracked file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HashedRange {
    pub start_line: usize,
    pub end_line: usize,
    pub content_hash: String,
}

/// A typed correlation (intent, ticket, ...) attached to a conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Relation {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

impl Relation {
    pub fn specification(intent_id: &str) -> Self {
        Self {
            kind: SPECIFICATION_RELATION.to_string(),
            value: intent_id.to_string(),
        }
    }
}

/// One agent conversation's contribution to a file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Conversation {
    /// Session identifier (or transport URL when one exists)
    pub url: String,
    pub contributor: Contributor,
    pub ranges: Vec<HashedRange>,
    pub related: Vec<Relation>,
    pub mutation_class: MutationClass,
}

/// A file touched by a trace record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackedFile {
    pub relative_path: String,
    pub conversations: Vec<Conversation>,
}

/// One immutable audit record correlating a mutation with its revision,
/// classification and authorizing intent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraceRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub vcs: VcsInfo,
    pub files: Vec<TrackedFile>,
}

impl TraceRecord {
    pub fn new(revision_id: String, files: Vec<TrackedFile>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            vcs: VcsInfo { revision_id },
            files,
        }
    }

    /// Whether any conversation in this record cites the given intent
    pub fn references_intent(&self, intent_id: &str) -> bool {
        self.files.iter().any(|file| {
            file.conversations.iter().any(|conv| {
                conv.related
                    .iter()
                    .any(|rel| rel.kind == SPECIFICATION_RELATION && rel.value == intent_id)
            })
        })
    }
}

/// Append-only, replayable log of trace records (JSONL on disk)
#[derive(Debug)]
pub struct TraceLedger {
    log: JsonLog<TraceRecord>,
}

impl TraceLedger {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            log: JsonLog::new(path, WriteStrategy::AppendLine),
        }
    }

    /// Replay the on-disk ledger into memory, skipping malformed lines
    pub async fn load(&mut self) -> Result<usize> {
        self.log.load().await
    }

    /// Append a record. Write failures are logged and swallowed: tracing
    /// must never abort the agent.
    pub async fn add(&mut self, record: TraceRecord) {
        if let Err(e) = self.log.append(record).await {
            warn!("Failed to persist trace record: {}", e);
        }
    }

    pub fn records(&self) -> &[TraceRecord] {
        self.log.entries()
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// Records whose conversations cite the given intent as specification
    pub fn records_for_intent(&self, intent_id: &str) -> Vec<&TraceRecord> {
        self.log
            .entries()
            .iter()
            .filter(|r| r.references_intent(intent_id))
            .collect()
    }
}
