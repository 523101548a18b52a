use std::path::Path;

use super::CommandHandler;
use crate::io::OrchestrationPaths;
use crate::trace::{TraceLedger, TraceRecord};
use crate::Result;

/// Handler for the `trace` command
pub struct TraceCommand {
    pub workspace: String,
    pub intent: Option<String>,
    pub tail: Option<usize>,
    pub format: String,
}

impl CommandHandler for TraceCommand {
    async fn execute(&self) -> Result<()> {
        let paths = OrchestrationPaths::for_workspace(Path::new(&self.workspace));
        let mut ledger = TraceLedger::new(paths.trace_ledger_file());
        ledger.load().await?;

        let records: Vec<&TraceRecord> = match &self.intent {
            Some(intent_id) => ledger.records_for_intent(intent_id),
            None => ledger.records().iter().collect(),
        };

        let skip = self
            .tail
            .map(|n| records.len().saturating_sub(n))
            .unwrap_or(0);
        let records = &records[skip..];

        if self.format == "json" {
            println!("{}", serde_json::to_string_pretty(&records)?);
            return Ok(());
        }

        if records.is_empty() {
            println!("No trace records.");
            return Ok(());
        }

        for record in records {
            println!(
                "{}  rev {}  ({})",
                record.timestamp.to_rfc3339(),
                record.vcs.revision_id,
                record.id
            );
            for file in &record.files {
                for conv in &file.conversations {
                    let intents: Vec<&str> =
                        conv.related.iter().map(|r| r.value.as_str()).collect();
                    println!(
                        "    {}  {}  intents: {}",
                        file.relative_path,
                        conv.mutation_class,
                        intents.join(", ")
                    );
                }
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "trace"
    }
}

impl TraceCommand {
    pub fn new(
        workspace: String,
        intent: Option<String>,
        tail: Option<usize>,
        format: String,
    ) -> Self {
        Self {
            workspace,
            intent,
            tail,
            format,
        }
    }
}
