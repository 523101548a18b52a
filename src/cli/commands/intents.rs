use std::path::Path;

use super::CommandHandler;
use crate::intent::{IntentStatus, IntentStore};
use crate::io::OrchestrationPaths;
use crate::Result;

/// Handler for the `intents` command
pub struct IntentsCommand {
    pub workspace: String,
    pub all: bool,
    pub format: String,
}

impl CommandHandler for IntentsCommand {
    async fn execute(&self) -> Result<()> {
        let paths = OrchestrationPaths::for_workspace(Path::new(&self.workspace));
        let mut store = IntentStore::new(paths.active_intents_file());
        store.load().await?;

        let intents: Vec<_> = store
            .all_intents()?
            .iter()
            .filter(|i| self.all || i.status == IntentStatus::InProgress)
            .collect();

        if self.format == "json" {
            println!("{}", serde_json::to_string_pretty(&intents)?);
            return Ok(());
        }

        if intents.is_empty() {
            println!("No matching intents (try --all).");
            return Ok(());
        }

        for intent in intents {
            println!("{} [{}] {}", intent.id, intent.status, intent.name);
            for glob in &intent.owned_scope {
                println!("    scope: {}", glob);
            }
            for c in &intent.constraints {
                println!("    constraint: {}", c);
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "intents"
    }
}

impl IntentsCommand {
    pub fn new(workspace: String, all: bool, format: String) -> Self {
        Self {
            workspace,
            all,
            format,
        }
    }
}
