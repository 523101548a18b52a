use std::path::Path;

use serde_json::json;

use super::CommandHandler;
use crate::intent::parse_spec;
use crate::io::OrchestrationPaths;
use crate::{OrchestratorError, Result};

/// Handler for the `validate` command
pub struct ValidateCommand {
    pub workspace: String,
    pub format: String,
}

impl CommandHandler for ValidateCommand {
    async fn execute(&self) -> Result<()> {
        let paths = OrchestrationPaths::for_workspace(Path::new(&self.workspace));
        let spec_file = paths.active_intents_file();

        let content = tokio::fs::read_to_string(&spec_file).await.map_err(|e| {
            OrchestratorError::Validation(format!("cannot read {}: {}", spec_file.display(), e))
        })?;

        match parse_spec(&content) {
            Ok(spec) => {
                if self.format == "json" {
                    let report = json!({
                        "valid": true,
                        "file": spec_file.display().to_string(),
                        "intents": spec.active_intents.len(),
                    });
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    println!("{}: OK", spec_file.display());
                    println!("  {} intent(s) declared", spec.active_intents.len());
                    for intent in &spec.active_intents {
                        println!("  - {} [{}]", intent.id, intent.status);
                    }
                }
                Ok(())
            }
            Err(e) => {
                if self.format == "json" {
                    let report = json!({
                        "valid": false,
                        "file": spec_file.display().to_string(),
                        "error": e.to_string(),
                    });
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    println!("{}: INVALID", spec_file.display());
                    println!("  {}", e);
                }
                Err(e)
            }
        }
    }

    fn name(&self) -> &'static str {
        "validate"
    }
}

impl ValidateCommand {
    pub fn new(workspace: String, format: String) -> Self {
        Self { workspace, format }
    }
}
