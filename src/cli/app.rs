use clap::{Parser, Subcommand};

/// intentgate: intent-attributed orchestration for coding agents
#[derive(Parser)]
#[command(name = "intentgate")]
#[command(version = "0.1.0")]
#[command(about = "Intent-attributed orchestration for coding agents")]
#[command(
    long_about = "intentgate sits between a coding agent and its tools. Every mutation must be \
                  attributed to a declared intent, stay inside that intent's owned scope, and \
                  leave an immutable trace record behind."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scaffold the .orchestration/ directory with a sample intent spec
    Init {
        /// Workspace directory to initialize
        #[arg(default_value = ".")]
        workspace: String,

        /// Overwrite an existing active_intents.yaml
        #[arg(short, long)]
        force: bool,
    },

    /// Validate the active-intents spec
    Validate {
        /// Workspace directory containing .orchestration/
        #[arg(default_value = ".")]
        workspace: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List declared intents
    Intents {
        /// Workspace directory containing .orchestration/
        #[arg(default_value = ".")]
        workspace: String,

        /// Include intents that are not IN_PROGRESS
        #[arg(short, long)]
        all: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// View the trace ledger
    Trace {
        /// Workspace directory containing .orchestration/
        #[arg(default_value = ".")]
        workspace: String,

        /// Only show records attributed to this intent
        #[arg(short, long)]
        intent: Option<String>,

        /// Number of most recent records to show
        #[arg(short, long)]
        tail: Option<usize>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Regenerate intent_map.md from the spatial map
    Map {
        /// Workspace directory containing .orchestration/
        #[arg(default_value = ".")]
        workspace: String,
    },
}

impl Commands {
    /// Get the command name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Init { .. } => "init",
            Commands::Validate { .. } => "validate",
            Commands::Intents { .. } => "intents",
            Commands::Trace { .. } => "trace",
            Commands::Map { .. } => "map",
        }
    }

    /// Check if this command needs a loadable intent spec
    pub fn requires_spec(&self) -> bool {
        matches!(self, Commands::Validate { .. } | Commands::Intents { .. })
    }

    /// Check if this command writes to the workspace
    pub fn modifies_files(&self) -> bool {
        matches!(self, Commands::Init { .. } | Commands::Map { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_init_parsing() {
        let cli = Cli::parse_from(["intentgate", "init", "/tmp/ws", "--force"]);

        match cli.command {
            Commands::Init { workspace, force } => {
                assert_eq!(workspace, "/tmp/ws");
                assert!(force);
            }
            _ => panic!("Wrong command parsed"),
        }
    }

    #[test]
    fn test_validate_defaults() {
        let cli = Cli::parse_from(["intentgate", "validate"]);

        match cli.command {
            Commands::Validate { workspace, format } => {
                assert_eq!(workspace, ".");
                assert_eq!(format, "text");
            }
            _ => panic!("Wrong command parsed"),
        }
    }

    #[test]
    fn test_trace_parsing() {
        let cli = Cli::parse_from([
            "intentgate",
            "trace",
            "--intent",
            "auth-1",
            "--tail",
            "20",
            "--format",
            "json",
        ]);

        match cli.command {
            Commands::Trace {
                workspace,
                intent,
                tail,
                format,
            } => {
                assert_eq!(workspace, ".");
                assert_eq!(intent, Some("auth-1".to_string()));
                assert_eq!(tail, Some(20));
                assert_eq!(format, "json");
            }
            _ => panic!("Wrong command parsed"),
        }
    }

    #[test]
    fn test_intents_parsing() {
        let cli = Cli::parse_from(["intentgate", "intents", "--all"]);

        match cli.command {
            Commands::Intents {
                workspace,
                all,
                format,
            } => {
                assert_eq!(workspace, ".");
                assert!(all);
                assert_eq!(format, "text");
            }
            _ => panic!("Wrong command parsed"),
        }
    }

    #[test]
    fn test_command_properties() {
        let init = Commands::Init {
            workspace: ".".to_string(),
            force: false,
        };
        assert_eq!(init.name(), "init");
        assert!(!init.requires_spec());
        assert!(init.modifies_files());

        let validate = Commands::Validate {
            workspace: ".".to_string(),
            format: "text".to_string(),
        };
        assert_eq!(validate.name(), "validate");
        assert!(validate.requires_spec());
        assert!(!validate.modifies_files());
    }
}
