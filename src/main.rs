use clap::Parser;
use intentgate::{
    cli::{
        commands::{
            init::InitCommand, intents::IntentsCommand, map::MapCommand, trace::TraceCommand,
            validate::ValidateCommand, CommandHandler,
        },
        Cli, Commands,
    },
    Result,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { workspace, force } => {
            InitCommand::new(workspace, force).execute().await?;
        }
        Commands::Validate { workspace, format } => {
            ValidateCommand::new(workspace, format).execute().await?;
        }
        Commands::Intents {
            workspace,
            all,
            format,
        } => {
            IntentsCommand::new(workspace, all, format).execute().await?;
        }
        Commands::Trace {
            workspace,
            intent,
            tail,
            format,
        } => {
            TraceCommand::new(workspace, intent, tail, format)
                .execute()
                .await?;
        }
        Commands::Map { workspace } => {
            MapCommand::new(workspace).execute().await?;
        }
    }

    Ok(())
}
