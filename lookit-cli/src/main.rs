use argh::FromArgs;
use lookit_server::{data_migrations::DataMigrationError, settings::SettingsError};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

mod generate;
mod migrate;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("I/O error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("JSON serialization error: {0}")]
    JSONSerializationError(#[from] serde_json::Error),
    #[error("configuration error: {0}")]
    SettingsError(#[from] SettingsError),
    #[error("database error: {0}")]
    DatabaseError(String),
    #[error("data migration failed: {0}")]
    DataMigrationError(#[from] DataMigrationError),
}

/// Command-line interface for Lookit admin and operations tasks.
#[derive(FromArgs, PartialEq, Eq, Debug)]
pub struct Arguments {
    #[argh(subcommand)]
    command: RootCommand,
}

#[derive(FromArgs, PartialEq, Eq, Debug)]
#[argh(subcommand)]
pub enum RootCommand {
    Generate(generate::GenerateCommand),
    Migrate(migrate::MigrateCommand),
}

impl RootCommand {
    pub async fn run(&self) -> Result<(), CliError> {
        match self {
            RootCommand::Generate(cmd) => cmd.run().await,
            RootCommand::Migrate(cmd) => cmd.run().await,
        }
    }
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    if std::env::var_os("RUST_BACKTRACE").is_none() {
        std::env::set_var("RUST_BACKTRACE", "1")
    }

    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "lookitcli=debug,lookit_server=debug")
    }

    tracing_subscriber::fmt::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Arguments = argh::from_env();
    if let Err(e) = args.command.run().await {
        tracing::error!("command failed: {}", e);
        std::process::exit(1);
    }
}
