use argh::FromArgs;
use lookit_server::{
    app::env_database_url,
    data_migrations::{self, DataMigrationStatus},
    database::{self, Database},
    settings::Settings,
};

use crate::CliError;

/// Applies, lists and reverts database migrations.
#[derive(FromArgs, PartialEq, Eq, Debug)]
#[argh(subcommand, name = "migrate")]
pub struct MigrateCommand {
    /// the database URL to connect to (default: DATABASE_URL environment variable, or a URL built from the DB_* variables)
    #[argh(option)]
    database_url: Option<String>,
    #[argh(subcommand)]
    subcommand: MigrateSubCommand,
}

#[derive(FromArgs, PartialEq, Eq, Debug)]
#[argh(subcommand)]
pub enum MigrateSubCommand {
    Run(RunMigrations),
    List(ListMigrations),
    Revert(RevertMigration),
}

/// Apply pending schema and data migrations.
#[derive(FromArgs, PartialEq, Eq, Debug)]
#[argh(subcommand, name = "run")]
pub struct RunMigrations {}

/// List data migrations and when they were applied.
#[derive(FromArgs, PartialEq, Eq, Debug)]
#[argh(subcommand, name = "list")]
pub struct ListMigrations {
    /// print the list as JSON
    #[argh(switch)]
    json: bool,
}

/// Revert an applied data migration.
#[derive(FromArgs, PartialEq, Eq, Debug)]
#[argh(subcommand, name = "revert")]
pub struct RevertMigration {
    /// name of the data migration, as shown by `migrate list`
    #[argh(positional)]
    name: String,
}

impl MigrateCommand {
    pub async fn run(&self) -> Result<(), CliError> {
        let database = self.connect().await?;

        let result = match &self.subcommand {
            MigrateSubCommand::Run(_) => database
                .migrate()
                .await
                .map_err(|e| CliError::DatabaseError(e.to_string())),
            MigrateSubCommand::List(cmd) => {
                let statuses = data_migrations::list(&database).await?;
                if cmd.json {
                    println!("{}", serde_json::to_string_pretty(&statuses)?);
                } else {
                    for status in &statuses {
                        println!("{}", status_line(status));
                    }
                }
                Ok(())
            }
            MigrateSubCommand::Revert(cmd) => {
                data_migrations::revert(&database, &cmd.name).await?;
                tracing::info!("reverted {}", cmd.name);
                Ok(())
            }
        };

        database.close().await;

        result
    }

    async fn connect(&self) -> Result<Database, CliError> {
        let url = match self.database_url.clone().or_else(env_database_url) {
            Some(url) => url,
            None => Settings::from_env()?.database.url()?,
        };

        database::connect(&url, 1, 1)
            .await
            .map_err(|e| CliError::DatabaseError(e.to_string()))
    }
}

fn status_line(status: &DataMigrationStatus) -> String {
    let applied = match status.applied_at {
        Some(at) => at.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "pending".to_string(),
    };
    format!("{:<24} {:<19}  {}", status.name, applied, status.description)
}
