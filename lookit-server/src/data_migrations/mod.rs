//! Named rewrites of existing rows, run after the schema migrations.
//!
//! Each data migration runs in its own transaction and is recorded in the
//! `data_migrations` table once applied. A failing migration rolls back and
//! aborts the whole run.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

use crate::database::{Database, DbConnection};

mod populate_salt;
mod rename_study_types;

pub use populate_salt::PopulateSaltValues;
pub use rename_study_types::{RenameStudyTypes, StudyTypeName, EMBER_FRAME_PLAYER, EXTERNAL};

type Result<T> = std::result::Result<T, DataMigrationError>;

#[derive(Error, Diagnostic, Debug)]
pub enum DataMigrationError {
    #[error("query failed: {0}")]
    #[diagnostic(code(lookit::error::database))]
    Database(#[from] sqlx::Error),
    #[error("study type '{name}' does not exist")]
    #[diagnostic(code(lookit::error::migration))]
    StudyTypeNotFound { name: String },
    #[error("no data migration named '{0}'")]
    #[diagnostic(code(lookit::error::migration))]
    Unknown(String),
    #[error("data migration '{0}' has not been applied")]
    #[diagnostic(code(lookit::error::migration))]
    NotApplied(String),
}

#[async_trait]
pub trait DataMigration: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    async fn apply(&self, conn: &mut DbConnection) -> Result<()>;

    /// Undoes [`DataMigration::apply`]. Does nothing unless overridden.
    async fn revert(&self, _conn: &mut DbConnection) -> Result<()> {
        Ok(())
    }
}

/// All data migrations, in the order they are applied.
pub fn all() -> Vec<Box<dyn DataMigration>> {
    vec![Box::new(PopulateSaltValues), Box::new(RenameStudyTypes)]
}

#[derive(Debug, Clone, Serialize)]
pub struct DataMigrationStatus {
    pub name: &'static str,
    pub description: &'static str,
    pub applied_at: Option<NaiveDateTime>,
}

async fn applied_at(conn: &mut DbConnection, name: &str) -> Result<Option<NaiveDateTime>> {
    let row: Option<(NaiveDateTime,)> =
        sqlx::query_as("SELECT applied_at FROM data_migrations WHERE name = $1")
            .bind(name)
            .fetch_optional(&mut *conn)
            .await?;
    Ok(row.map(|r| r.0))
}

pub async fn run_pending(database: &Database) -> Result<usize> {
    let mut applied = 0;

    for migration in all() {
        let mut tx = database.transaction().await?;

        if applied_at(&mut tx, migration.name()).await?.is_some() {
            tracing::trace!(name = migration.name(), "data migration already applied");
            continue;
        }

        tracing::debug!(
            name = migration.name(),
            desc = migration.description(),
            "applying data migration"
        );

        migration.apply(&mut tx).await?;

        sqlx::query("INSERT INTO data_migrations (name) VALUES ($1)")
            .bind(migration.name())
            .execute(&mut tx)
            .await?;

        tx.commit().await?;
        applied += 1;
    }

    tracing::debug!(count = applied, "all data migration(s) applied");

    Ok(applied)
}

pub async fn list(database: &Database) -> Result<Vec<DataMigrationStatus>> {
    let mut conn = database.connection().await?;
    let mut statuses = Vec::new();

    for migration in all() {
        statuses.push(DataMigrationStatus {
            name: migration.name(),
            description: migration.description(),
            applied_at: applied_at(&mut conn, migration.name()).await?,
        });
    }

    Ok(statuses)
}

/// Reverts an applied data migration and forgets it was applied, so the next
/// run applies it again.
pub async fn revert(database: &Database, name: &str) -> Result<()> {
    let migration = all()
        .into_iter()
        .find(|m| m.name() == name)
        .ok_or_else(|| DataMigrationError::Unknown(name.to_string()))?;

    let mut tx = database.transaction().await?;

    if applied_at(&mut tx, name).await?.is_none() {
        return Err(DataMigrationError::NotApplied(name.to_string()));
    }

    migration.revert(&mut tx).await?;

    sqlx::query("DELETE FROM data_migrations WHERE name = $1")
        .bind(name)
        .execute(&mut tx)
        .await?;

    tx.commit().await?;

    tracing::debug!(name = name, "data migration reverted");

    Ok(())
}
