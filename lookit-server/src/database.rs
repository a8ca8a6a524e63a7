use std::time::Duration;

use anyhow::Result;
use sqlx::{migrate::Migrator, pool::PoolConnection, ConnectOptions, Postgres, Transaction};
use tracing::log::LevelFilter;

use crate::{data_migrations, mask};

pub type DbConnectOptions = sqlx::postgres::PgConnectOptions;
pub type DbConnection = sqlx::postgres::PgConnection;
pub type DbPool = sqlx::postgres::PgPool;
pub type DbPoolOptions = sqlx::postgres::PgPoolOptions;
pub type DbType = Postgres;

const SLOW_STATEMENT_THRESHOLD_MS: Duration = Duration::from_millis(100);
static MIGRATOR: Migrator = sqlx::migrate!();

#[derive(Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    pub async fn new(url: &str, min_connections: u32, max_connections: u32) -> Result<Self> {
        let connection_options = connect_options(url)?;
        let pool = DbPoolOptions::new()
            .min_connections(min_connections)
            .max_connections(max_connections)
            .connect_with(connection_options)
            .await?;
        tracing::debug!(
            url = mask::database_url(url),
            min_connections = min_connections,
            max_connections = max_connections,
            "connected to database"
        );
        Ok(Self { pool })
    }

    /// Applies pending schema migrations, then pending data migrations.
    pub async fn migrate(&self) -> Result<()> {
        for migration in MIGRATOR.migrations.iter() {
            tracing::debug!(
                desc = migration.description.to_string(),
                "migration {:0>4}",
                migration.version
            );
        }

        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| anyhow::anyhow!(e))?;

        tracing::debug!(
            count = MIGRATOR.migrations.len(),
            "all schema migration(s) applied"
        );

        data_migrations::run_pending(self).await?;

        Ok(())
    }

    pub async fn connection(&self) -> Result<PoolConnection<Postgres>, sqlx::Error> {
        self.pool.acquire().await
    }

    pub async fn transaction(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    pub async fn close(&self) {
        self.pool.close().await
    }
}

fn connect_options(url: &str) -> Result<DbConnectOptions> {
    let mut connection_options: DbConnectOptions = url.parse()?;
    connection_options.log_statements(LevelFilter::Trace);
    connection_options.log_slow_statements(LevelFilter::Info, SLOW_STATEMENT_THRESHOLD_MS);
    Ok(connection_options)
}

pub async fn connect(url: &str, min_connections: u32, max_connections: u32) -> Result<Database> {
    tracing::debug!(url = mask::database_url(url), "connecting to database");
    Database::new(url, min_connections, max_connections)
        .await
        .map_err(|e| anyhow::anyhow!(e))
}
