use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use argh::FromArgs;
use dotenv::dotenv;
use miette::{Diagnostic, IntoDiagnostic, Result};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::{
    api, database,
    repository::Repository,
    settings::{Settings, SettingsError},
};

static JSON_OUTPUT: AtomicBool = AtomicBool::new(false);

pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

pub struct App {
    args: Args,
}

#[derive(Error, Diagnostic, Debug)]
pub enum AppError {
    #[error("configuration error: {0}")]
    #[diagnostic(code(lookit::error::configuration))]
    ConfigurationError(#[from] SettingsError),
    #[error("failed to connect to database: {0}")]
    #[diagnostic(code(lookit::error::database))]
    DatabaseError(String),
}

impl App {
    pub fn new() -> Self {
        Self::with_args(argh::from_env())
    }

    pub fn with_args(args: Args) -> Self {
        Self { args }
    }

    pub fn json_output() -> bool {
        JSON_OUTPUT.load(Ordering::Relaxed)
    }

    pub async fn run(&self) -> Result<()> {
        dotenv().ok();

        miette::set_panic_hook();

        if std::env::var_os("RUST_BACKTRACE").is_none() {
            std::env::set_var("RUST_BACKTRACE", "1")
        }

        if std::env::var_os("RUST_LOG").is_none() {
            std::env::set_var("RUST_LOG", "lookit_server=debug,tower_http=debug,sqlx=info")
        }

        init_tracing(self.args.json);

        let settings = Arc::new(Settings::from_env().map_err(AppError::ConfigurationError)?);
        settings.log_summary();

        let database_url = match self.args.database_url.clone().or_else(env_database_url) {
            Some(url) => url,
            None => settings.database.url().map_err(AppError::ConfigurationError)?,
        };

        let database = database::connect(&database_url, 1, self.args.database_max_connections)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        database
            .migrate()
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        let repository = Repository::new(database.clone());
        let router = api::build(repository, settings);

        tracing::debug!(
            ip = self.args.listen_address.ip().to_string().as_str(),
            port = self.args.listen_address.port(),
            url = format!(
                "http://{}:{}",
                self.args.listen_address.ip(),
                self.args.listen_address.port()
            ),
            "server started"
        );

        let server = axum::Server::bind(&self.args.listen_address)
            .serve(router.into_make_service_with_connect_info::<SocketAddr>());

        server
            .with_graceful_shutdown(shutdown_signal())
            .await
            .into_diagnostic()?;

        database.close().await;

        tracing::debug!("server terminated");

        Ok(())
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Installs the global subscriber, as JSON lines when `json` is set.
pub fn init_tracing(json: bool) {
    JSON_OUTPUT.store(json, Ordering::Relaxed);
    if json {
        tracing_subscriber::fmt::fmt()
            .json()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::fmt::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init()
            .ok();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = e.to_string().as_str(), "failed to listen for Ctrl-C");
        return;
    }
    tracing::info!("ctrl-c received");
}

#[derive(FromArgs)]
/// The Lookit server.
pub struct Args {
    /// server address:port to listen on (default: 0.0.0.0:8000, PORT environment variable can override default port 8000)
    #[argh(
        option,
        default = "SocketAddr::from(([0, 0, 0, 0], default_listen_port()))"
    )]
    pub listen_address: SocketAddr,
    /// the database URL to connect to (default: DATABASE_URL environment variable, or a URL built from the DB_* variables)
    #[argh(option)]
    pub database_url: Option<String>,
    /// the maximum number of connections in the PostgreSQL connection pool (default: 4, or DATABASE_MAX_CONNECTIONS environment variable)
    #[argh(option, default = "default_database_max_connections()")]
    pub database_max_connections: u32,
    /// use JSON for log messages
    #[argh(switch)]
    pub json: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            listen_address: SocketAddr::from(([127, 0, 0, 1], default_listen_port())),
            database_url: None,
            database_max_connections: default_database_max_connections(),
            json: false,
        }
    }
}

const DEFAULT_LISTEN_PORT: u16 = 8000;

fn default_listen_port() -> u16 {
    if let Ok(port_str) = std::env::var("PORT") {
        if let Ok(port) = port_str.parse() {
            tracing::debug!("using port from PORT environment variable");
            port
        } else {
            DEFAULT_LISTEN_PORT
        }
    } else {
        DEFAULT_LISTEN_PORT
    }
}

/// `DATABASE_URL`, unless unset or empty.
pub fn env_database_url() -> Option<String> {
    std::env::var(DATABASE_URL_ENV).ok().filter(|v| !v.is_empty())
}

const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 4;

fn default_database_max_connections() -> u32 {
    if let Ok(value) = std::env::var("DATABASE_MAX_CONNECTIONS") {
        value
            .parse()
            .ok()
            .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS)
    } else {
        DEFAULT_DATABASE_MAX_CONNECTIONS
    }
}
