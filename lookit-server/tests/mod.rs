use std::{
    error::Error,
    net::{Ipv4Addr, SocketAddr, SocketAddrV4, TcpListener},
    sync::Arc,
    time::Duration,
};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use sqlx::{Connection, PgConnection};
use thiserror::Error;
use tracing::Level;
use url::Url;
use uuid::Uuid;

use lookit_server::{database::Database, repository::Repository, settings::Settings};

const BASE_DATABASE_URL: &str = "postgres://127.0.0.1:5432";

pub mod api;
pub mod data_migrations;

/// Server address of the PostgreSQL instance test databases are created in,
/// overridable with `TEST_DATABASE_URL`.
fn base_database_url() -> String {
    std::env::var("TEST_DATABASE_URL")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| BASE_DATABASE_URL.to_string())
}

/// A freshly created and migrated database, dropped again with the value.
pub struct TestDatabase {
    name: String,
    database: Database,
}

impl TestDatabase {
    pub async fn create() -> Self {
        dotenv::dotenv().ok();

        let base_url = base_database_url();
        let name = format!("it_{}", Uuid::new_v4().simple());
        let mut conn = PgConnection::connect(&base_url)
            .await
            .expect("failed to connect to database");
        sqlx::query(&format!("CREATE DATABASE \"{}\"", name))
            .execute(&mut conn)
            .await
            .expect("failed to create test database");
        conn.close()
            .await
            .expect("failed to close temporary connection");

        tracing::trace!("created test database {}", name);

        let database = Database::new(&format!("{}/{}", base_url, name), 1, 2)
            .await
            .expect("failed to connect to test database");
        database
            .migrate()
            .await
            .expect("failed to migrate test database");

        Self { name, database }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        tokio::task::block_in_place(|| {
            futures::executor::block_on(async {
                self.database.close().await;
                if let Ok(mut conn) = PgConnection::connect(&base_database_url()).await {
                    if let Err(e) = sqlx::query(&format!(
                        "DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)",
                        self.name
                    ))
                    .execute(&mut conn)
                    .await
                    {
                        tracing::error!("failed to drop test database {}: {}", self.name, e)
                    }
                    conn.close()
                        .await
                        .expect("failed to close temporary connection");
                }
            })
        });

        tracing::trace!("test database {} dropped", self.name);
    }
}

pub struct TestApp {
    database: TestDatabase,
    url: Url,
}

#[derive(Error, Debug)]
pub enum TestError {
    #[error("failed to connect to test server: {0}")]
    ConnectError(#[source] reqwest::Error),
    #[error("failed to check test server health")]
    HealthCheckError,
    #[error("failed to parse URL: {0}")]
    UrlError(#[from] url::ParseError),
    #[error("failed to execute request: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("failed to serialize/deserialize JSON: {0}")]
    JSONSerializationError(#[from] serde_json::Error),
}

impl TestApp {
    pub async fn start_and_connect() -> (Self, TestClient) {
        let app = Self::start().await;
        let client = app.connect().await.unwrap();
        (app, client)
    }

    pub async fn start() -> Self {
        let settings = Settings::from_lookup(|name| match name {
            "DEBUG" => Some("1".to_string()),
            "GOOGLE_TAG_MANAGER_ID" => Some("G-TEST".to_string()),
            _ => None,
        })
        .expect("failed to build test settings");

        let database = TestDatabase::create().await;
        let router = lookit_server::api::build(
            Repository::new(database.database().clone()),
            Arc::new(settings),
        );

        let port = next_available_port();
        let listen_address = SocketAddr::from(([127, 0, 0, 1], port));

        let _ = tokio::spawn(async move {
            axum::Server::bind(&listen_address)
                .serve(router.into_make_service())
                .await
        });

        let url =
            Url::parse(&format!("http://127.0.0.1:{}", port)).expect("failed to generate URL");

        Self { database, url }
    }

    pub async fn connect(&self) -> Result<TestClient, TestError> {
        let mut remaining_tries = 50;
        let client = reqwest::Client::new();

        while remaining_tries > 0 {
            let result = client
                .request(reqwest::Method::GET, self.url.join("/health")?)
                .send()
                .await;
            match result {
                Ok(res) => {
                    if res.text().await?.trim() == "UP" {
                        break;
                    } else {
                        return Err(TestError::HealthCheckError);
                    }
                }
                Err(e) => {
                    if let Some(source) = e.source() {
                        if let Some(hyper_error) = source.downcast_ref::<hyper::Error>() {
                            if hyper_error.is_connect() {
                                tokio::time::sleep(Duration::from_millis(20)).await;
                                remaining_tries -= 1;
                                continue;
                            }
                        }
                    }
                    return Err(TestError::ConnectError(e));
                }
            }
        }

        Ok(TestClient(client, self.url.clone()))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn database(&self) -> &Database {
        self.database.database()
    }
}

pub struct TestClient(reqwest::Client, Url);

pub type TestResult<T> = Result<T, TestError>;

/// Status and body of a response, whatever the status.
pub struct RawResponse {
    pub status: u16,
    pub content_type: String,
    pub body: String,
}

impl RawResponse {
    pub fn json(&self) -> TestResult<Value> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

impl TestClient {
    pub async fn get_string(&self, path: &str) -> TestResult<String> {
        Ok(self
            .0
            .request(reqwest::Method::GET, self.1.join(path)?)
            .send()
            .await?
            .text()
            .await?)
    }

    pub async fn get<RS: DeserializeOwned>(&self, path: &str) -> TestResult<RS> {
        self.execute_json_request_response(reqwest::Method::GET, path, None::<()>)
            .await
    }

    pub async fn post<RQ: Serialize, RS: DeserializeOwned>(
        &self,
        path: &str,
        body: RQ,
    ) -> TestResult<RS> {
        self.execute_json_request_response(reqwest::Method::POST, path, Some(body))
            .await
    }

    /// Sends `body` as is with a JSON content type.
    pub async fn send_raw(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&str>,
    ) -> TestResult<RawResponse> {
        let mut req = self.0.request(method, self.1.join(path)?);
        if let Some(body) = body {
            req = req
                .header("Content-Type", "application/json")
                .body(body.to_string());
        }
        let response = req.send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get("Content-Type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.text().await?;
        tracing::debug!(status, body = body.as_str(), "received response");
        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }

    pub async fn send_json<RQ: Serialize>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: RQ,
    ) -> TestResult<RawResponse> {
        let body = serde_json::to_string(&body)?;
        self.send_raw(method, path, Some(&body)).await
    }

    async fn execute_json_request_response<RQ: Serialize, RS: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<RQ>,
    ) -> Result<RS, TestError> {
        let mut req = self.0.request(method, self.1.join(path)?);
        if let Some(body) = body {
            if tracing::event_enabled!(Level::DEBUG) {
                tracing::debug!(body = serde_json::to_string(&body)?, "sending request");
            }
            req = req.json(&body);
        }
        let response = self.0.execute(req.build()?).await?;
        response
            .error_for_status_ref()
            .map_err(TestError::RequestError)?;
        Ok(response.json().await?)
    }
}

fn next_available_port() -> u16 {
    for _ in 0..10 {
        if let Some(port) = bind_os_available_port() {
            return port;
        }
    }

    panic!("no port available")
}

fn bind_os_available_port() -> Option<u16> {
    TcpListener::bind(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0))
        .and_then(|l| l.local_addr())
        .map(|a| a.port())
        .ok()
}
