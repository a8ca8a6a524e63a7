use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Router,
};
use lookit_core::forms::FormErrors;
use miette::Diagnostic;
use serde_json::json;
use thiserror::Error;

use crate::{api::Json, app::App, repository::RepositoryError};

use super::{ReportRenderer, ReportType};

pub mod studies;
pub mod study_types;

#[derive(Error, Diagnostic, Debug)]
pub enum ApiError {
    #[error("repository error")]
    #[diagnostic(code(lookit::error::repository))]
    Repository(#[from] RepositoryError),
    #[error("validation failed: {0}")]
    #[diagnostic(code(lookit::error::validation))]
    Validation(#[from] FormErrors),
}

pub const HEALTH_URI: &str = "/health";

pub fn router() -> Router {
    Router::new()
        .route("/api/v1/study-types", get(study_types::read_all))
        .route(
            "/api/v1/studies",
            get(studies::read_all).post(studies::create),
        )
        .route(
            "/api/v1/studies/:id",
            get(studies::read_one).put(studies::update),
        )
        .route(
            "/api/v1/studies/:id/structure",
            put(studies::update_structure),
        )
        .route(HEALTH_URI, get(health_handler))
}

async fn health_handler() -> &'static str {
    "UP"
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let e = match self {
            ApiError::Validation(errors) => {
                tracing::debug!(errors = errors.to_string().as_str(), "validation failed");
                return (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({
                        "result": "failure",
                        "message": errors.message(),
                        "errors": errors
                    })),
                )
                    .into_response();
            }
            ApiError::Repository(e) => e,
        };

        if App::json_output() {
            tracing::error!("{}", ReportRenderer(ReportType::Json, &e));
        } else {
            tracing::error!("{}", ReportRenderer(ReportType::Graphical, &e));
        }

        let mut details: Vec<String> = Vec::new();
        let (status, message) = match e {
            RepositoryError::NotFound { .. } => (StatusCode::NOT_FOUND, e.to_string()),
            RepositoryError::InvalidArgument(..) => (StatusCode::BAD_REQUEST, e.to_string()),
            RepositoryError::DatabaseError(_) => {
                let mut messages: Vec<String> =
                    format!("{}", ReportRenderer(ReportType::Narratable, &e))
                        .split('\n')
                        .map(|s| s.trim())
                        .filter(|s| !s.is_empty())
                        .map(|s| s.to_string())
                        .collect();

                let message = if messages.is_empty() {
                    e.to_string()
                } else {
                    messages.remove(0)
                };
                details.extend(messages);

                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        let body = if details.is_empty() {
            Json(json!({
                "result": "failure",
                "message": message
            }))
        } else {
            Json(json!({
                "result": "failure",
                "message": message,
                "details": details
            }))
        };

        (status, body).into_response()
    }
}
