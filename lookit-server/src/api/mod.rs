use std::fmt;
use std::sync::Arc;

use axum::{
    handler::Handler,
    http::{StatusCode, Uri},
    response::IntoResponse,
    Extension, Router,
};
use miette::{Diagnostic, GraphicalReportHandler, JSONReportHandler, NarratableReportHandler};
use serde_json::json;

mod json;
pub mod ui;
pub mod v1;

pub use json::Json;

use crate::{repository::Repository, settings::Settings};

pub fn build(repository: Repository, settings: Arc<Settings>) -> Router {
    v1::router()
        .merge(ui::router(&settings))
        .layer(Extension(repository))
        .layer(Extension(settings))
        .fallback(not_found_handler.into_service())
}

async fn not_found_handler(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "result": "failure",
            "message": "not found",
            "uri": uri.to_string()
        })),
    )
}

/// How a [`ReportRenderer`] formats a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportType {
    Json,
    Graphical,
    Narratable,
}

/// Displays a diagnostic with one of the miette report handlers.
pub struct ReportRenderer<'a>(pub ReportType, pub &'a dyn Diagnostic);

impl fmt::Display for ReportRenderer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            ReportType::Json => JSONReportHandler::new().render_report(f, self.1),
            ReportType::Graphical => GraphicalReportHandler::new().render_report(f, self.1),
            ReportType::Narratable => NarratableReportHandler::new().render_report(f, self.1),
        }
    }
}
