use axum::{
    extract::Path,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use rust_embed::RustEmbed;

pub const STATIC_URI: &str = "/static/*path";

#[derive(RustEmbed)]
#[folder = "static/"]
pub struct Asset;

/// Adds the `/static/` routes serving the embedded assets.
pub fn register_routes(router: Router) -> Router {
    router.route(STATIC_URI, get(static_file_handler))
}

async fn static_file_handler(Path(path): Path<String>) -> impl IntoResponse {
    StaticFile(path.trim_start_matches('/').to_string())
}

struct StaticFile(String);

impl IntoResponse for StaticFile {
    fn into_response(self) -> Response {
        match Asset::get(self.0.as_str()) {
            Some(content) => {
                let mime = mime_guess::from_path(&self.0).first_or_octet_stream();
                match HeaderValue::from_str(mime.as_ref()) {
                    Ok(content_type) => (
                        [(header::CONTENT_TYPE, content_type)],
                        content.data.into_owned(),
                    )
                        .into_response(),
                    Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
                }
            }
            None => {
                tracing::debug!(path = self.0.as_str(), "static file not found");
                (StatusCode::NOT_FOUND, "404").into_response()
            }
        }
    }
}
