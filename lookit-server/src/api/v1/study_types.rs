use axum::Extension;

use crate::api::v1::ApiError;
use crate::api::Json;
use crate::repository::{Repository, StudyType};

/// Handler for `GET /api/v1/study-types`
pub async fn read_all(
    Extension(repository): Extension<Repository>,
) -> Result<Json<Vec<StudyType>>, ApiError> {
    Ok(repository.study_type().read_all().await?.into())
}
