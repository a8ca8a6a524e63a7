use axum::extract::{Path, Query};
use axum::Extension;
use chrono::NaiveDateTime;
use lookit_core::forms::{StudyBuildForm, StudyEditForm, StudyForm};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::api::v1::ApiError;
use crate::api::Json;
use crate::repository::{self, Repository, StudyQuery, StudySort};

pub const PAGE_SIZE: i64 = 10;

/// Query arguments of `GET /api/v1/studies`.
#[derive(Debug, Default, Deserialize)]
pub struct ListStudies {
    pub state: Option<String>,
    #[serde(rename = "match")]
    pub matching: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u32>,
}

impl ListStudies {
    pub fn to_query(&self, public_only: bool) -> StudyQuery {
        let page = i64::from(self.page.unwrap_or(1).max(1));
        StudyQuery {
            state: self.state.clone().filter(|s| !s.is_empty()),
            matching: self.matching.clone().filter(|s| !s.is_empty()),
            public_only,
            study_type_id: None,
            sort: self
                .sort
                .as_deref()
                .and_then(StudySort::from_param)
                .unwrap_or_default(),
            limit: PAGE_SIZE,
            offset: (page - 1) * PAGE_SIZE,
        }
    }
}

/// Handler for `GET /api/v1/studies`
pub async fn read_all(
    Query(params): Query<ListStudies>,
    Extension(repository): Extension<Repository>,
) -> Result<Json<StudyPage>, ApiError> {
    let (studies, total) = repository
        .study()
        .read_page(&params.to_query(false))
        .await?;
    Ok(StudyPage {
        studies: studies.into_iter().map(Study::from).collect(),
        total,
        page: params.page.unwrap_or(1).max(1),
    }
    .into())
}

/// Handler for `GET /api/v1/studies/:id`
pub async fn read_one(
    Path(id): Path<Uuid>,
    Extension(repository): Extension<Repository>,
) -> Result<Json<Study>, ApiError> {
    let study: Study = repository.study().read_one(&id).await?.into();
    Ok(study.into())
}

/// Handler for `POST /api/v1/studies`
pub async fn create(
    Extension(repository): Extension<Repository>,
    Json(request): Json<StudyForm>,
) -> Result<Json<Study>, ApiError> {
    let cleaned = request.clean()?;
    let study: Study = repository.study().create(&cleaned).await?.into();
    Ok(study.into())
}

/// Handler for `PUT /api/v1/studies/:id`
pub async fn update(
    Path(id): Path<Uuid>,
    Extension(repository): Extension<Repository>,
    Json(request): Json<StudyEditForm>,
) -> Result<Json<Study>, ApiError> {
    request.clean()?;
    let study: Study = repository.study().update(&id, &request).await?.into();
    Ok(study.into())
}

/// Handler for `PUT /api/v1/studies/:id/structure`
pub async fn update_structure(
    Path(id): Path<Uuid>,
    Extension(repository): Extension<Repository>,
    Json(request): Json<StudyBuildForm>,
) -> Result<Json<Study>, ApiError> {
    let structure = request.clean()?;
    let study: Study = repository
        .study()
        .update_structure(&id, &structure)
        .await?
        .into();
    Ok(study.into())
}

/// Conversion from repository [`repository::Study`] to API [`Study`].
impl From<repository::Study> for Study {
    fn from(study: repository::Study) -> Self {
        Self {
            id: study.uuid,
            name: study.name,
            image: study.image,
            short_description: study.short_description,
            long_description: study.long_description,
            exit_url: study.exit_url,
            criteria: study.criteria,
            min_age_days: study.min_age_days,
            min_age_months: study.min_age_months,
            min_age_years: study.min_age_years,
            max_age_days: study.max_age_days,
            max_age_months: study.max_age_months,
            max_age_years: study.max_age_years,
            duration: study.duration,
            contact_info: study.contact_info,
            public: study.public,
            state: study.state,
            structure: study.structure,
            study_type: StudyTypeRef {
                id: study.study_type_id,
                name: study.study_type_name,
            },
            created_at: study.created_at,
            updated_at: study.updated_at,
        }
    }
}

/// An API [`Study`] type. The salt is never exposed.
#[derive(Debug, Serialize, Deserialize)]
pub struct Study {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub short_description: String,
    pub long_description: String,
    pub exit_url: Option<String>,
    pub criteria: String,
    pub min_age_days: i32,
    pub min_age_months: i32,
    pub min_age_years: i32,
    pub max_age_days: i32,
    pub max_age_months: i32,
    pub max_age_years: i32,
    pub duration: String,
    pub contact_info: String,
    pub public: bool,
    pub state: String,
    pub structure: Value,
    pub study_type: StudyTypeRef,
    pub created_at: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StudyTypeRef {
    pub id: i64,
    pub name: String,
}

/// Body of `GET /api/v1/studies`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StudyPage {
    pub studies: Vec<Study>,
    pub total: i64,
    pub page: u32,
}
