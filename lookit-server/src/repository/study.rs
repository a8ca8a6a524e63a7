use chrono::NaiveDateTime;
use lookit_core::forms::{CleanedStudy, StudyEditForm};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    database::Database,
    repository::{RepositoryError, Result},
};

const ENTITY_STUDY: &str = "study";
const ENTITY_STUDY_TYPE: &str = "study type";

const SELECT_STUDIES: &str = r"
    SELECT
        s.*,
        t.name AS study_type_name
    FROM
        studies s
        JOIN study_types t ON t.id = s.study_type_id
";

const FILTER_STUDIES: &str = r"
    WHERE
        ($1::text IS NULL OR s.state = $1)
        AND
        ($2::text IS NULL OR s.name ILIKE '%' || $2 || '%' ESCAPE '\')
        AND
        (NOT $3 OR s.public)
        AND
        ($4::bigint IS NULL OR s.study_type_id = $4)
";

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Study {
    pub id: i64,
    pub uuid: Uuid,
    pub salt: Option<Uuid>,
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
    pub study_type_id: i64,
    pub study_type_name: String,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

/// Ordering of study lists, as given in the `sort` query argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StudySort {
    #[default]
    Name,
    NameDescending,
    Newest,
    Oldest,
}

impl StudySort {
    pub fn from_param(value: &str) -> Option<Self> {
        Some(match value {
            "name" => StudySort::Name,
            "-name" => StudySort::NameDescending,
            "-created_at" => StudySort::Newest,
            "created_at" => StudySort::Oldest,
            _ => return None,
        })
    }

    pub fn param(&self) -> &'static str {
        match self {
            StudySort::Name => "name",
            StudySort::NameDescending => "-name",
            StudySort::Newest => "-created_at",
            StudySort::Oldest => "created_at",
        }
    }

    fn order_by(&self) -> &'static str {
        match self {
            StudySort::Name => "ORDER BY s.name ASC, s.id ASC",
            StudySort::NameDescending => "ORDER BY s.name DESC, s.id DESC",
            StudySort::Newest => "ORDER BY s.created_at DESC, s.id DESC",
            StudySort::Oldest => "ORDER BY s.created_at ASC, s.id ASC",
        }
    }
}

/// A page of a filtered study list.
#[derive(Debug, Clone, Default)]
pub struct StudyQuery {
    pub state: Option<String>,
    pub matching: Option<String>,
    pub public_only: bool,
    pub study_type_id: Option<i64>,
    pub sort: StudySort,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Clone)]
pub struct StudyRepository {
    database: Database,
}

impl StudyRepository {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    pub async fn read_one(&self, uuid: &Uuid) -> Result<Study> {
        let mut conn = self.database.connection().await?;

        tracing::trace!(uuid = uuid.to_string(), "reading study");

        sqlx::query_as(&format!("{} WHERE s.uuid = $1", SELECT_STUDIES))
            .bind(uuid)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| RepositoryError::NotFound {
                entity_type: ENTITY_STUDY.to_string(),
                id: uuid.to_string(),
            })
    }

    /// One page of studies matching `query`, and the total number of matches.
    pub async fn read_page(&self, query: &StudyQuery) -> Result<(Vec<Study>, i64)> {
        let mut conn = self.database.connection().await?;

        tracing::trace!(
            state = query.state.as_deref().unwrap_or(""),
            matching = query.matching.as_deref().unwrap_or(""),
            public_only = query.public_only,
            study_type_id = ?query.study_type_id,
            sort = query.sort.param(),
            limit = query.limit,
            offset = query.offset,
            "reading studies"
        );

        let sql = format!(
            "{} {} {} LIMIT $5 OFFSET $6",
            SELECT_STUDIES,
            FILTER_STUDIES,
            query.sort.order_by()
        );

        let matching = query.matching.as_deref().map(escape_like);

        let studies = sqlx::query_as(&sql)
            .bind(query.state.as_deref())
            .bind(matching.as_deref())
            .bind(query.public_only)
            .bind(query.study_type_id)
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&mut *conn)
            .await?;

        let (total,): (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM studies s {}",
            FILTER_STUDIES
        ))
        .bind(query.state.as_deref())
        .bind(matching.as_deref())
        .bind(query.public_only)
        .bind(query.study_type_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok((studies, total))
    }

    pub async fn create(&self, request: &CleanedStudy) -> Result<Study> {
        let mut tx = self.database.transaction().await?;

        let study_type: Option<(i64,)> = sqlx::query_as("SELECT id FROM study_types WHERE id = $1")
            .bind(request.study_type)
            .fetch_optional(&mut tx)
            .await?;
        if study_type.is_none() {
            return Err(RepositoryError::InvalidArgument(
                "study_type".to_string(),
                format!("{} with ID {} does not exist", ENTITY_STUDY_TYPE, request.study_type),
            ));
        }

        let id = Uuid::new_v4();
        let study = &request.study;
        let ages = age_components(study)?;

        let sql = r"
            INSERT INTO studies (
                uuid,
                salt,
                name,
                image,
                short_description,
                long_description,
                exit_url,
                criteria,
                min_age_days,
                min_age_months,
                min_age_years,
                max_age_days,
                max_age_months,
                max_age_years,
                duration,
                contact_info,
                public,
                structure,
                study_type_id
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15, $16, $17, $18, $19
            )
        ";

        sqlx::query(sql)
            .bind(id)
            .bind(Uuid::new_v4())
            .bind(&study.name)
            .bind(study.image.as_deref())
            .bind(&study.short_description)
            .bind(&study.long_description)
            .bind(study.exit_url.as_deref())
            .bind(&study.criteria)
            .bind(ages[0])
            .bind(ages[1])
            .bind(ages[2])
            .bind(ages[3])
            .bind(ages[4])
            .bind(ages[5])
            .bind(&study.duration)
            .bind(&study.contact_info)
            .bind(study.public)
            .bind(&request.structure)
            .bind(request.study_type)
            .execute(&mut tx)
            .await?;

        let created: Study = sqlx::query_as(&format!("{} WHERE s.uuid = $1", SELECT_STUDIES))
            .bind(id)
            .fetch_one(&mut tx)
            .await?;

        tx.commit().await?;

        tracing::trace!(
            uuid = id.to_string(),
            name = study.name.as_str(),
            "study created"
        );

        Ok(created)
    }

    pub async fn update(&self, uuid: &Uuid, study: &StudyEditForm) -> Result<Study> {
        let mut tx = self.database.transaction().await?;
        let ages = age_components(study)?;

        let sql = r"
            UPDATE
                studies
            SET
                name = $2,
                image = $3,
                short_description = $4,
                long_description = $5,
                exit_url = $6,
                criteria = $7,
                min_age_days = $8,
                min_age_months = $9,
                min_age_years = $10,
                max_age_days = $11,
                max_age_months = $12,
                max_age_years = $13,
                duration = $14,
                contact_info = $15,
                public = $16,
                updated_at = NOW() AT TIME ZONE 'UTC'
            WHERE
                uuid = $1
        ";

        let updated = sqlx::query(sql)
            .bind(uuid)
            .bind(&study.name)
            .bind(study.image.as_deref())
            .bind(&study.short_description)
            .bind(&study.long_description)
            .bind(study.exit_url.as_deref())
            .bind(&study.criteria)
            .bind(ages[0])
            .bind(ages[1])
            .bind(ages[2])
            .bind(ages[3])
            .bind(ages[4])
            .bind(ages[5])
            .bind(&study.duration)
            .bind(&study.contact_info)
            .bind(study.public)
            .execute(&mut tx)
            .await?
            .rows_affected()
            > 0;

        if !updated {
            return Err(not_found(uuid));
        }

        let study = read_in(&mut tx, uuid).await?;

        tx.commit().await?;

        tracing::trace!(uuid = uuid.to_string(), "study updated");

        Ok(study)
    }

    pub async fn update_structure(&self, uuid: &Uuid, structure: &Value) -> Result<Study> {
        let mut tx = self.database.transaction().await?;

        let sql = r"
            UPDATE
                studies
            SET
                structure = $2,
                updated_at = NOW() AT TIME ZONE 'UTC'
            WHERE
                uuid = $1
        ";

        let updated = sqlx::query(sql)
            .bind(uuid)
            .bind(structure)
            .execute(&mut tx)
            .await?
            .rows_affected()
            > 0;

        if !updated {
            return Err(not_found(uuid));
        }

        let study = read_in(&mut tx, uuid).await?;

        tx.commit().await?;

        tracing::trace!(uuid = uuid.to_string(), "study structure updated");

        Ok(study)
    }
}

async fn read_in(conn: &mut crate::database::DbConnection, uuid: &Uuid) -> Result<Study> {
    Ok(
        sqlx::query_as(&format!("{} WHERE s.uuid = $1", SELECT_STUDIES))
            .bind(uuid)
            .fetch_one(&mut *conn)
            .await?,
    )
}

fn not_found(uuid: &Uuid) -> RepositoryError {
    RepositoryError::NotFound {
        entity_type: ENTITY_STUDY.to_string(),
        id: uuid.to_string(),
    }
}

/// Makes `%`, `_` and `\` in a search term match literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Age components in column order: min days, months, years, then max.
fn age_components(study: &StudyEditForm) -> Result<[i32; 6]> {
    let values = [
        ("min_age_days", study.min_age_days),
        ("min_age_months", study.min_age_months),
        ("min_age_years", study.min_age_years),
        ("max_age_days", study.max_age_days),
        ("max_age_months", study.max_age_months),
        ("max_age_years", study.max_age_years),
    ];

    let mut ages = [0; 6];
    for (i, (name, value)) in values.iter().enumerate() {
        ages[i] = i32::try_from(*value).map_err(|_| {
            RepositoryError::InvalidArgument(name.to_string(), format!("{} is too large", value))
        })?;
    }
    Ok(ages)
}
