use serde::Serialize;

use crate::{database::Database, repository::Result};

/// ID of the built in experiment builder study type.
pub const EMBER_FRAME_PLAYER_ID: i64 = 1;
/// ID of the built in external link study type.
pub const EXTERNAL_ID: i64 = 2;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StudyType {
    pub id: i64,
    pub name: String,
}

#[derive(Clone)]
pub struct StudyTypeRepository {
    database: Database,
}

impl StudyTypeRepository {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    pub async fn read_all(&self) -> Result<Vec<StudyType>> {
        let mut conn = self.database.connection().await?;

        tracing::trace!("reading study types");

        Ok(sqlx::query_as("SELECT id, name FROM study_types ORDER BY id")
            .fetch_all(&mut *conn)
            .await?)
    }
}
