use async_trait::async_trait;
use uuid::Uuid;

use super::{DataMigration, Result};
use crate::database::DbConnection;

/// Gives every study a fresh random salt.
pub struct PopulateSaltValues;

#[async_trait]
impl DataMigration for PopulateSaltValues {
    fn name(&self) -> &'static str {
        "populate_salt_values"
    }

    fn description(&self) -> &'static str {
        "generate a random salt for every study"
    }

    async fn apply(&self, conn: &mut DbConnection) -> Result<()> {
        let column: Option<(String,)> = sqlx::query_as(
            r"
            SELECT
                column_name::text
            FROM
                information_schema.columns
            WHERE
                table_schema = current_schema()
                AND
                table_name = 'studies'
                AND
                column_name = 'salt'
        ",
        )
        .fetch_optional(&mut *conn)
        .await?;

        if column.is_none() {
            tracing::debug!("studies have no salt column, nothing to populate");
            return Ok(());
        }

        let ids: Vec<(i64,)> = sqlx::query_as("SELECT id FROM studies ORDER BY id")
            .fetch_all(&mut *conn)
            .await?;

        for (id,) in ids.iter() {
            sqlx::query("UPDATE studies SET salt = $1 WHERE id = $2")
                .bind(Uuid::new_v4())
                .bind(id)
                .execute(&mut *conn)
                .await?;
        }

        tracing::debug!(count = ids.len(), "study salts populated");

        Ok(())
    }
}
