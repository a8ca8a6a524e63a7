use async_trait::async_trait;

use super::{DataMigration, DataMigrationError, Result};
use crate::database::DbConnection;

/// Display names of the built in study types, before and after the rename.
pub struct StudyTypeName {
    pub old: &'static str,
    pub new: &'static str,
}

pub const EMBER_FRAME_PLAYER: StudyTypeName = StudyTypeName {
    old: "Ember Frame Player (default)",
    new: "Lookit/Ember Frame Player (Default experiment builder)",
};

pub const EXTERNAL: StudyTypeName = StudyTypeName {
    old: "External",
    new: "External Study (Choose this if you are posting a study link rather using an experiment builder)",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// `(from, to)` name pairs to rename, in order.
fn renames(direction: Direction) -> [(&'static str, &'static str); 2] {
    [EMBER_FRAME_PLAYER, EXTERNAL].map(|n| match direction {
        Direction::Forward => (n.old, n.new),
        Direction::Backward => (n.new, n.old),
    })
}

async fn rename(conn: &mut DbConnection, direction: Direction) -> Result<()> {
    for (from, to) in renames(direction) {
        let renamed = sqlx::query("UPDATE study_types SET name = $2 WHERE name = $1")
            .bind(from)
            .bind(to)
            .execute(&mut *conn)
            .await?
            .rows_affected();

        if renamed == 0 {
            return Err(DataMigrationError::StudyTypeNotFound {
                name: from.to_string(),
            });
        }

        tracing::trace!(from = from, to = to, "study type renamed");
    }
    Ok(())
}

/// Gives the built in study types descriptive display names.
pub struct RenameStudyTypes;

#[async_trait]
impl DataMigration for RenameStudyTypes {
    fn name(&self) -> &'static str {
        "rename_study_types"
    }

    fn description(&self) -> &'static str {
        "update the display names of the built in study types"
    }

    async fn apply(&self, conn: &mut DbConnection) -> Result<()> {
        rename(conn, Direction::Forward).await
    }

    async fn revert(&self, conn: &mut DbConnection) -> Result<()> {
        rename(conn, Direction::Backward).await
    }
}
