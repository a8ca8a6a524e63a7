use std::collections::HashSet;

use lookit_server::data_migrations::{self, DataMigrationError, EMBER_FRAME_PLAYER, EXTERNAL};
use lookit_server::database::Database;
use uuid::Uuid;

use crate::TestDatabase;

async fn insert_study(database: &Database, name: &str) {
    let mut conn = database.connection().await.unwrap();
    sqlx::query(
        r"
        INSERT INTO studies (
            uuid,
            name,
            short_description,
            long_description,
            criteria,
            duration,
            contact_info,
            study_type_id
        ) VALUES ($1, $2, 'short', 'long', 'anyone', '5 minutes', 'lab@example.com', 1)
    ",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .execute(&mut *conn)
    .await
    .unwrap();
}

async fn study_type_names(database: &Database) -> Vec<String> {
    let mut conn = database.connection().await.unwrap();
    let rows: Vec<(String,)> = sqlx::query_as("SELECT name FROM study_types ORDER BY id")
        .fetch_all(&mut *conn)
        .await
        .unwrap();
    rows.into_iter().map(|r| r.0).collect()
}

async fn is_recorded(database: &Database, name: &str) -> bool {
    let mut conn = database.connection().await.unwrap();
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM data_migrations WHERE name = $1")
        .bind(name)
        .fetch_one(&mut *conn)
        .await
        .unwrap();
    count > 0
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn migrate_applies_and_records_everything() {
    let db = TestDatabase::create().await;

    let statuses = data_migrations::list(db.database()).await.unwrap();

    assert_eq!(2, statuses.len());
    assert!(statuses.iter().all(|s| s.applied_at.is_some()));
    assert_eq!(
        vec![EMBER_FRAME_PLAYER.new, EXTERNAL.new],
        study_type_names(db.database()).await
    );
    assert_eq!(0, data_migrations::run_pending(db.database()).await.unwrap());
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn salt_backfill_gives_each_study_its_own_salt() {
    let db = TestDatabase::create().await;
    for name in ["Words", "Faces", "Sounds"] {
        insert_study(db.database(), name).await;
    }

    data_migrations::revert(db.database(), "populate_salt_values")
        .await
        .unwrap();
    assert!(!is_recorded(db.database(), "populate_salt_values").await);

    assert_eq!(1, data_migrations::run_pending(db.database()).await.unwrap());

    let salts: Vec<(Option<Uuid>,)> = {
        let mut conn = db.database().connection().await.unwrap();
        sqlx::query_as("SELECT salt FROM studies")
            .fetch_all(&mut *conn)
            .await
            .unwrap()
    };
    let salts: HashSet<Uuid> = salts.into_iter().filter_map(|s| s.0).collect();

    assert_eq!(3, salts.len());
    assert!(is_recorded(db.database(), "populate_salt_values").await);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn study_type_rename_can_be_reverted() {
    let db = TestDatabase::create().await;

    data_migrations::revert(db.database(), "rename_study_types")
        .await
        .unwrap();

    assert_eq!(
        vec![EMBER_FRAME_PLAYER.old, EXTERNAL.old],
        study_type_names(db.database()).await
    );
    assert!(!is_recorded(db.database(), "rename_study_types").await);

    assert_eq!(1, data_migrations::run_pending(db.database()).await.unwrap());
    assert_eq!(
        vec![EMBER_FRAME_PLAYER.new, EXTERNAL.new],
        study_type_names(db.database()).await
    );
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn missing_study_type_aborts_rename() {
    let db = TestDatabase::create().await;

    data_migrations::revert(db.database(), "rename_study_types")
        .await
        .unwrap();
    {
        let mut conn = db.database().connection().await.unwrap();
        sqlx::query("UPDATE study_types SET name = 'Retired' WHERE name = $1")
            .bind(EXTERNAL.old)
            .execute(&mut *conn)
            .await
            .unwrap();
    }

    let result = data_migrations::run_pending(db.database()).await;

    assert!(matches!(
        result,
        Err(DataMigrationError::StudyTypeNotFound { name }) if name == EXTERNAL.old
    ));
    assert_eq!(
        vec![EMBER_FRAME_PLAYER.old, "Retired"],
        study_type_names(db.database()).await
    );
    assert!(!is_recorded(db.database(), "rename_study_types").await);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn reverting_unapplied_migration_fails() {
    let db = TestDatabase::create().await;

    data_migrations::revert(db.database(), "rename_study_types")
        .await
        .unwrap();
    let result = data_migrations::revert(db.database(), "rename_study_types").await;

    assert!(matches!(
        result,
        Err(DataMigrationError::NotApplied(name)) if name == "rename_study_types"
    ));
    assert!(matches!(
        data_migrations::revert(db.database(), "nope").await,
        Err(DataMigrationError::Unknown(_))
    ));
}
