use lookit_core::age::AGE_RANGE_ERROR;
use lookit_core::forms::study::{BUILD_INVALID_JSON, STRUCTURE_INVALID_JSON};
use lookit_core::forms::FIELD_REQUIRED;
use lookit_server::api::v1::studies::{Study, StudyPage};
use reqwest::Method;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{TestApp, TestClient};

const NIL_STUDY: &str = "/api/v1/studies/00000000-0000-0000-0000-000000000000";

fn study(overrides: Value) -> Value {
    let mut study = json!({
        "name": "Word learning",
        "short_description": "How toddlers learn new words",
        "long_description": "We show two objects and name one of them.",
        "criteria": "Children who hear English at home",
        "duration": "10 minutes",
        "contact_info": "lab@example.com",
        "min_age_years": 1,
        "max_age_years": 2,
        "structure": "{\"frames\": {}, \"sequence\": []}",
        "study_type": 1
    });
    if let (Some(study), Some(overrides)) = (study.as_object_mut(), overrides.as_object()) {
        for (key, value) in overrides {
            study.insert(key.clone(), value.clone());
        }
    }
    study
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn inverted_age_range_is_rejected() {
    let (_app, client) = TestApp::start_and_connect().await;

    let response = client
        .send_json(
            Method::POST,
            "/api/v1/studies",
            study(json!({"min_age_years": 3, "max_age_years": 2, "max_age_months": 11})),
        )
        .await
        .expect("failed to send request");

    assert_eq!(422, response.status);
    let body = response.json().unwrap();
    assert_eq!("failure", body["result"]);
    assert_eq!(AGE_RANGE_ERROR, body["message"]);
    assert_eq!(json!([AGE_RANGE_ERROR]), body["errors"]["__all__"]);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn invalid_structure_is_rejected() {
    let (_app, client) = TestApp::start_and_connect().await;

    let response = client
        .send_json(
            Method::POST,
            "/api/v1/studies",
            study(json!({"structure": "{\"frames\": "})),
        )
        .await
        .expect("failed to send request");

    assert_eq!(422, response.status);
    let body = response.json().unwrap();
    assert_eq!(STRUCTURE_INVALID_JSON, body["message"]);
    assert_eq!(json!([STRUCTURE_INVALID_JSON]), body["errors"]["structure"]);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn all_errors_are_reported_together() {
    let (_app, client) = TestApp::start_and_connect().await;

    let response = client
        .send_json(
            Method::POST,
            "/api/v1/studies",
            study(json!({"name": "", "min_age_years": 5, "study_type": null})),
        )
        .await
        .expect("failed to send request");

    assert_eq!(422, response.status);
    let body = response.json().unwrap();
    assert_eq!(
        format!("{} {} {}", AGE_RANGE_ERROR, FIELD_REQUIRED, FIELD_REQUIRED),
        body["message"]
    );
    assert_eq!(json!([FIELD_REQUIRED]), body["errors"]["name"]);
    assert_eq!(json!([FIELD_REQUIRED]), body["errors"]["study_type"]);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn edit_with_inverted_age_range_is_rejected() {
    let (_app, client) = TestApp::start_and_connect().await;

    let response = client
        .send_json(
            Method::PUT,
            NIL_STUDY,
            study(json!({"min_age_days": 400, "max_age_years": 1, "min_age_years": 0})),
        )
        .await
        .expect("failed to send request");

    assert_eq!(422, response.status);
    assert_eq!(AGE_RANGE_ERROR, response.json().unwrap()["message"]);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn invalid_build_structure_is_rejected() {
    let (_app, client) = TestApp::start_and_connect().await;

    let response = client
        .send_json(
            Method::PUT,
            &format!("{}/structure", NIL_STUDY),
            json!({"structure": "not json"}),
        )
        .await
        .expect("failed to send request");

    assert_eq!(422, response.status);
    let body = response.json().unwrap();
    assert_eq!(BUILD_INVALID_JSON, body["message"]);
    assert_eq!(json!([BUILD_INVALID_JSON]), body["errors"]["structure"]);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn malformed_body_reports_location() {
    let (_app, client) = TestApp::start_and_connect().await;

    let response = client
        .send_raw(Method::POST, "/api/v1/studies", Some("{\"name\": ]"))
        .await
        .expect("failed to send request");

    assert_eq!(422, response.status);
    assert_eq!("application/json", response.content_type);
    let body = response.json().unwrap();
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("failed to parse JSON at line 1"));
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn mistyped_body_is_rejected() {
    let (_app, client) = TestApp::start_and_connect().await;

    let response = client
        .send_raw(
            Method::POST,
            "/api/v1/studies",
            Some(r#"{"study_type": "ember"}"#),
        )
        .await
        .expect("failed to send request");

    assert_eq!(422, response.status);
    let body = response.json().unwrap();
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("JSON is invalid"));
}

async fn create_study(client: &TestClient, name: &str) -> Study {
    client
        .post("/api/v1/studies", study(json!({ "name": name })))
        .await
        .expect("failed to create study")
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn created_study_is_stored_with_a_salt() {
    let (app, client) = TestApp::start_and_connect().await;

    let created = create_study(&client, "Word learning").await;
    assert_eq!("Word learning", created.name);
    assert_eq!("created", created.state);
    assert_eq!(1, created.min_age_years);
    assert_eq!(json!({"frames": {}, "sequence": []}), created.structure);
    assert_eq!(1, created.study_type.id);

    let read: Study = client
        .get(&format!("/api/v1/studies/{}", created.id))
        .await
        .expect("failed to read study");
    assert_eq!(created.name, read.name);
    assert_eq!(created.created_at, read.created_at);

    let second = create_study(&client, "Face perception").await;

    let mut conn = app.database().connection().await.unwrap();
    let salts: Vec<(Uuid, Option<Uuid>)> =
        sqlx::query_as("SELECT uuid, salt FROM studies WHERE uuid = ANY($1)")
            .bind(vec![created.id, second.id])
            .fetch_all(&mut *conn)
            .await
            .unwrap();
    assert_eq!(2, salts.len());
    assert!(salts.iter().all(|(_, salt)| salt.is_some()));
    assert_ne!(salts[0].1, salts[1].1);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn unknown_study_type_is_a_bad_argument() {
    let (_app, client) = TestApp::start_and_connect().await;

    let response = client
        .send_json(Method::POST, "/api/v1/studies", study(json!({"study_type": 99})))
        .await
        .expect("failed to send request");

    assert_eq!(400, response.status);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn missing_study_is_not_found() {
    let (_app, client) = TestApp::start_and_connect().await;

    let response = client
        .send_raw(Method::GET, NIL_STUDY, None)
        .await
        .expect("failed to send request");

    assert_eq!(404, response.status);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn update_replaces_metadata() {
    let (_app, client) = TestApp::start_and_connect().await;
    let created = create_study(&client, "Word learning").await;

    let response = client
        .send_json(
            Method::PUT,
            &format!("/api/v1/studies/{}", created.id),
            study(json!({"name": "Word learning II", "public": true, "max_age_years": 3})),
        )
        .await
        .expect("failed to send request");

    assert_eq!(200, response.status);
    let updated: Study = serde_json::from_value(response.json().unwrap()).unwrap();
    assert_eq!(created.id, updated.id);
    assert_eq!("Word learning II", updated.name);
    assert!(updated.public);
    assert_eq!(3, updated.max_age_years);
    assert_eq!(created.structure, updated.structure);
    assert!(updated.updated_at.is_some());
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn update_structure_replaces_only_structure() {
    let (_app, client) = TestApp::start_and_connect().await;
    let created = create_study(&client, "Word learning").await;

    let response = client
        .send_json(
            Method::PUT,
            &format!("/api/v1/studies/{}/structure", created.id),
            json!({"structure": "{\"frames\": {\"intro\": {}}, \"sequence\": [\"intro\"]}"}),
        )
        .await
        .expect("failed to send request");

    assert_eq!(200, response.status);
    let updated: Study = serde_json::from_value(response.json().unwrap()).unwrap();
    assert_eq!(
        json!({"frames": {"intro": {}}, "sequence": ["intro"]}),
        updated.structure
    );
    assert_eq!(created.name, updated.name);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn study_list_is_paged_and_searchable() {
    let (_app, client) = TestApp::start_and_connect().await;
    for i in 0..12 {
        create_study(&client, &format!("Study {:02}", i)).await;
    }
    create_study(&client, "100% attention").await;

    let first: StudyPage = client
        .get("/api/v1/studies")
        .await
        .expect("failed to list studies");
    assert_eq!(13, first.total);
    assert_eq!(1, first.page);
    assert_eq!(10, first.studies.len());
    assert_eq!("100% attention", first.studies[0].name);

    let second: StudyPage = client
        .get("/api/v1/studies?page=2&sort=-name")
        .await
        .expect("failed to list studies");
    assert_eq!(3, second.studies.len());
    assert_eq!("Study 01", second.studies[0].name);

    let matching: StudyPage = client
        .get("/api/v1/studies?match=study%200")
        .await
        .expect("failed to search studies");
    assert_eq!(10, matching.total);

    let literal: StudyPage = client
        .get("/api/v1/studies?match=%25")
        .await
        .expect("failed to search studies");
    assert_eq!(1, literal.total);
    assert_eq!("100% attention", literal.studies[0].name);
}
