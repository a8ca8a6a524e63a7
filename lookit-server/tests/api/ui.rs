use reqwest::Method;

use crate::TestApp;

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn home_page_renders_shell() {
    let (_app, client) = TestApp::start_and_connect().await;

    let response = client
        .send_raw(Method::GET, "/", None)
        .await
        .expect("failed to fetch home page");

    assert_eq!(200, response.status);
    assert!(response.content_type.starts_with("text/html"));
    assert!(response.body.contains("<title>Home | Lookit</title>"));
    assert!(response.body.contains("gtag/js?id=G-TEST"));
    assert!(response.body.contains(r#"href="/studies/">Find a study</a>"#));
    assert!(!response.body.contains("/login/"));
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn static_assets_are_served_locally() {
    let (_app, client) = TestApp::start_and_connect().await;

    let response = client
        .send_raw(Method::GET, "/static/css/site.css", None)
        .await
        .expect("failed to fetch stylesheet");

    assert_eq!(200, response.status);
    assert_eq!("text/css", response.content_type);
    assert!(response.body.contains(".breadcrumb"));

    let missing = client
        .send_raw(Method::GET, "/static/css/missing.css", None)
        .await
        .expect("failed to fetch missing file");

    assert_eq!(404, missing.status);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn study_list_survives_page_past_the_end() {
    let (_app, client) = TestApp::start_and_connect().await;
    for i in 0..11 {
        let response = client
            .send_json(
                Method::POST,
                "/api/v1/studies",
                serde_json::json!({
                    "name": format!("Study {:02}", i),
                    "short_description": "short",
                    "long_description": "long",
                    "criteria": "anyone",
                    "duration": "5 minutes",
                    "contact_info": "lab@example.com",
                    "structure": "{}",
                    "study_type": 1
                }),
            )
            .await
            .expect("failed to create study");
        assert_eq!(200, response.status);
    }

    let response = client
        .send_raw(Method::GET, "/exp/studies/?page=4294967295", None)
        .await
        .expect("failed to fetch study list");

    assert_eq!(200, response.status);
    assert!(response.body.contains("Page 4294967295 of 2"));
}
