use crate::TestApp;

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn health_check() {
    let (_app, client) = TestApp::start_and_connect().await;

    let response = client
        .get_string("/health")
        .await
        .expect("failed to perform health check");

    assert_eq!("UP", response);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn unknown_route_is_not_found() {
    let (_app, client) = TestApp::start_and_connect().await;

    let response = client
        .send_raw(reqwest::Method::GET, "/nope", None)
        .await
        .expect("failed to send request");

    assert_eq!(404, response.status);
    let body = response.json().unwrap();
    assert_eq!("failure", body["result"]);
    assert_eq!("/nope", body["uri"]);
}
