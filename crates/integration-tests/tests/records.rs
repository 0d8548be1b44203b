mod harness;

use harness::config::ConfigBuilder;
use harness::records::RecordDir;
use harness::server::TestServer;

#[tokio::test]
async fn stored_record_is_served_as_json() {
    let records = RecordDir::new();
    records.write("intro", "Introduction", "Welcome aboard");

    let config = ConfigBuilder::new().with_records_dir(records.path()).build();
    let server = TestServer::start(config).await.unwrap();

    let resp = server.client().get(server.url("/records/intro")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "application/json");

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["title"], "Introduction");
}

#[tokio::test]
async fn stored_record_is_served_as_html() {
    let records = RecordDir::new();
    records.write("intro", "Fish & Chips", "Welcome aboard");

    let config = ConfigBuilder::new().with_records_dir(records.path()).with_html().build();
    let server = TestServer::start(config).await.unwrap();

    let (status, body) = server.get("/records/intro").await;
    assert_eq!(status, 200);
    assert!(body.contains("<h1>Fish &amp; Chips</h1>"));
}

#[tokio::test]
async fn missing_record_is_not_found() {
    let records = RecordDir::new();
    let config = ConfigBuilder::new().with_records_dir(records.path()).build();
    let server = TestServer::start(config).await.unwrap();

    let resp = server.client().get(server.url("/records/ghost")).send().await.unwrap();
    assert_eq!(resp.status(), 404);
    assert_eq!(resp.headers()["content-type"], "text/plain; charset=utf-8");
    assert_eq!(resp.text().await.unwrap(), "Record not found");
}

#[tokio::test]
async fn corrupt_record_hides_the_cause() {
    let records = RecordDir::new();
    records.write_raw("broken", "{\"id\": \"broken\"");

    let config = ConfigBuilder::new().with_records_dir(records.path()).build();
    let server = TestServer::start(config).await.unwrap();

    let (status, body) = server.get("/records/broken").await;
    assert_eq!(status, 500);
    assert_eq!(body, "Can't load record");
}

#[tokio::test]
async fn raw_route_returns_the_stored_record() {
    let records = RecordDir::new();
    records.write("intro", "Introduction", "Welcome aboard");

    let config = ConfigBuilder::new().with_records_dir(records.path()).build();
    let server = TestServer::start(config).await.unwrap();

    let (status, body) = server.get("/records/intro/raw").await;
    assert_eq!(status, 200);

    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["id"], "intro");
    assert_eq!(body["body"], "Welcome aboard");
}

#[tokio::test]
async fn raw_route_exposes_the_bare_description() {
    let records = RecordDir::new();
    records.write_raw("broken", "not json");

    let config = ConfigBuilder::new().with_records_dir(records.path()).build();
    let server = TestServer::start(config).await.unwrap();

    let (status, body) = server.get("/records/ghost/raw").await;
    assert_eq!(status, 500);
    assert_eq!(body, "record ghost not found");

    let (status, body) = server.get("/records/broken/raw").await;
    assert_eq!(status, 500);
    assert_eq!(body, "record broken is corrupt");
}

#[tokio::test]
async fn fallback_status_is_configurable() {
    let records = RecordDir::new();
    let config = ConfigBuilder::new()
        .with_records_dir(records.path())
        .with_fallback_status(502)
        .build();
    let server = TestServer::start(config).await.unwrap();

    let (status, body) = server.get("/records/ghost/raw").await;
    assert_eq!(status, 502);
    assert_eq!(body, "record ghost not found");

    // Structured errors keep their own status
    let (status, _) = server.get("/records/ghost").await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn request_timeout_does_not_affect_fast_lookups() {
    let records = RecordDir::new();
    records.write("intro", "Introduction", "Welcome aboard");

    let config = ConfigBuilder::new()
        .with_records_dir(records.path())
        .with_request_timeout("5s")
        .build();
    let server = TestServer::start(config).await.unwrap();

    let (status, _) = server.get("/records/intro").await;
    assert_eq!(status, 200);
}
