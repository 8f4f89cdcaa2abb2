//! End-to-end tests for the export pipeline against a mocked Graph API

use std::path::Path;

use httpmock::prelude::*;
use serde_json::json;
use tempfile::tempdir;

use page_inbox_export::export::{self, conversations::CONVERSATION_FIELDS};
use page_inbox_export::{Error, ExportConfig, GraphClient};

const PAGE: &str = "P";

fn setup(server: &MockServer, output_dir: &Path) -> (GraphClient, ExportConfig) {
    let config = ExportConfig {
        page_id: PAGE.to_string(),
        output_dir: output_dir.to_path_buf(),
        api_url: server.url("/v3.3"),
        concurrency: 2,
        ..ExportConfig::default()
    };
    let client = GraphClient::with_base_url("test-token", &config.api_url).expect("client");
    (client, config)
}

fn mock_listing(server: &MockServer, ids: &[&str]) {
    let data: Vec<_> = ids.iter().map(|id| json!({ "id": id })).collect();
    server.mock(|when, then| {
        when.method(GET)
            .path("/v3.3/P/conversations")
            .query_param("limit", "99999");
        then.status(200).json_body(json!({ "data": data }));
    });
}

fn mock_conversation(server: &MockServer, id: &str, user_id: &str, name: &str, text: &str) {
    server.mock(|when, then| {
        when.method(GET)
            .path(format!("/v3.3/{id}"))
            .query_param("fields", CONVERSATION_FIELDS);
        then.status(200).json_body(json!({
            "id": id,
            "participants": { "data": [
                { "id": PAGE, "name": "My Page" },
                { "id": user_id, "name": name }
            ]},
            "messages": { "data": [
                { "from": { "id": PAGE, "name": "My Page" },
                  "created_time": "2019-05-01T17:05:00+0000", "message": "Thanks!" },
                { "from": { "id": user_id, "name": name },
                  "created_time": "2019-05-01T17:02:03+0000", "message": text,
                  "shares": { "data": [
                      { "name": "Cat Video", "description": "Funny", "link": "http://x/y" }
                  ]}}
            ]}
        }));
    });
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("read output dir")
        .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_run_writes_one_transcript_per_participant() {
    let server = MockServer::start_async().await;
    let tmp = tempdir().expect("tempdir");
    let out = tmp.path().join("Conversations");

    mock_listing(&server, &["t_1", "t_2"]);
    mock_conversation(&server, "t_1", "U1", "Alice", "Hi");
    mock_conversation(&server, "t_2", "U2", "Carol", "Hello");

    let (client, config) = setup(&server, &out);
    let summary = export::run(&client, &config).await.expect("export");

    assert_eq!(summary.conversations, 2);
    assert_eq!(summary.files.len(), 2);
    assert_eq!(files_in(&out), vec!["Alice.txt", "Carol.txt"]);
    assert_eq!(
        std::fs::read_to_string(out.join("Alice.txt")).unwrap(),
        "Alice (5/1/2019, 11:02:03 AM): Hi\n\
         Cat Video (Funny): http://x/y\n\
         My Page (5/1/2019, 11:05:00 AM): Thanks!"
    );
}

#[tokio::test]
async fn test_same_display_name_collides_into_one_file() {
    let server = MockServer::start_async().await;
    let tmp = tempdir().expect("tempdir");

    mock_listing(&server, &["t_1", "t_2"]);
    mock_conversation(&server, "t_1", "U1", "Bob", "first Bob");
    mock_conversation(&server, "t_2", "U2", "Bob", "second Bob");

    let (client, config) = setup(&server, tmp.path());
    let summary = export::run(&client, &config).await.expect("export");

    assert_eq!(summary.conversations, 2);
    assert_eq!(files_in(tmp.path()), vec!["Bob.txt"]);
    // Later conversation in the listing wins.
    let body = std::fs::read_to_string(tmp.path().join("Bob.txt")).unwrap();
    assert!(body.contains("second Bob"));
}

#[tokio::test]
async fn test_listing_failure_writes_nothing() {
    let server = MockServer::start_async().await;
    let tmp = tempdir().expect("tempdir");
    let out = tmp.path().join("Conversations");

    server.mock(|when, then| {
        when.method(GET).path("/v3.3/P/conversations");
        then.status(400).json_body(json!({
            "error": {
                "message": "Error validating access token",
                "type": "OAuthException",
                "code": 190
            }
        }));
    });

    let (client, config) = setup(&server, &out);
    let err = export::run(&client, &config).await.unwrap_err();

    assert!(err.is_auth_failure());
    let guidance = export::guidance_for(&err, &config).expect("guidance");
    assert!(guidance.contains("pages_messaging"));
    assert!(out.is_dir());
    assert!(files_in(&out).is_empty());
}

#[tokio::test]
async fn test_single_conversation_failure_writes_nothing() {
    let server = MockServer::start_async().await;
    let tmp = tempdir().expect("tempdir");

    mock_listing(&server, &["t_1", "t_2", "t_3"]);
    mock_conversation(&server, "t_1", "U1", "Alice", "Hi");
    mock_conversation(&server, "t_3", "U3", "Carol", "Hello");
    server.mock(|when, then| {
        when.method(GET).path("/v3.3/t_2");
        then.status(500).body("upstream exploded");
    });

    let (client, config) = setup(&server, tmp.path());
    let err = export::run(&client, &config).await.unwrap_err();

    assert!(matches!(err, Error::GraphApi { status: 500, .. }));
    assert!(!err.is_auth_failure());
    assert!(export::guidance_for(&err, &config).is_none());
    assert!(files_in(tmp.path()).is_empty());
}

#[tokio::test]
async fn test_empty_inbox_creates_directory_only() {
    let server = MockServer::start_async().await;
    let tmp = tempdir().expect("tempdir");
    let out = tmp.path().join("nested").join("Conversations");

    mock_listing(&server, &[]);

    let (client, config) = setup(&server, &out);
    let summary = export::run(&client, &config).await.expect("export");

    assert_eq!(summary.conversations, 0);
    assert!(out.is_dir());
    assert!(files_in(&out).is_empty());
}
