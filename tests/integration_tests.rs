//! Integration tests for page_inbox_export library
//!
//! These tests verify the public API and module interactions.

mod export;

use page_inbox_export::{
    config::{ExportConfig, FACEBOOK_PAGE_ID, LIMIT, LOCALE, OUTPUT_DIRECTORY, TIME_ZONE},
    error::{Error, Result},
    export::{share_line, Locale, TranscriptFormat},
    models::{Message, Page, Share},
};

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_config_constants() {
    assert_eq!(FACEBOOK_PAGE_ID, "366767477271199");
    assert_eq!(OUTPUT_DIRECTORY, "Conversations");
    assert_eq!(LOCALE, "en-US");
    assert_eq!(TIME_ZONE, "America/Denver");
    assert_eq!(LIMIT, 99999);
}

#[test]
fn test_default_config_uses_constants() {
    let config = ExportConfig::default();
    assert_eq!(config.locale.tag(), LOCALE);
    assert_eq!(config.time_zone.name(), TIME_ZONE);
    assert!(config.validate().is_ok());
}

// ============================================================================
// Error Tests
// ============================================================================

#[test]
fn test_error_variants_display() {
    let errors = vec![
        Error::GraphApi {
            status: 400,
            code: 190,
            kind: "OAuthException".into(),
            message: "expired".into(),
        },
        Error::Http("timeout".into()),
        Error::SerializationError("json error".into()),
        Error::MissingParticipant("t_1".into()),
        Error::InvalidArgument("bad arg".into()),
    ];

    for err in errors {
        let msg = err.to_string();
        assert!(!msg.is_empty(), "Error message should not be empty");
    }
}

#[test]
fn test_result_type_alias() {
    fn returns_ok() -> Result<i32> {
        Ok(42)
    }

    fn returns_err() -> Result<i32> {
        Err(Error::InvalidArgument("test".into()))
    }

    assert!(returns_ok().is_ok());
    assert!(returns_err().is_err());
}

// ============================================================================
// Transcript Tests
// ============================================================================

fn graph_message(value: serde_json::Value) -> Message {
    serde_json::from_value(value).expect("message json")
}

#[test]
fn test_transcript_from_graph_json() {
    let page: Page<Message> = serde_json::from_value(serde_json::json!({
        "data": [
            {
                "from": { "id": "366767477271199", "name": "Zhennovate" },
                "created_time": "2019-05-01T17:05:00+0000",
                "message": "Hello Alice!"
            },
            {
                "from": { "id": "U1", "name": "Alice" },
                "created_time": "2019-05-01T17:02:03+0000",
                "message": "Hi"
            }
        ]
    }))
    .unwrap();

    // Graph order is newest first.
    let mut messages = page.data;
    messages.reverse();

    let format = TranscriptFormat::new(Locale::EnUs, chrono_tz::America::Denver);
    assert_eq!(
        format.conversation_lines(&messages),
        vec![
            "Alice (5/1/2019, 11:02:03 AM): Hi",
            "Zhennovate (5/1/2019, 11:05:00 AM): Hello Alice!",
        ]
    );
}

#[test]
fn test_share_only_message() {
    let message = graph_message(serde_json::json!({
        "from": { "id": "U1", "name": "Alice" },
        "created_time": "2019-05-01T17:02:03+0000",
        "shares": { "data": [
            { "name": "Cat Video", "description": "Funny", "link": "http://x/y" }
        ]}
    }));

    let format = TranscriptFormat::new(Locale::EnUs, chrono_tz::America::Denver);
    assert_eq!(
        format.render(std::slice::from_ref(&message)),
        "Alice (5/1/2019, 11:02:03 AM): \nCat Video (Funny): http://x/y"
    );
}

#[test]
fn test_share_line_link_only() {
    let share = Share {
        link: "http://x/y".into(),
        ..Share::default()
    };
    assert_eq!(share_line(&share), "http://x/y");
}
