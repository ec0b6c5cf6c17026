//! Integration tests for thread planning and configured capabilities

use libplurtext::config::Config;
use libplurtext::error::{PlurtextError, ValidationError};
use libplurtext::platforms::{self, BLUESKY, MASTODON};
use libplurtext::text::MentionPolicy;
use libplurtext::validation::{ValidationRequest, ValidationService};
use libplurtext::{split_thread, MediaDescriptor, StaticResolver, ThreadRequest};
use std::sync::Arc;

const CONFIG: &str = r#"
[facets]
mention_policy = "keep"

[mentions]
"alice.com" = "did:plc:alice"

[platforms.mastodon]
max_text_length = 11000

[platforms.pager]
max_text_length = 20
"#;

fn config() -> Config {
    toml::from_str(CONFIG).expect("Failed to parse config")
}

#[tokio::test]
async fn test_three_post_thread_with_media_and_alt_text() {
    let img1 = MediaDescriptor::image("image/jpeg", 800_000).with_dimensions(1200, 800);
    let img2 = MediaDescriptor::image("image/png", 300_000);

    let request = ThreadRequest::new([
        "A thread about #rust, 1/3",
        "@alice.com wrote about it here: https://example.com/post 2/3",
        "That's all 3/3",
    ])
    .with_media(vec![vec![img1], vec![img2], vec![]])
    .with_alt_texts(vec![
        vec![Some("a".to_string())],
        vec![Some("b".to_string())],
        vec![],
    ]);

    let config = config();
    let posts = split_thread(
        request,
        platforms::capability(BLUESKY).unwrap(),
        &config.resolver(),
        config.mention_policy(),
    )
    .await
    .unwrap();

    assert_eq!(posts.len(), 3);
    assert_eq!(posts[0].media[0].alt_text.as_deref(), Some("a"));
    assert_eq!(posts[0].media[0].width, Some(1200));
    assert_eq!(posts[1].media[0].alt_text.as_deref(), Some("b"));
    assert!(posts[2].media.is_empty());
    assert!(posts[2].facets.is_empty());

    let wire = serde_json::to_value(posts[1].wire_facets()).unwrap();
    assert_eq!(wire[0]["features"][0]["did"], "did:plc:alice");
    assert_eq!(wire[1]["features"][0]["uri"], "https://example.com/post");
}

#[tokio::test]
async fn test_thread_against_configured_platform() {
    let table = config().capabilities().unwrap();
    let pager = table.get("pager").unwrap();

    let request = ThreadRequest::new(["short enough", "this one is far too long for a pager"]);
    let err = split_thread(request, pager, &StaticResolver::new(), MentionPolicy::Fail)
        .await
        .unwrap_err();

    assert_eq!(err.exit_code(), 3);
    match err {
        PlurtextError::Thread(thread) => {
            assert_eq!(thread.indices(), vec![1]);
            assert!(matches!(
                thread.chunks[0].cause.as_ref(),
                PlurtextError::Validation(ValidationError::TextTooLong { limit: 20, .. })
            ));
        }
        other => panic!("Expected thread error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_media_on_text_only_configured_platform() {
    let table = config().capabilities().unwrap();
    let request = ThreadRequest::new(["pic"]).with_media(vec![vec![MediaDescriptor::gif(1_000)]]);

    let err = split_thread(request, table.get("pager").unwrap(), &StaticResolver::new(), MentionPolicy::Fail)
        .await
        .unwrap_err();

    match err {
        PlurtextError::Thread(thread) => assert!(matches!(
            thread.chunks[0].cause.as_ref(),
            PlurtextError::Validation(ValidationError::MediaUnsupported { platform }) if platform == "pager"
        )),
        other => panic!("Expected thread error, got {:?}", other),
    }
}

#[test]
fn test_validation_service_with_configured_table() {
    let table = config().capabilities().unwrap();
    let service = ValidationService::new(Arc::new(table));

    let long = "word ".repeat(200);
    let response = service.validate(ValidationRequest {
        content: long,
        platforms: vec![BLUESKY.to_string(), MASTODON.to_string(), "pager".to_string()],
        is_reply: false,
    });

    assert!(!response.valid);
    let valid: Vec<bool> = response.results.iter().map(|r| r.valid).collect();
    assert_eq!(valid, vec![false, true, false]);
    assert_eq!(response.results[1].remaining, Some(10_000));
}
