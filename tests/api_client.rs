mod support;

use std::sync::Arc;
use std::time::Duration;

use gator_mail::api::{ApiClient, ApiError};
use gator_mail::auth::store::{MemoryStore, SessionStore, StoredSession};
use oauth2::AuthorizationCode;
use reqwest::StatusCode;
use support::{ANALYSIS, EMAILS, MockBackend, STATS};

fn signed_in() -> Arc<dyn SessionStore> {
    Arc::new(MemoryStore::with(StoredSession {
        access_token: Some("tok-123".into()),
        user_email: Some("me@example.com".into()),
        token_expiry: Some("2030-01-01T00:00:00".into()),
    }))
}

fn client(base: &str, store: Arc<dyn SessionStore>) -> ApiClient {
    ApiClient::new(base, store, Duration::from_secs(5)).unwrap()
}

#[test]
fn bearer_attached_when_token_stored() {
    let mock = MockBackend::new()
        .route("GET", "/emails", 200, EMAILS)
        .route("GET", "/stats", 200, STATS)
        .start();
    let api = client(&mock.base_url, signed_in());

    let list = api.list_emails().unwrap();
    assert_eq!(list.emails.len(), 2);
    assert_eq!(list.moved_count, Some(3));
    let stats = api.get_stats().unwrap();
    assert_eq!(stats.total_emails_processed, 42);

    for seen in mock.seen() {
        assert_eq!(seen.authorization.as_deref(), Some("Bearer tok-123"));
    }
}

#[test]
fn no_bearer_without_token() {
    let mock = MockBackend::new().route("GET", "/stats", 200, STATS).start();
    let api = client(&mock.base_url, Arc::new(MemoryStore::new()));

    api.get_stats().unwrap();
    assert_eq!(mock.seen_path("/stats")[0].authorization, None);
}

#[test]
fn auth_endpoints_never_carry_bearer() {
    let mock = MockBackend::new()
        .route(
            "GET",
            "/auth/url",
            200,
            r#"{"auth_url":"https://accounts.example.com/o/oauth2/auth?client_id=x"}"#,
        )
        .route(
            "POST",
            "/auth/callback",
            200,
            r#"{"access_token":"A","email":"a@example.com","expires_in":"2030-01-01T00:00:00"}"#,
        )
        .start();
    let api = client(&mock.base_url, signed_in());

    let url = api.get_auth_url().unwrap();
    assert_eq!(url.host_str(), Some("accounts.example.com"));

    let creds = api
        .exchange_code(&AuthorizationCode::new("C 1".into()))
        .unwrap();
    assert_eq!(creds.access_token, "A");
    assert_eq!(creds.email.as_deref(), Some("a@example.com"));

    let seen = mock.seen();
    assert!(seen.iter().all(|s| s.authorization.is_none()));
    let exchange = &mock.seen_path("/auth/callback")[0];
    assert_eq!(exchange.method, "POST");
    assert!(exchange.url.contains("code=C+1"), "{}", exchange.url);
    let body: serde_json::Value = serde_json::from_str(&exchange.body).unwrap();
    assert_eq!(body["code"], "C 1");
}

#[test]
fn unauthorized_clears_store_and_publishes_once() {
    let mock = MockBackend::new()
        .route("GET", "/emails", 401, r#"{"detail":"Invalid token"}"#)
        .start();
    let store = signed_in();
    let api = client(&mock.base_url, store.clone());
    let events = api.subscribe_unauthorized();

    let err = api.list_emails().unwrap_err();
    assert!(err.is_unauthorized());
    assert!(store.load().unwrap().is_empty());

    let event = events.try_recv().unwrap();
    assert_eq!(event.path, "/emails");
    assert!(events.try_recv().is_err());
}

#[test]
fn other_statuses_keep_the_session() {
    let mock = MockBackend::new()
        .route("GET", "/emails/missing", 404, r#"{"detail":"Email not found"}"#)
        .start();
    let store = signed_in();
    let api = client(&mock.base_url, store.clone());
    let events = api.subscribe_unauthorized();

    match api.get_email("missing") {
        Err(ApiError::Status { status, detail }) => {
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(detail, "Email not found");
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert!(!store.load().unwrap().is_empty());
    assert!(events.try_recv().is_err());
}

#[test]
fn malformed_body_is_a_decode_error() {
    let mock = MockBackend::new()
        .route("GET", "/emails/m1/analyze", 200, "not json")
        .start();
    let api = client(&mock.base_url, signed_in());
    assert!(matches!(api.analyze_email("m1"), Err(ApiError::Decode(_))));
}

#[test]
fn message_routes() {
    let mock = MockBackend::new()
        .route("GET", "/emails/m1/analyze", 200, ANALYSIS)
        .route("POST", "/emails/m1/trash", 200, r#"{"status":"ok"}"#)
        .route(
            "POST",
            "/emails/m1/draft-response",
            200,
            r#"{"content":"Thanks, will do."}"#,
        )
        .start();
    let api = client(&mock.base_url, signed_in());

    let a = api.analyze_email("m1").unwrap();
    assert!(a.should_trash);
    assert_eq!(a.key_points, vec!["50% off".to_string()]);

    api.move_to_trash("m1").unwrap();
    assert_eq!(mock.seen_path("/emails/m1/trash")[0].method, "POST");

    let draft = api.draft_response("m1", "friendly").unwrap();
    assert_eq!(draft.content, "Thanks, will do.");
    let seen = &mock.seen_path("/emails/m1/draft-response")[0];
    assert!(seen.url.contains("tone=friendly"));
    assert!(seen.url.contains("access_token=tok-123"));
}

#[test]
fn unreachable_backend_is_a_transport_error() {
    // Nothing listens on the discard port.
    let api = client("http://127.0.0.1:9", signed_in());
    assert!(matches!(api.get_stats(), Err(ApiError::Transport(_))));
}
