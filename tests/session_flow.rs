mod support;

use std::sync::Arc;
use std::time::Duration;

use gator_mail::api::ApiClient;
use gator_mail::auth::store::{MemoryStore, SessionStore, StoredSession};
use gator_mail::auth::{CallbackParams, Session};
use support::MockBackend;

fn setup(mock: &support::Running, stored: StoredSession) -> (Arc<dyn SessionStore>, ApiClient) {
    let store: Arc<dyn SessionStore> = Arc::new(MemoryStore::with(stored));
    let api = ApiClient::new(&mock.base_url, store.clone(), Duration::from_secs(5)).unwrap();
    (store, api)
}

#[test]
fn token_redirect_signs_in_directly() {
    let mock = MockBackend::new().start();
    let (store, api) = setup(
        &mock,
        StoredSession {
            access_token: Some("old".into()),
            user_email: Some("old@example.com".into()),
            token_expiry: Some("2020-01-01T00:00:00".into()),
        },
    );
    let mut session = Session::initialize(store.clone()).unwrap();

    let params = CallbackParams {
        token: Some("T".into()),
        ..Default::default()
    };
    session.complete_callback(&api, &params).unwrap();

    assert_eq!(session.access_token().map(|t| t.secret().as_str()), Some("T"));
    assert_eq!(session.user_email(), None);
    assert_eq!(session.token_expiry(), None);
    assert_eq!(
        store.load().unwrap(),
        StoredSession {
            access_token: Some("T".into()),
            ..Default::default()
        }
    );
    assert!(mock.seen().is_empty());
}

#[test]
fn code_redirect_is_exchanged() {
    let mock = MockBackend::new()
        .route(
            "POST",
            "/auth/callback",
            200,
            r#"{"access_token":"A","email":"e@example.com","expires_in":"2030-05-01T12:00:00"}"#,
        )
        .start();
    let (store, api) = setup(&mock, StoredSession::default());
    let mut session = Session::initialize(store.clone()).unwrap();

    let params = CallbackParams {
        code: Some("C".into()),
        ..Default::default()
    };
    session.complete_callback(&api, &params).unwrap();

    assert!(session.is_authenticated());
    assert_eq!(session.user_email(), Some("e@example.com"));
    assert_eq!(session.token_expiry(), Some("2030-05-01T12:00:00"));
    assert_eq!(store.load().unwrap().access_token.as_deref(), Some("A"));

    // A restart picks the same session back up.
    let again = Session::initialize(store).unwrap();
    assert_eq!(again.user_email(), Some("e@example.com"));
}

#[test]
fn failed_exchange_leaves_no_token() {
    let mock = MockBackend::new()
        .route("POST", "/auth/callback", 400, r#"{"detail":"bad code"}"#)
        .start();
    let (store, api) = setup(
        &mock,
        StoredSession {
            access_token: Some("stale".into()),
            ..Default::default()
        },
    );
    let mut session = Session::initialize(store.clone()).unwrap();

    let params = CallbackParams {
        code: Some("C".into()),
        ..Default::default()
    };
    assert!(session.complete_callback(&api, &params).is_err());
    assert!(!session.is_authenticated());
    assert!(store.load().unwrap().is_empty());
}

#[test]
fn provider_error_is_a_failure() {
    let mock = MockBackend::new().start();
    let (store, api) = setup(&mock, StoredSession::default());
    let mut session = Session::initialize(store).unwrap();

    let params = CallbackParams {
        error: Some("access_denied".into()),
        ..Default::default()
    };
    let err = session.complete_callback(&api, &params).unwrap_err();
    assert!(err.to_string().contains("access_denied"));
    assert!(!session.is_authenticated());
}

#[test]
fn unauthorized_response_logs_the_session_out() {
    let mock = MockBackend::new()
        .route("GET", "/stats", 401, r#"{"detail":"expired"}"#)
        .start();
    let (store, api) = setup(
        &mock,
        StoredSession {
            access_token: Some("tok".into()),
            user_email: Some("me@example.com".into()),
            token_expiry: None,
        },
    );
    let mut session = Session::initialize(store.clone()).unwrap();
    session.watch(&api);
    assert!(session.is_authenticated());
    assert!(!session.sync_unauthorized());

    assert!(api.get_stats().unwrap_err().is_unauthorized());
    assert!(session.sync_unauthorized());
    assert!(!session.is_authenticated());
    assert_eq!(session.user_email(), None);
    assert!(store.load().unwrap().is_empty());

    // Already handled.
    assert!(!session.sync_unauthorized());
}
