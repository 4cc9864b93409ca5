//! Integration tests for login, refresh and authenticated requests

use quill::application::session_manager::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use quill::application::{AuthService, RefreshOutcome, RequestOptions};
use quill::domain::{Credentials, Registration, Session, SessionState};
use quill::error::QuillError;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::manager_with;

const LOGGED_IN: &[(&str, &str)] = &[(ACCESS_TOKEN_KEY, "T1"), (REFRESH_TOKEN_KEY, "R1")];

fn stored(store: &quill::infrastructure::MemoryTokenStore, key: &str) -> Option<String> {
    store.snapshot().get(key).cloned()
}

#[tokio::test]
async fn test_login_stores_and_persists_token_pair() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .and(body_json(json!({"username": "a", "password": "b"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access": "T1", "refresh": "R1"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (session, store) = manager_with(&server.uri(), &[]);
    AuthService::new(session.clone())
        .login(&Credentials::new("a", "b"))
        .await
        .unwrap();

    assert!(session.is_logged_in());
    assert_eq!(session.state(), SessionState::Authenticated);
    assert_eq!(stored(&store, ACCESS_TOKEN_KEY).as_deref(), Some("T1"));
    assert_eq!(stored(&store, REFRESH_TOKEN_KEY).as_deref(), Some("R1"));
}

#[tokio::test]
async fn test_login_rejected_reports_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(
            json!({"detail": "No active account found with the given credentials"}),
        ))
        .mount(&server)
        .await;

    let (session, store) = manager_with(&server.uri(), &[]);
    let err = AuthService::new(session.clone())
        .login(&Credentials::new("a", "wrong"))
        .await
        .unwrap_err();

    match err {
        QuillError::InvalidCredentials(detail) => {
            assert_eq!(detail, "No active account found with the given credentials")
        }
        other => panic!("Expected InvalidCredentials, got {:?}", other),
    }
    assert_eq!(session.state(), SessionState::Anonymous);
    assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn test_login_without_detail_is_unknown_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(ResponseTemplate::new(400).set_body_string("<html>nope</html>"))
        .mount(&server)
        .await;

    let (session, _) = manager_with(&server.uri(), &[]);
    let err = AuthService::new(session)
        .login(&Credentials::new("a", "b"))
        .await
        .unwrap_err();

    assert!(matches!(err, QuillError::InvalidCredentials(ref d) if d == "Unknown error"));
}

#[tokio::test]
async fn test_login_unreachable_backend() {
    let (session, _) = manager_with("http://127.0.0.1:9", &[]);
    let err = AuthService::new(session.clone())
        .login(&Credentials::new("a", "b"))
        .await
        .unwrap_err();

    assert!(matches!(err, QuillError::Unreachable(_)));
    assert_eq!(err.to_string(), "Could not reach backend.");
    assert!(!err.display_with_suggestions().contains("session has been kept"));
    assert_eq!(session.state(), SessionState::Anonymous);
}

#[tokio::test]
async fn test_login_with_empty_access_token_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access": "", "refresh": "R1"})),
        )
        .mount(&server)
        .await;

    let (session, store) = manager_with(&server.uri(), &[]);
    let err = AuthService::new(session.clone())
        .login(&Credentials::new("a", "b"))
        .await
        .unwrap_err();

    assert!(matches!(err, QuillError::InvalidResponse(_)));
    assert_eq!(err.exit_code(), 1);
    assert!(!session.is_logged_in());
    assert_eq!(session.state(), SessionState::Anonymous);
    assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn test_request_to_unreachable_backend_keeps_session() {
    let (session, store) = manager_with("http://127.0.0.1:9", LOGGED_IN);
    let err = session
        .authenticated_request("http://127.0.0.1:9/api/notes/", &RequestOptions::get())
        .await
        .unwrap_err();

    assert!(matches!(err, QuillError::Network(_)));
    assert!(err.display_with_suggestions().contains("session has been kept"));
    assert_eq!(stored(&store, REFRESH_TOKEN_KEY).as_deref(), Some("R1"));
}

#[tokio::test]
async fn test_refresh_without_refresh_token_logs_out_without_calling_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "T2"})))
        .expect(0)
        .mount(&server)
        .await;

    let (session, store) = manager_with(&server.uri(), &[(ACCESS_TOKEN_KEY, "T1")]);

    assert_eq!(session.refresh().await, None);
    assert!(!session.is_logged_in());
    assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn test_refresh_success_replaces_access_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .and(body_json(json!({"refresh": "R1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "T2"})))
        .expect(1)
        .mount(&server)
        .await;

    let (session, store) = manager_with(&server.uri(), LOGGED_IN);

    assert_eq!(session.refresh().await.as_deref(), Some("T2"));
    assert_eq!(session.session().access_token(), Some("T2"));
    assert_eq!(session.session().refresh_token(), Some("R1"));
    assert_eq!(stored(&store, ACCESS_TOKEN_KEY).as_deref(), Some("T2"));
}

#[tokio::test]
async fn test_refresh_rejected_logs_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(
            json!({"detail": "Token is invalid or expired", "code": "token_not_valid"}),
        ))
        .mount(&server)
        .await;

    let (session, store) = manager_with(&server.uri(), LOGGED_IN);

    assert_eq!(session.refresh_outcome().await, RefreshOutcome::LoggedOut);
    assert_eq!(session.session(), Session::default());
    assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn test_refresh_server_error_keeps_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (session, store) = manager_with(&server.uri(), LOGGED_IN);
    let before = session.session();

    assert_eq!(session.refresh_outcome().await, RefreshOutcome::Unavailable);
    assert_eq!(session.session(), before);
    assert_eq!(stored(&store, ACCESS_TOKEN_KEY).as_deref(), Some("T1"));
    assert_eq!(stored(&store, REFRESH_TOKEN_KEY).as_deref(), Some("R1"));
}

#[tokio::test]
async fn test_expired_token_is_refreshed_and_request_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notes/"))
        .and(header("Authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/notes/"))
        .and(header("Authorization", "Bearer T2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "title": "from T2", "markdown": "", "pinned": false}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .and(body_json(json!({"refresh": "R1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "T2"})))
        .expect(1)
        .mount(&server)
        .await;

    let (session, store) = manager_with(&server.uri(), LOGGED_IN);
    let url = session.endpoints().notes();

    let response = session
        .authenticated_request(&url, &RequestOptions::get())
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body[0]["title"], "from T2");
    assert_eq!(session.session().access_token(), Some("T2"));
    assert_eq!(stored(&store, ACCESS_TOKEN_KEY).as_deref(), Some("T2"));
}

#[tokio::test]
async fn test_at_most_one_refresh_per_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notes/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(6)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "T2"})))
        .expect(3)
        .mount(&server)
        .await;

    let (session, _) = manager_with(&server.uri(), LOGGED_IN);
    let url = session.endpoints().notes();

    for _ in 0..3 {
        let response = session
            .authenticated_request(&url, &RequestOptions::get())
            .await
            .unwrap();
        // The retried 401 is handed back rather than refreshed again
        assert_eq!(response.status(), 401);
    }
}

#[tokio::test]
async fn test_failed_refresh_surfaces_session_expired_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/notes/4/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let (session, _) = manager_with(&server.uri(), LOGGED_IN);
    let url = session.endpoints().note(4);

    let err = session
        .authenticated_request(&url, &RequestOptions::patch(json!({"pinned": true})))
        .await
        .unwrap_err();

    assert!(matches!(err, QuillError::SessionExpired));
    // Transient refresh failure leaves the session in place
    assert_eq!(session.session().access_token(), Some("T1"));
}

#[tokio::test]
async fn test_rejected_refresh_during_request_logs_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notes/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let (session, store) = manager_with(&server.uri(), LOGGED_IN);
    let url = session.endpoints().notes();

    let err = session
        .authenticated_request(&url, &RequestOptions::get())
        .await
        .unwrap_err();

    assert!(matches!(err, QuillError::SessionExpired));
    assert!(!session.is_logged_in());
    assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn test_request_body_and_bearer_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/notes/"))
        .and(header("Authorization", "Bearer T1"))
        .and(body_json(json!({"title": "x"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let (session, _) = manager_with(&server.uri(), LOGGED_IN);
    let url = session.endpoints().notes();

    let response = session
        .authenticated_request(&url, &RequestOptions::post(json!({"title": "x"})))
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
}

fn registration(email: &str) -> Registration {
    Registration {
        username: "ada".to_string(),
        email: email.to_string(),
        password: "pw-one".to_string(),
        password2: "pw-two".to_string(),
    }
}

#[tokio::test]
async fn test_signup_field_errors_are_flattened() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/register/"))
        .and(body_json(json!({
            "username": "ada",
            "email": "ada@example.com",
            "password": "pw-one",
            "password2": "pw-two"
        })))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "password": ["Password fields didn't match."]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (session, _) = manager_with(&server.uri(), &[]);
    let err = AuthService::new(session.clone())
        .register(&registration("ada@example.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, QuillError::Registration(ref m) if m == "Password fields didn't match."));
    assert!(!session.is_logged_in());
}

#[tokio::test]
async fn test_signup_success_does_not_log_in() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/register/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"username": "ada"})))
        .expect(1)
        .mount(&server)
        .await;

    let (session, store) = manager_with(&server.uri(), &[]);
    AuthService::new(session.clone())
        .register(&registration(""))
        .await
        .unwrap();

    assert!(!session.is_logged_in());
    assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn test_signup_invalid_email_is_not_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/register/"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let (session, _) = manager_with(&server.uri(), &[]);
    let err = AuthService::new(session)
        .register(&registration("ada-at-example"))
        .await
        .unwrap_err();

    assert!(matches!(err, QuillError::Registration(_)));
}
