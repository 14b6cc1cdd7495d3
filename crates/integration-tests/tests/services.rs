//! Integration tests for login, the job board and the notification feed.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{Method, StatusCode};
use placify_client::http::ApiError;
use placify_client::services::jobs::JobBoard;
use placify_client::services::notifications::NotificationFeed;
use placify_client::services::{APPLICATIONS_ENDPOINT, LOGIN_ENDPOINT, auth};
use placify_client::{ManualClock, MemoryStore, ServiceError, SessionState};
use placify_core::{JobId, NotificationFilter, NotificationId, Role};
use placify_integration_tests::{Canned, MockApi};
use secrecy::SecretString;
use serde_json::{Value, json};

const T0: i64 = 1_700_000_000_000;

fn manual_session() -> (SessionState, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(T0));
    let session = SessionState::with_clock(Arc::new(MemoryStore::new()), clock.clone());
    (session, clock)
}

fn password() -> SecretString {
    SecretString::from("hunter2".to_string())
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_then_authenticated_request() {
    let api = MockApi::start().await;
    api.route(
        &Method::POST,
        "/auth/login",
        Canned::ok(json!({
            "data": {
                "token": "abc123",
                "user": {"_id": "u1", "id": "u1", "role": "Student", "name": "Ann"}
            }
        })),
    );
    api.route(&Method::GET, "/jobs", Canned::ok(json!({"data": {"jobs": []}})));

    let (client, _) = api.client();
    let user = auth::login(&client, "ann@example.com", &password())
        .await
        .expect("login");
    assert_eq!(user.role, "Student");

    let session = client.session();
    assert!(session.is_logged_in());
    assert_eq!(session.role().as_deref(), Some("student"));
    assert_eq!(session.current_role(), Some(Role::Student));
    assert_eq!(session.name(), "Ann");
    assert_eq!(session.user_id().as_deref(), Some("u1"));
    assert!(session.has_role("STUDENT"));

    let login = api.requests_to("/auth/login");
    assert_eq!(login.len(), 1);
    assert!(login[0].header("authorization").is_none());
    assert_eq!(
        login[0].json(),
        Some(json!({"email": "ann@example.com", "password": "hunter2"}))
    );

    let jobs = client.get::<Value>("/jobs").await.expect("jobs");
    assert_eq!(jobs.data, json!({"data": {"jobs": []}}));
    let recorded = api.requests_to("/jobs");
    assert_eq!(recorded[0].header("authorization"), Some("Bearer abc123"));
}

#[tokio::test]
async fn test_login_rate_limit_cooldown() {
    let api = MockApi::start().await;
    api.route(
        &Method::POST,
        "/auth/login",
        Canned::json(StatusCode::TOO_MANY_REQUESTS, json!({"message": "Too many attempts"})),
    );

    let (session, clock) = manual_session();
    let (client, redirect) = api.client_with(session, None);

    let err = auth::login(&client, "ann@example.com", &password())
        .await
        .expect_err("429");
    assert!(matches!(
        err,
        ServiceError::Api(ApiError::RateLimited {
            retry_after: None,
            ..
        })
    ));
    assert_eq!(redirect.calls(), 0);

    // No Retry-After: default cooldown
    let status = client
        .session()
        .rate_limit_data(LOGIN_ENDPOINT)
        .expect("cooldown");
    assert_eq!(status.remaining_time, 30);
    assert_eq!(status.expiry_time, T0 + 30_000);

    // Refused locally while cooling down
    let err = auth::login(&client, "ann@example.com", &password())
        .await
        .expect_err("cooling down");
    assert!(matches!(
        err,
        ServiceError::CoolingDown {
            remaining_secs: 30,
            ..
        }
    ));
    assert_eq!(api.requests_to("/auth/login").len(), 1);

    // After expiry a successful login clears the marker
    clock.advance(Duration::from_secs(31));
    api.route(
        &Method::POST,
        "/auth/login",
        Canned::ok(json!({"token": "t2", "user": {"id": "u2", "role": "student"}})),
    );
    auth::login(&client, "ann@example.com", &password())
        .await
        .expect("login");
    assert!(client.session().rate_limit_data(LOGIN_ENDPOINT).is_none());
    assert!(client.session().is_logged_in());
}

#[tokio::test]
async fn test_login_malformed_response() {
    let api = MockApi::start().await;
    api.route(&Method::POST, "/auth/login", Canned::ok(json!({"ok": true})));

    let (client, _) = api.client();
    let err = auth::login(&client, "ann@example.com", &password())
        .await
        .expect_err("malformed");
    assert!(matches!(err, ServiceError::MalformedResponse(_)));
    assert!(!client.session().is_logged_in());
}

#[tokio::test]
async fn test_login_rejects_empty_token() {
    let api = MockApi::start().await;
    api.route(
        &Method::POST,
        "/auth/login",
        Canned::ok(json!({"token": "", "user": {"role": "student"}})),
    );

    let (client, _) = api.client();
    let err = auth::login(&client, "ann@example.com", &password())
        .await
        .expect_err("empty token");
    assert!(matches!(err, ServiceError::Session(_)));
    assert!(!client.session().is_logged_in());
}

// =============================================================================
// Job board
// =============================================================================

fn route_job_board(api: &MockApi) {
    api.route(
        &Method::GET,
        "/jobs",
        Canned::ok(json!({
            "jobs": [
                {"_id": "a", "title": "Backend Intern", "company": "Acme"},
                {"_id": "b", "title": "Data Analyst"},
                {"_id": "c", "title": "QA Engineer"}
            ]
        })),
    );
    api.route(
        &Method::GET,
        "/bookmarks",
        Canned::ok(json!({"data": [{"_id": "bm1", "job": {"_id": "a"}}]})),
    );
    api.route(
        &Method::GET,
        "/applications",
        Canned::ok(json!({"data": {"applications": [{"jobId": "b", "status": "pending"}]}})),
    );
}

#[tokio::test]
async fn test_job_board_merges_for_students() {
    let api = MockApi::start().await;
    route_job_board(&api);

    let (client, _) = api.client();
    client
        .session()
        .set_auth_data("tok", "student", None, None)
        .expect("session");

    let listings = JobBoard::new(client).load().await.expect("load");
    let flags: Vec<_> = listings
        .iter()
        .map(|l| (l.job.id.as_str(), l.bookmarked, l.applied))
        .collect();
    assert_eq!(
        flags,
        vec![("a", true, false), ("b", false, true), ("c", false, false)]
    );
    assert_eq!(listings[0].job.company.as_deref(), Some("Acme"));

    assert_eq!(api.requests_to("/bookmarks").len(), 1);
    assert_eq!(api.requests_to("/applications").len(), 1);
}

#[tokio::test]
async fn test_job_board_plain_for_recruiters() {
    let api = MockApi::start().await;
    route_job_board(&api);

    let (client, _) = api.client();
    client
        .session()
        .set_auth_data("tok", "recruiter", None, None)
        .expect("session");

    let listings = JobBoard::new(client).load().await.expect("load");
    assert_eq!(listings.len(), 3);
    assert!(listings.iter().all(|l| !l.bookmarked && !l.applied));

    assert!(api.requests_to("/bookmarks").is_empty());
    assert!(api.requests_to("/applications").is_empty());
}

#[tokio::test]
async fn test_job_board_fails_when_any_fetch_fails() {
    let api = MockApi::start().await;
    route_job_board(&api);
    api.route(&Method::GET, "/bookmarks", Canned::empty(StatusCode::BAD_GATEWAY));

    let (client, _) = api.client();
    client
        .session()
        .set_auth_data("tok", "student", None, None)
        .expect("session");

    let err = JobBoard::new(client).load().await.expect_err("502");
    assert!(matches!(err, ServiceError::Api(ApiError::Server(_))));
}

#[tokio::test]
async fn test_job_board_rejects_unknown_shape() {
    let api = MockApi::start().await;
    api.route(&Method::GET, "/jobs", Canned::ok(json!({"results": []})));

    let (client, _) = api.client();
    let err = JobBoard::new(client).load().await.expect_err("shape");
    assert!(matches!(err, ServiceError::Envelope(_)));
}

#[tokio::test]
async fn test_toggle_bookmark() {
    let api = MockApi::start().await;
    api.route(&Method::POST, "/bookmarks/a", Canned::json(StatusCode::CREATED, json!({})));
    api.route(&Method::DELETE, "/bookmarks/a", Canned::empty(StatusCode::NO_CONTENT));

    let (client, _) = api.client();
    let board = JobBoard::new(client);
    let job = JobId::new("a");

    assert!(board.toggle_bookmark(&job, false).await.expect("add"));
    assert!(!board.toggle_bookmark(&job, true).await.expect("remove"));

    let methods: Vec<_> = api
        .requests_to("/bookmarks/a")
        .into_iter()
        .map(|r| r.method)
        .collect();
    assert_eq!(methods, vec![Method::POST, Method::DELETE]);
}

#[tokio::test]
async fn test_job_ids_are_escaped_in_paths() {
    let api = MockApi::start().await;
    api.route(
        &Method::POST,
        "/bookmarks/a%2Fb%3Fc",
        Canned::json(StatusCode::CREATED, json!({})),
    );
    api.route(
        &Method::POST,
        "/applications/..%2Fadmin",
        Canned::json(StatusCode::CREATED, json!({})),
    );

    let (client, _) = api.client();
    let board = JobBoard::new(client);

    assert!(board
        .toggle_bookmark(&JobId::new("a/b?c"), false)
        .await
        .expect("bookmark"));
    board.apply(&JobId::new("../admin")).await.expect("apply");

    let bookmark = api.requests_to("/bookmarks/a%2Fb%3Fc");
    assert_eq!(bookmark.len(), 1);
    assert!(bookmark[0].query.is_none());
    assert_eq!(api.requests_to("/applications/..%2Fadmin").len(), 1);
}

#[tokio::test]
async fn test_apply_cooldown() {
    let api = MockApi::start().await;
    api.route(
        &Method::POST,
        "/applications/j1",
        Canned::json(StatusCode::TOO_MANY_REQUESTS, json!({"message": "slow down"}))
            .with_header("retry-after", "60"),
    );

    let (session, clock) = manual_session();
    let (client, _) = api.client_with(session, None);
    client
        .session()
        .set_auth_data("tok", "student", None, None)
        .expect("session");
    let board = JobBoard::new(client.clone());
    let job = JobId::new("j1");

    let err = board.apply(&job).await.expect_err("429");
    assert!(matches!(err, ServiceError::Api(ApiError::RateLimited { .. })));
    let status = client
        .session()
        .rate_limit_data(APPLICATIONS_ENDPOINT)
        .expect("cooldown");
    assert_eq!(status.remaining_time, 60);

    let err = board.apply(&job).await.expect_err("cooling down");
    assert!(matches!(err, ServiceError::CoolingDown { .. }));
    assert_eq!(api.requests_to("/applications/j1").len(), 1);

    clock.advance(Duration::from_secs(61));
    api.route(
        &Method::POST,
        "/applications/j1",
        Canned::json(StatusCode::CREATED, json!({"data": {"_id": "app1", "status": "pending"}})),
    );
    let application = board.apply(&job).await.expect("apply");
    assert_eq!(application, json!({"_id": "app1", "status": "pending"}));
    assert!(client.session().rate_limit_data(APPLICATIONS_ENDPOINT).is_none());
}

// =============================================================================
// Notifications
// =============================================================================

#[tokio::test]
async fn test_notification_feed_filters_and_paginates() {
    let api = MockApi::start().await;
    api.route(
        &Method::GET,
        "/notifications",
        Canned::ok(json!({
            "data": {
                "notifications": [
                    {"_id": "n1", "message": "Application viewed", "read": false},
                    {"_id": "n2", "message": "Interview scheduled", "read": true},
                    {"_id": "n3", "message": "New job posted", "read": false},
                    {"_id": "n4", "message": "Offer received", "isRead": false},
                    {"_id": "n5", "message": "Profile incomplete", "read": true}
                ]
            }
        })),
    );

    let (client, _) = api.client();
    let feed = NotificationFeed::new(client).with_per_page(2);

    let page = feed.page(NotificationFilter::Unread, 2).await.expect("page");
    assert_eq!(page.total, 3);
    assert_eq!(page.total_pages, 2);
    let ids: Vec<_> = page.items.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["n4"]);

    let page = feed.page(NotificationFilter::Read, 7).await.expect("page");
    assert_eq!(page.page, 1);
    assert_eq!(page.items.len(), 2);

    let page = feed.page(NotificationFilter::All, 3).await.expect("page");
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.items.len(), 1);
}

#[tokio::test]
async fn test_mark_notification_read() {
    let api = MockApi::start().await;
    api.route(
        &Method::PATCH,
        "/notifications/n1/read",
        Canned::ok(json!({"data": {"_id": "n1", "read": true}})),
    );

    let (client, _) = api.client();
    NotificationFeed::new(client)
        .mark_read(&NotificationId::new("n1"))
        .await
        .expect("mark read");

    assert_eq!(api.requests_to("/notifications/n1/read").len(), 1);
}

#[tokio::test]
async fn test_notification_id_is_escaped_in_path() {
    let api = MockApi::start().await;
    api.route(
        &Method::PATCH,
        "/notifications/n%201%2Fx/read",
        Canned::ok(json!({"data": {"_id": "n 1/x", "read": true}})),
    );

    let (client, _) = api.client();
    NotificationFeed::new(client)
        .mark_read(&NotificationId::new("n 1/x"))
        .await
        .expect("mark read");

    assert_eq!(api.requests_to("/notifications/n%201%2Fx/read").len(), 1);
}
