//! Integration tests for the API client against a mock backend
//!
//! **Coverage:**
//! - In-flight de-duplication and eviction after completion
//! - Transport-failure retry with linear back-off, no retry on HTTP errors
//! - Error normalization with status and backend payload
//! - Login flow: token persisted, profile fetched, bearer header attached
//! - Caller cancellation

#![allow(dead_code)]

mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use coursehub_core::{CredentialStore, RecoveryAction};
use coursehub_domain::{
    ApiError, Course, CourseDraft, CourseUpdate, Credentials, CurrentUser, RecommendationQuery,
    Role, UploadFile, UserProfile,
};
use coursehub_infra::MemoryStorage;
use serde_json::{json, Value};
use support::{course_json, TestClient};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_courses(server: &MockServer, delay: Duration, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/courses"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([course_json(1, "Rust"), course_json(2, "SQL")]))
                .set_delay(delay),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

// ============================================================================
// De-duplication
// ============================================================================

#[tokio::test]
async fn concurrent_identical_requests_share_one_call() {
    let server = MockServer::start().await;
    mount_courses(&server, Duration::from_millis(100), 1).await;
    let client = TestClient::new(&server.uri());

    let (a, b, c) = tokio::join!(
        client.api.get_all::<Course>("courses", None),
        client.api.get_all::<Course>("courses", None),
        client.api.get_all::<Course>("courses", None),
    );

    let a = a.unwrap();
    assert_eq!(a.len(), 2);
    assert_eq!(a, b.unwrap());
    assert_eq!(a, c.unwrap());
    assert!(client.api.in_flight().is_empty());
}

#[tokio::test]
async fn completed_request_is_issued_again() {
    let server = MockServer::start().await;
    mount_courses(&server, Duration::ZERO, 2).await;
    let client = TestClient::new(&server.uri());

    client.api.get_all::<Course>("courses", None).await.unwrap();
    client.api.get_all::<Course>("courses", None).await.unwrap();
}

#[tokio::test]
async fn concurrent_failures_are_shared() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/courses/99"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"detail": "Not Found"}))
                .set_delay(Duration::from_millis(50)),
        )
        .expect(1)
        .mount(&server)
        .await;
    let client = TestClient::new(&server.uri());

    let (a, b) = tokio::join!(
        client.api.get_by_id::<Course, _>("courses", 99),
        client.api.get_by_id::<Course, _>("courses", 99),
    );

    assert_eq!(a.unwrap_err(), b.unwrap_err());
    assert!(client.api.in_flight().is_empty());
}

#[tokio::test]
async fn different_urls_are_not_merged() {
    let server = MockServer::start().await;
    for id in [1, 2] {
        Mock::given(method("GET"))
            .and(path(format!("/courses/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(course_json(id, "C")))
            .expect(1)
            .mount(&server)
            .await;
    }
    let client = TestClient::new(&server.uri());

    let (a, b) = tokio::join!(
        client.api.get_by_id::<Course, _>("courses", 1),
        client.api.get_by_id::<Course, _>("courses", 2),
    );
    assert_eq!(a.unwrap().id, 1);
    assert_eq!(b.unwrap().id, 2);
}

// ============================================================================
// Retry policy
// ============================================================================

/// Accepts connections and hangs up immediately, counting attempts.
async fn hang_up_server() -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = accepted.clone();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            drop(stream);
        }
    });
    (format!("http://{addr}"), accepted)
}

#[tokio::test]
async fn transport_failures_are_retried_then_reported() {
    let (base, accepted) = hang_up_server().await;
    let client = TestClient::with_retries(&base, 3, Duration::from_millis(20));

    let started = Instant::now();
    let err = client.api.get_all::<Course>("courses", None).await.unwrap_err();

    assert_eq!(accepted.load(Ordering::SeqCst), 4, "initial attempt plus three retries");
    assert!(started.elapsed() >= Duration::from_millis(120), "20 + 40 + 60 ms of back-off");
    assert_eq!(err.status(), 0);
    assert_eq!(err.message(), "Network error after 3 retries: Failed to fetch courses");
    assert_eq!(RecoveryAction::for_error(&err), RecoveryAction::CheckConnection);
}

#[tokio::test]
async fn http_errors_are_never_retried() {
    for status in [400_u16, 401, 403, 404, 500, 503] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/courses"))
            .respond_with(ResponseTemplate::new(status))
            .expect(1)
            .mount(&server)
            .await;
        let client = TestClient::new(&server.uri());

        let err = client.api.get_all::<Course>("courses", None).await.unwrap_err();
        assert_eq!(err.status(), status);
    }
}

// ============================================================================
// Error normalization
// ============================================================================

#[tokio::test]
async fn backend_message_and_details_are_preserved() {
    let server = MockServer::start().await;
    let payload = json!({"message": "title is required", "field": "title"});
    Mock::given(method("POST"))
        .and(path("/courses"))
        .respond_with(ResponseTemplate::new(422).set_body_json(payload.clone()))
        .mount(&server)
        .await;
    let client = TestClient::new(&server.uri());

    let err = client.api.create::<_, Course>("courses", &json!({"title": ""})).await.unwrap_err();

    assert!(matches!(err, ApiError::Rejected { status: 422, .. }));
    assert_eq!(err.message(), "title is required");
    assert_eq!(err.details(), Some(&payload));
}

#[tokio::test]
async fn status_text_used_when_body_has_no_message() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/courses/3"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;
    let client = TestClient::new(&server.uri());

    let err = client.api.delete("courses", 3).await.unwrap_err();

    assert!(matches!(err, ApiError::Server { status: 500, .. }));
    assert_eq!(err.message(), "Internal Server Error");
    assert!(err.details().is_none());
}

#[tokio::test]
async fn undecodable_success_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/courses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"not": "a list"})))
        .mount(&server)
        .await;
    let client = TestClient::new(&server.uri());

    let err = client.api.get_all::<Course>("courses", None).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidResponse { status: 200, .. }));
}

#[tokio::test]
async fn unauthorized_profile_lookup_redirects_to_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Unauthorized"})))
        .mount(&server)
        .await;
    let storage = Arc::new(MemoryStorage::with_token("expired"));
    let client =
        TestClient::from_storage(&server.uri(), storage.clone(), 3, Duration::from_millis(10));
    client.session.initialize().await.unwrap();

    let err = client.api.get_by_id::<UserProfile, _>("users", "me").await.unwrap_err();
    assert_eq!(err.status(), 401);

    let action = client.session.handle_error(&err).await;
    assert_eq!(action, RecoveryAction::RedirectToLogin { path: "/login".into() });
    assert!(client.session.token().is_none());
    assert!(storage.load_token().await.unwrap().is_none());
}

// ============================================================================
// Authentication
// ============================================================================

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token/pair"))
        .and(body_json(json!({"email": "ada@example.com", "password": "secret"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "access": "tok-123",
                "refresh": "ref-456",
                "email": "ada@example.com"
            })),
        )
        .expect(1)
        .mount(server)
        .await;
}

fn credentials() -> Credentials {
    Credentials { email: "ada@example.com".into(), password: "secret".into() }
}

#[tokio::test]
async fn login_stores_token_and_authenticates_later_calls() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7, "username": "ada", "email": "ada@example.com", "role": "teacher"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/courses"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([course_json(1, "Rust")])))
        .expect(1)
        .mount(&server)
        .await;
    let client = TestClient::new(&server.uri());

    let response = client.api.login(&credentials()).await.unwrap();
    assert_eq!(response.access, "tok-123");
    assert_eq!(response.refresh.as_deref(), Some("ref-456"));

    let user = client.session.current_user().unwrap();
    assert_eq!(user.role, Role::Teacher);
    assert_eq!(user.id, Some(7));
    let stored = client.storage.load_token().await.unwrap();
    assert_eq!(stored.as_deref(), Some("tok-123"));

    let courses = client.api.get_all::<Course>("courses", None).await.unwrap();
    assert_eq!(courses.len(), 1);
}

#[tokio::test]
async fn login_falls_back_to_student_when_profile_fails() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let client = TestClient::new(&server.uri());

    client.api.login(&credentials()).await.unwrap();

    assert_eq!(client.session.current_user(), Some(CurrentUser::fallback_student()));
    assert!(client.session.is_authenticated());
}

#[tokio::test]
async fn login_with_empty_role_is_guest() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1, "username": "x", "email": "x@y", "role": ""
        })))
        .mount(&server)
        .await;
    let client = TestClient::new(&server.uri());

    client.api.login(&credentials()).await.unwrap();
    assert_eq!(client.session.current_user().map(|u| u.role), Some(Role::Guest));
}

#[tokio::test]
async fn login_with_null_role_is_guest() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1, "username": "x", "email": "x@y", "role": null
        })))
        .mount(&server)
        .await;
    let client = TestClient::new(&server.uri());

    client.api.login(&credentials()).await.unwrap();
    assert_eq!(client.session.current_user().map(|u| u.role), Some(Role::Guest));
}

#[tokio::test]
async fn rejected_login_stores_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token/pair"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid credentials"})),
        )
        .mount(&server)
        .await;
    let client = TestClient::new(&server.uri());

    let err = client.api.login(&credentials()).await.unwrap_err();

    assert_eq!(err.message(), "Invalid credentials");
    assert!(!client.session.is_authenticated());
    assert!(client.session.current_user().is_none());
}

#[tokio::test]
async fn logout_clears_session_even_when_server_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    let client = TestClient::from_storage(
        &server.uri(),
        Arc::new(MemoryStorage::with_token("tok")),
        3,
        Duration::from_millis(10),
    );
    client.session.initialize().await.unwrap();

    client.api.logout().await.unwrap();
    assert!(!client.session.is_authenticated());
}

#[tokio::test]
async fn logout_is_not_retried_when_offline() {
    let (base, accepted) = hang_up_server().await;
    let client = TestClient::from_storage(
        &base,
        Arc::new(MemoryStorage::with_token("tok")),
        3,
        Duration::from_millis(10),
    );
    client.session.initialize().await.unwrap();

    client.api.logout().await.unwrap();

    assert_eq!(accepted.load(Ordering::SeqCst), 1);
    assert!(!client.session.is_authenticated());
}

#[tokio::test]
async fn register_posts_role() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .and(body_json(json!({
            "username": "bob", "password": "pw", "email": "bob@example.com", "role": "student"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"message": "User created"})))
        .expect(1)
        .mount(&server)
        .await;
    let client = TestClient::new(&server.uri());

    let request = coursehub_domain::RegisterRequest {
        username: "bob".into(),
        password: "pw".into(),
        email: "bob@example.com".into(),
        role: Role::Student,
    };
    let ack: coursehub_infra::api::Acknowledgement = client.api.register(&request).await.unwrap();
    assert_eq!(ack.message.as_deref(), Some("User created"));
}

// ============================================================================
// Resource operations
// ============================================================================

#[tokio::test]
async fn create_posts_course_draft() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/courses"))
        .and(body_json(json!({
            "title": "Rust",
            "subject": "Programming",
            "level": "Beginner",
            "difficulty_score": 2.0,
            "description": "An introduction"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(course_json(1, "Rust")))
        .expect(1)
        .mount(&server)
        .await;
    let client = TestClient::new(&server.uri());

    let draft = CourseDraft {
        title: "Rust".into(),
        subject: "Programming".into(),
        level: "Beginner".into(),
        difficulty_score: 2.0,
        description: "An introduction".into(),
        price: None,
        image: None,
    };
    let course: Course = client.api.create("courses", &draft).await.unwrap();
    assert_eq!(course.id, 1);
}

#[tokio::test]
async fn update_puts_partial_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/courses/5"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"price": 49.0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(course_json(5, "Rust")))
        .expect(1)
        .mount(&server)
        .await;
    let client = TestClient::new(&server.uri());

    let update = CourseUpdate { price: Some(49.0), ..CourseUpdate::default() };
    let course: Course = client.api.update("courses", 5, &update).await.unwrap();
    assert_eq!(course.id, 5);
}

#[tokio::test]
async fn delete_accepts_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/courses/5"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let client = TestClient::new(&server.uri());

    client.api.delete("courses", 5).await.unwrap();
}

#[tokio::test]
async fn upload_sends_multipart_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/courses/5/upload-image"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"image": "/media/cover.png"})))
        .expect(1)
        .mount(&server)
        .await;
    let client = TestClient::new(&server.uri());

    let file = UploadFile::new("cover.png", b"png-bytes".to_vec()).with_content_type("image/png");
    let response: Value = client.api.upload_file("courses", 5, file, None).await.unwrap();
    assert_eq!(response["image"], "/media/cover.png");

    let requests = server.received_requests().await.unwrap();
    let request = &requests[0];
    let content_type = request.headers.get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data"));
    let body = String::from_utf8_lossy(&request.body);
    assert!(body.contains("name=\"image\""));
    assert!(body.contains("filename=\"cover.png\""));
}

#[tokio::test]
async fn recommendations_send_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recommend"))
        .and(query_param("top_n", "5"))
        .and(query_param("subject", "Data Science"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Recommended courses",
            "courses": [course_json(3, "Pandas")]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let client = TestClient::new(&server.uri());

    let query = RecommendationQuery {
        top_n: 5,
        subject: Some("Data Science".into()),
        level: None,
    };
    let recommendation = client.api.get_recommended(&query).await.unwrap();
    assert_eq!(recommendation.courses[0].title, "Pandas");
}

#[tokio::test]
async fn dashboard_decodes_role_shape() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "admin": {
                "totalRevenue": 120.0,
                "totalEnrollments": 12,
                "activeCourses": 4,
                "monthlyProfitChange": 3.5
            }
        })))
        .mount(&server)
        .await;
    let client = TestClient::new(&server.uri());

    let dashboard = client.api.get_dashboard().await.unwrap();
    let admin = dashboard.admin.unwrap();
    assert_eq!(admin.total_enrollments, 12);
    assert!(dashboard.student.is_none());
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn cancelling_list_fetch_aborts_without_retry() {
    let server = MockServer::start().await;
    mount_courses(&server, Duration::from_secs(2), 1).await;
    let client = TestClient::new(&server.uri());
    let token = CancellationToken::new();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let started = Instant::now();
    let err = client.api.get_all::<Course>("courses", Some(&token)).await.unwrap_err();

    assert_eq!(err, ApiError::Aborted);
    assert_eq!(err.status(), 0);
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(RecoveryAction::for_error(&err), RecoveryAction::Ignore);
    assert!(client.api.in_flight().is_empty());
}

#[tokio::test]
async fn cancelled_token_short_circuits() {
    let server = MockServer::start().await;
    mount_courses(&server, Duration::ZERO, 0).await;
    let client = TestClient::new(&server.uri());
    let token = CancellationToken::new();
    token.cancel();

    let err = client.api.get_all::<Course>("courses", Some(&token)).await.unwrap_err();
    assert_eq!(err, ApiError::Aborted);
}

#[tokio::test]
async fn cancelling_during_back_off_stops_retries() {
    let (base, accepted) = hang_up_server().await;
    let client = TestClient::with_retries(&base, 3, Duration::from_millis(200));
    let token = CancellationToken::new();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let err = client.api.get_all::<Course>("courses", Some(&token)).await.unwrap_err();
    assert_eq!(err, ApiError::Aborted);

    // past the first two retry points (200 ms, then 400 ms more)
    tokio::time::sleep(Duration::from_millis(700)).await;
    assert_eq!(accepted.load(Ordering::SeqCst), 1, "no attempt after the abort");
    assert!(client.api.in_flight().is_empty());
}

#[tokio::test]
async fn one_waiter_cancelling_leaves_the_other_served() {
    let server = MockServer::start().await;
    mount_courses(&server, Duration::from_millis(200), 1).await;
    let client = TestClient::new(&server.uri());
    let token = CancellationToken::new();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let (cancelled, served) = tokio::join!(
        client.api.get_all::<Course>("courses", Some(&token)),
        client.api.get_all::<Course>("courses", None),
    );

    assert_eq!(cancelled.unwrap_err(), ApiError::Aborted);
    let courses = served.expect("remaining waiter gets the shared response");
    assert_eq!(courses.len(), 2);
    assert!(client.api.in_flight().is_empty());
}
