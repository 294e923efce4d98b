//! API integration tests.
//!
//! These tests drive the router end to end against a mock database.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::redundant_clone)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    middleware,
    response::Response,
};
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use nightline_api::{AppState, auth_middleware, router as api_router};
use nightline_common::{
    config::{EventsConfig, InstanceConfig},
    hash_token,
};
use nightline_core::{EventService, SessionService, SupportService, UserService};
use nightline_db::{
    entities::{
        event::{self, EventStatus},
        session,
        user::{self, UserRole},
    },
    repositories::{EventRepository, SessionRepository, SupportRepository, UserRepository},
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

const TOKEN: &str = "test-session-token";

/// Create test app state over the given database.
fn create_test_state(db: DatabaseConnection) -> AppState {
    let db = Arc::new(db);

    let user_repo = UserRepository::new(Arc::clone(&db));
    let session_repo = SessionRepository::new(Arc::clone(&db));
    let event_repo = EventRepository::new(Arc::clone(&db));
    let support_repo = SupportRepository::new(Arc::clone(&db));

    let user_service = UserService::new(user_repo.clone());
    let session_service =
        SessionService::new(session_repo, user_repo.clone(), user_service.clone(), 24);
    let event_service = EventService::new(event_repo, user_repo.clone(), &EventsConfig::default());
    let support_service = SupportService::new(support_repo, user_repo);

    AppState {
        user_service,
        session_service,
        event_service,
        support_service,
        instance: InstanceConfig {
            name: "Test Nightline".to_string(),
            contact_email: Some("help@example.com".to_string()),
        },
    }
}

/// Create the test router with session resolution in front.
fn create_test_router(db: DatabaseConnection) -> Router {
    let state = create_test_state(db);
    api_router()
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

fn test_user(role: UserRole) -> user::Model {
    user::Model {
        id: "u1".to_string(),
        username: "night_owl".to_string(),
        email: Some("owl@example.com".to_string()),
        phone: None,
        password_hash: "$argon2id$v=19$stub".to_string(),
        role,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

fn live_session() -> session::Model {
    let now = Utc::now();
    session::Model {
        id: "s1".to_string(),
        user_id: "u1".to_string(),
        token_hash: hash_token(TOKEN),
        created_at: now.into(),
        expires_at: (now + Duration::hours(1)).into(),
    }
}

/// A database that resolves [`TOKEN`] to a user with `role`.
fn signed_in_db(role: UserRole) -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[live_session()]])
        .append_query_results([[test_user(role)]])
}

fn featured_event(id: &str, rank: i32) -> event::Model {
    event::Model {
        id: id.to_string(),
        name: format!("Night {rank}"),
        description: None,
        date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        start_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
        end_time: None,
        venue_name: "Warehouse".to_string(),
        venue_address: "1 Dock St".to_string(),
        city: "Berlin".to_string(),
        organizer_user_id: "u1".to_string(),
        submitted_by_promoter_id: None,
        ticket_button_label: "Purchase tickets".to_string(),
        ticket_url: None,
        is_published: true,
        status: EventStatus::Published,
        is_featured: true,
        featured_rank: Some(rank),
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

fn post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authed_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {TOKEN}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_meta_endpoint() {
    let app = create_test_router(empty_db());

    let response = app.oneshot(post("/meta", "{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["name"], "Test Nightline");
    assert_eq!(body["data"]["featuredLimit"], 2);
}

#[tokio::test]
async fn test_upload_is_gone() {
    let app = create_test_router(empty_db());

    let response = app.oneshot(post("/upload", "{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::GONE);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "GONE");
}

#[tokio::test]
async fn test_identity_requires_session() {
    let app = create_test_router(empty_db());

    let response = app.oneshot(post("/i", "{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_authorization_header_is_rejected() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/i")
                .method("POST")
                .header("Authorization", "Token abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_identity_with_session() {
    let app = create_test_router(signed_in_db(UserRole::Owner).into_connection());

    let response = app.oneshot(authed_post("/i", "{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["username"], "night_owl");
    assert_eq!(body["data"]["role"], "owner");
    assert_eq!(body["data"]["badge"], "owner");
    assert!(body["data"].get("passwordHash").is_none());
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_unknown_token_is_anonymous() {
    let app = create_test_router(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<session::Model>::new()])
            .into_connection(),
    );

    let response = app.oneshot(authed_post("/i", "{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signin_unknown_user_is_unauthorized() {
    let app = create_test_router(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection(),
    );

    let response = app
        .oneshot(post(
            "/signin",
            r#"{"username":"nobody","password":"wrongpassword"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signup_with_invalid_json_returns_error() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(post("/signup", "invalid json"))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_featured_events_never_exceed_cap() {
    let app = create_test_router(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[
                featured_event("e1", 1),
                featured_event("e2", 2),
                featured_event("e3", 3),
            ]])
            .into_connection(),
    );

    let response = app.oneshot(post("/events/featured", "{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let events = body["data"].as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["featuredRank"], 1);
    assert_eq!(events[0]["ticketButtonLabel"], "Purchase tickets");
}

#[tokio::test]
async fn test_create_event_requires_session() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(post("/events/create", r#"{"name":"Warehouse Night"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_user_cannot_create_events() {
    let app = create_test_router(signed_in_db(UserRole::User).into_connection());

    let response = app
        .oneshot(authed_post("/events/create", r#"{"name":"Warehouse Night"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_promoter_event_missing_fields() {
    let app = create_test_router(signed_in_db(UserRole::Promoter).into_connection());

    let response = app
        .oneshot(authed_post("/events/create", r#"{"name":"Warehouse Night"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.contains("venueName"));
    assert!(!message.contains("name,"));
}

#[tokio::test]
async fn test_promoter_cannot_list_users() {
    let app = create_test_router(signed_in_db(UserRole::Promoter).into_connection());

    let response = app
        .oneshot(authed_post("/admin/users/list", "{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_user_cannot_change_ticket_status() {
    let app = create_test_router(signed_in_db(UserRole::User).into_connection());

    let response = app
        .oneshot(authed_post(
            "/admin/support/update-status",
            r#"{"ticketId":"t1","status":"resolved"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_overlong_reply_is_rejected() {
    let app = create_test_router(signed_in_db(UserRole::User).into_connection());
    let body = serde_json::json!({ "ticketId": "t1", "message": "x".repeat(10_001) });

    let response = app
        .oneshot(authed_post("/support/reply", &body.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_admin_cannot_delete_self() {
    let app = create_test_router(
        signed_in_db(UserRole::Admin)
            .append_query_results([[test_user(UserRole::Admin)]])
            .into_connection(),
    );

    let response = app
        .oneshot(authed_post("/admin/users/delete", r#"{"userId":"u1"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent/endpoint")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
