#![allow(clippy::unwrap_used)]

use super::signin::INVALID_CREDENTIALS;
use crate::server::{
    router,
    session::{MemorySessionStore, SessionManager, SESSION_COOKIE_NAME},
    storage::User,
    views::{Page, Views},
};
use axum::{
    body::{to_bytes, Body},
    http::{
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
        Request, StatusCode,
    },
    response::Response,
    Router,
};
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tower::ServiceExt;
use uuid::Uuid;

const FORM: &str = "application/x-www-form-urlencoded";

// nothing listens on port 1, so any query fails fast
fn app(store: Arc<MemorySessionStore>) -> Router {
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(200))
        .connect_lazy("postgres://gatehouse@127.0.0.1:1/gatehouse")
        .unwrap();
    let sessions = SessionManager::new(store, SecretString::from("test-secret"), Duration::from_secs(60));
    let views = Views::new(concat!(env!("CARGO_MANIFEST_DIR"), "/views"));
    router(pool, Arc::new(sessions), Arc::new(views))
}

fn post_form(uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, FORM)
        .body(Body::from(body))
        .unwrap()
}

async fn body_string(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn static_pages_are_served() {
    let app = app(Arc::new(MemorySessionStore::new()));
    for page in Page::STATIC {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(page.path()).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "GET {}", page.path());
        assert!(response.headers().contains_key("x-request-id"));
    }
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let response = app(Arc::new(MemorySessionStore::new()))
        .oneshot(Request::builder().uri("/admin").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn dashboard_without_session_redirects_to_signin() {
    let response = app(Arc::new(MemorySessionStore::new()))
        .oneshot(Request::builder().uri("/dashboard").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers().get(LOCATION).unwrap(), "/signin");
}

#[tokio::test]
async fn dashboard_with_unreachable_database_redirects_to_signin() {
    let store = Arc::new(MemorySessionStore::new());
    let sessions = SessionManager::new(
        store.clone(),
        SecretString::from("test-secret"),
        Duration::from_secs(60),
    );
    let cookie = sessions
        .start(&User {
            id: Uuid::new_v4(),
            name: "A".to_string(),
            email: "a@x.com".to_string(),
            password: "$2b$10$digest".to_string(),
        })
        .await
        .unwrap();
    let pair = cookie.to_str().unwrap().split(';').next().unwrap().to_string();

    let response = app(store)
        .oneshot(
            Request::builder()
                .uri("/dashboard")
                .header(COOKIE, pair)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers().get(LOCATION).unwrap(), "/signin");
}

#[tokio::test]
async fn logout_destroys_session_and_clears_cookie() {
    let store = Arc::new(MemorySessionStore::new());
    let sessions = SessionManager::new(
        store.clone(),
        SecretString::from("test-secret"),
        Duration::from_secs(60),
    );
    let cookie = sessions
        .start(&User {
            id: Uuid::new_v4(),
            name: "A".to_string(),
            email: "a@x.com".to_string(),
            password: "$2b$10$digest".to_string(),
        })
        .await
        .unwrap();
    let pair = cookie.to_str().unwrap().split(';').next().unwrap().to_string();
    assert_eq!(store.len().await, 1);

    let app = app(store.clone());
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/logout")
                .header(COOKIE, pair.clone())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(set_cookie.starts_with(&format!("{SESSION_COOKIE_NAME}=;")));
    assert!(set_cookie.contains("Max-Age=0"));
    assert!(body_string(response).await.contains("You have been logged out."));
    assert!(store.is_empty().await);

    // the old cookie no longer opens the dashboard
    let response = app
        .oneshot(
            Request::builder()
                .uri("/dashboard")
                .header(COOKIE, pair)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers().get(LOCATION).unwrap(), "/signin");
}

#[tokio::test]
async fn logout_without_session_still_succeeds() {
    let response = app(Arc::new(MemorySessionStore::new()))
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(SET_COOKIE));
}

#[tokio::test]
async fn contact_with_missing_field_is_bad_request() {
    let bodies = [
        "contactName=&contactPhone=1&contactEmail=a%40x.com&subject=s&contactMessage=m",
        "contactName=A&contactPhone=1&contactEmail=a%40x.com&subject=s",
        "contactName=A&contactPhone=1&contactEmail=a%40x.com&subject=&contactMessage=m",
    ];
    let app = app(Arc::new(MemorySessionStore::new()));
    for body in bodies {
        let response = app.clone().oneshot(post_form("/contact", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        assert!(body_string(response).await.contains("All fields are required."));
    }
}

#[tokio::test]
async fn contact_with_database_down_is_server_error() {
    let response = app(Arc::new(MemorySessionStore::new()))
        .oneshot(post_form(
            "/contact",
            "contactName=A&contactPhone=1&contactEmail=a%40x.com&subject=s&contactMessage=m",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_string(response)
        .await
        .contains("Failed to send your message. Please try again later."));
}

#[tokio::test]
async fn newsletter_without_email_asks_for_one() {
    let app = app(Arc::new(MemorySessionStore::new()));
    for body in ["email=", ""] {
        let response = app.clone().oneshot(post_form("/newsletter", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("Please provide a valid email."));
        assert!(html.contains(r#"window.location.href = "/";"#));
    }
}

#[tokio::test]
async fn signin_with_missing_fields_matches_invalid_credentials() {
    let app = app(Arc::new(MemorySessionStore::new()));
    for body in ["email=a%40x.com", "password=p1", "email=&password="] {
        let response = app.clone().oneshot(post_form("/signin", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(!response.headers().contains_key(SET_COOKIE));
        assert_eq!(body_string(response).await, INVALID_CREDENTIALS.to_html());
    }
}

#[tokio::test]
async fn signup_and_forgot_require_every_field() {
    let app = app(Arc::new(MemorySessionStore::new()));

    let response = app
        .clone()
        .oneshot(post_form("/signup", "name=A&email=a%40x.com"))
        .await
        .unwrap();
    let html = body_string(response).await;
    assert!(html.contains("All fields are required."));
    assert!(html.contains(r#"window.location.href = "/signup";"#));

    let response = app
        .oneshot(post_form("/forgotpassword", "email=a%40x.com&password="))
        .await
        .unwrap();
    let html = body_string(response).await;
    assert!(html.contains("All fields are required."));
    assert!(html.contains(r#"window.location.href = "/forgot";"#));
}

#[tokio::test]
async fn signin_with_database_down_reports_server_error() {
    let response = app(Arc::new(MemorySessionStore::new()))
        .oneshot(post_form("/signin", "email=a%40x.com&password=p1"))
        .await
        .unwrap();
    let html = body_string(response).await;
    assert!(html.contains("Server error during login."));
}

#[tokio::test]
async fn health_reports_unreachable_database() {
    let response = app(Arc::new(MemorySessionStore::new()))
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(response.headers().contains_key("X-App"));
    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["database"], "error");
    assert_eq!(json["name"], env!("CARGO_PKG_NAME"));
}
