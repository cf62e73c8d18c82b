#![allow(clippy::needless_for_each)]

pub mod handlers;
pub mod outcome;
pub mod password;
pub mod session;
pub mod storage;
pub mod views;

use crate::cli::{commands::session::StoreKind, globals::GlobalArgs};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::Extension,
    http::{HeaderName, HeaderValue, Request},
    routing::{get, post},
    Router,
};
use session::{
    spawn_session_reaper, MemorySessionStore, PgSessionStore, SessionManager, SessionStore,
};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use utoipa::OpenApi;
use views::{Page, Views};

const REAPER_INTERVAL: Duration = Duration::from_secs(60 * 10);

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::signup::signup,
        handlers::signin::signin,
        handlers::logout::logout,
        handlers::forgot_password::forgot_password,
        handlers::newsletter::newsletter,
        handlers::contact::contact,
    ),
    components(
        schemas(
            handlers::health::Health,
            handlers::signup::SignupForm,
            handlers::signin::SigninForm,
            handlers::forgot_password::ForgotPasswordForm,
            handlers::newsletter::NewsletterForm,
            handlers::contact::ContactForm,
        )
    ),
    tags(
        (name = "account", description = "Registration, sign in and password reset"),
        (name = "contact", description = "Contact form"),
        (name = "newsletter", description = "Newsletter subscriptions"),
        (name = "health", description = "Liveness and database reachability"),
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub dsn: String,
    pub max_connections: u32,
    pub views_dir: PathBuf,
    pub session_ttl: Duration,
    pub session_store: StoreKind,
    pub session_cookie_secure: bool,
}

/// Connect to the database and serve until a shutdown signal arrives.
///
/// # Errors
/// Returns an error if the database is unreachable or the listener cannot bind.
pub async fn new(config: Config, globals: &GlobalArgs) -> Result<()> {
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(config.max_connections)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&config.dsn)
        .await
        .context("Failed to connect to database")?;

    let store: Arc<dyn SessionStore> = match config.session_store {
        StoreKind::Postgres => {
            let store = Arc::new(PgSessionStore::new(pool.clone()));
            spawn_session_reaper(store.clone(), REAPER_INTERVAL);
            store
        }
        StoreKind::Memory => Arc::new(MemorySessionStore::new()),
    };

    let sessions = SessionManager::new(store, globals.session_secret.clone(), config.session_ttl)
        .with_cookie_secure(config.session_cookie_secure);

    let views = Views::new(config.views_dir);

    let app = router(pool, Arc::new(sessions), Arc::new(views));

    let listener = TcpListener::bind(format!("::0:{}", config.port)).await?;

    info!("Listening on [::]:{}", config.port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gracefully shutdown");

    Ok(())
}

/// Build every route with its shared state attached.
pub fn router(pool: PgPool, sessions: Arc<SessionManager>, views: Arc<Views>) -> Router {
    let mut app = Router::new();

    for page in Page::STATIC {
        app = app.route(
            page.path(),
            get(move |Extension(views): Extension<Arc<Views>>| async move {
                handlers::show(&views, page).await
            }),
        );
    }

    app.route("/dashboard", get(handlers::dashboard))
        .route("/signup", post(handlers::signup))
        .route("/signin", post(handlers::signin))
        .route("/logout", post(handlers::logout))
        .route("/forgotpassword", post(handlers::forgot_password))
        .route("/newsletter", post(handlers::newsletter))
        .route("/contact", post(handlers::contact))
        .route("/health", get(handlers::health).options(handlers::health))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(pool))
                .layer(Extension(sessions))
                .layer(Extension(views)),
        )
}

// span
fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = request.uri().path(),
        request_id
    )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
