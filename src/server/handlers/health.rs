use crate::GIT_COMMIT_HASH;
use axum::{
    extract::Extension,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use sqlx::{Connection, PgPool};
use tracing::{debug, error, info_span, Instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
    database: String,
}

#[utoipa::path(
    get,
    path= "/health",
    responses (
        (status = 200, description = "Database is reachable", body = [Health]),
        (status = 503, description = "Database is unreachable", body = [Health])
    ),
    tag= "health"
)]
pub async fn health(pool: Extension<PgPool>) -> impl IntoResponse {
    let span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
    let database_ok = async {
        match pool.0.acquire().await {
            Ok(mut conn) => match conn.ping().await {
                Ok(()) => true,
                Err(e) => {
                    error!("Failed to ping database: {e}");
                    false
                }
            },
            Err(e) => {
                error!("Failed to acquire database connection: {e}");
                false
            }
        }
    }
    .instrument(span)
    .await;

    let health = Health {
        commit: GIT_COMMIT_HASH.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if database_ok { "ok" } else { "error" }.to_string(),
    };

    let short_hash = health
        .commit
        .get(0..7)
        .filter(|_| health.commit.len() > 7)
        .unwrap_or("");

    let mut headers = HeaderMap::new();
    match format!("{}:{}:{}", health.name, health.version, short_hash).parse::<HeaderValue>() {
        Ok(value) => {
            headers.insert("X-App", value);
        }
        Err(e) => error!("Failed to parse X-App header: {e}"),
    }

    debug!("Database healthy: {database_ok}");

    let status = if database_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, headers, Json(health))
}
