use crate::server::{
    session::SessionManager,
    storage::find_user_by_id,
    views::{Page, Views},
};
use axum::{
    extract::Extension,
    http::{
        header::{CONTENT_TYPE, LOCATION},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{Html, IntoResponse, Response},
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, error, instrument};

fn to_signin() -> Response {
    (StatusCode::FOUND, [(LOCATION, HeaderValue::from_static("/signin"))]).into_response()
}

/// Show the signed-in user's current `id`, `name` and `email`.
///
/// The session only proves who the user is; the details are read fresh from
/// the database so renames and deletions show up immediately.
#[instrument(skip(headers, pool, sessions, views))]
pub async fn dashboard(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    sessions: Extension<Arc<SessionManager>>,
    views: Extension<Arc<Views>>,
) -> Response {
    let session_user = match sessions.current(&headers).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            debug!("No session, redirecting to signin");
            return to_signin();
        }
        Err(e) => {
            error!("Error reading session: {e:#}");
            return to_signin();
        }
    };

    let details = match find_user_by_id(&pool, session_user.id).await {
        Ok(Some(details)) => details,
        Ok(None) => {
            debug!(user_id = %session_user.id, "Session user no longer exists");
            return to_signin();
        }
        Err(e) => {
            error!("Error fetching user details: {e:#}");
            return to_signin();
        }
    };

    let id = details.id.to_string();
    match views
        .render(
            Page::Dashboard,
            &[
                ("id", id.as_str()),
                ("name", details.name.as_str()),
                ("email", details.email.as_str()),
            ],
        )
        .await
    {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Error rendering dashboard: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"))],
                "Internal Server Error",
            )
                .into_response()
        }
    }
}
