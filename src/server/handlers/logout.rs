use crate::server::{outcome::Outcome, session::SessionManager};
use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{error, instrument};

const LOGGED_OUT: Outcome = Outcome::success("You have been logged out.", "/signin");

#[utoipa::path(
    post,
    path= "/logout",
    responses (
        (status = 200, description = "Session destroyed; alert and redirect page", content_type = "text/html"),
    ),
    tag= "account"
)]
#[instrument(skip(headers, sessions))]
pub async fn logout(headers: HeaderMap, sessions: Extension<Arc<SessionManager>>) -> Response {
    if let Err(e) = sessions.end(&headers).await {
        error!("Error destroying session: {e:#}");
    }

    // always clear the cookie, even when no session was found
    let mut response = LOGGED_OUT.into_response();
    match sessions.clear_cookie() {
        Ok(cookie) => {
            response.headers_mut().insert(SET_COOKIE, cookie);
        }
        Err(e) => error!("Error building session cookie: {e:#}"),
    }
    response
}
