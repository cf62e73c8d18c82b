use crate::server::{
    handlers::all_present, outcome::Outcome, password, session::SessionManager,
    storage::find_user_by_email,
};
use axum::{
    extract::{Extension, Form},
    http::header::SET_COOKIE,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use utoipa::ToSchema;

/// Shared by unknown email, wrong password and missing fields.
pub(crate) const INVALID_CREDENTIALS: Outcome =
    Outcome::failure("Invalid email or password.", "/signin");
const SERVER_ERROR: Outcome = Outcome::failure("Server error during login.", "/signin");
const SIGNED_IN: Outcome = Outcome::success("Login successful!", "/dashboard");

#[derive(ToSchema, Deserialize)]
pub struct SigninForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[utoipa::path(
    post,
    path= "/signin",
    request_body(content = SigninForm, content_type = "application/x-www-form-urlencoded"),
    responses (
        (status = 200, description = "Alert and redirect page; sets the session cookie on success", content_type = "text/html"),
    ),
    tag= "account"
)]
#[instrument(skip(pool, sessions, payload))]
pub async fn signin(
    pool: Extension<PgPool>,
    sessions: Extension<Arc<SessionManager>>,
    payload: Option<Form<SigninForm>>,
) -> Response {
    let Some(Form(form)) = payload else {
        return INVALID_CREDENTIALS.into_response();
    };

    if !all_present(&[&form.email, &form.password]) {
        return INVALID_CREDENTIALS.into_response();
    }

    let user = match find_user_by_email(&pool, &form.email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            debug!("Unknown email");
            return INVALID_CREDENTIALS.into_response();
        }
        Err(e) => {
            error!("Error getting user from database: {e:#}");
            return SERVER_ERROR.into_response();
        }
    };

    if !password::verify_blocking(form.password, user.password.clone()).await {
        debug!(user_id = %user.id, "Wrong password");
        return INVALID_CREDENTIALS.into_response();
    }

    match sessions.start(&user).await {
        Ok(cookie) => {
            info!(user_id = %user.id, "User signed in");
            ([(SET_COOKIE, cookie)], SIGNED_IN).into_response()
        }
        Err(e) => {
            error!("Error starting session: {e:#}");
            SERVER_ERROR.into_response()
        }
    }
}
