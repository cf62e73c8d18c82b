use crate::server::{
    handlers::all_present,
    outcome::Outcome,
    password,
    session::SessionManager,
    storage::{find_user_by_email, insert_user, is_unique_violation},
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

const MISSING_FIELDS: Outcome = Outcome::failure("All fields are required.", "/signup");
const EMAIL_TAKEN: Outcome = Outcome::failure("Email already exists, try logging in.", "/signup");
const SERVER_ERROR: Outcome = Outcome::failure("Server error during registration.", "/signup");
const REGISTERED: Outcome = Outcome::success("Registration successful!", "/dashboard");

#[derive(ToSchema, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[utoipa::path(
    post,
    path= "/signup",
    request_body(content = SignupForm, content_type = "application/x-www-form-urlencoded"),
    responses (
        (status = 200, description = "Alert and redirect page; sets the session cookie on success", content_type = "text/html"),
    ),
    tag= "account"
)]
#[instrument(skip(pool, sessions, payload))]
pub async fn signup(
    pool: Extension<PgPool>,
    sessions: Extension<Arc<SessionManager>>,
    payload: Option<Form<SignupForm>>,
) -> Response {
    let Some(Form(form)) = payload else {
        return MISSING_FIELDS.into_response();
    };

    if !all_present(&[&form.name, &form.email, &form.password]) {
        return MISSING_FIELDS.into_response();
    }

    match find_user_by_email(&pool, &form.email).await {
        Ok(Some(_)) => {
            debug!("Email already registered");
            return EMAIL_TAKEN.into_response();
        }
        Ok(None) => (),
        Err(e) => {
            error!("Error checking if user exists: {e:#}");
            return SERVER_ERROR.into_response();
        }
    }

    let password_hash = match password::hash_blocking(form.password).await {
        Ok(hash) => hash,
        Err(e) => {
            error!("Error hashing password: {e:#}");
            return SERVER_ERROR.into_response();
        }
    };

    // the unique index on users.email settles concurrent signups
    let user = match insert_user(&pool, &form.name, &form.email, &password_hash).await {
        Ok(user) => user,
        Err(e) if is_unique_violation(&e) => {
            debug!("Email registered concurrently");
            return EMAIL_TAKEN.into_response();
        }
        Err(e) => {
            error!("Error inserting user: {e:#}");
            return SERVER_ERROR.into_response();
        }
    };

    match sessions.start(&user).await {
        Ok(cookie) => {
            info!(user_id = %user.id, "User registered");
            ([(SET_COOKIE, cookie)], REGISTERED).into_response()
        }
        Err(e) => {
            error!("Error starting session: {e:#}");
            SERVER_ERROR.into_response()
        }
    }
}
