use crate::server::{
    handlers::all_present,
    outcome::Outcome,
    password,
    storage::{find_user_by_email, update_password},
};
use axum::{
    extract::{Extension, Form},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{debug, error, info, instrument};
use utoipa::ToSchema;

const MISSING_FIELDS: Outcome = Outcome::failure("All fields are required.", "/forgot");
const EMAIL_NOT_FOUND: Outcome =
    Outcome::failure("Email not found. Please sign up first.", "/forgot");
const SERVER_ERROR: Outcome = Outcome::failure("Server error. Please try again later.", "/forgot");
const PASSWORD_UPDATED: Outcome =
    Outcome::success("Password updated successfully. Please log in.", "/signin");

#[derive(ToSchema, Deserialize)]
pub struct ForgotPasswordForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

/// Replace the password of any registered email.
///
/// Knowing the email is the only proof of identity asked for.
#[utoipa::path(
    post,
    path= "/forgotpassword",
    request_body(content = ForgotPasswordForm, content_type = "application/x-www-form-urlencoded"),
    responses (
        (status = 200, description = "Alert and redirect page", content_type = "text/html"),
    ),
    tag= "account"
)]
#[instrument(skip(pool, payload))]
pub async fn forgot_password(
    pool: Extension<PgPool>,
    payload: Option<Form<ForgotPasswordForm>>,
) -> Response {
    let Some(Form(form)) = payload else {
        return MISSING_FIELDS.into_response();
    };

    if !all_present(&[&form.email, &form.password]) {
        return MISSING_FIELDS.into_response();
    }

    match find_user_by_email(&pool, &form.email).await {
        Ok(Some(_)) => (),
        Ok(None) => {
            debug!("Password reset for unknown email");
            return EMAIL_NOT_FOUND.into_response();
        }
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

    match update_password(&pool, &form.email, &password_hash).await {
        Ok(0) => {
            debug!("User removed before password update");
            EMAIL_NOT_FOUND.into_response()
        }
        Ok(_) => {
            info!("Password updated");
            PASSWORD_UPDATED.into_response()
        }
        Err(e) => {
            error!("Error updating password: {e:#}");
            SERVER_ERROR.into_response()
        }
    }
}
