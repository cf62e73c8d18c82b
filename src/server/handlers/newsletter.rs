use crate::server::{outcome::Outcome, storage::insert_subscription};
use axum::{
    extract::{Extension, Form},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{error, instrument};
use utoipa::ToSchema;

const MISSING_EMAIL: Outcome = Outcome::failure("Please provide a valid email.", "/");
const SUBSCRIBE_FAILED: Outcome =
    Outcome::failure("Failed to subscribe. Please try again later.", "/");
const SUBSCRIBED: Outcome = Outcome::success("Thanks for subscribing!", "/");

#[derive(ToSchema, Deserialize)]
pub struct NewsletterForm {
    #[serde(default)]
    email: String,
}

#[utoipa::path(
    post,
    path= "/newsletter",
    request_body(content = NewsletterForm, content_type = "application/x-www-form-urlencoded"),
    responses (
        (status = 200, description = "Alert and redirect page", content_type = "text/html"),
    ),
    tag= "newsletter"
)]
#[instrument(skip(pool, payload))]
pub async fn newsletter(pool: Extension<PgPool>, payload: Option<Form<NewsletterForm>>) -> Response {
    let email = match payload {
        Some(Form(form)) if !form.email.is_empty() => form.email,
        _ => return MISSING_EMAIL.into_response(),
    };

    match insert_subscription(&pool, &email).await {
        Ok(()) => SUBSCRIBED.into_response(),
        Err(e) => {
            error!("Error inserting subscription: {e:#}");
            SUBSCRIBE_FAILED.into_response()
        }
    }
}
