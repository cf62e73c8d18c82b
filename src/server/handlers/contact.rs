use crate::server::{
    handlers::all_present,
    outcome::Outcome,
    storage::{insert_contact_message, ContactMessage},
};
use axum::{
    extract::{Extension, Form},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{error, instrument};
use utoipa::ToSchema;

const MISSING_FIELDS: Outcome =
    Outcome::failure("All fields are required.", "/contact").with_status(StatusCode::BAD_REQUEST);
const SEND_FAILED: Outcome =
    Outcome::failure("Failed to send your message. Please try again later.", "/contact")
        .with_status(StatusCode::INTERNAL_SERVER_ERROR);
const SENT: Outcome = Outcome::success("Your message has been sent successfully!", "/contact");

#[derive(ToSchema, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    #[serde(default)]
    contact_name: String,
    #[serde(default)]
    contact_phone: String,
    #[serde(default)]
    contact_email: String,
    #[serde(default)]
    subject: String,
    #[serde(default)]
    contact_message: String,
}

#[utoipa::path(
    post,
    path= "/contact",
    request_body(content = ContactForm, content_type = "application/x-www-form-urlencoded"),
    responses (
        (status = 200, description = "Message stored; alert and redirect page", content_type = "text/html"),
        (status = 400, description = "A field is missing", content_type = "text/html"),
        (status = 500, description = "Message could not be stored", content_type = "text/html"),
    ),
    tag= "contact"
)]
#[instrument(skip(pool, payload))]
pub async fn contact(pool: Extension<PgPool>, payload: Option<Form<ContactForm>>) -> Response {
    let Some(Form(form)) = payload else {
        return MISSING_FIELDS.into_response();
    };

    if !all_present(&[
        &form.contact_name,
        &form.contact_phone,
        &form.contact_email,
        &form.subject,
        &form.contact_message,
    ]) {
        return MISSING_FIELDS.into_response();
    }

    let message = ContactMessage {
        name: form.contact_name,
        phone: form.contact_phone,
        email: form.contact_email,
        subject: form.subject,
        message: form.contact_message,
    };

    match insert_contact_message(&pool, &message).await {
        Ok(()) => SENT.into_response(),
        Err(e) => {
            error!("Error saving contact form data: {e:#}");
            SEND_FAILED.into_response()
        }
    }
}
