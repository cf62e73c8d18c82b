use crate::server::views::{Page, Views};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::error;

/// Serve `page` unchanged from the views directory.
pub async fn show(views: &Views, page: Page) -> Response {
    match views.render(page, &[]).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Error rendering {}: {e:#}", page.path());
            (StatusCode::NOT_FOUND, "Not Found").into_response()
        }
    }
}
