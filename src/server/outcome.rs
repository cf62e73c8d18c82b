//! Response intents for form submissions.
//!
//! Handlers decide what happened; [`Outcome`] turns that into the small HTML
//! document the pages expect: an `alert()` followed by a navigation.

use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutcomeKind {
    Success,
    Failure,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub kind: OutcomeKind,
    pub message: &'static str,
    pub redirect_to: &'static str,
    pub status: StatusCode,
}

impl Outcome {
    #[must_use]
    pub const fn success(message: &'static str, redirect_to: &'static str) -> Self {
        Self {
            kind: OutcomeKind::Success,
            message,
            redirect_to,
            status: StatusCode::OK,
        }
    }

    #[must_use]
    pub const fn failure(message: &'static str, redirect_to: &'static str) -> Self {
        Self {
            kind: OutcomeKind::Failure,
            message,
            redirect_to,
            status: StatusCode::OK,
        }
    }

    #[must_use]
    pub const fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Render the alert and redirect script.
    #[must_use]
    pub fn to_html(&self) -> String {
        format!(
            "<script>\n  alert({});\n  window.location.href = {};\n</script>\n",
            js_string(self.message),
            js_string(self.redirect_to)
        )
    }
}

/// Quote `value` as a JavaScript string literal that is safe inside a `<script>` element.
fn js_string(value: &str) -> String {
    let quoted = serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string());
    quoted.replace('<', "\\u003c").replace('>', "\\u003e")
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        (
            self.status,
            [(
                CONTENT_TYPE,
                HeaderValue::from_static("text/html; charset=utf-8"),
            )],
            self.to_html(),
        )
            .into_response()
    }
}
