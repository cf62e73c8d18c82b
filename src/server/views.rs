//! HTML pages served from the views directory.

use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    Index,
    Signin,
    Signup,
    Forgot,
    PrivacyPolicy,
    TermsPolicy,
    Contact,
    Chat,
    Team,
    Help,
    ProfileDetails,
    Dashboard,
}

impl Page {
    /// Pages served as-is on `GET`.
    pub const STATIC: [Self; 11] = [
        Self::Index,
        Self::Signin,
        Self::Signup,
        Self::Forgot,
        Self::PrivacyPolicy,
        Self::TermsPolicy,
        Self::Contact,
        Self::Chat,
        Self::Team,
        Self::Help,
        Self::ProfileDetails,
    ];

    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Index => "/",
            Self::Signin => "/signin",
            Self::Signup => "/signup",
            Self::Forgot => "/forgot",
            Self::PrivacyPolicy => "/privacy-policy",
            Self::TermsPolicy => "/terms-policy",
            Self::Contact => "/contact",
            Self::Chat => "/chat",
            Self::Team => "/team",
            Self::Help => "/help",
            Self::ProfileDetails => "/profile-details",
            Self::Dashboard => "/dashboard",
        }
    }

    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Index => "index.html",
            Self::Signin => "signin.html",
            Self::Signup => "signup.html",
            Self::Forgot => "forgot-password.html",
            Self::PrivacyPolicy => "privacy-policy.html",
            Self::TermsPolicy => "terms-policy.html",
            Self::Contact => "contact.html",
            Self::Chat => "chat.html",
            Self::Team => "team.html",
            Self::Help => "help.html",
            Self::ProfileDetails => "profile-details.html",
            Self::Dashboard => "dashboard.html",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Views {
    dir: PathBuf,
}

impl Views {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Read `page` and replace each `{{key}}` from `context` with its HTML-escaped value.
    ///
    /// # Errors
    /// Returns an error if the page file cannot be read.
    pub async fn render(&self, page: Page, context: &[(&str, &str)]) -> Result<String> {
        let path = self.dir.join(page.file_name());
        let template = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read view {}", path.display()))?;

        Ok(fill(&template, context))
    }
}

/// Replace `{{key}}` placeholders in a single left-to-right pass.
///
/// Substituted values are never scanned again, so a value that itself looks
/// like a placeholder is shown as written. Unknown keys are left in place.
fn fill(template: &str, context: &[(&str, &str)]) -> String {
    let mut html = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        html.push_str(&rest[..open]);
        let after = &rest[open + 2..];

        let value = after.find("}}").and_then(|close| {
            let key = &after[..close];
            context
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (close, *value))
        });

        match value {
            Some((close, value)) => {
                html.push_str(&escape_html(value));
                rest = &after[close + 2..];
            }
            None => {
                html.push_str("{{");
                rest = after;
            }
        }
    }

    html.push_str(rest);
    html
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
