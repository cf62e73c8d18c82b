//! # Gatehouse
//!
//! `gatehouse` is a server-rendered web backend for account registration,
//! sign in, password reset, a contact form and a newsletter signup, backed
//! by PostgreSQL.
//!
//! ## Sessions
//!
//! Signing in (or signing up) issues an opaque random token in an `HttpOnly`
//! cookie. The server keeps only an HMAC of the token, keyed with the session
//! secret, next to a snapshot of the user row. Sessions expire a fixed time
//! after creation and are not extended by activity.
//!
//! ## Responses
//!
//! Form submissions answer with a small HTML document that shows an alert
//! and navigates the browser, mirroring the pages the site ships with.
//! Handlers build an [`server::outcome::Outcome`] and the boundary renders it.
//!
//! ## Known gaps
//!
//! The password reset flow trusts whoever knows an email address; there is
//! no reset token. Uniqueness of `users.email` is enforced by the schema, not
//! by the signup handler.

pub mod cli;
pub mod server;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
