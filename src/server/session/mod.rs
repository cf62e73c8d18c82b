//! Cookie sessions backed by a pluggable server-side store.
//!
//! The browser only ever sees a random token. Stores are keyed by
//! `HMAC-SHA256(session_secret, token)`, so a leaked store cannot be replayed
//! as cookies and a cookie minted without the secret resolves to nothing.
//! A session holds the user row captured at sign in and expires a fixed
//! interval after creation.

mod memory;
mod postgres;

pub use memory::MemorySessionStore;
pub use postgres::{spawn_session_reaper, PgSessionStore};

use crate::server::storage::User;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use axum::http::{header::COOKIE, HeaderMap, HeaderValue};
use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use rand::{rngs::OsRng, RngCore};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use std::{sync::Arc, time::Duration};

pub const SESSION_COOKIE_NAME: &str = "gatehouse.sid";

type HmacSha256 = Hmac<Sha256>;

/// Store-side identifier derived from the cookie token.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionKey(Vec<u8>);

impl SessionKey {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Save `user` under `key` until `ttl` has elapsed.
    async fn set(&self, key: &SessionKey, user: &User, ttl: Duration) -> Result<()>;

    /// Fetch the user saved under `key`; expired sessions read as `None`.
    async fn get(&self, key: &SessionKey) -> Result<Option<User>>;

    /// Forget `key`. Unknown keys are not an error.
    async fn destroy(&self, key: &SessionKey) -> Result<()>;
}

pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    secret: SecretString,
    ttl: Duration,
    cookie_secure: bool,
}

impl SessionManager {
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>, secret: SecretString, ttl: Duration) -> Self {
        Self {
            store,
            secret,
            ttl,
            cookie_secure: false,
        }
    }

    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    fn key_for(&self, token: &str) -> Result<SessionKey> {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| anyhow!("invalid session secret"))?;
        mac.update(token.as_bytes());
        Ok(SessionKey(mac.finalize().into_bytes().to_vec()))
    }

    /// Open a session for `user` and return the `Set-Cookie` value carrying its token.
    ///
    /// # Errors
    /// Returns an error if no token can be generated or the store rejects the write.
    pub async fn start(&self, user: &User) -> Result<HeaderValue> {
        let token = generate_session_token()?;
        let key = self.key_for(&token)?;

        self.store.set(&key, user, self.ttl).await?;

        self.cookie(&token, self.ttl.as_secs())
    }

    /// Resolve the request's session cookie to the user it was opened for.
    ///
    /// # Errors
    /// Returns an error only when the store itself fails.
    pub async fn current(&self, headers: &HeaderMap) -> Result<Option<User>> {
        let Some(token) = extract_session_token(headers) else {
            return Ok(None);
        };
        let key = self.key_for(&token)?;
        self.store.get(&key).await
    }

    /// Destroy the request's session, if it carries one.
    ///
    /// # Errors
    /// Returns an error when the store fails to delete the session.
    pub async fn end(&self, headers: &HeaderMap) -> Result<()> {
        if let Some(token) = extract_session_token(headers) {
            let key = self.key_for(&token)?;
            self.store.destroy(&key).await?;
        }
        Ok(())
    }

    /// `Set-Cookie` value that removes the session cookie from the browser.
    ///
    /// # Errors
    /// Returns an error if the header value cannot be built.
    pub fn clear_cookie(&self) -> Result<HeaderValue> {
        self.cookie("", 0)
    }

    fn cookie(&self, token: &str, max_age: u64) -> Result<HeaderValue> {
        let mut cookie = format!(
            "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}"
        );
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie).context("failed to build session cookie")
    }
}

/// Create a new session token for the cookie.
fn generate_session_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate session token")?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let (Some(key), Some(val)) = (parts.next(), parts.next()) else {
                continue;
            };
            let val = val.trim();
            if key.trim() == SESSION_COOKIE_NAME && !val.is_empty() {
                return Some(val.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "A".to_string(),
            email: "a@x.com".to_string(),
            password: "$2b$10$digest".to_string(),
        }
    }

    fn manager(store: Arc<MemorySessionStore>, secret: &str) -> SessionManager {
        SessionManager::new(store, SecretString::from(secret), Duration::from_secs(3600))
    }

    fn request_headers(set_cookie: &HeaderValue) -> HeaderMap {
        let pair = set_cookie
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string();
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(&pair).unwrap());
        headers
    }

    #[test]
    fn session_tokens_are_unique() {
        let first = generate_session_token().unwrap();
        let second = generate_session_token().unwrap();
        assert_ne!(first, second);
        assert_eq!(first.len(), 43);
    }

    #[test]
    fn extract_finds_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; gatehouse.sid=abc123; lang=en"),
        );
        assert_eq!(extract_session_token(&headers), Some("abc123".to_string()));
    }

    #[test]
    fn extract_ignores_empty_and_missing() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_session_token(&headers), None);
        headers.insert(COOKIE, HeaderValue::from_static("gatehouse.sid="));
        assert_eq!(extract_session_token(&headers), None);
    }

    #[tokio::test]
    async fn start_then_current_returns_user() {
        let store = Arc::new(MemorySessionStore::new());
        let sessions = manager(store, "secret");
        let user = user();

        let cookie = sessions.start(&user).await.unwrap();
        let cookie_str = cookie.to_str().unwrap();
        assert!(cookie_str.starts_with("gatehouse.sid="));
        assert!(cookie_str.contains("HttpOnly"));
        assert!(cookie_str.contains("Max-Age=3600"));
        assert!(!cookie_str.contains("Secure"));

        let current = sessions.current(&request_headers(&cookie)).await.unwrap();
        assert_eq!(current, Some(user));
    }

    #[tokio::test]
    async fn end_destroys_session() {
        let store = Arc::new(MemorySessionStore::new());
        let sessions = manager(store, "secret");

        let cookie = sessions.start(&user()).await.unwrap();
        let headers = request_headers(&cookie);
        sessions.end(&headers).await.unwrap();

        assert_eq!(sessions.current(&headers).await.unwrap(), None);
        // a second logout is harmless
        sessions.end(&headers).await.unwrap();
        sessions.end(&HeaderMap::new()).await.unwrap();
    }

    #[tokio::test]
    async fn token_from_other_secret_is_rejected() {
        let store = Arc::new(MemorySessionStore::new());
        let issuer = manager(store.clone(), "secret-one");
        let other = manager(store, "secret-two");

        let cookie = issuer.start(&user()).await.unwrap();
        assert_eq!(other.current(&request_headers(&cookie)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn raw_token_is_not_the_store_key() {
        let store = Arc::new(MemorySessionStore::new());
        let sessions = manager(store.clone(), "secret");

        let cookie = sessions.start(&user()).await.unwrap();
        let headers = request_headers(&cookie);
        let token = extract_session_token(&headers).unwrap();

        let raw_key = SessionKey(token.as_bytes().to_vec());
        assert_eq!(store.get(&raw_key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_session_reads_as_anonymous() {
        let store = Arc::new(MemorySessionStore::new());
        let sessions =
            SessionManager::new(store, SecretString::from("secret"), Duration::from_millis(20));

        let cookie = sessions.start(&user()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(sessions.current(&request_headers(&cookie)).await.unwrap(), None);
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let sessions = manager(Arc::new(MemorySessionStore::new()), "secret").with_cookie_secure(true);
        let cookie = sessions.clear_cookie().unwrap();
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with("gatehouse.sid=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.ends_with("; Secure"));
    }
}
