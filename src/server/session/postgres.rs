use super::{SessionKey, SessionStore};
use crate::server::storage::User;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::{sync::Arc, time::Duration};
use tokio::time::interval;
use tracing::{debug, error, info_span, Instrument};

/// Sessions kept in the `user_sessions` table.
///
/// The row carries the user snapshot taken at sign in; there is no foreign
/// key, so a session can outlive its user row.
#[derive(Clone, Debug)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Delete every expired session, returning how many were removed.
    ///
    /// # Errors
    /// Returns an error if the delete fails.
    pub async fn purge_expired(&self) -> Result<u64> {
        let query = "DELETE FROM user_sessions WHERE expires_at <= NOW()";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DELETE",
            db.statement = query
        );
        let result = sqlx::query(query)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to purge expired sessions")?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn set(&self, key: &SessionKey, user: &User, ttl: Duration) -> Result<()> {
        let query = r"
            INSERT INTO user_sessions (session_key, user_id, name, email, password, expires_at)
            VALUES ($1, $2, $3, $4, $5, NOW() + ($6 * INTERVAL '1 second'))
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let ttl_seconds = i64::try_from(ttl.as_secs()).context("session ttl is out of range")?;
        sqlx::query(query)
            .bind(key.as_bytes())
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password)
            .bind(ttl_seconds)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to insert session")?;
        Ok(())
    }

    async fn get(&self, key: &SessionKey) -> Result<Option<User>> {
        let query = r"
            SELECT user_id, name, email, password
            FROM user_sessions
            WHERE session_key = $1
              AND expires_at > NOW()
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(key.as_bytes())
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup session")?;

        Ok(row.map(|row| User {
            id: row.get("user_id"),
            name: row.get("name"),
            email: row.get("email"),
            password: row.get("password"),
        }))
    }

    async fn destroy(&self, key: &SessionKey) -> Result<()> {
        let query = "DELETE FROM user_sessions WHERE session_key = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DELETE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(key.as_bytes())
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to delete session")?;
        Ok(())
    }
}

/// Periodically delete expired rows from `user_sessions`.
///
/// Expired rows are already invisible to [`SessionStore::get`]; this only keeps the table small.
pub fn spawn_session_reaper(store: Arc<PgSessionStore>, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        loop {
            ticker.tick().await;
            match store.purge_expired().await {
                Ok(0) => {}
                Ok(count) => debug!("Purged {count} expired sessions"),
                Err(e) => error!("Error purging expired sessions: {e:#}"),
            }
        }
    });
}
