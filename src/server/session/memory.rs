use super::{SessionKey, SessionStore};
use crate::server::storage::User;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

/// Process-local session store.
///
/// Sessions vanish on restart and are not shared between instances.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<SessionKey, (User, Instant)>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn set(&self, key: &SessionKey, user: &User, ttl: Duration) -> Result<()> {
        let now = Instant::now();
        let expires_at = now
            .checked_add(ttl)
            .ok_or_else(|| anyhow!("session ttl of {}s is out of range", ttl.as_secs()))?;
        let mut sessions = self.sessions.lock().await;
        sessions.retain(|_, (_, until)| *until > now);
        sessions.insert(key.clone(), (user.clone(), expires_at));
        Ok(())
    }

    async fn get(&self, key: &SessionKey) -> Result<Option<User>> {
        let mut sessions = self.sessions.lock().await;
        match sessions.get(key) {
            Some((user, expires_at)) if *expires_at > Instant::now() => Ok(Some(user.clone())),
            Some(_) => {
                sessions.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn destroy(&self, key: &SessionKey) -> Result<()> {
        self.sessions.lock().await.remove(key);
        Ok(())
    }
}
