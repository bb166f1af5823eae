use chrono::{DateTime, Utc};
use moka::future::Cache;
use sqlx::SqlitePool;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::{model::user::User, store::users};

#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Token → session map held in process memory. Every session is lost on restart.
///
/// With no TTL a session lives until logout. A TTL turns it into an idle
/// timeout: each successful lookup extends the session.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Cache<String, Session>,
}

impl SessionStore {
    pub fn new(ttl: Option<Duration>) -> Self {
        // unbounded: a live session is only dropped by logout or the idle TTL
        let builder = Cache::builder();
        let sessions = match ttl {
            Some(ttl) => builder.time_to_idle(ttl).build(),
            None => builder.build(),
        };

        Self { sessions }
    }

    pub fn from_ttl_secs(secs: u64) -> Self {
        Self::new((secs > 0).then(|| Duration::from_secs(secs)))
    }

    /// Mints a token for the user. Tokens combine the user id, the creation
    /// time and a random v4 uuid, so they never repeat within a process.
    pub async fn create(&self, user_id: i64) -> String {
        let now = Utc::now();
        let token = format!(
            "{}_{}_{}",
            user_id,
            now.timestamp_micros(),
            Uuid::new_v4().to_simple()
        );

        self.sessions
            .insert(
                token.clone(),
                Session {
                    user_id,
                    created_at: now,
                },
            )
            .await;

        token
    }

    pub async fn resolve(&self, token: &str) -> Option<Session> {
        self.sessions.get(token).await
    }

    /// Loads the user behind a live session. A session whose user has since
    /// been deleted resolves to nothing.
    pub async fn resolve_user(
        &self,
        pool: &SqlitePool,
        token: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        match self.resolve(token).await {
            Some(session) => {
                debug!(user_id = session.user_id, since = %session.created_at, "Session resolved");
                users::find_by_id(pool, session.user_id).await
            }
            None => Ok(None),
        }
    }

    pub async fn remove(&self, token: &str) {
        self.sessions.invalidate(token).await;
    }
}
