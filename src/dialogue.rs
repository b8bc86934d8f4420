//! Guided dialog state for the add-image and add-post flows.
//!
//! Sessions are keyed by user id and expire a fixed time after they start, so an
//! admin who walks away from a prompt does not leave the bot waiting for an
//! upload forever.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// Telegram message length limit in characters
pub const MAX_POST_CHARS: usize = 4096;

/// Represents the dashboard dialog state of a single admin
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogState {
    #[default]
    Idle,
    AwaitingImage,
    AwaitingPost,
}

/// A guided dialog in progress
#[derive(Clone, Copy, Debug)]
pub struct DashboardSession {
    pub state: DialogState,
    pub started_at: Instant,
}

impl DashboardSession {
    pub fn is_expired(&self, timeout: Duration) -> bool {
        self.started_at.elapsed() >= timeout
    }
}

/// Per-user session store
#[derive(Debug)]
pub struct DashboardSessions {
    timeout: Duration,
    sessions: Mutex<HashMap<i64, DashboardSession>>,
}

impl DashboardSessions {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Current state of a user; expired sessions are dropped and read as Idle
    pub async fn state(&self, user_id: i64) -> DialogState {
        let mut sessions = self.sessions.lock().await;
        match sessions.get(&user_id).copied() {
            Some(session) if session.is_expired(self.timeout) => {
                debug!(user_id, state = ?session.state, "Dialog session expired");
                sessions.remove(&user_id);
                DialogState::Idle
            }
            Some(session) => session.state,
            None => DialogState::Idle,
        }
    }

    /// Enter a guided dialog, replacing any previous one. Expired sessions
    /// of every user are swept here.
    pub async fn begin(&self, user_id: i64, state: DialogState) {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(self.timeout));
        if sessions.len() < before {
            debug!(swept = before - sessions.len(), "Dropped expired dialog sessions");
        }

        if state == DialogState::Idle {
            sessions.remove(&user_id);
            return;
        }
        sessions.insert(
            user_id,
            DashboardSession {
                state,
                started_at: Instant::now(),
            },
        );
    }

    /// Leave the current dialog, returning the state it was in
    pub async fn finish(&self, user_id: i64) -> DialogState {
        let mut sessions = self.sessions.lock().await;
        match sessions.remove(&user_id) {
            Some(session) if !session.is_expired(self.timeout) => session.state,
            _ => DialogState::Idle,
        }
    }

    /// Number of stored sessions, expired ones included
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Validates post text submitted in the add-post dialog
pub fn validate_post_text(text: &str) -> Result<&str, &'static str> {
    if text.trim().is_empty() {
        return Err("empty");
    }

    if text.chars().count() > MAX_POST_CHARS {
        return Err("too_long");
    }

    Ok(text)
}
