//! Per-sender conversational state
//!
//! # State Machine
//!
//! ```text
//! (absent)
//!     ↓ activation trigger ("icarus ...")
//! Active { last_action_at }
//!     ↓ touch (every message while active)
//! Active { last_action_at = now }
//!     ↓ exit command | idle > ttl (checked lazily on lookup)
//! (absent)
//! ```
//!
//! The store is the only shared mutable state of the pipeline. It is an
//! injectable value (clone it to share), never a module-level singleton.

mod lanes;
pub(crate) mod triggers;

pub use lanes::SenderLanes;
pub use triggers::{is_exit_command, TriggerDetector};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

use crate::clock::Clock;
use crate::text::{digits_only, mask_phone};

/// Normalized sender address (digits of the phone number)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SenderId(String);

impl SenderId {
    /// Normalize a transport address. Phone-like addresses keep only their
    /// digits; anything without digits is kept trimmed and lower-cased.
    pub fn normalize(raw: &str) -> Self {
        let digits = digits_only(raw);
        if digits.is_empty() {
            Self(raw.trim().to_lowercase())
        } else {
            Self(digits)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Form safe to write to logs
    pub fn masked(&self) -> String {
        mask_phone(&self.0)
    }
}

impl std::fmt::Display for SenderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.masked())
    }
}

/// One user message and the reply it produced in the action pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    pub user: String,
    pub assistant: String,
    pub at: DateTime<Utc>,
}

/// Session of a single sender
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub active: bool,
    pub last_action_at: DateTime<Utc>,
    /// Prior exchanges, append-only. Only the action pipeline reads this.
    pub context: Vec<Exchange>,
}

impl Session {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            active: true,
            last_action_at: now,
            context: Vec::new(),
        }
    }

    fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        match (now - self.last_action_at).to_std() {
            Ok(idle) => idle > ttl,
            // last_action_at in the future (clock skew): not expired
            Err(_) => false,
        }
    }
}

type SessionMap = Arc<RwLock<HashMap<SenderId, Session>>>;

/// Lock-protected session map keyed by sender
#[derive(Clone)]
pub struct SessionStore {
    sessions: SessionMap,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            clock,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// True iff a session exists, is active and has not expired.
    ///
    /// An expired session is removed as a side effect, so a later lookup
    /// cannot resurrect it.
    pub async fn is_active(&self, sender: &SenderId) -> bool {
        let now = self.clock.now();
        let mut sessions = self.sessions.write().await;

        let expired = match sessions.get(sender) {
            None => return false,
            Some(session) => session.is_expired(now, self.ttl),
        };

        if expired {
            sessions.remove(sender);
            debug!(sender = %sender, "Session expired");
            return false;
        }

        sessions.get(sender).map(|s| s.active).unwrap_or(false)
    }

    /// Create or overwrite the sender's session with an empty context
    pub async fn activate(&self, sender: &SenderId) {
        let now = self.clock.now();
        self.sessions
            .write()
            .await
            .insert(sender.clone(), Session::new(now));
        debug!(sender = %sender, "Session activated");
    }

    /// Remove the sender's session unconditionally
    pub async fn deactivate(&self, sender: &SenderId) {
        if self.sessions.write().await.remove(sender).is_some() {
            debug!(sender = %sender, "Session deactivated");
        }
    }

    /// Refresh the idle timer. Never creates a session.
    pub async fn touch(&self, sender: &SenderId) {
        let now = self.clock.now();
        if let Some(session) = self.sessions.write().await.get_mut(sender) {
            session.last_action_at = now;
        }
    }

    /// Append an exchange to an existing session's context
    pub async fn append_exchange(&self, sender: &SenderId, user: &str, assistant: &str) {
        let now = self.clock.now();
        if let Some(session) = self.sessions.write().await.get_mut(sender) {
            session.context.push(Exchange {
                user: user.to_string(),
                assistant: assistant.to_string(),
                at: now,
            });
        }
    }

    /// Context of the sender's session (empty when absent)
    pub async fn context(&self, sender: &SenderId) -> Vec<Exchange> {
        self.sessions
            .read()
            .await
            .get(sender)
            .map(|s| s.context.clone())
            .unwrap_or_default()
    }

    /// Raw snapshot, without the expiry check
    pub async fn get(&self, sender: &SenderId) -> Option<Session> {
        self.sessions.read().await.get(sender).cloned()
    }

    /// Number of stored sessions, including expired ones not yet looked up
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
