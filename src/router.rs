//! Message Router
//!
//! Single entry point (`MessageRouter::handle`) for every inbound chat
//! message. Decides between the action pipeline (an active agent session)
//! and the read-only query pipeline:
//!
//! - **Exit** words always win, whatever the session state
//! - **Activation** keyword opens a session and hands the command over
//! - **Active session** messages continue the agent conversation
//! - everything else is classified, extracted, dispatched and formatted
//!
//! Messages from one sender are serialized through [`SenderLanes`]; different
//! senders run concurrently.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::clock::{local_time, Clock};
use crate::config::RouterConfig;
use crate::entities::{extract, Entities};
use crate::error::ActionError;
use crate::format::templates::{ACTION_FAILED, ACTION_UNAVAILABLE, FAREWELL};
use crate::format::{format_response, Reply};
use crate::intent::{classify, Intent};
use crate::query::{QueryDispatcher, QueryStore, TenantId};
use crate::session::{is_exit_command, Exchange, SenderId, SenderLanes, SessionStore, TriggerDetector};

/// Message event handed over by the transport
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub sender: SenderId,
    pub sender_name: Option<String>,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl InboundMessage {
    /// Build from a raw transport address; the sender is normalized
    pub fn new(raw_sender: &str, text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            sender: SenderId::normalize(raw_sender),
            sender_name: None,
            text: text.into(),
            timestamp,
        }
    }

    pub fn with_sender_name(mut self, name: impl Into<String>) -> Self {
        self.sender_name = Some(name.into());
        self
    }
}

/// Work handed to the action pipeline
#[derive(Debug, Clone)]
pub struct ActionRequest {
    pub sender: SenderId,
    pub sender_name: Option<String>,
    pub tenant: TenantId,
    /// Command text. The activation keyword is already stripped.
    pub text: String,
    /// Prior exchanges of the session, oldest first
    pub context: Vec<Exchange>,
    /// False for the message that opened the session
    pub continuation: bool,
}

/// Answer of the action pipeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionReply {
    pub response: String,
    /// Whether a mutating action was carried out
    pub executed: bool,
    pub tokens: u32,
}

/// External, model-driven executor of mutating commands
#[async_trait]
pub trait ActionPipeline: Send + Sync {
    async fn execute(&self, request: ActionRequest) -> Result<ActionReply, ActionError>;
}

/// Pipeline used when no action backend is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledActionPipeline;

#[async_trait]
impl ActionPipeline for DisabledActionPipeline {
    async fn execute(&self, _request: ActionRequest) -> Result<ActionReply, ActionError> {
        Err(ActionError::NotConfigured)
    }
}

/// Which path handled a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteMode {
    Query,
    Agent,
    Exit,
}

/// Agent-side details of a routed message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentOutcome {
    pub continuation: bool,
    pub executed: bool,
    pub tokens: u32,
}

/// Result envelope for one handled message
#[derive(Debug, Clone, Serialize)]
pub struct RouterReply {
    pub mode: RouteMode,
    /// Classified intent; `None` for agent messages
    pub intent: Option<Intent>,
    pub entities: Option<Entities>,
    pub reply: Reply,
    pub agent: Option<AgentOutcome>,
    pub latency_ms: u64,
}

impl RouterReply {
    pub fn is_agent(&self) -> bool {
        self.mode == RouteMode::Agent
    }
}

/// Routes inbound messages to the query or action pipeline
pub struct MessageRouter {
    sessions: SessionStore,
    lanes: SenderLanes,
    triggers: TriggerDetector,
    dispatcher: QueryDispatcher,
    actions: Arc<dyn ActionPipeline>,
    clock: Arc<dyn Clock>,
    config: RouterConfig,
}

impl MessageRouter {
    pub fn new(
        config: RouterConfig,
        store: Arc<dyn QueryStore>,
        actions: Arc<dyn ActionPipeline>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sessions: SessionStore::new(clock.clone(), config.session_ttl),
            lanes: SenderLanes::new(),
            triggers: TriggerDetector::new(&config.activation_keyword),
            dispatcher: QueryDispatcher::new(store, config.query_timeout),
            actions,
            clock,
            config,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Handle one message for an already resolved tenant.
    ///
    /// Flow:
    /// 1. Wait for the sender's lane
    /// 2. Exit word: drop the session, answer with the farewell block
    /// 3. Activation keyword: open a session, run the stripped command
    /// 4. Active session: refresh it, run the message as a continuation
    /// 5. Otherwise: classify, extract, dispatch, format
    pub async fn handle(&self, message: &InboundMessage, tenant: &TenantId) -> RouterReply {
        let started = Instant::now();
        let sender = &message.sender;
        let _lane = self.lanes.acquire(sender).await;

        // ── Step 2: Exit ────────────────────────────────────────────
        if is_exit_command(&message.text) {
            self.sessions.deactivate(sender).await;
            info!(sender = %sender, "Exit command, agent mode closed");
            return RouterReply {
                mode: RouteMode::Exit,
                intent: Some(Intent::Exit),
                entities: None,
                reply: Reply::text(FAREWELL),
                agent: None,
                latency_ms: elapsed_ms(started),
            };
        }

        // ── Step 3: Activation ──────────────────────────────────────
        if self.triggers.is_activation(&message.text) {
            self.sessions.activate(sender).await;
            let command = self.triggers.strip_activation(&message.text);
            info!(sender = %sender, "Agent mode activated");
            return self
                .run_action(message, tenant, command, false, started)
                .await;
        }

        // ── Step 4: Continuation ────────────────────────────────────
        if self.sessions.is_active(sender).await {
            self.sessions.touch(sender).await;
            return self
                .run_action(message, tenant, message.text.trim().to_string(), true, started)
                .await;
        }

        // ── Step 5: Query pipeline ──────────────────────────────────
        let now = local_time(self.clock.now(), self.config.utc_offset);
        let today = now.date_naive();
        let intent = classify(&message.text);
        let entities = extract(&message.text, intent, today);
        debug!(sender = %sender, intent = %intent, "Query pipeline");

        let outcome = self.dispatcher.dispatch(intent, &entities, tenant, today).await;
        let reply = format_response(&outcome, now);

        RouterReply {
            mode: RouteMode::Query,
            intent: Some(intent),
            entities: Some(entities),
            reply,
            agent: None,
            latency_ms: elapsed_ms(started),
        }
    }

    async fn run_action(
        &self,
        message: &InboundMessage,
        tenant: &TenantId,
        command: String,
        continuation: bool,
        started: Instant,
    ) -> RouterReply {
        let sender = &message.sender;
        let request = ActionRequest {
            sender: sender.clone(),
            sender_name: message.sender_name.clone(),
            tenant: tenant.clone(),
            text: command.clone(),
            context: self.sessions.context(sender).await,
            continuation,
        };

        let timeout = self.config.action_timeout;
        let result = match tokio::time::timeout(timeout, self.actions.execute(request)).await {
            Ok(result) => result,
            Err(_) => Err(ActionError::Timeout {
                timeout_ms: duration_ms(timeout),
            }),
        };

        let (agent, text) = match result {
            Ok(action) => {
                self.sessions
                    .append_exchange(sender, &command, &action.response)
                    .await;
                debug!(
                    sender = %sender,
                    executed = action.executed,
                    tokens = action.tokens,
                    "Action pipeline replied"
                );
                let agent = AgentOutcome {
                    continuation,
                    executed: action.executed,
                    tokens: action.tokens,
                };
                (agent, action.response)
            }
            Err(ActionError::NotConfigured) => {
                warn!(sender = %sender, "Action pipeline not configured");
                (AgentOutcome::failed(continuation), ACTION_UNAVAILABLE.to_string())
            }
            Err(err) => {
                warn!(sender = %sender, tenant = %tenant, error = %err, "Action pipeline failed");
                (AgentOutcome::failed(continuation), ACTION_FAILED.to_string())
            }
        };

        RouterReply {
            mode: RouteMode::Agent,
            intent: None,
            entities: None,
            reply: Reply::text(text),
            agent: Some(agent),
            latency_ms: elapsed_ms(started),
        }
    }
}

impl AgentOutcome {
    fn failed(continuation: bool) -> Self {
        Self {
            continuation,
            executed: false,
            tokens: 0,
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn elapsed_ms(started: Instant) -> u64 {
    duration_ms(started.elapsed())
}
