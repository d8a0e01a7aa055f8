//! Icarus query pipeline
//!
//! Routes chat messages from field workers either to an external action
//! pipeline (an agent session opened with the activation keyword) or to the
//! read-only query pipeline:
//!
//! Message -> Intent -> Entities -> tenant-scoped queries -> pt-BR reply
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use icarus_query::clock::SystemClock;
//! use icarus_query::config::{DatabaseConfig, RouterConfig};
//! use icarus_query::query::{PgQueryStore, TenantId};
//! use icarus_query::router::{DisabledActionPipeline, InboundMessage, MessageRouter};
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let store = PgQueryStore::connect(&DatabaseConfig::from_env()?).await?;
//! let router = MessageRouter::new(
//!     RouterConfig::from_env()?,
//!     Arc::new(store),
//!     Arc::new(DisabledActionPipeline),
//!     Arc::new(SystemClock),
//! );
//!
//! let message = InboundMessage::new("5562999991234", "tem martelo?", chrono::Utc::now());
//! let reply = router.handle(&message, &TenantId::new("fazenda-1")).await;
//! println!("{}", reply.reply);
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

// Configuration and time
pub mod clock;
pub mod config;

// Text normalization shared by classifier and extractor
pub mod text;

// Per-sender agent sessions
pub mod session;

// Classification and extraction
pub mod entities;
pub mod intent;

// Tenant-scoped reads
pub mod query;

// Chat rendering
pub mod format;

// Entry point
pub mod router;

pub use error::{ActionError, ConfigError, StoreError};
pub use format::{format_response, Reply, ReportRequest};
pub use intent::{classify, Intent};
pub use query::{QueryDispatcher, QueryOutcome, QueryStore, TenantId};
pub use router::{ActionPipeline, InboundMessage, MessageRouter, RouterReply};
