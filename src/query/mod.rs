//! Read-only query pipeline
//!
//! ```text
//! (Intent, Entities, TenantId)
//!     ↓ QueryDispatcher  (one or more reads, each bounded by a timeout)
//! QueryStore             (PgQueryStore, or a test double)
//!     ↓
//! QueryOutcome::Found(Answer) | QueryOutcome::NotFound { message }
//! ```
//!
//! [`Answer`] has one variant per result shape, so the formatter matches it
//! exhaustively.

mod dispatcher;
pub mod messages;
#[cfg(feature = "database")]
mod postgres;
pub mod rows;
pub mod sql;
mod store;

pub use dispatcher::QueryDispatcher;
#[cfg(feature = "database")]
pub use postgres::{mask_database_url, PgQueryStore};
pub use store::{DateRange, PeriodWindow, QueryStore, ReadingFilter};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entities::Period;
use rows::*;

/// Tenant discriminator (the `key_id` column)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(String);

impl TenantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of dispatching one message
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryOutcome {
    Found(Answer),
    /// Nothing to show; `message` is rendered verbatim
    NotFound { message: String },
}

impl QueryOutcome {
    pub fn not_found(message: impl Into<String>) -> Self {
        QueryOutcome::NotFound {
            message: message.into(),
        }
    }

    pub fn found(&self) -> bool {
        matches!(self, QueryOutcome::Found(_))
    }

    pub fn answer(&self) -> Option<&Answer> {
        match self {
            QueryOutcome::Found(answer) => Some(answer),
            QueryOutcome::NotFound { .. } => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            QueryOutcome::Found(_) => None,
            QueryOutcome::NotFound { message } => Some(message),
        }
    }
}

/// Typed payload of a found outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Answer {
    Greeting,
    Help,
    Farewell,
    Items(Vec<ItemRow>),
    Loans(Vec<LoanRow>),
    LowStock(Vec<LowStockRow>),
    Readings(Vec<ReadingRow>),
    MonthlyConsumption {
        range: DateRange,
        tanks: Vec<TankConsumptionRow>,
    },
    WaterReport(WaterReport),
    Checklists(Vec<ChecklistRow>),
    InvoiceSummary(Vec<InvoiceSummaryRow>),
    InvoiceDetails(Vec<InvoiceDetailRow>),
    WorkOrders(Vec<WorkOrderRow>),
    TechnicianRanking(Vec<TechnicianRankRow>),
    TechnicianProfile(TechnicianProfile),
    Diesel {
        balance: f64,
        movements: Vec<DieselRow>,
    },
    Purchases(Vec<PurchaseRow>),
    ForumList(Vec<ForumSummaryRow>),
    ForumDetails(Vec<ForumDetailRow>),
}

/// Month covered by a water report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
    pub month: u32,
    pub year: i32,
}

/// Everything the external document renderer needs for the water report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaterReport {
    pub period: ReportPeriod,
    pub readings: Vec<ReportReadingRow>,
    pub summary: Vec<TankSummaryRow>,
    pub daily: Vec<DailyComparisonRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnicianProfile {
    pub technician: TechnicianRow,
    pub period: Period,
    pub stats: TechnicianStatsRow,
    pub recent: Vec<CompletedOrderRow>,
}
