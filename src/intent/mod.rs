//! Intent classification for the query pipeline
//!
//! Messages are normalized (lower-case, accents stripped) and matched against
//! an ordered rule table. The first rule that matches decides the intent;
//! nothing matching means [`Intent::Unknown`], so classification is total.
//!
//! # Design Principles
//!
//! 1. **Closed Enum**: every message maps to exactly one known intent
//! 2. **Precedence is data**: rule order lives in [`rules()`]
//! 3. **Vocabulary is interface**: keywords are user-facing and change only
//!    deliberately

mod rules;

pub use rules::{rules, IntentRule};

use serde::{Deserialize, Serialize};

use crate::text::normalize_message;

/// All intents the query pipeline understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Intent {
    Greeting,
    Help,
    FindItem,
    CheckLoan,
    WaterReading,
    WaterMonthlyConsumption,
    WaterHtmlReport,
    ChecklistStatus,
    ListInvoices,
    CreateInvoice,
    LowStock,
    WorkOrders,
    TechnicianStats,
    Diesel,
    Generator,
    Purchases,
    Forum,
    Exit,
    Unknown,
}

impl Intent {
    pub const ALL: [Intent; 19] = [
        Intent::Greeting,
        Intent::Help,
        Intent::FindItem,
        Intent::CheckLoan,
        Intent::WaterReading,
        Intent::WaterMonthlyConsumption,
        Intent::WaterHtmlReport,
        Intent::ChecklistStatus,
        Intent::ListInvoices,
        Intent::CreateInvoice,
        Intent::LowStock,
        Intent::WorkOrders,
        Intent::TechnicianStats,
        Intent::Diesel,
        Intent::Generator,
        Intent::Purchases,
        Intent::Forum,
        Intent::Exit,
        Intent::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Greeting => "greeting",
            Intent::Help => "help",
            Intent::FindItem => "find-item",
            Intent::CheckLoan => "check-loan",
            Intent::WaterReading => "water-reading",
            Intent::WaterMonthlyConsumption => "water-monthly-consumption",
            Intent::WaterHtmlReport => "water-html-report",
            Intent::ChecklistStatus => "checklist-status",
            Intent::ListInvoices => "list-invoices",
            Intent::CreateInvoice => "create-invoice",
            Intent::LowStock => "low-stock",
            Intent::WorkOrders => "work-orders",
            Intent::TechnicianStats => "technician-stats",
            Intent::Diesel => "diesel",
            Intent::Generator => "generator",
            Intent::Purchases => "purchases",
            Intent::Forum => "forum",
            Intent::Exit => "exit",
            Intent::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify a raw chat message
pub fn classify(message: &str) -> Intent {
    classify_normalized(normalize_message(message).trim())
}

/// Classify text that is already normalized
pub fn classify_normalized(normalized: &str) -> Intent {
    rules()
        .iter()
        .find_map(|rule| rule.evaluate(normalized))
        .unwrap_or(Intent::Unknown)
}
