//! Typed result rows
//!
//! Column names match the aliases used in [`super::sql`]. Numeric columns are
//! cast in SQL (`::float8`, `::int8`, `::numeric`) so decoding does not depend
//! on how the underlying table declares them.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[cfg(feature = "database")]
use sqlx::FromRow;

// ============================================================================
// Inventory
// ============================================================================

/// Inventory item with the quantity currently out on loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(FromRow))]
pub struct ItemRow {
    pub name: String,
    pub quantity: f64,
    pub unit: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub in_use: f64,
    /// Comma-separated borrower names, empty when nothing is lent
    pub borrowed_by: String,
}

/// Open loan (outbound movement not yet returned)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(FromRow))]
pub struct LoanRow {
    pub item_name: String,
    pub sku: Option<String>,
    pub quantity: f64,
    pub person_name: Option<String>,
    pub person_sector: Option<String>,
    pub created_at: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(FromRow))]
pub struct LowStockRow {
    pub name: String,
    pub quantity: f64,
    pub unit: Option<String>,
    pub min_stock: f64,
    pub category: Option<String>,
}

// ============================================================================
// Water
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(FromRow))]
pub struct ReadingRow {
    pub tank_name: String,
    pub reading_value: f64,
    /// `HH:MM`
    pub reading_time: String,
    pub reading_date: NaiveDate,
    pub temperature: Option<f64>,
}

/// Per-tank aggregate over a date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(FromRow))]
pub struct TankConsumptionRow {
    pub tank_name: String,
    pub readings: i64,
    pub total: f64,
    pub average: f64,
    pub highest: f64,
    pub lowest: f64,
}

/// Full reading row used by the monthly report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(FromRow))]
pub struct ReportReadingRow {
    pub id: String,
    pub tank_name: String,
    pub reading_date: NaiveDate,
    pub reading_time: String,
    pub reading_value: f64,
    pub temperature: Option<f64>,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(FromRow))]
pub struct TankSummaryRow {
    pub tank_name: String,
    pub readings: i64,
    pub lowest: f64,
    pub highest: f64,
    pub average_temperature: Option<f64>,
}

/// Morning and afternoon values of one tank on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(FromRow))]
pub struct DailyComparisonRow {
    pub tank_name: String,
    pub reading_date: NaiveDate,
    pub morning: Option<f64>,
    pub afternoon: Option<f64>,
}

// ============================================================================
// Checklists
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(FromRow))]
pub struct ChecklistRow {
    pub id: String,
    pub name: String,
    pub sector: Option<String>,
    pub frequency: Option<String>,
    pub auto_complete: bool,
    pub frequency_days: Option<i32>,
    pub auto_time: Option<String>,
    pub next_execution: Option<DateTime<Utc>>,
    pub last_auto_execution: Option<DateTime<Utc>>,
    pub item_count: i64,
    pub last_execution: Option<DateTime<Utc>>,
}

// ============================================================================
// Invoices and bills
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(FromRow))]
pub struct InvoiceSummaryRow {
    pub company: String,
    pub description: Option<String>,
    pub bill_amount: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(FromRow))]
pub struct InvoiceDetailRow {
    pub id: String,
    pub company: String,
    pub description: Option<String>,
    pub responsible: Option<String>,
    pub sector: Option<String>,
    pub invoice_amount: Option<Decimal>,
    pub bill_amount: Option<Decimal>,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub status: String,
    /// JSON document (`{"url": ...}`) stored as text
    pub invoice_attachment: Option<String>,
    pub bill_attachment: Option<String>,
    pub notes: Option<String>,
}

impl InvoiceDetailRow {
    pub fn invoice_url(&self) -> Option<String> {
        attachment_url(self.invoice_attachment.as_deref())
    }

    pub fn bill_url(&self) -> Option<String> {
        attachment_url(self.bill_attachment.as_deref())
    }
}

/// `url` field of an attachment document; malformed documents have none
fn attachment_url(raw: Option<&str>) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(raw?).ok()?;
    value
        .get("url")
        .and_then(|u| u.as_str())
        .filter(|u| !u.is_empty())
        .map(str::to_string)
}

// ============================================================================
// Work orders and technicians
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(FromRow))]
pub struct WorkOrderRow {
    pub title: String,
    pub sector: Option<String>,
    pub priority: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(FromRow))]
pub struct TechnicianRankRow {
    pub name: String,
    pub role: Option<String>,
    pub total_completed: i64,
    pub today: i64,
    pub this_month: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(FromRow))]
pub struct TechnicianRow {
    pub id: String,
    pub name: String,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(FromRow))]
pub struct TechnicianStatsRow {
    pub completed: i64,
    pub pending: i64,
    pub worked_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(FromRow))]
pub struct CompletedOrderRow {
    pub title: String,
    pub sector: Option<String>,
    pub finished_at: Option<DateTime<Utc>>,
    pub worked_minutes: Option<i64>,
}

// ============================================================================
// Diesel, purchases, forum
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(FromRow))]
pub struct DieselRow {
    /// `entrada` or `saida`
    pub record_type: String,
    pub quantity: f64,
    pub reason: Option<String>,
    pub record_date: NaiveDate,
}

impl DieselRow {
    pub fn is_entry(&self) -> bool {
        self.record_type == "entrada"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(FromRow))]
pub struct BalanceRow {
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(FromRow))]
pub struct PurchaseRow {
    pub item_name: String,
    pub quantity: f64,
    pub unit: Option<String>,
    pub status: String,
    pub supplier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(FromRow))]
pub struct ForumSummaryRow {
    pub id: String,
    pub title: String,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub author: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(FromRow))]
pub struct ForumDetailRow {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub author: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(invoice: Option<&str>, bill: Option<&str>) -> InvoiceDetailRow {
        InvoiceDetailRow {
            id: "1".into(),
            company: "GYN Service".into(),
            description: None,
            responsible: None,
            sector: None,
            invoice_amount: None,
            bill_amount: None,
            issue_date: None,
            due_date: None,
            status: "pendente".into(),
            invoice_attachment: invoice.map(str::to_string),
            bill_attachment: bill.map(str::to_string),
            notes: None,
        }
    }

    #[test]
    fn test_attachment_urls() {
        let row = detail(
            Some(r#"{"url":"https://files.example/nf-1.pdf","name":"nf-1.pdf"}"#),
            Some(r#"{"name":"boleto.pdf"}"#),
        );
        assert_eq!(row.invoice_url().as_deref(), Some("https://files.example/nf-1.pdf"));
        assert_eq!(row.bill_url(), None);
    }

    #[test]
    fn test_malformed_attachment_has_no_url() {
        let row = detail(Some("not json"), Some(r#"{"url":""}"#));
        assert_eq!(row.invoice_url(), None);
        assert_eq!(row.bill_url(), None);
    }
}
