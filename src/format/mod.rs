//! Chat rendering of query outcomes
//!
//! [`format_response`] is a pure function of the outcome and the local time,
//! so rendering the same outcome twice gives byte-identical text. Not-found
//! outcomes render their message verbatim. Water reports are not rendered
//! here: they become a [`ReportRequest`] for the external document renderer.

pub mod locale;
mod render;
pub mod templates;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::query::{Answer, QueryOutcome, WaterReport};

/// Kind of document the external renderer should produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    Water,
}

/// Marker asking the transport to attach a generated document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRequest {
    pub report_type: ReportType,
    pub data: WaterReport,
}

impl ReportRequest {
    /// One-line description for surfaces that cannot attach documents
    pub fn summary(&self) -> String {
        let period = &self.data.period;
        format!(
            "📊 Relatório de água - {} ({} leituras)",
            locale::month_year_label(period.year, period.month),
            self.data.readings.len()
        )
    }
}

/// What goes back to the chat surface
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum Reply {
    Text(String),
    Report(ReportRequest),
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Text(text.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Reply::Text(text) => Some(text),
            Reply::Report(_) => None,
        }
    }

    pub fn as_report(&self) -> Option<&ReportRequest> {
        match self {
            Reply::Text(_) => None,
            Reply::Report(report) => Some(report),
        }
    }
}

impl std::fmt::Display for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reply::Text(text) => write!(f, "{text}"),
            Reply::Report(report) => write!(f, "{}", report.summary()),
        }
    }
}

/// Render an outcome. `now` is the business-local time, used for overdue
/// markers, countdowns and timestamp conversion.
pub fn format_response(outcome: &QueryOutcome, now: DateTime<FixedOffset>) -> Reply {
    let answer = match outcome {
        QueryOutcome::NotFound { message } => return Reply::text(message.clone()),
        QueryOutcome::Found(answer) => answer,
    };
    let today = now.date_naive();

    let text = match answer {
        Answer::Greeting => templates::GREETING.to_string(),
        Answer::Help => templates::HELP.to_string(),
        Answer::Farewell => templates::FAREWELL.to_string(),
        Answer::WaterReport(report) => {
            return Reply::Report(ReportRequest {
                report_type: ReportType::Water,
                data: report.clone(),
            })
        }
        Answer::Items(rows) => render::items(rows),
        Answer::Loans(rows) => render::loans(rows, now),
        Answer::LowStock(rows) => render::low_stock(rows),
        Answer::Readings(rows) => render::readings(rows),
        Answer::MonthlyConsumption { range, tanks } => render::monthly_consumption(range, tanks),
        Answer::Checklists(rows) => render::checklists(rows, now),
        Answer::InvoiceSummary(rows) => render::invoice_summary(rows, today),
        Answer::InvoiceDetails(rows) => render::invoice_details(rows, today),
        Answer::WorkOrders(rows) => render::work_orders(rows),
        Answer::TechnicianRanking(rows) => render::technician_ranking(rows),
        Answer::TechnicianProfile(profile) => render::technician_profile(profile, now),
        Answer::Diesel { balance, movements } => render::diesel(*balance, movements),
        Answer::Purchases(rows) => render::purchases(rows),
        Answer::ForumList(rows) => render::forum_list(rows, now),
        Answer::ForumDetails(rows) => render::forum_details(rows, now),
    };
    Reply::Text(text)
}
