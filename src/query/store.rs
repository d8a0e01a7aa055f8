//! Data-store seam for the dispatcher
//!
//! One method per read. Every method takes the tenant first; implementations
//! must never return rows of another tenant.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::rows::*;
use super::TenantId;
use crate::entities::{Period, ReadingSlot, Tank, YearMonth};
use crate::error::StoreResult;

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
}

impl DateRange {
    /// First through last day of a calendar month
    pub fn month(month: YearMonth) -> Option<Self> {
        Some(Self {
            first_day: month.first_day()?,
            last_day: month.last_day()?,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first_day <= date && date <= self.last_day
    }
}

/// Optional filters for the latest water readings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadingFilter {
    pub date: Option<NaiveDate>,
    pub slot: Option<ReadingSlot>,
    pub tank: Option<Tank>,
}

/// Completion-date window for technician statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl PeriodWindow {
    /// Today only, the last seven days, or the current month so far
    pub fn for_period(period: Period, today: NaiveDate) -> Self {
        let from = match period {
            Period::Today => today,
            Period::Week => today - Duration::days(7),
            Period::Month => YearMonth::of(today).first_day().unwrap_or(today),
        };
        Self { from, to: today }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

#[async_trait]
pub trait QueryStore: Send + Sync {
    /// Items whose name or SKU contains `name`, at most 5
    async fn search_items(&self, tenant: &TenantId, name: &str) -> StoreResult<Vec<ItemRow>>;

    /// Open loans, newest first, at most 10
    async fn active_loans(
        &self,
        tenant: &TenantId,
        item_name: Option<&str>,
    ) -> StoreResult<Vec<LoanRow>>;

    /// Items at or below their minimum stock, at most 10
    async fn low_stock(&self, tenant: &TenantId) -> StoreResult<Vec<LowStockRow>>;

    /// Latest readings matching the filter, at most 10
    async fn water_readings(
        &self,
        tenant: &TenantId,
        filter: &ReadingFilter,
    ) -> StoreResult<Vec<ReadingRow>>;

    /// Per-tank aggregates over the range, highest total first
    async fn water_consumption(
        &self,
        tenant: &TenantId,
        range: &DateRange,
    ) -> StoreResult<Vec<TankConsumptionRow>>;

    async fn report_readings(
        &self,
        tenant: &TenantId,
        range: &DateRange,
    ) -> StoreResult<Vec<ReportReadingRow>>;

    async fn tank_summary(
        &self,
        tenant: &TenantId,
        range: &DateRange,
    ) -> StoreResult<Vec<TankSummaryRow>>;

    async fn daily_comparison(
        &self,
        tenant: &TenantId,
        range: &DateRange,
    ) -> StoreResult<Vec<DailyComparisonRow>>;

    async fn checklists(&self, tenant: &TenantId) -> StoreResult<Vec<ChecklistRow>>;

    /// Invoices whose company or description contains `company`, at most 5
    async fn invoice_details(
        &self,
        tenant: &TenantId,
        company: &str,
    ) -> StoreResult<Vec<InvoiceDetailRow>>;

    /// Invoices not yet paid, earliest due first, at most 10
    async fn unpaid_invoices(&self, tenant: &TenantId) -> StoreResult<Vec<InvoiceSummaryRow>>;

    /// Open work orders by priority then newest, at most 10
    async fn open_work_orders(&self, tenant: &TenantId) -> StoreResult<Vec<WorkOrderRow>>;

    /// Top 10 technicians by completions this month, then overall
    async fn technician_ranking(
        &self,
        tenant: &TenantId,
        today: NaiveDate,
        month_start: NaiveDate,
    ) -> StoreResult<Vec<TechnicianRankRow>>;

    /// First user (by name) whose name contains `name`
    async fn find_technician(
        &self,
        tenant: &TenantId,
        name: &str,
    ) -> StoreResult<Option<TechnicianRow>>;

    async fn technician_stats(
        &self,
        tenant: &TenantId,
        technician_id: &str,
        window: &PeriodWindow,
    ) -> StoreResult<TechnicianStatsRow>;

    /// Last 5 orders completed by the technician within the window
    async fn recent_completed_orders(
        &self,
        tenant: &TenantId,
        technician_id: &str,
        window: &PeriodWindow,
    ) -> StoreResult<Vec<CompletedOrderRow>>;

    /// Latest 10 diesel movements
    async fn diesel_movements(&self, tenant: &TenantId) -> StoreResult<Vec<DieselRow>>;

    /// Entries minus exits over the whole history
    async fn diesel_balance(&self, tenant: &TenantId) -> StoreResult<f64>;

    async fn pending_purchases(&self, tenant: &TenantId) -> StoreResult<Vec<PurchaseRow>>;

    /// Latest 15 forum reports
    async fn forum_reports(&self, tenant: &TenantId) -> StoreResult<Vec<ForumSummaryRow>>;

    /// Forum reports whose title or content contains `term`, at most 5
    async fn search_forum(
        &self,
        tenant: &TenantId,
        term: &str,
    ) -> StoreResult<Vec<ForumDetailRow>>;
}
