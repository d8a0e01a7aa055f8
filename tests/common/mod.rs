//! Shared fixtures for integration tests
//!
//! `MemoryStore` is a tenant-scoped in-memory [`QueryStore`]. Every method
//! looks only at the data seeded for the requested tenant, mirroring the
//! `key_id = $1` filter of the SQL templates.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use icarus_query::error::{ActionError, StoreError, StoreResult};
use icarus_query::query::rows::*;
use icarus_query::query::{DateRange, PeriodWindow, QueryStore, ReadingFilter, TenantId};
use icarus_query::router::{ActionPipeline, ActionReply, ActionRequest};

// =============================================================================
// TENANT DATA
// =============================================================================

/// One raw tank reading; consumption aggregates are computed from these
#[derive(Debug, Clone)]
pub struct RawReading {
    pub tank: String,
    pub date: NaiveDate,
    pub time: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default)]
pub struct TenantData {
    pub items: Vec<ItemRow>,
    pub loans: Vec<LoanRow>,
    pub low_stock: Vec<LowStockRow>,
    pub readings: Vec<RawReading>,
    pub checklists: Vec<ChecklistRow>,
    pub invoices: Vec<InvoiceDetailRow>,
    pub work_orders: Vec<WorkOrderRow>,
    pub ranking: Vec<TechnicianRankRow>,
    pub technicians: Vec<TechnicianRow>,
    pub stats: HashMap<String, TechnicianStatsRow>,
    pub completed: HashMap<String, Vec<CompletedOrderRow>>,
    pub diesel: Vec<DieselRow>,
    pub purchases: Vec<PurchaseRow>,
    pub forum: Vec<ForumDetailRow>,
}

/// How every store call behaves
#[derive(Debug, Clone, Copy, Default)]
pub enum Behavior {
    #[default]
    Normal,
    Fail,
    Delay(Duration),
}

#[derive(Default)]
pub struct MemoryStore {
    tenants: HashMap<TenantId, TenantData>,
    behavior: Behavior,
    calls: Mutex<Vec<String>>,
    ranges: Mutex<Vec<DateRange>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tenant(mut self, tenant: &str, data: TenantData) -> Self {
        self.tenants.insert(TenantId::new(tenant), data);
        self
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Names of the store methods called so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Date ranges passed to range-based queries
    pub fn ranges(&self) -> Vec<DateRange> {
        self.ranges.lock().unwrap().clone()
    }

    async fn enter(&self, name: &str, tenant: &TenantId) -> StoreResult<TenantData> {
        self.calls.lock().unwrap().push(name.to_string());
        match self.behavior {
            Behavior::Normal => {}
            Behavior::Fail => {
                return Err(StoreError::Unavailable {
                    message: "connection refused".to_string(),
                })
            }
            Behavior::Delay(delay) => tokio::time::sleep(delay).await,
        }
        Ok(self.tenants.get(tenant).cloned().unwrap_or_default())
    }

    fn record(&self, range: &DateRange) {
        self.ranges.lock().unwrap().push(*range);
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[async_trait]
impl QueryStore for MemoryStore {
    async fn search_items(&self, tenant: &TenantId, name: &str) -> StoreResult<Vec<ItemRow>> {
        let data = self.enter("search_items", tenant).await?;
        Ok(data
            .items
            .into_iter()
            .filter(|item| contains_ci(&item.name, name))
            .take(5)
            .collect())
    }

    async fn active_loans(
        &self,
        tenant: &TenantId,
        item_name: Option<&str>,
    ) -> StoreResult<Vec<LoanRow>> {
        let data = self.enter("active_loans", tenant).await?;
        Ok(data
            .loans
            .into_iter()
            .filter(|loan| item_name.map_or(true, |n| contains_ci(&loan.item_name, n)))
            .take(10)
            .collect())
    }

    async fn low_stock(&self, tenant: &TenantId) -> StoreResult<Vec<LowStockRow>> {
        Ok(self.enter("low_stock", tenant).await?.low_stock)
    }

    async fn water_readings(
        &self,
        tenant: &TenantId,
        filter: &ReadingFilter,
    ) -> StoreResult<Vec<ReadingRow>> {
        let data = self.enter("water_readings", tenant).await?;
        Ok(data
            .readings
            .into_iter()
            .filter(|r| filter.date.map_or(true, |d| r.date == d))
            .filter(|r| filter.slot.map_or(true, |s| r.time == s.as_time()))
            .filter(|r| filter.tank.map_or(true, |t| contains_ci(&r.tank, t.as_str())))
            .take(10)
            .map(|r| ReadingRow {
                tank_name: r.tank,
                reading_value: r.value,
                reading_time: r.time,
                reading_date: r.date,
                temperature: None,
            })
            .collect())
    }

    async fn water_consumption(
        &self,
        tenant: &TenantId,
        range: &DateRange,
    ) -> StoreResult<Vec<TankConsumptionRow>> {
        let data = self.enter("water_consumption", tenant).await?;
        self.record(range);

        let mut by_tank: HashMap<String, Vec<f64>> = HashMap::new();
        for reading in data.readings.iter().filter(|r| range.contains(r.date)) {
            by_tank
                .entry(reading.tank.clone())
                .or_default()
                .push(reading.value);
        }

        let mut rows: Vec<TankConsumptionRow> = by_tank
            .into_iter()
            .map(|(tank_name, values)| {
                let total: f64 = values.iter().sum();
                TankConsumptionRow {
                    tank_name,
                    readings: values.len() as i64,
                    total,
                    average: total / values.len() as f64,
                    highest: values.iter().cloned().fold(f64::MIN, f64::max),
                    lowest: values.iter().cloned().fold(f64::MAX, f64::min),
                }
            })
            .collect();
        rows.sort_by(|a, b| b.total.total_cmp(&a.total));
        Ok(rows)
    }

    async fn report_readings(
        &self,
        tenant: &TenantId,
        range: &DateRange,
    ) -> StoreResult<Vec<ReportReadingRow>> {
        let data = self.enter("report_readings", tenant).await?;
        self.record(range);
        Ok(data
            .readings
            .into_iter()
            .filter(|r| range.contains(r.date))
            .enumerate()
            .map(|(i, r)| ReportReadingRow {
                id: i.to_string(),
                tank_name: r.tank,
                reading_date: r.date,
                reading_time: r.time,
                reading_value: r.value,
                temperature: None,
                notes: None,
                created_at: None,
            })
            .collect())
    }

    async fn tank_summary(
        &self,
        tenant: &TenantId,
        range: &DateRange,
    ) -> StoreResult<Vec<TankSummaryRow>> {
        let rows = self.water_consumption(tenant, range).await?;
        Ok(rows
            .into_iter()
            .map(|row| TankSummaryRow {
                tank_name: row.tank_name,
                readings: row.readings,
                lowest: row.lowest,
                highest: row.highest,
                average_temperature: None,
            })
            .collect())
    }

    async fn daily_comparison(
        &self,
        tenant: &TenantId,
        range: &DateRange,
    ) -> StoreResult<Vec<DailyComparisonRow>> {
        let data = self.enter("daily_comparison", tenant).await?;
        let mut rows: Vec<DailyComparisonRow> = Vec::new();
        for r in data.readings.iter().filter(|r| range.contains(r.date)) {
            let pos = rows
                .iter()
                .position(|d| d.tank_name == r.tank && d.reading_date == r.date);
            let idx = match pos {
                Some(idx) => idx,
                None => {
                    rows.push(DailyComparisonRow {
                        tank_name: r.tank.clone(),
                        reading_date: r.date,
                        morning: None,
                        afternoon: None,
                    });
                    rows.len() - 1
                }
            };
            match r.time.as_str() {
                "07:00" => rows[idx].morning = Some(r.value),
                "16:00" => rows[idx].afternoon = Some(r.value),
                _ => {}
            }
        }
        Ok(rows)
    }

    async fn checklists(&self, tenant: &TenantId) -> StoreResult<Vec<ChecklistRow>> {
        Ok(self.enter("checklists", tenant).await?.checklists)
    }

    async fn invoice_details(
        &self,
        tenant: &TenantId,
        company: &str,
    ) -> StoreResult<Vec<InvoiceDetailRow>> {
        let data = self.enter("invoice_details", tenant).await?;
        Ok(data
            .invoices
            .into_iter()
            .filter(|inv| contains_ci(&inv.company, company))
            .take(5)
            .collect())
    }

    async fn unpaid_invoices(&self, tenant: &TenantId) -> StoreResult<Vec<InvoiceSummaryRow>> {
        let data = self.enter("unpaid_invoices", tenant).await?;
        Ok(data
            .invoices
            .into_iter()
            .filter(|inv| inv.status != "pago")
            .map(|inv| InvoiceSummaryRow {
                company: inv.company,
                description: inv.description,
                bill_amount: inv.bill_amount,
                due_date: inv.due_date,
                status: inv.status,
            })
            .collect())
    }

    async fn open_work_orders(&self, tenant: &TenantId) -> StoreResult<Vec<WorkOrderRow>> {
        Ok(self.enter("open_work_orders", tenant).await?.work_orders)
    }

    async fn technician_ranking(
        &self,
        tenant: &TenantId,
        _today: NaiveDate,
        _month_start: NaiveDate,
    ) -> StoreResult<Vec<TechnicianRankRow>> {
        Ok(self.enter("technician_ranking", tenant).await?.ranking)
    }

    async fn find_technician(
        &self,
        tenant: &TenantId,
        name: &str,
    ) -> StoreResult<Option<TechnicianRow>> {
        let data = self.enter("find_technician", tenant).await?;
        let mut matches: Vec<TechnicianRow> = data
            .technicians
            .into_iter()
            .filter(|t| contains_ci(&t.name, name))
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(matches.into_iter().next())
    }

    async fn technician_stats(
        &self,
        tenant: &TenantId,
        technician_id: &str,
        _window: &PeriodWindow,
    ) -> StoreResult<TechnicianStatsRow> {
        let data = self.enter("technician_stats", tenant).await?;
        Ok(data.stats.get(technician_id).cloned().unwrap_or_default())
    }

    async fn recent_completed_orders(
        &self,
        tenant: &TenantId,
        technician_id: &str,
        window: &PeriodWindow,
    ) -> StoreResult<Vec<CompletedOrderRow>> {
        let data = self.enter("recent_completed_orders", tenant).await?;
        Ok(data
            .completed
            .get(technician_id)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|o| {
                o.finished_at
                    .map_or(false, |at| window.contains(at.date_naive()))
            })
            .take(5)
            .collect())
    }

    async fn diesel_movements(&self, tenant: &TenantId) -> StoreResult<Vec<DieselRow>> {
        let data = self.enter("diesel_movements", tenant).await?;
        Ok(data.diesel.into_iter().take(10).collect())
    }

    async fn diesel_balance(&self, tenant: &TenantId) -> StoreResult<f64> {
        let data = self.enter("diesel_balance", tenant).await?;
        Ok(data
            .diesel
            .iter()
            .map(|d| if d.is_entry() { d.quantity } else { -d.quantity })
            .sum())
    }

    async fn pending_purchases(&self, tenant: &TenantId) -> StoreResult<Vec<PurchaseRow>> {
        Ok(self.enter("pending_purchases", tenant).await?.purchases)
    }

    async fn forum_reports(&self, tenant: &TenantId) -> StoreResult<Vec<ForumSummaryRow>> {
        let data = self.enter("forum_reports", tenant).await?;
        Ok(data
            .forum
            .into_iter()
            .take(15)
            .map(|f| ForumSummaryRow {
                id: f.id,
                title: f.title,
                category: f.category,
                created_at: f.created_at,
                author: f.author,
            })
            .collect())
    }

    async fn search_forum(
        &self,
        tenant: &TenantId,
        term: &str,
    ) -> StoreResult<Vec<ForumDetailRow>> {
        let data = self.enter("search_forum", tenant).await?;
        Ok(data
            .forum
            .into_iter()
            .filter(|f| contains_ci(&f.title, term) || contains_ci(&f.content, term))
            .take(5)
            .collect())
    }
}

// =============================================================================
// ROW BUILDERS
// =============================================================================

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

pub fn item(name: &str, quantity: f64, location: &str) -> ItemRow {
    ItemRow {
        name: name.to_string(),
        quantity,
        unit: Some("un".to_string()),
        location: Some(location.to_string()),
        category: Some("Ferramentas".to_string()),
        in_use: 0.0,
        borrowed_by: String::new(),
    }
}

pub fn reading(tank: &str, date: NaiveDate, time: &str, value: f64) -> RawReading {
    RawReading {
        tank: tank.to_string(),
        date,
        time: time.to_string(),
        value,
    }
}

pub fn technician(id: &str, name: &str) -> TechnicianRow {
    TechnicianRow {
        id: id.to_string(),
        name: name.to_string(),
        role: Some("Técnico".to_string()),
    }
}

pub fn rank(name: &str, total: i64, today: i64, month: i64) -> TechnicianRankRow {
    TechnicianRankRow {
        name: name.to_string(),
        role: Some("Técnico".to_string()),
        total_completed: total,
        today,
        this_month: month,
    }
}

// =============================================================================
// ACTION PIPELINE DOUBLE
// =============================================================================

/// Records every request and answers with a fixed reply
#[derive(Default)]
pub struct RecordingPipeline {
    requests: Mutex<Vec<ActionRequest>>,
    delay: Option<Duration>,
}

impl RecordingPipeline {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            delay: Some(delay),
        })
    }

    pub fn requests(&self) -> Vec<ActionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ActionPipeline for RecordingPipeline {
    async fn execute(&self, request: ActionRequest) -> Result<ActionReply, ActionError> {
        let text = request.text.clone();
        self.requests.lock().unwrap().push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(ActionReply {
            response: format!("✅ Registrado: {text}"),
            executed: true,
            tokens: 42,
        })
    }
}
