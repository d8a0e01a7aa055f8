//! Intent + entities → reads → [`QueryOutcome`]

use chrono::NaiveDate;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

use super::messages;
use super::store::{DateRange, PeriodWindow, QueryStore, ReadingFilter};
use super::{Answer, QueryOutcome, ReportPeriod, TechnicianProfile, TenantId, WaterReport};
use crate::entities::{Entities, YearMonth};
use crate::error::{StoreError, StoreResult};
use crate::intent::Intent;

/// Runs the reads for one classified message.
///
/// Every store call is bounded by `timeout`. Any failure, timeouts included,
/// is logged here and becomes [`messages::INTERNAL_ERROR`]; callers never see
/// a [`StoreError`].
#[derive(Clone)]
pub struct QueryDispatcher {
    store: Arc<dyn QueryStore>,
    timeout: Duration,
}

impl QueryDispatcher {
    pub fn new(store: Arc<dyn QueryStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Dispatch for a tenant. `today` is the business-local date.
    pub async fn dispatch(
        &self,
        intent: Intent,
        entities: &Entities,
        tenant: &TenantId,
        today: NaiveDate,
    ) -> QueryOutcome {
        debug!(intent = %intent, tenant = %tenant, "Dispatching query");
        match self.run(intent, entities, tenant, today).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(
                    intent = %intent,
                    tenant = %tenant,
                    entities = ?entities,
                    query = err.query().unwrap_or("-"),
                    error = %err,
                    "Query failed"
                );
                QueryOutcome::not_found(messages::INTERNAL_ERROR)
            }
        }
    }

    async fn bounded<T, F>(&self, query: &'static str, call: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout {
                query,
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }

    async fn run(
        &self,
        intent: Intent,
        entities: &Entities,
        tenant: &TenantId,
        today: NaiveDate,
    ) -> StoreResult<QueryOutcome> {
        match intent {
            Intent::Greeting => Ok(QueryOutcome::Found(Answer::Greeting)),
            Intent::Help => Ok(QueryOutcome::Found(Answer::Help)),
            Intent::Exit => Ok(QueryOutcome::Found(Answer::Farewell)),
            Intent::FindItem => self.find_item(entities, tenant).await,
            Intent::CheckLoan => self.loans(entities, tenant).await,
            Intent::WaterReading => self.readings(entities, tenant).await,
            Intent::WaterMonthlyConsumption => self.monthly_consumption(tenant, today).await,
            Intent::WaterHtmlReport => self.water_report(entities, tenant, today).await,
            Intent::ChecklistStatus => self.checklists(tenant).await,
            Intent::ListInvoices => self.invoices(entities, tenant).await,
            Intent::CreateInvoice => Ok(QueryOutcome::not_found(messages::CREATE_INVOICE_HINT)),
            Intent::LowStock => self.low_stock(tenant).await,
            Intent::WorkOrders => self.work_orders(tenant).await,
            Intent::TechnicianStats => self.technician(entities, tenant, today).await,
            Intent::Diesel => self.diesel(tenant).await,
            Intent::Purchases => self.purchases(tenant).await,
            Intent::Forum => self.forum(entities, tenant).await,
            Intent::Generator | Intent::Unknown => Ok(QueryOutcome::not_found(messages::UNKNOWN)),
        }
    }

    // ------------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------------

    async fn find_item(&self, entities: &Entities, tenant: &TenantId) -> StoreResult<QueryOutcome> {
        let Some(name) = entities.item_name.as_deref() else {
            return Ok(QueryOutcome::not_found(messages::SPECIFY_ITEM));
        };
        let items = self
            .bounded("search_items", self.store.search_items(tenant, name))
            .await?;
        if items.is_empty() {
            return Ok(QueryOutcome::not_found(messages::item_not_found(name)));
        }
        Ok(QueryOutcome::Found(Answer::Items(items)))
    }

    async fn loans(&self, entities: &Entities, tenant: &TenantId) -> StoreResult<QueryOutcome> {
        let loans = self
            .bounded(
                "active_loans",
                self.store.active_loans(tenant, entities.item_name.as_deref()),
            )
            .await?;
        if loans.is_empty() {
            return Ok(QueryOutcome::not_found(messages::NO_ACTIVE_LOANS));
        }
        Ok(QueryOutcome::Found(Answer::Loans(loans)))
    }

    async fn readings(&self, entities: &Entities, tenant: &TenantId) -> StoreResult<QueryOutcome> {
        let filter = ReadingFilter {
            date: entities.date,
            slot: entities.time_slot,
            tank: entities.tank,
        };
        let readings = self
            .bounded("water_readings", self.store.water_readings(tenant, &filter))
            .await?;
        if readings.is_empty() {
            return Ok(QueryOutcome::not_found(messages::NO_WATER_READINGS));
        }
        Ok(QueryOutcome::Found(Answer::Readings(readings)))
    }

    async fn checklists(&self, tenant: &TenantId) -> StoreResult<QueryOutcome> {
        let checklists = self
            .bounded("checklists", self.store.checklists(tenant))
            .await?;
        if checklists.is_empty() {
            return Ok(QueryOutcome::not_found(messages::NO_CHECKLISTS));
        }
        Ok(QueryOutcome::Found(Answer::Checklists(checklists)))
    }

    async fn invoices(&self, entities: &Entities, tenant: &TenantId) -> StoreResult<QueryOutcome> {
        let outcome = match entities.company.as_deref() {
            Some(company) if entities.detailed => {
                let rows = self
                    .bounded("invoice_details", self.store.invoice_details(tenant, company))
                    .await?;
                (!rows.is_empty()).then_some(Answer::InvoiceDetails(rows))
            }
            _ => {
                let rows = self
                    .bounded("unpaid_invoices", self.store.unpaid_invoices(tenant))
                    .await?;
                (!rows.is_empty()).then_some(Answer::InvoiceSummary(rows))
            }
        };
        Ok(outcome
            .map(QueryOutcome::Found)
            .unwrap_or_else(|| QueryOutcome::not_found(messages::NO_PENDING_INVOICES)))
    }

    async fn low_stock(&self, tenant: &TenantId) -> StoreResult<QueryOutcome> {
        let items = self.bounded("low_stock", self.store.low_stock(tenant)).await?;
        if items.is_empty() {
            return Ok(QueryOutcome::not_found(messages::STOCK_OK));
        }
        Ok(QueryOutcome::Found(Answer::LowStock(items)))
    }

    async fn work_orders(&self, tenant: &TenantId) -> StoreResult<QueryOutcome> {
        let orders = self
            .bounded("open_work_orders", self.store.open_work_orders(tenant))
            .await?;
        if orders.is_empty() {
            return Ok(QueryOutcome::not_found(messages::NO_OPEN_ORDERS));
        }
        Ok(QueryOutcome::Found(Answer::WorkOrders(orders)))
    }

    async fn purchases(&self, tenant: &TenantId) -> StoreResult<QueryOutcome> {
        let purchases = self
            .bounded("pending_purchases", self.store.pending_purchases(tenant))
            .await?;
        if purchases.is_empty() {
            return Ok(QueryOutcome::not_found(messages::NO_PENDING_PURCHASES));
        }
        Ok(QueryOutcome::Found(Answer::Purchases(purchases)))
    }

    async fn forum(&self, entities: &Entities, tenant: &TenantId) -> StoreResult<QueryOutcome> {
        if let Some(term) = entities.search_term.as_deref().filter(|_| entities.detailed) {
            let reports = self
                .bounded("search_forum", self.store.search_forum(tenant, term))
                .await?;
            if reports.is_empty() {
                return Ok(QueryOutcome::not_found(messages::forum_not_found(term)));
            }
            return Ok(QueryOutcome::Found(Answer::ForumDetails(reports)));
        }

        let reports = self
            .bounded("forum_reports", self.store.forum_reports(tenant))
            .await?;
        if reports.is_empty() {
            return Ok(QueryOutcome::not_found(messages::EMPTY_FORUM));
        }
        Ok(QueryOutcome::Found(Answer::ForumList(reports)))
    }

    // ------------------------------------------------------------------------
    // Aggregates and reports
    // ------------------------------------------------------------------------

    async fn monthly_consumption(
        &self,
        tenant: &TenantId,
        today: NaiveDate,
    ) -> StoreResult<QueryOutcome> {
        let Some(range) = DateRange::month(YearMonth::of(today)) else {
            return Ok(QueryOutcome::not_found(messages::NO_MONTHLY_READINGS));
        };
        let tanks = self
            .bounded("water_consumption", self.store.water_consumption(tenant, &range))
            .await?;
        if tanks.is_empty() {
            return Ok(QueryOutcome::not_found(messages::NO_MONTHLY_READINGS));
        }
        Ok(QueryOutcome::Found(Answer::MonthlyConsumption { range, tanks }))
    }

    async fn water_report(
        &self,
        entities: &Entities,
        tenant: &TenantId,
        today: NaiveDate,
    ) -> StoreResult<QueryOutcome> {
        let month = entities.report_month.unwrap_or_else(|| YearMonth::of(today));
        let Some(range) = DateRange::month(month) else {
            return Ok(QueryOutcome::not_found(messages::no_report_readings(month)));
        };

        let readings = self
            .bounded("report_readings", self.store.report_readings(tenant, &range))
            .await?;
        if readings.is_empty() {
            return Ok(QueryOutcome::not_found(messages::no_report_readings(month)));
        }

        let (summary, daily) = tokio::try_join!(
            self.bounded("tank_summary", self.store.tank_summary(tenant, &range)),
            self.bounded("daily_comparison", self.store.daily_comparison(tenant, &range)),
        )?;

        Ok(QueryOutcome::Found(Answer::WaterReport(WaterReport {
            period: ReportPeriod {
                first_day: range.first_day,
                last_day: range.last_day,
                month: month.month,
                year: month.year,
            },
            readings,
            summary,
            daily,
        })))
    }

    async fn technician(
        &self,
        entities: &Entities,
        tenant: &TenantId,
        today: NaiveDate,
    ) -> StoreResult<QueryOutcome> {
        let name = match entities.technician.as_deref() {
            Some(name) if !entities.ranking => name,
            _ => return self.ranking(tenant, today).await,
        };

        let Some(technician) = self
            .bounded("find_technician", self.store.find_technician(tenant, name))
            .await?
        else {
            return Ok(QueryOutcome::not_found(messages::technician_not_found(name)));
        };

        let period = entities.period.unwrap_or_default();
        let window = PeriodWindow::for_period(period, today);
        let (stats, recent) = tokio::try_join!(
            self.bounded(
                "technician_stats",
                self.store.technician_stats(tenant, &technician.id, &window),
            ),
            self.bounded(
                "recent_completed_orders",
                self.store
                    .recent_completed_orders(tenant, &technician.id, &window),
            ),
        )?;

        Ok(QueryOutcome::Found(Answer::TechnicianProfile(TechnicianProfile {
            technician,
            period,
            stats,
            recent,
        })))
    }

    async fn ranking(&self, tenant: &TenantId, today: NaiveDate) -> StoreResult<QueryOutcome> {
        let month_start = YearMonth::of(today).first_day().unwrap_or(today);
        let ranking = self
            .bounded(
                "technician_ranking",
                self.store.technician_ranking(tenant, today, month_start),
            )
            .await?;
        if ranking.is_empty() {
            return Ok(QueryOutcome::not_found(messages::NO_RANKING));
        }
        Ok(QueryOutcome::Found(Answer::TechnicianRanking(ranking)))
    }

    async fn diesel(&self, tenant: &TenantId) -> StoreResult<QueryOutcome> {
        let (movements, balance) = tokio::try_join!(
            self.bounded("diesel_movements", self.store.diesel_movements(tenant)),
            self.bounded("diesel_balance", self.store.diesel_balance(tenant)),
        )?;
        Ok(QueryOutcome::Found(Answer::Diesel { balance, movements }))
    }
}
