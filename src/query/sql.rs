//! Tenant-scoped SQL templates
//!
//! Every query is built through [`BoundQuery::scoped`], which binds the tenant
//! as `$1`; every template filters on `key_id = $1`. Optional filters are
//! appended with [`BoundQuery::and`], which numbers the placeholder itself, so
//! no value is ever interpolated into query text.

use chrono::NaiveDate;

use super::store::{DateRange, PeriodWindow, ReadingFilter};
use super::TenantId;

/// Value bound to a positional placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Text(String),
    Date(NaiveDate),
}

/// SQL text plus its positional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct BoundQuery {
    name: &'static str,
    sql: String,
    params: Vec<SqlParam>,
}

impl BoundQuery {
    /// Start from a template whose tenant filter uses `$1`
    fn scoped(name: &'static str, tenant: &TenantId, template: &str) -> Self {
        Self {
            name,
            sql: template.trim().to_string(),
            params: vec![SqlParam::Text(tenant.as_str().to_string())],
        }
    }

    /// Bind the next placeholder already present in the template
    fn bind(mut self, param: SqlParam) -> Self {
        self.params.push(param);
        self
    }

    /// Append `AND <clause>`; every `$?` in the clause becomes the next
    /// placeholder number
    fn and(mut self, clause: &str, param: SqlParam) -> Self {
        let n = self.params.len() + 1;
        self.sql.push_str("\n  AND ");
        self.sql.push_str(&clause.replace("$?", &format!("${n}")));
        self.params.push(param);
        self
    }

    fn then(mut self, tail: &str) -> Self {
        self.sql.push('\n');
        self.sql.push_str(tail.trim());
        self
    }

    /// Short query name used in logs and errors
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[SqlParam] {
        &self.params
    }
}

/// `%term%` for ILIKE, with LIKE metacharacters escaped
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn text(value: &str) -> SqlParam {
    SqlParam::Text(value.to_string())
}

// ============================================================================
// Inventory
// ============================================================================

const SEARCH_ITEMS: &str = r#"
SELECT i.name, i.quantity::float8 AS quantity, i.unit, i.location, i.category,
       COALESCE(l.in_use, 0)::float8 AS in_use,
       COALESCE(l.borrowed_by, '') AS borrowed_by
FROM inventory_items i
LEFT JOIN (
    SELECT item_id, SUM(quantity) AS in_use,
           STRING_AGG(borrowed_by_name, ', ') AS borrowed_by
    FROM inventory_loans
    WHERE returned_at IS NULL
    GROUP BY item_id
) l ON l.item_id = i.id
WHERE i.key_id = $1 AND (i.name ILIKE $2 OR i.sku ILIKE $2)
ORDER BY i.name
LIMIT 5
"#;

pub fn search_items(tenant: &TenantId, name: &str) -> BoundQuery {
    BoundQuery::scoped("search_items", tenant, SEARCH_ITEMS).bind(SqlParam::Text(like_pattern(name)))
}

const ACTIVE_LOANS: &str = r#"
SELECT i.name AS item_name, i.sku, m.quantity::float8 AS quantity,
       m.person_name, m.person_sector, m.created_at::timestamptz AS created_at, m.notes
FROM inventory_movements m
JOIN inventory_items i ON i.id = m.item_id
WHERE m.key_id = $1
  AND m.usage_type = 'emprestimo'
  AND m.is_returned = false
  AND m.movement_type = 'saida'
"#;

pub fn active_loans(tenant: &TenantId, item_name: Option<&str>) -> BoundQuery {
    let mut query = BoundQuery::scoped("active_loans", tenant, ACTIVE_LOANS);
    if let Some(name) = item_name {
        query = query.and(
            "(i.name ILIKE $? OR i.sku ILIKE $?)",
            SqlParam::Text(like_pattern(name)),
        );
    }
    query.then("ORDER BY m.created_at DESC LIMIT 10")
}

const LOW_STOCK: &str = r#"
SELECT name, quantity::float8 AS quantity, unit,
       COALESCE(min_stock, 0)::float8 AS min_stock, category
FROM inventory_items
WHERE key_id = $1 AND quantity <= COALESCE(min_stock, 0)
ORDER BY quantity ASC
LIMIT 10
"#;

pub fn low_stock(tenant: &TenantId) -> BoundQuery {
    BoundQuery::scoped("low_stock", tenant, LOW_STOCK)
}

// ============================================================================
// Water
// ============================================================================

const WATER_READINGS: &str = r#"
SELECT tank_name, reading_value::float8 AS reading_value,
       LEFT(reading_time::text, 5) AS reading_time,
       reading_date::date AS reading_date, temperature::float8 AS temperature
FROM water_readings
WHERE key_id = $1
"#;

pub fn water_readings(tenant: &TenantId, filter: &ReadingFilter) -> BoundQuery {
    let mut query = BoundQuery::scoped("water_readings", tenant, WATER_READINGS);
    if let Some(date) = filter.date {
        query = query.and("reading_date = $?", SqlParam::Date(date));
    }
    if let Some(slot) = filter.slot {
        query = query.and("LEFT(reading_time::text, 5) = $?", text(slot.as_time()));
    }
    if let Some(tank) = filter.tank {
        query = query.and("LOWER(tank_name) = $?", text(tank.as_str()));
    }
    query.then("ORDER BY reading_date DESC, reading_time DESC LIMIT 10")
}

const WATER_CONSUMPTION: &str = r#"
SELECT tank_name,
       COUNT(*)::int8 AS readings,
       COALESCE(SUM(reading_value), 0)::float8 AS total,
       COALESCE(AVG(reading_value), 0)::float8 AS average,
       COALESCE(MAX(reading_value), 0)::float8 AS highest,
       COALESCE(MIN(reading_value), 0)::float8 AS lowest
FROM water_readings
WHERE key_id = $1 AND reading_date >= $2 AND reading_date <= $3
GROUP BY tank_name
ORDER BY total DESC
"#;

pub fn water_consumption(tenant: &TenantId, range: &DateRange) -> BoundQuery {
    BoundQuery::scoped("water_consumption", tenant, WATER_CONSUMPTION)
        .bind(SqlParam::Date(range.first_day))
        .bind(SqlParam::Date(range.last_day))
}

const REPORT_READINGS: &str = r#"
SELECT id::text AS id, tank_name, reading_date::date AS reading_date,
       LEFT(reading_time::text, 5) AS reading_time,
       reading_value::float8 AS reading_value, temperature::float8 AS temperature,
       notes, created_at::timestamptz AS created_at
FROM water_readings
WHERE key_id = $1 AND reading_date >= $2 AND reading_date <= $3
ORDER BY reading_date ASC, reading_time ASC
"#;

pub fn report_readings(tenant: &TenantId, range: &DateRange) -> BoundQuery {
    BoundQuery::scoped("report_readings", tenant, REPORT_READINGS)
        .bind(SqlParam::Date(range.first_day))
        .bind(SqlParam::Date(range.last_day))
}

const TANK_SUMMARY: &str = r#"
SELECT tank_name,
       COUNT(*)::int8 AS readings,
       COALESCE(MIN(reading_value), 0)::float8 AS lowest,
       COALESCE(MAX(reading_value), 0)::float8 AS highest,
       AVG(temperature)::float8 AS average_temperature
FROM water_readings
WHERE key_id = $1 AND reading_date >= $2 AND reading_date <= $3
GROUP BY tank_name
ORDER BY tank_name
"#;

pub fn tank_summary(tenant: &TenantId, range: &DateRange) -> BoundQuery {
    BoundQuery::scoped("tank_summary", tenant, TANK_SUMMARY)
        .bind(SqlParam::Date(range.first_day))
        .bind(SqlParam::Date(range.last_day))
}

const DAILY_COMPARISON: &str = r#"
SELECT tank_name, reading_date::date AS reading_date,
       MAX(CASE WHEN LEFT(reading_time::text, 5) = '07:00' THEN reading_value END)::float8 AS morning,
       MAX(CASE WHEN LEFT(reading_time::text, 5) = '16:00' THEN reading_value END)::float8 AS afternoon
FROM water_readings
WHERE key_id = $1 AND reading_date >= $2 AND reading_date <= $3
GROUP BY tank_name, reading_date
ORDER BY reading_date ASC, tank_name ASC
"#;

pub fn daily_comparison(tenant: &TenantId, range: &DateRange) -> BoundQuery {
    BoundQuery::scoped("daily_comparison", tenant, DAILY_COMPARISON)
        .bind(SqlParam::Date(range.first_day))
        .bind(SqlParam::Date(range.last_day))
}

// ============================================================================
// Checklists
// ============================================================================

const CHECKLISTS: &str = r#"
SELECT c.id::text AS id, c.name, c.sector, c.frequency,
       COALESCE(c.auto_complete, false) AS auto_complete,
       c.frequency_days::int4 AS frequency_days,
       LEFT(c.auto_time::text, 5) AS auto_time,
       c.next_execution::timestamptz AS next_execution,
       c.last_auto_execution::timestamptz AS last_auto_execution,
       (SELECT COUNT(*) FROM checklist_items ci WHERE ci.checklist_id = c.id)::int8 AS item_count,
       (SELECT MAX(ce.executed_at) FROM checklist_executions ce
         WHERE ce.checklist_id = c.id)::timestamptz AS last_execution
FROM checklists c
WHERE c.key_id = $1
ORDER BY c.name
"#;

pub fn checklists(tenant: &TenantId) -> BoundQuery {
    BoundQuery::scoped("checklists", tenant, CHECKLISTS)
}

// ============================================================================
// Invoices and bills
// ============================================================================

const INVOICE_DETAILS: &str = r#"
SELECT id::text AS id, empresa AS company, descricao AS description,
       responsavel AS responsible, setor AS sector,
       valor_nota::numeric AS invoice_amount, valor_boleto::numeric AS bill_amount,
       data_emissao::date AS issue_date, data_vencimento::date AS due_date, status,
       nota_anexo::text AS invoice_attachment, boleto_anexo::text AS bill_attachment,
       observacoes AS notes
FROM notas_boletos
WHERE key_id = $1 AND (empresa ILIKE $2 OR descricao ILIKE $2)
ORDER BY data_vencimento ASC
LIMIT 5
"#;

pub fn invoice_details(tenant: &TenantId, company: &str) -> BoundQuery {
    BoundQuery::scoped("invoice_details", tenant, INVOICE_DETAILS)
        .bind(SqlParam::Text(like_pattern(company)))
}

const UNPAID_INVOICES: &str = r#"
SELECT empresa AS company, descricao AS description,
       valor_boleto::numeric AS bill_amount, data_vencimento::date AS due_date, status
FROM notas_boletos
WHERE key_id = $1 AND status != 'pago'
ORDER BY data_vencimento ASC
LIMIT 10
"#;

pub fn unpaid_invoices(tenant: &TenantId) -> BoundQuery {
    BoundQuery::scoped("unpaid_invoices", tenant, UNPAID_INVOICES)
}

// ============================================================================
// Work orders and technicians
// ============================================================================

const OPEN_WORK_ORDERS: &str = r#"
SELECT title, sector, priority, status, created_at::timestamptz AS created_at
FROM orders
WHERE key_id = $1 AND status != 'completed'
ORDER BY
    CASE priority WHEN 'critical' THEN 1 WHEN 'high' THEN 2 WHEN 'medium' THEN 3 ELSE 4 END,
    created_at DESC
LIMIT 10
"#;

pub fn open_work_orders(tenant: &TenantId) -> BoundQuery {
    BoundQuery::scoped("open_work_orders", tenant, OPEN_WORK_ORDERS)
}

const TECHNICIAN_RANKING: &str = r#"
SELECT u.name, u.role,
       COUNT(CASE WHEN o.status = 'completed' THEN 1 END)::int8 AS total_completed,
       COUNT(CASE WHEN o.status = 'completed' AND DATE(o.finished_at) = $2 THEN 1 END)::int8 AS today,
       COUNT(CASE WHEN o.status = 'completed' AND DATE(o.finished_at) >= $3 THEN 1 END)::int8 AS this_month
FROM users u
LEFT JOIN order_assignments oa ON oa.user_id = u.id
LEFT JOIN orders o ON o.id = oa.order_id AND o.key_id = $1
WHERE u.key_id = $1 AND u.role IN ('tech', 'admin')
GROUP BY u.id, u.name, u.role
HAVING COUNT(CASE WHEN o.status = 'completed' THEN 1 END) > 0
ORDER BY this_month DESC, total_completed DESC, u.name ASC
LIMIT 10
"#;

pub fn technician_ranking(tenant: &TenantId, today: NaiveDate, month_start: NaiveDate) -> BoundQuery {
    BoundQuery::scoped("technician_ranking", tenant, TECHNICIAN_RANKING)
        .bind(SqlParam::Date(today))
        .bind(SqlParam::Date(month_start))
}

const FIND_TECHNICIAN: &str = r#"
SELECT u.id::text AS id, u.name, u.role
FROM users u
WHERE u.key_id = $1 AND u.name ILIKE $2
ORDER BY u.name ASC
LIMIT 1
"#;

pub fn find_technician(tenant: &TenantId, name: &str) -> BoundQuery {
    BoundQuery::scoped("find_technician", tenant, FIND_TECHNICIAN)
        .bind(SqlParam::Text(like_pattern(name)))
}

const TECHNICIAN_STATS: &str = r#"
SELECT COUNT(*) FILTER (
           WHERE o.status = 'completed' AND DATE(o.finished_at) BETWEEN $3 AND $4
       )::int8 AS completed,
       COUNT(*) FILTER (WHERE o.status IN ('pending', 'in_progress'))::int8 AS pending,
       COALESCE(SUM(o.worked_minutes) FILTER (
           WHERE o.status = 'completed' AND DATE(o.finished_at) BETWEEN $3 AND $4
       ), 0)::int8 AS worked_minutes
FROM order_assignments oa
JOIN orders o ON o.id = oa.order_id
WHERE o.key_id = $1 AND oa.user_id::text = $2
"#;

pub fn technician_stats(tenant: &TenantId, technician_id: &str, window: &PeriodWindow) -> BoundQuery {
    BoundQuery::scoped("technician_stats", tenant, TECHNICIAN_STATS)
        .bind(text(technician_id))
        .bind(SqlParam::Date(window.from))
        .bind(SqlParam::Date(window.to))
}

const RECENT_COMPLETED_ORDERS: &str = r#"
SELECT o.title, o.sector, o.finished_at::timestamptz AS finished_at,
       o.worked_minutes::int8 AS worked_minutes
FROM order_assignments oa
JOIN orders o ON o.id = oa.order_id
WHERE o.key_id = $1 AND oa.user_id::text = $2
  AND o.status = 'completed'
  AND DATE(o.finished_at) BETWEEN $3 AND $4
ORDER BY o.finished_at DESC
LIMIT 5
"#;

pub fn recent_completed_orders(
    tenant: &TenantId,
    technician_id: &str,
    window: &PeriodWindow,
) -> BoundQuery {
    BoundQuery::scoped("recent_completed_orders", tenant, RECENT_COMPLETED_ORDERS)
        .bind(text(technician_id))
        .bind(SqlParam::Date(window.from))
        .bind(SqlParam::Date(window.to))
}

// ============================================================================
// Diesel, purchases, forum
// ============================================================================

const DIESEL_MOVEMENTS: &str = r#"
SELECT record_type, quantity::float8 AS quantity, reason, record_date::date AS record_date
FROM diesel_records
WHERE key_id = $1
ORDER BY record_date DESC, created_at DESC
LIMIT 10
"#;

pub fn diesel_movements(tenant: &TenantId) -> BoundQuery {
    BoundQuery::scoped("diesel_movements", tenant, DIESEL_MOVEMENTS)
}

const DIESEL_BALANCE: &str = r#"
SELECT (COALESCE(SUM(CASE WHEN record_type = 'entrada' THEN quantity ELSE 0 END), 0)
      - COALESCE(SUM(CASE WHEN record_type = 'saida' THEN quantity ELSE 0 END), 0))::float8 AS balance
FROM diesel_records
WHERE key_id = $1
"#;

pub fn diesel_balance(tenant: &TenantId) -> BoundQuery {
    BoundQuery::scoped("diesel_balance", tenant, DIESEL_BALANCE)
}

const PENDING_PURCHASES: &str = r#"
SELECT item_name, quantity::float8 AS quantity, unit, status, supplier
FROM purchases
WHERE key_id = $1 AND status NOT IN ('chegou', 'cancelado')
ORDER BY created_at DESC
LIMIT 10
"#;

pub fn pending_purchases(tenant: &TenantId) -> BoundQuery {
    BoundQuery::scoped("pending_purchases", tenant, PENDING_PURCHASES)
}

const FORUM_REPORTS: &str = r#"
SELECT mr.id::text AS id, mr.title, mr.category,
       mr.created_at::timestamptz AS created_at, u.name AS author
FROM maintenance_reports mr
LEFT JOIN users u ON u.id = mr.created_by
WHERE mr.key_id = $1
ORDER BY mr.created_at DESC
LIMIT 15
"#;

pub fn forum_reports(tenant: &TenantId) -> BoundQuery {
    BoundQuery::scoped("forum_reports", tenant, FORUM_REPORTS)
}

const SEARCH_FORUM: &str = r#"
SELECT mr.id::text AS id, mr.title, mr.content, mr.category,
       mr.created_at::timestamptz AS created_at, u.name AS author
FROM maintenance_reports mr
LEFT JOIN users u ON u.id = mr.created_by
WHERE mr.key_id = $1 AND (mr.title ILIKE $2 OR mr.content ILIKE $2)
ORDER BY mr.created_at DESC
LIMIT 5
"#;

pub fn search_forum(tenant: &TenantId, term: &str) -> BoundQuery {
    BoundQuery::scoped("search_forum", tenant, SEARCH_FORUM).bind(SqlParam::Text(like_pattern(term)))
}
