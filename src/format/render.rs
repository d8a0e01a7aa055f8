//! Per-answer chat templates

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use rust_decimal::Decimal;

use super::locale::*;
use super::templates::{header, rule, CLOSING_PROMPT, FORUM_DETAIL_HINT, INVOICE_DETAIL_HINT};
use crate::query::rows::*;
use crate::query::{DateRange, TechnicianProfile};

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn local_date(at: DateTime<Utc>, now: DateTime<FixedOffset>) -> NaiveDate {
    at.with_timezone(now.offset()).date_naive()
}

/// `quantity unit`, without a dangling space when the unit is missing
fn with_unit(quantity: f64, unit: &Option<String>) -> String {
    match present(unit) {
        Some(unit) => format!("{} {unit}", format_quantity(quantity)),
        None => format_quantity(quantity),
    }
}

fn blocks<T>(rows: &[T], separator: &str, render: impl Fn(&T) -> String) -> String {
    rows.iter().map(render).collect::<Vec<_>>().join(separator)
}

// ============================================================================
// Inventory
// ============================================================================

pub(super) fn items(rows: &[ItemRow]) -> String {
    let body = blocks(rows, "\n\n", |item| {
        let mut block = format!("*{}*: {}", item.name, with_unit(item.quantity, &item.unit));
        if item.in_use > 0.0 {
            block.push_str(&format!(
                "\n   ⚠️ _{} emprestado(s) para {}_",
                format_quantity(item.in_use),
                item.borrowed_by
            ));
        }
        if let Some(location) = present(&item.location) {
            block.push_str(&format!("\n   📍 {location}"));
        }
        block
    });
    format!("{}{body}{CLOSING_PROMPT}", header("📦 *ESTOQUE*", 16))
}

pub(super) fn loans(rows: &[LoanRow], now: DateTime<FixedOffset>) -> String {
    let body = blocks(rows, "\n\n", |loan| {
        let mut block = format!("• *{}*: {}x", loan.item_name, format_quantity(loan.quantity));
        block.push_str(&format!(
            "\n   👤 {}",
            present(&loan.person_name).unwrap_or("Não informado")
        ));
        if let Some(sector) = present(&loan.person_sector) {
            block.push_str(&format!(" ({sector})"));
        }
        block.push_str(&format!(
            "\n   📅 {}",
            format_day_month_time(loan.created_at.with_timezone(now.offset()))
        ));
        if let Some(notes) = present(&loan.notes) {
            block.push_str(&format!("\n   📝 {notes}"));
        }
        block
    });
    format!("{}{body}{CLOSING_PROMPT}", header("🔧 *FERRAMENTAS EM USO*", 20))
}

pub(super) fn low_stock(rows: &[LowStockRow]) -> String {
    let body = blocks(rows, "\n\n", |item| {
        format!(
            "🔴 *{}*\n   Atual: {} | Mínimo: {}",
            item.name,
            format_quantity(item.quantity),
            with_unit(item.min_stock, &item.unit)
        )
    });
    format!("{}{body}{CLOSING_PROMPT}", header("⚠️ *ESTOQUE BAIXO*", 20))
}

// ============================================================================
// Water
// ============================================================================

pub(super) fn readings(rows: &[ReadingRow]) -> String {
    let body = blocks(rows, "\n\n", |reading| {
        let mut block = format!(
            "*{}*\n   📅 {} às {}\n   📊 {}",
            reading.tank_name,
            format_date(reading.reading_date),
            reading.reading_time,
            format_volume(reading.reading_value)
        );
        if let Some(temperature) = reading.temperature {
            block.push_str(&format!(" | 🌡️ {}°C", format_decimal(temperature, 1)));
        }
        block
    });
    format!("{}{body}{CLOSING_PROMPT}", header("💧 *LEITURAS DE ÁGUA*", 20))
}

pub(super) fn monthly_consumption(range: &DateRange, tanks: &[TankConsumptionRow]) -> String {
    use chrono::Datelike;

    let month = month_year_label(range.first_day.year(), range.first_day.month()).to_uppercase();
    let title = format!("💧 *CONSUMO DE ÁGUA - {month}*");
    let body = blocks(tanks, "\n\n", |tank| {
        format!(
            "📊 *{}*\n   💧 Total: *{}*\n   📈 Média/dia: {}\n   📉 Min: {} | Max: {}\n   📋 {} leituras",
            tank.tank_name,
            format_volume(tank.total),
            format_volume(tank.average),
            format_volume(tank.lowest),
            format_volume(tank.highest),
            tank.readings
        )
    });
    let grand_total: f64 = tanks.iter().map(|t| t.total).sum();

    format!(
        "{}\n{body}\n\n{}\n💧 *TOTAL GERAL: {}*{CLOSING_PROMPT}",
        header(&title, 29),
        rule(29),
        format_volume(grand_total)
    )
}

// ============================================================================
// Checklists
// ============================================================================

fn frequency_label(days: Option<i32>) -> String {
    match days {
        Some(2) => "Dia sim/não".to_string(),
        Some(n) if n > 2 => format!("A cada {n} dias"),
        _ => "Diário".to_string(),
    }
}

pub(super) fn checklists(rows: &[ChecklistRow], now: DateTime<FixedOffset>) -> String {
    let (automatic, manual): (Vec<&ChecklistRow>, Vec<&ChecklistRow>) =
        rows.iter().partition(|c| c.auto_complete);
    let mut sections = Vec::new();

    if !automatic.is_empty() {
        let body = blocks(&automatic, "\n\n", |c| {
            let mut block = format!("• *{}*", c.name);
            if let Some(sector) = present(&c.sector) {
                block.push_str(&format!(" ({sector})"));
            }
            block.push_str(&format!(
                "\n   ⏰ Hora: {} | 📆 {}",
                present(&c.auto_time).unwrap_or("11:00"),
                frequency_label(c.frequency_days)
            ));
            if let Some(next) = c.next_execution {
                let remaining = next.signed_duration_since(now);
                if remaining > Duration::zero() {
                    block.push_str(&format!("\n   ⏳ Próxima: {}", format_countdown(remaining)));
                } else {
                    block.push_str("\n   ✅ Executado hoje");
                }
            }
            block
        });
        sections.push(format!("⚡ *Automáticos ({}):*\n{body}", automatic.len()));
    }

    if !manual.is_empty() {
        let body = blocks(&manual, "\n", |c| {
            let mut block = format!("• *{}*", c.name);
            if let Some(sector) = present(&c.sector) {
                block.push_str(&format!(" ({sector})"));
            }
            block.push_str(&format!(" - {} itens", c.item_count));
            if let Some(last) = c.last_execution {
                block.push_str(&format!("\n   📅 Última: {}", format_date(local_date(last, now))));
            }
            block
        });
        sections.push(format!("📝 *Manuais ({}):*\n{body}", manual.len()));
    }

    format!(
        "{}\n{}{CLOSING_PROMPT}",
        header("📋 *CHECKLISTS*", 20),
        sections.join("\n\n")
    )
}

// ============================================================================
// Invoices
// ============================================================================

fn money(amount: Option<Decimal>) -> String {
    format_currency(amount.unwrap_or_default())
}

pub(super) fn invoice_details(rows: &[InvoiceDetailRow], today: NaiveDate) -> String {
    let body = blocks(rows, "\n\n", |n| {
        let mut lines = vec![format!("🏢 *{}*", n.company)];
        if let Some(description) = present(&n.description) {
            lines.push(format!("├ 📝 {description}"));
        }
        if let Some(sector) = present(&n.sector) {
            lines.push(format!("├ 🏷️ Setor: {sector}"));
        }
        if let Some(responsible) = present(&n.responsible) {
            lines.push(format!("├ 👤 Resp: {responsible}"));
        }
        lines.push(format!("├ 💵 Nota: {}", money(n.invoice_amount)));
        lines.push(format!("├ 💰 Boleto: {}", money(n.bill_amount)));
        lines.push(format!(
            "├ 📅 Emissão: {}",
            n.issue_date.map(format_date).unwrap_or_else(|| "-".to_string())
        ));

        let due = n
            .due_date
            .map(format_date)
            .unwrap_or_else(|| "sem venc.".to_string());
        let overdue = n.due_date.is_some_and(|d| d < today);
        lines.push(if overdue {
            format!("├ ⏰ Venc: {due} 🔴 VENCIDO!")
        } else {
            format!("├ ⏰ Venc: {due}")
        });
        lines.push(format!("├ 📊 Status: *{}*", n.status));

        if let Some(url) = n.invoice_url() {
            lines.push(format!("├ 📎 Nota: {url}"));
        }
        if let Some(url) = n.bill_url() {
            lines.push(format!("├ 📎 Boleto: {url}"));
        }
        if let Some(notes) = present(&n.notes) {
            lines.push(format!("└ 💬 {notes}"));
        }
        lines.join("\n")
    });
    format!("{}{body}{CLOSING_PROMPT}", header("📄 *DETALHES DA NOTA*", 20))
}

/// 🔴 overdue, 🟡 due within three days, 📋 otherwise
fn due_icon(due: Option<NaiveDate>, today: NaiveDate) -> &'static str {
    match due {
        Some(d) if d < today => "🔴",
        Some(d) if d <= today + Duration::days(3) => "🟡",
        _ => "📋",
    }
}

pub(super) fn invoice_summary(rows: &[InvoiceSummaryRow], today: NaiveDate) -> String {
    let body = blocks(rows, "\n\n", |n| {
        format!(
            "{} *{}*\n   {} | Venc: {}",
            due_icon(n.due_date, today),
            n.company,
            money(n.bill_amount),
            n.due_date
                .map(format_date)
                .unwrap_or_else(|| "sem venc.".to_string())
        )
    });
    format!(
        "{}{body}{INVOICE_DETAIL_HINT}{CLOSING_PROMPT}",
        header("💰 *NOTAS/BOLETOS PENDENTES*", 25)
    )
}

// ============================================================================
// Work orders and technicians
// ============================================================================

fn priority_icon(priority: Option<&str>) -> &'static str {
    match priority {
        Some("critical") => "🔴",
        Some("high") => "🟠",
        Some("medium") => "🟡",
        _ => "🟢",
    }
}

fn status_label(status: &str) -> &str {
    match status {
        "pending" => "⏳ Pendente",
        "in_progress" => "🔄 Em andamento",
        "paused" => "⏸️ Pausado",
        other => other,
    }
}

pub(super) fn work_orders(rows: &[WorkOrderRow]) -> String {
    let body = blocks(rows, "\n\n", |o| {
        format!(
            "{} *{}*\n   📍 {} | {}",
            priority_icon(o.priority.as_deref()),
            o.title,
            present(&o.sector).unwrap_or("Geral"),
            status_label(&o.status)
        )
    });
    format!("{}{body}{CLOSING_PROMPT}", header("🔧 *ORDENS DE SERVIÇO*", 22))
}

fn medal(position: usize) -> String {
    match position {
        0 => "🥇".to_string(),
        1 => "🥈".to_string(),
        2 => "🥉".to_string(),
        n => format!("*{}.*", n + 1),
    }
}

pub(super) fn technician_ranking(rows: &[TechnicianRankRow]) -> String {
    let body = rows
        .iter()
        .enumerate()
        .map(|(i, t)| {
            format!(
                "{} *{}*\n   📅 Mês: {} | 📆 Hoje: {} | 📊 Total: {}",
                medal(i),
                t.name,
                t.this_month,
                t.today,
                t.total_completed
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("{}\n{body}{CLOSING_PROMPT}", header("🏆 *RANKING DE TÉCNICOS*", 24))
}

pub(super) fn technician_profile(profile: &TechnicianProfile, now: DateTime<FixedOffset>) -> String {
    let stats = &profile.stats;
    let mut text = format!(
        "{}📊 *Período: {}*\n\n✅ OS Completas: *{}*\n⏳ OS Pendentes: *{}*\n⏱️ Tempo: *{}*",
        header(&format!("👷 *{}*", profile.technician.name), 22),
        profile.period.label(),
        stats.completed,
        stats.pending,
        format_worked_time(stats.worked_minutes)
    );

    if !profile.recent.is_empty() {
        let lines = blocks(&profile.recent, "\n", |o| {
            let date = o
                .finished_at
                .map(|at| format_date(local_date(at, now)))
                .unwrap_or_else(|| "-".to_string());
            match o.worked_minutes.filter(|m| *m > 0) {
                Some(minutes) => format!("• {} - {date} ({minutes}min)", o.title),
                None => format!("• {} - {date}", o.title),
            }
        });
        text.push_str(&format!("\n\n📋 *Últimas OS:*\n{lines}"));
    }

    text + CLOSING_PROMPT
}

// ============================================================================
// Diesel, purchases, forum
// ============================================================================

pub(super) fn diesel(balance: f64, movements: &[DieselRow]) -> String {
    let mut text = format!(
        "{}\n💧 *Saldo Atual: {}*",
        header("⛽ *CONTROLE DE DIESEL*", 23),
        format_litres(balance)
    );
    if !movements.is_empty() {
        let lines = blocks(&movements[..movements.len().min(5)], "\n", |r| {
            format!(
                "{} {}: {} ({})",
                if r.is_entry() { "📥" } else { "📤" },
                r.record_type,
                format_litres(r.quantity),
                format_date(r.record_date)
            )
        });
        text.push_str(&format!("\n\n📋 *Últimas Movimentações:*\n{lines}"));
    }
    text + CLOSING_PROMPT
}

fn purchase_icon(status: &str) -> &'static str {
    match status {
        "aguardando" => "⏳",
        "aprovado" => "✅",
        "pedido" => "📦",
        _ => "📋",
    }
}

pub(super) fn purchases(rows: &[PurchaseRow]) -> String {
    let body = blocks(rows, "\n\n", |p| {
        format!(
            "{} *{}*\n   {} | {}",
            purchase_icon(&p.status),
            p.item_name,
            with_unit(p.quantity, &p.unit),
            p.status
        )
    });
    format!("{}{body}{CLOSING_PROMPT}", header("🛒 *PEDIDOS DE COMPRA*", 22))
}

pub(super) fn forum_details(rows: &[ForumDetailRow], now: DateTime<FixedOffset>) -> String {
    let separator = format!("\n\n{}\n\n", rule(24));
    let body = blocks(rows, &separator, |r| {
        format!(
            "📄 *{}*\n├ 🏷️ Categoria: {}\n├ 👤 Autor: {}\n├ 📅 Data: {}\n└ 📝 *Conteúdo:*\n\n{}",
            r.title,
            present(&r.category).unwrap_or("Geral"),
            present(&r.author).unwrap_or("Desconhecido"),
            format_date(local_date(r.created_at, now)),
            r.content
        )
    });
    format!("{}\n{body}{CLOSING_PROMPT}", header("📋 *FÓRUM - RELATÓRIO*", 24))
}

pub(super) fn forum_list(rows: &[ForumSummaryRow], now: DateTime<FixedOffset>) -> String {
    let body = rows
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "{}. *{}*\n   📁 {} | 📅 {}",
                i + 1,
                r.title,
                present(&r.category).unwrap_or("Geral"),
                format_date(local_date(r.created_at, now))
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "{}\n{body}{FORUM_DETAIL_HINT}{CLOSING_PROMPT}",
        header("📋 *FÓRUM - RELATÓRIOS*", 24)
    )
}
