//! pt-BR number and date formatting
//!
//! Decimal comma, `.` thousands grouping, `dd/mm/yyyy` dates.

use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::Decimal;

const MONTHS: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

/// Join an already-rounded `123.45` style string into `123,45` with grouping
fn localize_fixed(fixed: &str) -> String {
    let (negative, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, fixed),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (unsigned, None),
    };
    let is_zero = unsigned.chars().all(|c| c == '0' || c == '.');

    let mut out = String::new();
    if negative && !is_zero {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push(',');
        out.push_str(frac);
    }
    out
}

/// Fixed number of decimal places: `format_decimal(1234.5, 2)` is `1.234,50`
pub fn format_decimal(value: f64, places: usize) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    localize_fixed(&format!("{:.*}", places, value))
}

/// Volume in cubic metres, one decimal place
pub fn format_volume(value: f64) -> String {
    format!("{}m³", format_decimal(value, 1))
}

/// Diesel litres, one decimal place
pub fn format_litres(value: f64) -> String {
    format!("{}L", format_decimal(value, 1))
}

/// Counts and stock quantities: no decimals when whole, otherwise up to two
pub fn format_quantity(value: f64) -> String {
    let fixed = format_decimal(value, 2);
    match fixed.split_once(',') {
        Some((int_part, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                int_part.to_string()
            } else {
                format!("{int_part},{frac}")
            }
        }
        None => fixed,
    }
}

/// `R$ 1.234,50`
pub fn format_currency(amount: Decimal) -> String {
    format!("R$ {}", localize_fixed(&format!("{:.2}", amount.round_dp(2))))
}

/// `dd/mm/yyyy`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// `dd/mm, HH:MM`
pub fn format_day_month_time(at: DateTime<FixedOffset>) -> String {
    at.format("%d/%m, %H:%M").to_string()
}

/// Lower-case month name; empty for an invalid month
pub fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| MONTHS.get(i as usize))
        .copied()
        .unwrap_or("")
}

/// `março de 2026`
pub fn month_year_label(year: i32, month: u32) -> String {
    format!("{} de {}", month_name(month), year)
}

/// Worked time as `{h}h{mm}min`
pub fn format_worked_time(minutes: i64) -> String {
    let minutes = minutes.max(0);
    format!("{}h{:02}min", minutes / 60, minutes % 60)
}

/// Time left until an event: `3h 20min`, or `20min` under an hour
pub fn format_countdown(remaining: chrono::Duration) -> String {
    let total_minutes = remaining.num_minutes().max(0);
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if hours > 0 {
        format!("{hours}h {minutes}min")
    } else {
        format!("{minutes}min")
    }
}
