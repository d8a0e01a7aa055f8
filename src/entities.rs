//! Entity extraction
//!
//! Pure and intent-gated: only the fields relevant to the given intent are
//! populated. A missing entity is not an error here; the dispatcher turns it
//! into a "please specify" or a default.

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::intent::Intent;
use crate::text::normalize_message;

// =============================================================================
// ENTITY TYPES
// =============================================================================

/// The two daily water reading slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingSlot {
    Morning,
    Afternoon,
}

impl ReadingSlot {
    /// Canonical `reading_time` value stored for the slot
    pub fn as_time(&self) -> &'static str {
        match self {
            ReadingSlot::Morning => "07:00",
            ReadingSlot::Afternoon => "16:00",
        }
    }
}

/// Known water tanks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tank {
    Aviarios,
    Recria,
}

impl Tank {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tank::Aviarios => "aviarios",
            Tank::Recria => "recria",
        }
    }
}

/// Reporting period for technician statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Today,
    Week,
    #[default]
    Month,
}

impl Period {
    /// Wording used in replies
    pub fn label(&self) -> &'static str {
        match self {
            Period::Today => "hoje",
            Period::Week => "esta semana",
            Period::Month => "este mês",
        }
    }
}

/// Calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1).and_then(|d| d.pred_opt())
    }
}

/// Fields extracted from a message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_slot: Option<ReadingSlot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tank: Option<Tank>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technician: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_month: Option<YearMonth>,
    /// Company or search term present: show the detail view
    #[serde(default)]
    pub detailed: bool,
    /// A leaderboard was asked for instead of one technician
    #[serde(default)]
    pub ranking: bool,
}

impl Entities {
    pub fn is_empty(&self) -> bool {
        self == &Entities::default()
    }
}

// =============================================================================
// PATTERNS
// =============================================================================

/// Phrases removed around an item name ("tem", "com quem está", ...)
static ITEM_STOP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\btem\b|\btemos\b|\bexiste\b|\bh[aá]\b|\bpossui\b|com quem|quem est[aá]\b|quem pegou|onde est[aá]\b|\best[aá]\b",
    )
    .unwrap()
});

static PUNCTUATION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[?!.,]").unwrap());

static LEADING_ARTICLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(o|a|os|as|um|uma)\s+").unwrap());

static NOW_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"hoje|agora").unwrap());

static MORNING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b0?7:?00\b|\b7\s?h\b|manha").unwrap());

static AFTERNOON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b16:?00\b|\b16\s?h\b|tarde").unwrap());

static INVOICE_COMPANY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"notas?\s+["']?([\w\s]+)["']?"#).unwrap());

static BILL_COMPANY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"boletos?\s+["']?([\w\s]+)["']?"#).unwrap());

static COMPANY_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(do|da|de|pendentes?|vencid[ao]s?)(\s+|$)").unwrap());

/// Technician name phrasings, tried in order
static TECHNICIAN_RES: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"\bos\s+(?:do|da|de)\s+(\w+)").unwrap(),
        Regex::new(r"quantas\s+os\s+o?\s*(\w+)").unwrap(),
        Regex::new(r"t[eé]cnico\s+(\w+)").unwrap(),
    ]
});

/// Words a technician capture can land on that are never a name
const NOT_A_NAME: &[&str] = &[
    "do", "da", "de", "dos", "das", "o", "a", "e", "no", "na", "que", "mais", "fez", "destaque",
    "ranking", "todos", "mes", "mês", "mensal", "semana", "hoje",
];

static FORUM_TERM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:f[oó]rum|relat[oó]rio|recibo)\s+(.+)").unwrap());

static POSSESSIVE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(do|da|de)\s+").unwrap());

static MONTH_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})\s*[/\-]\s*(\d{2,4})").unwrap());

// =============================================================================
// EXTRACTION
// =============================================================================

/// Extract the entities relevant to `intent` from a raw message.
///
/// `today` is the business-local date, used for "hoje"/"agora".
pub fn extract(message: &str, intent: Intent, today: NaiveDate) -> Entities {
    let lower = message.to_lowercase();
    let normalized = normalize_message(message);
    let mut entities = Entities::default();

    match intent {
        Intent::FindItem | Intent::CheckLoan => {
            entities.item_name = item_name(&lower);
        }
        Intent::WaterReading => {
            if NOW_RE.is_match(&normalized) {
                entities.date = Some(today);
            }
            if MORNING_RE.is_match(&normalized) {
                entities.time_slot = Some(ReadingSlot::Morning);
            }
            if AFTERNOON_RE.is_match(&normalized) {
                entities.time_slot = Some(ReadingSlot::Afternoon);
            }
            if normalized.contains("aviario") {
                entities.tank = Some(Tank::Aviarios);
            }
            if normalized.contains("recria") {
                entities.tank = Some(Tank::Recria);
            }
        }
        Intent::WaterHtmlReport => {
            entities.report_month = report_month(&lower);
        }
        Intent::ListInvoices | Intent::CreateInvoice => {
            if let Some(company) = company_name(&lower) {
                entities.company = Some(company);
                entities.detailed = true;
            }
        }
        Intent::TechnicianStats => {
            entities.technician = TECHNICIAN_RES
                .iter()
                .filter_map(|re| re.captures(&lower))
                .filter_map(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
                .find(|name| !name.is_empty() && !NOT_A_NAME.contains(&name.as_str()));

            if normalized.contains("hoje") {
                entities.period = Some(Period::Today);
            } else if normalized.contains("mes") || normalized.contains("mensal") {
                entities.period = Some(Period::Month);
            } else if normalized.contains("semana") {
                entities.period = Some(Period::Week);
            }
            // A leaderboard word wins over any captured name or period word
            if ["destaque", "ranking", "todos"]
                .iter()
                .any(|w| normalized.contains(w))
            {
                entities.ranking = true;
                entities.technician = None;
            }
        }
        Intent::Forum => {
            if let Some(term) = forum_term(&lower) {
                entities.search_term = Some(term);
                entities.detailed = true;
            }
        }
        _ => {}
    }

    entities
}

fn item_name(lower: &str) -> Option<String> {
    let stripped = PUNCTUATION_RE.replace_all(lower, "");
    let stripped = ITEM_STOP_RE.replace_all(&stripped, " ");
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    let name = LEADING_ARTICLE_RE.replace(&collapsed, "").trim().to_string();
    (!name.is_empty()).then_some(name)
}

fn company_name(lower: &str) -> Option<String> {
    let caps = INVOICE_COMPANY_RE
        .captures(lower)
        .or_else(|| BILL_COMPANY_RE.captures(lower))?;
    let mut company = caps.get(1)?.as_str().trim().to_string();
    loop {
        let next = COMPANY_PREFIX_RE.replace(&company, "").trim().to_string();
        if next == company {
            break;
        }
        company = next;
    }
    (company.chars().count() > 2).then_some(company)
}

fn forum_term(lower: &str) -> Option<String> {
    let caps = FORUM_TERM_RE.captures(lower)?;
    let raw = caps.get(1)?.as_str().trim();
    let term = POSSESSIVE_RE.replace(raw, "").trim().to_string();
    (term.chars().count() > 1).then_some(term)
}

/// `MM/YY` or `MM/YYYY`; two-digit years are in the 2000s
fn report_month(lower: &str) -> Option<YearMonth> {
    let caps = MONTH_YEAR_RE.captures(lower)?;
    let month: u32 = caps.get(1)?.as_str().parse().ok()?;
    let mut year: i32 = caps.get(2)?.as_str().parse().ok()?;
    if year < 100 {
        year += 2000;
    }
    YearMonth::new(year, month)
}
