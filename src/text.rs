//! Text normalization shared by trigger detection and intent matching
//!
//! - Lowercase conversion
//! - Unicode NFD decomposition
//! - Combining mark (accent) removal

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize a chat message for pattern matching.
///
/// # Examples
///
/// ```
/// use icarus_query::text::normalize_message;
///
/// assert_eq!(normalize_message("Consumo de ÁGUA do mês"), "consumo de agua do mes");
/// ```
pub fn normalize_message(s: &str) -> String {
    s.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Keep only the digits of a phone identifier
pub fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Phone number safe for logs (last four digits)
pub fn mask_phone(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().collect();
    if digits.len() <= 4 {
        return "*".repeat(digits.len());
    }
    let tail: String = digits[digits.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(digits.len() - 4), tail)
}
