//! Display formatting helpers
//!
//! Amounts are shown in CFA francs with space-grouped thousands, dates in
//! day/month/year order, as the portal's French-speaking users expect.

use chrono::{DateTime, NaiveDate, Utc};

/// Currency suffix for amounts.
pub const CURRENCY: &str = "FCFA";

const ELLIPSIS: &str = "...";

/// Format a whole-franc amount, e.g. `1 250 000 FCFA`.
pub fn format_currency(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(digit);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("{sign}{grouped} {CURRENCY}")
}

/// Format a calendar date as `dd/mm/yyyy`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Format a timestamp as `dd/mm/yyyy HH:MM` (UTC).
pub fn format_datetime(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%d/%m/%Y %H:%M").to_string()
}

/// Shorten `text` to at most `max_chars` characters, ending with `...` when cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars < ELLIPSIS.len() {
        return ELLIPSIS.chars().take(max_chars).collect();
    }
    let keep = max_chars - ELLIPSIS.len();
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}
