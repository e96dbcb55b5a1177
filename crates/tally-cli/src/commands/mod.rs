//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `categorize` - Categorization commands (categorize, tag, taxonomy)
//! - `core` - Shared environment (config, reference date, JSON output)
//! - `query` - Natural-language query command
//! - `records` - CSV record snapshots (load, validate, write)
//! - `reports` - Report and forecast commands

pub mod categorize;
pub mod core;
pub mod query;
pub mod records;
pub mod reports;

// Re-export command functions for main.rs
pub use categorize::*;
pub use core::*;
pub use query::*;
pub use reports::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format an amount as dollars with thousands separators ("$1,234.56")
pub fn format_currency(amount: f64) -> String {
    let formatted = format!("{:.2}", amount.abs());
    let (whole, cents) = formatted.split_once('.').unwrap_or((&formatted, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}

/// Format a percentage with an explicit sign ("+12.5%")
pub fn format_percentage(percentage: f64) -> String {
    format!("{:+.1}%", percentage)
}
