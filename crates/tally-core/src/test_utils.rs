//! Test utilities for tally-core
//!
//! Record builders and a small sample dataset shared by unit tests and the
//! CLI's command tests.

use chrono::NaiveDate;

use crate::models::ExpenseRecord;

/// Parse a `YYYY-MM-DD` literal, panicking on typos in test data
pub fn date(text: &str) -> NaiveDate {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .unwrap_or_else(|e| panic!("bad test date {}: {}", text, e))
}

/// Uncategorized record
pub fn record(id: i64, description: &str, amount: f64, on: &str) -> ExpenseRecord {
    ExpenseRecord::new(id, description, amount, date(on))
}

/// Record with a category already assigned
pub fn categorized(
    id: i64,
    description: &str,
    amount: f64,
    category: &str,
    on: &str,
) -> ExpenseRecord {
    record(id, description, amount, on).with_category(category)
}

/// Reference date for [`sample_records`]
pub fn sample_now() -> NaiveDate {
    date("2024-03-20")
}

/// Three months of categorized spending ending in March 2024
///
/// Monthly totals are 300, 400 and 500. Travel is the top category thanks to
/// the 400.00 hotel booking, which is also the only outlier.
pub fn sample_records() -> Vec<ExpenseRecord> {
    vec![
        categorized(1, "Grocery store", 60.0, "Food", "2024-01-04"),
        categorized(2, "Electric bill", 90.0, "Bills", "2024-01-10"),
        categorized(3, "Pizza delivery", 25.0, "Food", "2024-01-18"),
        categorized(4, "Uber ride", 25.0, "Transportation", "2024-01-22"),
        categorized(5, "Netflix subscription", 100.0, "Entertainment", "2024-01-28"),
        categorized(6, "Grocery store", 80.0, "Food", "2024-02-03"),
        categorized(7, "Electric bill", 95.0, "Bills", "2024-02-10"),
        categorized(8, "Coffee", 5.0, "Food", "2024-02-14"),
        categorized(9, "Gas station", 40.0, "Transportation", "2024-02-20"),
        categorized(10, "Movie tickets", 180.0, "Entertainment", "2024-02-25"),
        categorized(11, "Grocery store", 45.0, "Food", "2024-03-02"),
        categorized(12, "Hotel booking", 400.0, "Travel", "2024-03-08"),
        categorized(13, "Coffee", 5.0, "Food", "2024-03-12"),
        categorized(14, "Lunch", 50.0, "Food", "2024-03-15"),
    ]
}

/// Render records as a CSV snapshot (`id,date,description,amount,category`)
pub fn to_csv(records: &[ExpenseRecord]) -> String {
    let mut out = String::from("id,date,description,amount,category\n");
    for r in records {
        let category = if r.category.is_uncategorized() {
            ""
        } else {
            r.category.as_str()
        };
        out.push_str(&format!(
            "{},{},\"{}\",{},{}\n",
            r.id,
            r.date,
            r.description.replace('"', "\"\""),
            r.amount,
            category
        ));
    }
    out
}
