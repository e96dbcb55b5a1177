//! Data models for Tally

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Display name of the implicit fallback category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Expense category: a taxonomy category or the implicit fallback
///
/// Serializes as its display name. Parsing is lenient: "uncategorized" in any
/// case, "other" (the label older exports used) and the empty string all map
/// to [`Category::Uncategorized`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Named(String),
    #[default]
    Uncategorized,
}

impl Category {
    pub fn named(name: impl Into<String>) -> Self {
        Self::from(name.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Category::Named(name) => name,
            Category::Uncategorized => UNCATEGORIZED,
        }
    }

    pub fn is_uncategorized(&self) -> bool {
        matches!(self, Category::Uncategorized)
    }

    /// Case-insensitive comparison (store exports are not always consistent)
    pub fn same_as(&self, other: &Category) -> bool {
        match (self, other) {
            (Category::Named(a), Category::Named(b)) => a.to_lowercase() == b.to_lowercase(),
            (Category::Uncategorized, Category::Uncategorized) => true,
            _ => false,
        }
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case(UNCATEGORIZED)
            || trimmed.eq_ignore_ascii_case("other")
        {
            Category::Uncategorized
        } else {
            Category::Named(trimmed.to_string())
        }
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        c.as_str().to_string()
    }
}

impl FromStr for Category {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An expense as handed over by the record store
///
/// The store validates records before they reach the core (non-negative
/// amount, real date, non-empty description); nothing here re-checks that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: i64,
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub category: Category,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl ExpenseRecord {
    /// Create an uncategorized record; `created_at` defaults to midnight UTC of `date`
    pub fn new(id: i64, description: impl Into<String>, amount: f64, date: NaiveDate) -> Self {
        Self {
            id,
            description: description.into(),
            amount,
            category: Category::Uncategorized,
            date,
            created_at: date.and_time(chrono::NaiveTime::MIN).and_utc(),
        }
    }

    pub fn with_category(mut self, category: impl Into<Category>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

/// Outcome of categorizing one description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizationResult {
    pub category: Category,
    /// Match strength in [0, 1); not a probability
    pub confidence: f64,
    pub matched_keywords: BTreeSet<String>,
    /// Raw keyword score the confidence was derived from
    pub score: f64,
}

impl CategorizationResult {
    pub fn uncategorized() -> Self {
        Self {
            category: Category::Uncategorized,
            confidence: 0.0,
            matched_keywords: BTreeSet::new(),
            score: 0.0,
        }
    }

    pub fn is_match(&self) -> bool {
        !self.category.is_uncategorized()
    }
}

/// Category suggested for a stored record that has none yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryProposal {
    pub record_id: i64,
    pub result: CategorizationResult,
}

/// One bucket of a spending time series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendDataPoint {
    /// First day of the bucket
    pub period: NaiveDate,
    pub amount: f64,
    pub transaction_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parsing() {
        assert_eq!(Category::from("Food"), Category::Named("Food".to_string()));
        assert_eq!(Category::from("  Travel "), Category::named("Travel"));
        assert_eq!(Category::from("uncategorized"), Category::Uncategorized);
        assert_eq!(Category::from("Other"), Category::Uncategorized);
        assert_eq!(Category::from(""), Category::Uncategorized);
    }

    #[test]
    fn test_category_serializes_as_name() {
        let json = serde_json::to_string(&Category::named("Bills")).unwrap();
        assert_eq!(json, "\"Bills\"");

        let back: Category = serde_json::from_str("\"Uncategorized\"").unwrap();
        assert!(back.is_uncategorized());
    }

    #[test]
    fn test_category_same_as_ignores_case() {
        assert!(Category::named("food").same_as(&Category::named("Food")));
        assert!(!Category::named("Food").same_as(&Category::Uncategorized));
    }

    #[test]
    fn test_record_defaults() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let record = ExpenseRecord::new(1, "Coffee", 4.5, date);

        assert!(record.category.is_uncategorized());
        assert_eq!(record.created_at.date_naive(), date);

        let record = record.with_category("Food");
        assert_eq!(record.category, Category::named("Food"));
    }
}
