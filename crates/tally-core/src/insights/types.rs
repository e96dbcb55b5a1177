//! Core types for the Insight Engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::{Category, ExpenseRecord};
use crate::trend::{TimeSeries, TrendFit};

/// Types of insights that can be generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
    /// A category takes an outsized share of this month's spending
    HighSpending,
    /// A category grew sharply compared to last month
    RisingCategory,
}

impl InsightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightType::HighSpending => "high_spending",
            InsightType::RisingCategory => "rising_category",
        }
    }
}

impl fmt::Display for InsightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InsightType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high_spending" => Ok(InsightType::HighSpending),
            "rising_category" => Ok(InsightType::RisingCategory),
            _ => Err(format!("Unknown insight type: {}", s)),
        }
    }
}

/// Severity level of an insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Worth attention but not urgent
    Attention,
    /// Should be addressed soon
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Attention => "attention",
            Severity::Warning => "warning",
        }
    }

    /// Numeric priority for sorting (higher = more urgent)
    pub fn priority(&self) -> u8 {
        match self {
            Severity::Attention => 1,
            Severity::Warning => 2,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attention" => Ok(Severity::Attention),
            "warning" => Ok(Severity::Warning),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

/// A finding produced by an insight analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Type of insight that generated this finding
    pub insight_type: InsightType,
    /// Unique key for deduplication (e.g., "high_spending:food:2024-03")
    pub key: String,
    /// How urgent/important this finding is
    pub severity: Severity,
    /// Short title for the finding (e.g., "High Spending")
    pub title: String,
    /// One-line summary (e.g., "High spending detected in Food")
    pub summary: String,
    /// Optional longer explanation with details
    pub detail: Option<String>,
    /// Insight-specific structured data
    pub data: serde_json::Value,
}

impl Finding {
    pub fn new(
        insight_type: InsightType,
        key: impl Into<String>,
        severity: Severity,
        title: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            insight_type,
            key: key.into(),
            severity,
            title: title.into(),
            summary: summary.into(),
            detail: None,
            data: serde_json::Value::Null,
        }
    }

    /// Add optional detail text
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Add structured data payload
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}

/// Data for high spending insight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighSpendingData {
    pub category: Category,
    pub amount: f64,
    /// Mean current-month spend across categories
    pub category_mean: f64,
    pub ratio: f64,
}

/// Data for rising category insight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RisingCategoryData {
    pub category: Category,
    pub current_amount: f64,
    pub previous_amount: f64,
    pub percent_change: f64,
}

/// Spending total for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpending {
    pub category: Category,
    pub total: f64,
    pub count: usize,
    /// Percentage of the overall total (0-100)
    pub share: f64,
}

/// A record flagged as unusually large
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outlier {
    pub record: ExpenseRecord,
    /// Standard deviations above the mean
    pub deviations: f64,
}

/// Summary of a set of expense records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Category with the largest total (ties alphabetical), None without records
    pub top_category: Option<Category>,
    pub total_spend: f64,
    pub current_month_spend: f64,
    pub previous_month_spend: f64,
    /// Current month total minus previous month total
    pub month_over_month_delta: f64,
    pub month_over_month_percent: f64,
    /// Largest first
    pub by_category: Vec<CategorySpending>,
    pub outliers: Vec<Outlier>,
    pub series: TimeSeries,
    /// None when the series has fewer than two periods
    pub trend: Option<TrendFit>,
    /// Unclamped; may be negative for a falling trend
    pub next_period_forecast: Option<f64>,
    pub findings: Vec<Finding>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insight_type_serialization() {
        assert_eq!(InsightType::HighSpending.as_str(), "high_spending");
        assert_eq!(
            InsightType::from_str("rising_category").unwrap(),
            InsightType::RisingCategory
        );
        assert!(InsightType::from_str("zombie").is_err());
    }

    #[test]
    fn test_severity_priority() {
        assert!(Severity::Warning.priority() > Severity::Attention.priority());
        assert_eq!("warning".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!("attention".parse::<Severity>().unwrap(), Severity::Attention);
        assert!("alert".parse::<Severity>().is_err());
    }

    #[test]
    fn test_finding_builder() {
        let finding = Finding::new(
            InsightType::HighSpending,
            "test:key",
            Severity::Warning,
            "Test Title",
            "Test summary",
        )
        .with_detail("More details here")
        .with_data(serde_json::json!({"amount": 10.0}));

        assert_eq!(finding.key, "test:key");
        assert_eq!(finding.detail.unwrap(), "More details here");
        assert_eq!(finding.data["amount"], 10.0);
    }
}
