//! Insight Engine - spending summaries and pluggable insights
//!
//! [`InsightEngine::summarize`] turns a set of expense records into a
//! [`Report`]: totals, the top category, the month-over-month change,
//! outliers, the spending trend and the findings of every registered
//! analyzer.
//!
//! ## Built-in Insight Types
//!
//! - **High Spending** - Categories far above the average category this month
//! - **Rising Category** - Categories growing sharply versus last month
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_core::insights::InsightEngine;
//!
//! let engine = InsightEngine::with_settings(config.analysis);
//! let report = engine.summarize(&records, today);
//! ```

pub mod engine;
pub mod high_spending;
pub mod rising_category;
pub mod stats;
pub mod types;

pub use engine::{AnalysisContext, Insight, InsightEngine};
pub use high_spending::HighSpendingInsight;
pub use rising_category::RisingCategoryInsight;
pub use types::{
    CategorySpending, Finding, HighSpendingData, InsightType, Outlier, Report,
    RisingCategoryData, Severity,
};
