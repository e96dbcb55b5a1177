//! Tally Core Library
//!
//! Spending intelligence over a personal expense record store:
//! - Category taxonomy and keyword categorizer for expense descriptions
//! - Spending trend model (gap-free time series, least squares fit, forecast)
//! - Natural-language query interpreter for questions about spending
//! - Insight engine summarizing records into a report with findings
//! - Layered configuration (embedded defaults plus an optional override)
//!
//! Every operation is a pure function of its inputs. Nothing here reads the
//! clock or touches storage; callers pass records and a reference date in.

pub mod categorizer;
pub mod config;
pub mod error;
pub mod insights;
pub mod models;
pub mod period;
pub mod query;
pub mod taxonomy;
pub mod text;
pub mod trend;

/// Test utilities (record builders and sample data)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use categorizer::{Categorizer, CategoryScore};
pub use config::{AnalysisSettings, TallyConfig};
pub use error::{Error, Result};
pub use insights::{Finding, InsightEngine, Report, Severity};
pub use models::{
    CategorizationResult, Category, CategoryProposal, ExpenseRecord, TrendDataPoint,
    UNCATEGORIZED,
};
pub use period::{parse_reference_date, DateRange, Granularity};
pub use query::{Aggregation, ParsedQuery, QueryAnswer, QueryInterpreter};
pub use taxonomy::{CategoryKeywords, CategoryTaxonomy};
pub use trend::{fit, fit_or_flat, forecast, forecast_periods, ForecastPoint, TimeSeries, TrendFit};
