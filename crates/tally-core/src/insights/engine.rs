//! Insight Engine - orchestrates statistics, trend and insight analyzers

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::config::AnalysisSettings;
use crate::models::ExpenseRecord;
use crate::period::DateRange;
use crate::trend::{fit, forecast, TimeSeries};
use crate::Result;

use super::stats::{category_breakdown, find_outliers, percent_change, top_category};
use super::types::{CategorySpending, Finding, InsightType, Report};
use super::{HighSpendingInsight, RisingCategoryInsight};

/// Context provided to insight analyzers
pub struct AnalysisContext<'a> {
    pub records: &'a [ExpenseRecord],
    /// Reference date all relative periods are resolved against
    pub now: NaiveDate,
    /// Whole calendar month containing `now`
    pub current_month: DateRange,
    /// Whole calendar month before `current_month`
    pub previous_month: DateRange,
    pub settings: &'a AnalysisSettings,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(records: &'a [ExpenseRecord], now: NaiveDate, settings: &'a AnalysisSettings) -> Self {
        Self {
            records,
            now,
            current_month: DateRange::month_of(now),
            previous_month: DateRange::previous_month(now),
            settings,
        }
    }

    /// Records dated inside `range`
    pub fn records_in(&self, range: DateRange) -> impl Iterator<Item = &'a ExpenseRecord> {
        self.records.iter().filter(move |r| range.contains(r.date))
    }

    pub fn total_in(&self, range: DateRange) -> f64 {
        self.records_in(range).map(|r| r.amount).sum()
    }

    /// Per-category totals inside `range`, largest first
    pub fn category_totals(&self, range: DateRange) -> Vec<CategorySpending> {
        category_breakdown(self.records_in(range))
    }
}

/// Trait for insight analyzers
pub trait Insight: Send + Sync {
    /// Unique identifier for this insight type
    fn id(&self) -> InsightType;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Analyze data and produce findings
    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Vec<Finding>>;
}

/// The main insight engine that orchestrates analysis
pub struct InsightEngine {
    insights: Vec<Box<dyn Insight>>,
    settings: AnalysisSettings,
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightEngine {
    /// Create a new insight engine with built-in insight types and default thresholds
    pub fn new() -> Self {
        Self::with_settings(AnalysisSettings::default())
    }

    /// Create an engine with built-in insight types and the given thresholds
    pub fn with_settings(settings: AnalysisSettings) -> Self {
        let mut engine = Self::without_insights(settings);

        // Register built-in insights
        engine.register(Box::new(HighSpendingInsight::new()));
        engine.register(Box::new(RisingCategoryInsight::new()));

        engine
    }

    /// Create an engine with no analyzers registered
    pub fn without_insights(settings: AnalysisSettings) -> Self {
        Self {
            insights: vec![],
            settings,
        }
    }

    /// Register an insight analyzer
    pub fn register(&mut self, insight: Box<dyn Insight>) {
        self.insights.push(insight);
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    /// Summarize records relative to `now`
    pub fn summarize(&self, records: &[ExpenseRecord], now: NaiveDate) -> Report {
        let ctx = AnalysisContext::new(records, now, &self.settings);

        let by_category = category_breakdown(records);
        let total_spend = records.iter().map(|r| r.amount).sum::<f64>();
        let current_month_spend = ctx.total_in(ctx.current_month);
        let previous_month_spend = ctx.total_in(ctx.previous_month);

        let series = TimeSeries::from_records(records, self.settings.granularity);
        let trend = match fit(&series) {
            Ok(model) => Some(model),
            Err(e) => {
                debug!(error = %e, "No trend for report");
                None
            }
        };
        let next_period_forecast = trend
            .as_ref()
            .and_then(|model| forecast(model, 1).ok())
            .and_then(|values| values.first().copied());

        let report = Report {
            top_category: top_category(&by_category),
            total_spend,
            current_month_spend,
            previous_month_spend,
            month_over_month_delta: current_month_spend - previous_month_spend,
            month_over_month_percent: percent_change(current_month_spend, previous_month_spend),
            by_category,
            outliers: find_outliers(records, self.settings.outlier_sigma),
            series,
            trend,
            next_period_forecast,
            findings: self.analyze_all(&ctx),
        };

        debug!(
            records = records.len(),
            outliers = report.outliers.len(),
            findings = report.findings.len(),
            "Report generated"
        );
        report
    }

    /// Run all insight analyzers and collect findings
    ///
    /// A failing analyzer is logged and skipped.
    pub fn analyze_all(&self, ctx: &AnalysisContext<'_>) -> Vec<Finding> {
        let mut all_findings = vec![];

        for insight in &self.insights {
            match insight.analyze(ctx) {
                Ok(findings) => {
                    debug!(
                        insight = insight.id().as_str(),
                        count = findings.len(),
                        "Insight analysis complete"
                    );
                    all_findings.extend(findings);
                }
                Err(e) => {
                    warn!(
                        insight = insight.id().as_str(),
                        error = %e,
                        "Insight analysis failed"
                    );
                }
            }
        }

        // Sort by severity (highest first), then by key
        all_findings.sort_by(|a, b| {
            b.severity
                .priority()
                .cmp(&a.severity.priority())
                .then_with(|| a.key.cmp(&b.key))
        });

        all_findings
    }

    /// Get list of registered insight types
    pub fn insight_types(&self) -> Vec<InsightType> {
        self.insights.iter().map(|i| i.id()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::insights::Severity;
    use crate::models::Category;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn record(id: i64, amount: f64, category: &str, date: NaiveDate) -> ExpenseRecord {
        ExpenseRecord::new(id, "x", amount, date).with_category(category)
    }

    struct FailingInsight;

    impl Insight for FailingInsight {
        fn id(&self) -> InsightType {
            InsightType::HighSpending
        }

        fn name(&self) -> &'static str {
            "Failing"
        }

        fn analyze(&self, _ctx: &AnalysisContext<'_>) -> Result<Vec<Finding>> {
            Err(Error::InsufficientData("nothing to see".to_string()))
        }
    }

    struct FixedInsight(Severity, &'static str);

    impl Insight for FixedInsight {
        fn id(&self) -> InsightType {
            InsightType::RisingCategory
        }

        fn name(&self) -> &'static str {
            "Fixed"
        }

        fn analyze(&self, _ctx: &AnalysisContext<'_>) -> Result<Vec<Finding>> {
            Ok(vec![Finding::new(self.id(), self.1, self.0, "t", "s")])
        }
    }

    #[test]
    fn test_engine_creation() {
        let engine = InsightEngine::new();
        let types = engine.insight_types();

        assert!(types.contains(&InsightType::HighSpending));
        assert!(types.contains(&InsightType::RisingCategory));
    }

    #[test]
    fn test_failing_analyzer_is_skipped_and_findings_sorted() {
        let mut engine = InsightEngine::without_insights(AnalysisSettings::default());
        engine.register(Box::new(FixedInsight(Severity::Attention, "b")));
        engine.register(Box::new(FailingInsight));
        engine.register(Box::new(FixedInsight(Severity::Warning, "z")));
        engine.register(Box::new(FixedInsight(Severity::Attention, "a")));

        let settings = AnalysisSettings::default();
        let ctx = AnalysisContext::new(&[], d(2024, 3, 20), &settings);
        let keys: Vec<String> = engine
            .analyze_all(&ctx)
            .into_iter()
            .map(|f| f.key)
            .collect();

        assert_eq!(keys, vec!["z", "a", "b"]);
    }

    #[test]
    fn test_summarize_empty() {
        let report = InsightEngine::new().summarize(&[], d(2024, 3, 20));
        assert_eq!(report.top_category, None);
        assert_eq!(report.total_spend, 0.0);
        assert_eq!(report.month_over_month_delta, 0.0);
        assert!(report.series.is_empty());
        assert_eq!(report.trend, None);
        assert_eq!(report.next_period_forecast, None);
        assert!(report.findings.is_empty());
    }

    #[test]
    fn test_summarize_month_over_month() {
        let records = vec![
            record(1, 100.0, "Food", d(2024, 1, 10)),
            record(2, 200.0, "Food", d(2024, 2, 10)),
            record(3, 250.0, "Travel", d(2024, 3, 5)),
            record(4, 50.0, "Food", d(2024, 3, 6)),
        ];
        let report = InsightEngine::new().summarize(&records, d(2024, 3, 20));

        assert_eq!(report.total_spend, 600.0);
        assert_eq!(report.top_category, Some(Category::named("Food")));
        assert_eq!(report.current_month_spend, 300.0);
        assert_eq!(report.previous_month_spend, 200.0);
        assert_eq!(report.month_over_month_delta, 100.0);
        assert_eq!(report.month_over_month_percent, 50.0);

        // 100, 200, 300 per month
        let trend = report.trend.unwrap();
        assert_eq!(trend, fit(&report.series).unwrap());
        assert_eq!(trend.slope, 100.0);
        assert_eq!(report.next_period_forecast, Some(400.0));
    }

    #[test]
    fn test_summarize_sample_dataset() {
        use crate::test_utils::{sample_now, sample_records};

        let report = InsightEngine::new().summarize(&sample_records(), sample_now());

        assert_eq!(report.total_spend, 1200.0);
        assert_eq!(report.top_category, Some(Category::named("Travel")));
        assert_eq!(report.series.amounts(), vec![300.0, 400.0, 500.0]);
        assert_eq!(report.next_period_forecast, Some(600.0));
        assert_eq!(report.outliers.len(), 1);
        assert_eq!(report.outliers[0].record.id, 12);

        let keys: Vec<&str> = report.findings.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["high_spending:travel:2024-03"]);
    }

    #[test]
    fn test_summarize_empty_previous_month() {
        let records = vec![record(1, 80.0, "Food", d(2024, 3, 2))];
        let report = InsightEngine::new().summarize(&records, d(2024, 3, 20));

        assert_eq!(report.previous_month_spend, 0.0);
        assert_eq!(report.month_over_month_delta, 80.0);
        assert_eq!(report.month_over_month_percent, 100.0);
        assert_eq!(report.trend, None);
    }
}
