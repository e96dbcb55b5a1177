//! Integration tests for tally-core
//!
//! These tests exercise the full tag → query → report workflow.

use chrono::NaiveDate;
use tally_core::{
    config::TallyConfig,
    insights::InsightEngine,
    models::{Category, ExpenseRecord},
    query::{Aggregation, QueryInterpreter},
    trend::{fit, forecast, TimeSeries},
    Categorizer, DateRange, Error, Granularity,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Uncategorized records as they arrive from the record store
/// - January through March 2024
/// - Descriptions covering most default categories
/// - One record no keyword matches
fn untagged_records() -> Vec<ExpenseRecord> {
    vec![
        ExpenseRecord::new(1, "Starbucks coffee", 6.5, d(2024, 1, 3)),
        ExpenseRecord::new(2, "Uber ride to airport", 32.0, d(2024, 1, 9)),
        ExpenseRecord::new(3, "Monthly rent payment", 1200.0, d(2024, 1, 31)),
        ExpenseRecord::new(4, "Grocery store run", 85.25, d(2024, 2, 4)),
        ExpenseRecord::new(5, "Netflix", 15.99, d(2024, 2, 12)),
        ExpenseRecord::new(6, "Pharmacy prescription", 22.0, d(2024, 2, 19)),
        ExpenseRecord::new(7, "McDonald's", 9.75, d(2024, 2, 27)),
        ExpenseRecord::new(8, "Hotel booking Lisbon", 480.0, d(2024, 3, 2)),
        ExpenseRecord::new(9, "Gas station fill-up", 55.0, d(2024, 3, 6)),
        ExpenseRecord::new(10, "Pizza delivery", 24.0, d(2024, 3, 11)),
        ExpenseRecord::new(11, "zzq 4471", 3.0, d(2024, 3, 12)),
    ]
}

/// Apply category proposals the way a record store would
fn tag_all(categorizer: &Categorizer, records: &[ExpenseRecord]) -> Vec<ExpenseRecord> {
    let proposals = categorizer.propose_categories(records);
    records
        .iter()
        .map(|record| {
            match proposals.iter().find(|p| p.record_id == record.id) {
                Some(p) => record.clone().with_category(p.result.category.clone()),
                None => record.clone(),
            }
        })
        .collect()
}

// =============================================================================
// Categorization Workflow
// =============================================================================

#[test]
fn test_tagging_workflow() {
    let categorizer = Categorizer::builtin();
    let records = untagged_records();

    let proposals = categorizer.propose_categories(&records);
    // everything except the unmatched record gets a proposal
    assert_eq!(proposals.len(), 10);
    assert!(proposals.iter().all(|p| p.result.confidence > 0.0));

    let tagged = tag_all(&categorizer, &records);
    let category_of = |id: i64| tagged.iter().find(|r| r.id == id).unwrap().category.clone();

    assert_eq!(category_of(1), Category::named("Food"));
    assert_eq!(category_of(2), Category::named("Transportation"));
    assert_eq!(category_of(3), Category::named("Bills"));
    assert_eq!(category_of(6), Category::named("Healthcare"));
    assert_eq!(category_of(7), Category::named("Food"));
    assert_eq!(category_of(8), Category::named("Travel"));
    assert!(category_of(11).is_uncategorized());

    // tagged records are skipped; the leftover still matches nothing
    let again = categorizer.propose_categories(&tagged);
    assert!(again.is_empty());
}

#[test]
fn test_config_override_changes_categorization() {
    let config = TallyConfig::from_toml_str(
        r#"
        [[categories]]
        name = "Pets"
        keywords = ["vet", "kibble"]
        "#,
    )
    .unwrap();
    let categorizer = Categorizer::new(config.taxonomy);

    let result = categorizer.categorize("Vet visit for Rex");
    assert_eq!(result.category, Category::named("Pets"));

    // defaults survive the override
    let result = categorizer.categorize("Uber ride to airport");
    assert_eq!(result.category, Category::named("Transportation"));
}

// =============================================================================
// Query Workflow
// =============================================================================

#[test]
fn test_query_workflow() {
    let categorizer = Categorizer::builtin();
    let records = tag_all(&categorizer, &untagged_records());
    let interpreter = QueryInterpreter::new(categorizer);
    let now = d(2024, 3, 20);

    let query = interpreter.parse("total spent on food last month", now);
    assert_eq!(query.category_filter, Some(Category::named("Food")));
    assert_eq!(query.aggregation, Aggregation::Sum);
    assert_eq!(query.date_range, Some(DateRange::month_of(d(2024, 2, 1))));

    let answer = query.execute(&records);
    assert_eq!(answer.record_count, 2);
    assert_eq!(answer.value, Some(85.25 + 9.75));

    let answer = interpreter
        .parse("how many expenses this month", now)
        .execute(&records);
    assert_eq!(answer.value, Some(4.0));

    let answer = interpreter
        .parse("biggest expense between 2024-01-01 and 2024-01-31", now)
        .execute(&records);
    assert_eq!(answer.aggregation, Aggregation::Max);
    assert_eq!(answer.value, Some(1200.0));
}

#[test]
fn test_unparseable_query_covers_everything() {
    let records = untagged_records();
    let interpreter = QueryInterpreter::default();

    let query = interpreter.parse("asdkj qwoe", d(2024, 3, 20));
    assert!(query.is_degraded());

    let answer = query.execute(&records);
    assert_eq!(answer.record_count, records.len());
}

// =============================================================================
// Trend and Report Workflow
// =============================================================================

#[test]
fn test_trend_forecast_from_totals() {
    let series = TimeSeries::from_totals(d(2024, 1, 1), Granularity::Monthly, &[100.0, 200.0, 300.0]);
    let model = fit(&series).unwrap();

    assert_eq!(model.slope, 100.0);
    assert_eq!(model.intercept, 100.0);
    assert_eq!(model.r_squared, 1.0);
    assert_eq!(forecast(&model, 1).unwrap(), vec![400.0]);

    let short = TimeSeries::from_totals(d(2024, 1, 1), Granularity::Monthly, &[100.0]);
    assert!(matches!(fit(&short), Err(Error::InsufficientData(_))));
    assert!(matches!(forecast(&model, 0), Err(Error::InvalidInput(_))));
}

#[test]
fn test_report_workflow() {
    let categorizer = Categorizer::builtin();
    let records = tag_all(&categorizer, &untagged_records());
    let engine = InsightEngine::new();

    let report = engine.summarize(&records, d(2024, 3, 20));

    let total: f64 = records.iter().map(|r| r.amount).sum();
    assert!((report.total_spend - total).abs() < 1e-9);
    assert_eq!(report.top_category, Some(Category::named("Bills")));
    assert_eq!(report.series.len(), 3);
    assert_eq!(report.trend, Some(fit(&report.series).unwrap()));

    let delta = report.current_month_spend - report.previous_month_spend;
    assert!((report.month_over_month_delta - delta).abs() < 1e-9);

    // the rent payment dwarfs everything else
    assert_eq!(report.outliers.len(), 1);
    assert_eq!(report.outliers[0].record.id, 3);
}

#[test]
fn test_outlier_example() {
    let records: Vec<ExpenseRecord> = [10.0, 10.0, 10.0, 10.0, 1000.0]
        .iter()
        .enumerate()
        .map(|(i, amount)| ExpenseRecord::new(i as i64 + 1, "x", *amount, d(2024, 3, 1)))
        .collect();

    let report = InsightEngine::new().summarize(&records, d(2024, 3, 20));
    let flagged: Vec<f64> = report.outliers.iter().map(|o| o.record.amount).collect();
    assert_eq!(flagged, vec![1000.0]);
}
