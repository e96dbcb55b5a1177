//! Statistical summaries over expense records

use std::collections::BTreeMap;

use crate::models::{Category, ExpenseRecord};

use super::types::{CategorySpending, Outlier};

/// Relative slack when comparing against the outlier threshold
const THRESHOLD_TOLERANCE: f64 = 1e-9;

/// Per-category totals, largest first; equal totals sort by name
///
/// Category names are grouped case-insensitively.
pub fn category_breakdown<'a>(
    records: impl IntoIterator<Item = &'a ExpenseRecord>,
) -> Vec<CategorySpending> {
    let mut groups: BTreeMap<String, CategorySpending> = BTreeMap::new();
    let mut grand_total = 0.0;

    for record in records {
        grand_total += record.amount;
        let entry = groups
            .entry(record.category.as_str().to_lowercase())
            .or_insert_with(|| CategorySpending {
                category: record.category.clone(),
                total: 0.0,
                count: 0,
                share: 0.0,
            });
        entry.total += record.amount;
        entry.count += 1;
    }

    let mut breakdown: Vec<CategorySpending> = groups
        .into_values()
        .map(|mut c| {
            c.share = if grand_total > 0.0 {
                c.total / grand_total * 100.0
            } else {
                0.0
            };
            c
        })
        .collect();

    breakdown.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category.as_str().cmp(b.category.as_str()))
    });
    breakdown
}

/// Category with the largest total, ties broken alphabetically
pub fn top_category(breakdown: &[CategorySpending]) -> Option<Category> {
    breakdown.first().map(|c| c.category.clone())
}

/// Records with `amount >= mean + sigma * stddev` (population stddev)
///
/// Fewer than two records, or no spread at all, yields no outliers.
pub fn find_outliers(records: &[ExpenseRecord], sigma: f64) -> Vec<Outlier> {
    if records.len() < 2 {
        return Vec::new();
    }

    let n = records.len() as f64;
    let mean = records.iter().map(|r| r.amount).sum::<f64>() / n;
    let variance = records
        .iter()
        .map(|r| (r.amount - mean) * (r.amount - mean))
        .sum::<f64>()
        / n;
    let stddev = variance.sqrt();
    if stddev <= 0.0 || !stddev.is_finite() {
        return Vec::new();
    }

    let threshold = mean + sigma * stddev;
    let slack = THRESHOLD_TOLERANCE * threshold.abs().max(1.0);

    let mut outliers: Vec<Outlier> = records
        .iter()
        .filter(|r| r.amount >= threshold - slack)
        .map(|r| Outlier {
            record: r.clone(),
            deviations: (r.amount - mean) / stddev,
        })
        .collect();

    outliers.sort_by(|a, b| {
        b.record
            .amount
            .partial_cmp(&a.record.amount)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.record.id.cmp(&b.record.id))
    });
    outliers
}

/// Percent change from `previous` to `current`
///
/// With nothing previously spent, any spending counts as a 100% increase.
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        if current > 0.0 {
            100.0
        } else {
            0.0
        }
    } else {
        (current - previous) / previous * 100.0
    }
}
