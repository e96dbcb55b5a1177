//! Rising Category Insight
//!
//! Compares each category's current-month total against the previous
//! calendar month. A category is rising when both months have spending and
//! the current total exceeds `rising_ratio` (default 1.3) times the previous.

use crate::error::Result;

use super::engine::{AnalysisContext, Insight};
use super::stats::percent_change;
use super::types::{Finding, InsightType, RisingCategoryData, Severity};

/// Insight that flags month-over-month category growth
pub struct RisingCategoryInsight;

impl RisingCategoryInsight {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RisingCategoryInsight {
    fn default() -> Self {
        Self::new()
    }
}

impl Insight for RisingCategoryInsight {
    fn id(&self) -> InsightType {
        InsightType::RisingCategory
    }

    fn name(&self) -> &'static str {
        "Rising Category"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Vec<Finding>> {
        let current = ctx.category_totals(ctx.current_month);
        let previous = ctx.category_totals(ctx.previous_month);
        let month = ctx.current_month.start.format("%Y-%m");

        let mut findings = Vec::new();
        for cat in &current {
            let Some(prev) = previous.iter().find(|p| p.category.same_as(&cat.category)) else {
                continue;
            };
            if cat.total <= 0.0 || prev.total <= 0.0 {
                continue;
            }
            if cat.total <= prev.total * ctx.settings.rising_ratio {
                continue;
            }

            let change = percent_change(cat.total, prev.total);
            // Doubling or more
            let severity = if change >= 100.0 {
                Severity::Warning
            } else {
                Severity::Attention
            };
            let data = RisingCategoryData {
                category: cat.category.clone(),
                current_amount: cat.total,
                previous_amount: prev.total,
                percent_change: change,
            };

            findings.push(
                Finding::new(
                    self.id(),
                    format!(
                        "rising_category:{}:{}",
                        cat.category.as_str().to_lowercase(),
                        month
                    ),
                    severity,
                    "Rising Category",
                    format!("Spending in {} is increasing", cat.category),
                )
                .with_detail(format!(
                    "${:.2} this month vs ${:.2} last month ({:+.1}%)",
                    cat.total, prev.total, change
                ))
                .with_data(serde_json::to_value(data).unwrap_or_default()),
            );
        }

        Ok(findings)
    }
}
