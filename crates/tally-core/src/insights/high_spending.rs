//! High Spending Insight
//!
//! Flags categories whose spend in the current calendar month exceeds a
//! multiple (`high_spending_ratio`, default 1.5) of the mean current-month
//! spend per category.

use crate::error::Result;

use super::engine::{AnalysisContext, Insight};
use super::types::{Finding, HighSpendingData, InsightType, Severity};

/// Insight that flags categories dominating this month's spending
pub struct HighSpendingInsight;

impl HighSpendingInsight {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HighSpendingInsight {
    fn default() -> Self {
        Self::new()
    }
}

impl Insight for HighSpendingInsight {
    fn id(&self) -> InsightType {
        InsightType::HighSpending
    }

    fn name(&self) -> &'static str {
        "High Spending"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Vec<Finding>> {
        let totals = ctx.category_totals(ctx.current_month);
        if totals.is_empty() {
            return Ok(vec![]);
        }

        let mean = totals.iter().map(|c| c.total).sum::<f64>() / totals.len() as f64;
        if mean <= 0.0 {
            return Ok(vec![]);
        }
        let threshold = mean * ctx.settings.high_spending_ratio;
        let month = ctx.current_month.start.format("%Y-%m");

        let findings = totals
            .into_iter()
            .filter(|c| c.total > threshold)
            .map(|c| {
                let ratio = c.total / mean;
                let severity = if ratio >= 2.0 * ctx.settings.high_spending_ratio {
                    Severity::Warning
                } else {
                    Severity::Attention
                };
                let data = HighSpendingData {
                    category: c.category.clone(),
                    amount: c.total,
                    category_mean: mean,
                    ratio,
                };

                Finding::new(
                    self.id(),
                    format!(
                        "high_spending:{}:{}",
                        c.category.as_str().to_lowercase(),
                        month
                    ),
                    severity,
                    "High Spending",
                    format!("High spending detected in {}", c.category),
                )
                .with_detail(format!(
                    "${:.2} spent in {} this month, {:.1}x the ${:.2} average per category",
                    c.total, c.category, ratio, mean
                ))
                .with_data(serde_json::to_value(data).unwrap_or_default())
            })
            .collect();

        Ok(findings)
    }
}
