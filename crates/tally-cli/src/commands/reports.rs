//! Report command implementations (report, forecast)

use std::path::Path;

use anyhow::{bail, Result};
use serde_json::json;
use tally_core::insights::InsightEngine;
use tally_core::trend::{fit_or_flat, forecast_periods, TimeSeries};
use tally_core::{Category, Granularity};

use super::core::{print_json, Env};
use super::{format_currency, format_percentage, truncate};

pub fn cmd_report(env: &Env, file: &Path, no_tag: bool) -> Result<()> {
    let records = env.records(file, no_tag)?;
    let engine = InsightEngine::with_settings(env.config.analysis.clone());
    let report = engine.summarize(&records, env.now);

    if env.json {
        return print_json(&report);
    }

    println!();
    println!("📊 Spending Report (as of {})", env.now);
    println!("   ─────────────────────────────────────────────────────────────");

    if records.is_empty() {
        println!("   No expenses found.");
        return Ok(());
    }

    println!("   Total spend:     {}", format_currency(report.total_spend));
    if let Some(ref top) = report.top_category {
        println!("   Top category:    {}", top);
    }
    println!(
        "   This month:      {} ({} vs last month, {})",
        format_currency(report.current_month_spend),
        format_signed_currency(report.month_over_month_delta),
        format_percentage(report.month_over_month_percent)
    );
    println!(
        "   Last month:      {}",
        format_currency(report.previous_month_spend)
    );

    // Category breakdown
    println!();
    println!(
        "   {:25} │ {:>12} │ {:>6} │ {:>5}",
        "Category", "Amount", "%", "Count"
    );
    println!("   ──────────────────────────┼──────────────┼────────┼───────");
    for cat in &report.by_category {
        let name = if cat.category.is_uncategorized() {
            format!("\x1b[2m{:25}\x1b[0m", cat.category.as_str())
        } else {
            format!("{:25}", truncate(cat.category.as_str(), 25))
        };
        println!(
            "   {} │ {:>12} │ {:>5.1}% │ {:>5}",
            name,
            format_currency(cat.total),
            cat.share,
            cat.count
        );
    }

    // Trend
    println!();
    match report.trend {
        Some(trend) => {
            println!(
                "📈 Trend ({}): {} per period, r² {:.2} over {} periods",
                report.series.granularity,
                format_signed_currency(trend.slope),
                trend.r_squared,
                trend.periods
            );
            if let Some(next) = report.next_period_forecast {
                println!("   Next period forecast: {}", format_currency(next.max(0.0)));
            }
        }
        None => println!("📈 Trend: not enough history (need at least 2 periods)"),
    }

    if !report.outliers.is_empty() {
        println!();
        println!("⚠️  Unusual Expenses");
        for outlier in &report.outliers {
            println!(
                "   {} {:30} {:>10}  ({:.1}σ)",
                outlier.record.date,
                truncate(&outlier.record.description, 30),
                format_currency(outlier.record.amount),
                outlier.deviations
            );
        }
    }

    if !report.findings.is_empty() {
        println!();
        println!("💡 Insights");
        for finding in &report.findings {
            println!("   [{}] {}", finding.severity, finding.summary);
            if let Some(ref detail) = finding.detail {
                println!("      \x1b[2m{}\x1b[0m", detail);
            }
        }
    }

    Ok(())
}

pub fn cmd_forecast(
    env: &Env,
    file: &Path,
    steps: usize,
    granularity: Option<&str>,
    category: Option<&str>,
    no_tag: bool,
) -> Result<()> {
    let granularity = match granularity {
        Some(g) => g.parse::<Granularity>().map_err(anyhow::Error::msg)?,
        None => env.config.analysis.granularity,
    };

    let mut records = env.records(file, no_tag)?;
    let category = category.map(Category::from);
    if let Some(ref category) = category {
        records.retain(|r| r.category.same_as(category));
    }

    let series = TimeSeries::from_records(&records, granularity);
    if series.is_empty() {
        bail!("Cannot forecast without any matching expenses");
    }
    let model = fit_or_flat(&series);
    let points = forecast_periods(&series, &model, steps)?;

    if env.json {
        return print_json(&json!({
            "series": series,
            "trend": model,
            "forecast": points,
        }));
    }

    println!();
    match category {
        Some(ref c) => println!("📈 Spending Forecast: {} ({})", c, granularity),
        None => println!("📈 Spending Forecast ({})", granularity),
    }
    println!("   ─────────────────────────────────────────────────────────────");
    if series.len() < 2 {
        println!("   \x1b[2mOnly one period of history; projecting it flat.\x1b[0m");
    } else {
        println!(
            "   Slope {} per period, intercept {}, r² {:.2}",
            format_signed_currency(model.slope),
            format_currency(model.intercept),
            model.r_squared
        );
    }

    println!();
    println!("   {:12} │ {:>12} │ {:>5}", "Period", "Amount", "Count");
    println!("   ─────────────┼──────────────┼───────");
    for point in &series.points {
        println!(
            "   {:12} │ {:>12} │ {:>5}",
            point.period.to_string(),
            format_currency(point.amount),
            point.transaction_count
        );
    }
    println!("   ─────────────┼──────────────┼───────");
    for point in &points {
        // Display floors at zero; the JSON output keeps the raw projection
        println!(
            "   {:12} │ {:>12} │ \x1b[2mforecast\x1b[0m",
            point.period.to_string(),
            format_currency(point.amount.max(0.0))
        );
    }

    Ok(())
}

fn format_signed_currency(amount: f64) -> String {
    if amount < 0.0 {
        format!("-{}", format_currency(-amount))
    } else {
        format!("+{}", format_currency(amount))
    }
}
