//! Spending trend model
//!
//! Records are bucketed into a gap-free [`TimeSeries`] (missing periods are
//! zero) and an ordinary least squares line is fitted over
//! `(period_index, amount)` with indices 0, 1, 2, ... in chronological order.
//!
//! Forecasts extrapolate the line and are returned as computed, negative
//! values included. A consumer that needs non-negative amounts must floor
//! them at zero itself.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{ExpenseRecord, TrendDataPoint};
use crate::period::{DateRange, Granularity};

/// Contiguous, chronologically ordered spending totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub granularity: Granularity,
    pub points: Vec<TrendDataPoint>,
}

impl TimeSeries {
    /// Bucket records into periods spanning the first to the last record
    pub fn from_records(records: &[ExpenseRecord], granularity: Granularity) -> Self {
        let (Some(first), Some(last)) = (
            records.iter().map(|r| r.date).min(),
            records.iter().map(|r| r.date).max(),
        ) else {
            return Self {
                granularity,
                points: Vec::new(),
            };
        };

        Self::build(granularity, first, last, records.iter())
    }

    /// Bucket the records inside `range`, covering every period of the range
    pub fn from_records_in(
        records: &[ExpenseRecord],
        granularity: Granularity,
        range: DateRange,
    ) -> Self {
        Self::build(
            granularity,
            range.start,
            range.end,
            records.iter().filter(|r| range.contains(r.date)),
        )
    }

    /// Build a series directly from consecutive period totals
    pub fn from_totals(start: NaiveDate, granularity: Granularity, totals: &[f64]) -> Self {
        let mut period = granularity.bucket_start(start);
        let mut points = Vec::with_capacity(totals.len());
        for &amount in totals {
            points.push(TrendDataPoint {
                period,
                amount,
                transaction_count: 0,
            });
            period = granularity.next_bucket(period);
        }
        Self {
            granularity,
            points,
        }
    }

    fn build<'a>(
        granularity: Granularity,
        from: NaiveDate,
        to: NaiveDate,
        records: impl Iterator<Item = &'a ExpenseRecord>,
    ) -> Self {
        let mut buckets: BTreeMap<NaiveDate, (f64, i64)> = BTreeMap::new();
        for record in records {
            let entry = buckets
                .entry(granularity.bucket_start(record.date))
                .or_insert((0.0, 0));
            entry.0 += record.amount;
            entry.1 += 1;
        }

        let last = granularity.bucket_start(to);
        let mut period = granularity.bucket_start(from);
        let mut points = Vec::new();
        while period <= last {
            let (amount, transaction_count) = buckets.get(&period).copied().unwrap_or((0.0, 0));
            points.push(TrendDataPoint {
                period,
                amount,
                transaction_count,
            });

            let next = granularity.next_bucket(period);
            if next <= period {
                break;
            }
            period = next;
        }

        Self {
            granularity,
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn amounts(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.amount).collect()
    }

    pub fn last_amount(&self) -> Option<f64> {
        self.points.last().map(|p| p.amount)
    }
}

/// Fitted linear trend: `amount = intercept + slope * period_index`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    /// Number of periods the line was fitted over
    pub periods: usize,
}

impl TrendFit {
    /// Flat projection at the last known value, for series too short to fit
    pub fn flat(last_value: f64, periods: usize) -> Self {
        Self {
            slope: 0.0,
            intercept: last_value,
            r_squared: 0.0,
            periods,
        }
    }

    /// Predicted amount at a period index
    pub fn predict(&self, index: f64) -> f64 {
        self.intercept + self.slope * index
    }
}

/// A forecast amount for a future period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub period: NaiveDate,
    pub amount: f64,
}

/// Fit an OLS line over the series
///
/// Fails with [`Error::InsufficientData`] for fewer than two periods.
pub fn fit(series: &TimeSeries) -> Result<TrendFit> {
    let n = series.len();
    if n < 2 {
        return Err(Error::InsufficientData(format!(
            "trend needs at least 2 periods, got {}",
            n
        )));
    }

    let ys = series.amounts();
    let nf = n as f64;
    let x_mean = (nf - 1.0) / 2.0;
    let y_mean = ys.iter().sum::<f64>() / nf;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (i, y) in ys.iter().enumerate() {
        let dx = i as f64 - x_mean;
        sxx += dx * dx;
        sxy += dx * (y - y_mean);
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let mut ss_tot = 0.0;
    let mut ss_res = 0.0;
    for (i, y) in ys.iter().enumerate() {
        let residual = y - (intercept + slope * i as f64);
        ss_res += residual * residual;
        ss_tot += (y - y_mean) * (y - y_mean);
    }

    let r_squared = if is_zero(ss_tot, &ys) {
        // Flat series: perfect fit if the line reproduces it exactly
        if is_zero(ss_res, &ys) {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    };

    debug!(periods = n, slope, intercept, r_squared, "Trend fitted");

    Ok(TrendFit {
        slope,
        intercept,
        r_squared,
        periods: n,
    })
}

/// Sum of squares negligible relative to the magnitude of the data
fn is_zero(sum_of_squares: f64, ys: &[f64]) -> bool {
    let scale: f64 = ys.iter().map(|y| y * y).sum::<f64>().max(1.0);
    sum_of_squares <= scale * 1e-18
}

/// Fit, falling back to a flat projection when there is not enough history
pub fn fit_or_flat(series: &TimeSeries) -> TrendFit {
    match fit(series) {
        Ok(model) => model,
        Err(e) => {
            debug!(error = %e, "Falling back to flat projection");
            TrendFit::flat(series.last_amount().unwrap_or(0.0), series.len())
        }
    }
}

/// Predict the next `steps_ahead` periods after the fitted ones
///
/// `steps_ahead` must be positive.
pub fn forecast(model: &TrendFit, steps_ahead: usize) -> Result<Vec<f64>> {
    if steps_ahead == 0 {
        return Err(Error::InvalidInput(
            "forecast steps must be a positive integer".to_string(),
        ));
    }

    let start = model.periods;
    Ok((start..start + steps_ahead)
        .map(|i| model.predict(i as f64))
        .collect())
}

/// Forecast paired with the start date of each future period
pub fn forecast_periods(
    series: &TimeSeries,
    model: &TrendFit,
    steps_ahead: usize,
) -> Result<Vec<ForecastPoint>> {
    let last = series
        .points
        .last()
        .ok_or_else(|| Error::InsufficientData("series is empty".to_string()))?;

    let amounts = forecast(model, steps_ahead)?;
    let mut period = last.period;
    Ok(amounts
        .into_iter()
        .map(|amount| {
            period = series.granularity.next_bucket(period);
            ForecastPoint { period, amount }
        })
        .collect())
}
