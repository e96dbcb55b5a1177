//! Expense record snapshots in CSV form
//!
//! Columns: `id,date,description,amount` plus optional `category` and
//! `created_at` (RFC 3339). Dates are `YYYY-MM-DD` (or `YYYY/MM/DD`);
//! amounts may carry a `$` sign and thousands separators.
//!
//! The snapshot is the record store as far as the core is concerned, so
//! rows are validated here: a positive id, a real date, a non-empty
//! description of at most 200 characters and a non-negative amount.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use tally_core::period::parse_iso_date;
use tally_core::{Category, CategoryProposal, ExpenseRecord};
use tracing::debug;

const MAX_DESCRIPTION_LEN: usize = 200;

/// One CSV row as written on disk
#[derive(Debug, Deserialize, Serialize)]
struct CsvRecord {
    id: i64,
    date: String,
    description: String,
    amount: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

/// Load records from a CSV file
pub fn load_records(path: &Path) -> Result<Vec<ExpenseRecord>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open records file {}", path.display()))?;
    let records = read_records(file)
        .with_context(|| format!("Failed to read records from {}", path.display()))?;
    debug!(path = %path.display(), count = records.len(), "Loaded records");
    Ok(records)
}

/// Parse records from CSV data
pub fn read_records<R: Read>(reader: R) -> Result<Vec<ExpenseRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (index, row) in rdr.deserialize::<CsvRecord>().enumerate() {
        // header is line 1
        let line = index + 2;
        let row = row.with_context(|| format!("Malformed row on line {}", line))?;
        let record = to_record(row).with_context(|| format!("Invalid record on line {}", line))?;
        records.push(record);
    }
    Ok(records)
}

fn to_record(row: CsvRecord) -> Result<ExpenseRecord> {
    if row.id <= 0 {
        bail!("id must be positive, got {}", row.id);
    }

    let date = parse_iso_date(&row.date)
        .with_context(|| format!("Invalid date '{}' (use YYYY-MM-DD)", row.date))?;

    let description = row.description.trim();
    if description.is_empty() {
        bail!("description is empty");
    }
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        bail!("description is longer than {} characters", MAX_DESCRIPTION_LEN);
    }

    let amount = parse_amount(&row.amount)?;

    let mut record = ExpenseRecord::new(row.id, description, amount, date);
    if let Some(category) = row.category {
        record = record.with_category(Category::from(category));
    }
    if let Some(created_at) = row.created_at.filter(|s| !s.is_empty()) {
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .with_context(|| format!("Invalid created_at '{}' (use RFC 3339)", created_at))?
            .with_timezone(&Utc);
        record = record.with_created_at(created_at);
    }
    Ok(record)
}

/// Parse an amount, ignoring `$` and thousands separators
pub fn parse_amount(text: &str) -> Result<f64> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    let amount: f64 = cleaned
        .parse()
        .with_context(|| format!("Invalid amount '{}'", text))?;
    if !amount.is_finite() || amount < 0.0 {
        bail!("amount must be a non-negative number, got {}", text);
    }
    Ok(amount)
}

/// Apply proposals to the records they were made for
pub fn apply_proposals(
    records: Vec<ExpenseRecord>,
    proposals: &[CategoryProposal],
) -> Vec<ExpenseRecord> {
    records
        .into_iter()
        .map(|record| match proposals.iter().find(|p| p.record_id == record.id) {
            Some(p) if record.category.is_uncategorized() => {
                record.with_category(p.result.category.clone())
            }
            _ => record,
        })
        .collect()
}

/// Write records as CSV (uncategorized records get an empty category)
pub fn write_records<W: Write>(writer: W, records: &[ExpenseRecord]) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(writer);
    for record in records {
        wtr.serialize(CsvRecord {
            id: record.id,
            date: record.date.to_string(),
            description: record.description.clone(),
            amount: format!("{:.2}", record.amount),
            category: (!record.category.is_uncategorized())
                .then(|| record.category.as_str().to_string()),
            created_at: Some(record.created_at.to_rfc3339()),
        })
        .context("Failed to write CSV row")?;
    }
    wtr.flush().context("Failed to flush CSV output")?;
    Ok(())
}
