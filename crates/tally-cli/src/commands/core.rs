//! Shared command environment: configuration, reference date, output mode

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use tally_core::{parse_reference_date, Categorizer, ExpenseRecord, TallyConfig};
use tracing::debug;

use super::records::{apply_proposals, load_records};

/// Everything a command needs besides its own arguments
pub struct Env {
    pub config: TallyConfig,
    /// Reference date for relative periods
    pub now: NaiveDate,
    pub json: bool,
}

impl Env {
    /// Resolve the config layers and the reference date
    pub fn load(config_path: Option<&Path>, now: Option<&str>, json: bool) -> Result<Self> {
        let config = TallyConfig::load(config_path).context("Failed to load configuration")?;
        let now = resolve_now(now)?;
        debug!(
            categories = config.taxonomy.len(),
            now = %now,
            "Environment ready"
        );
        Ok(Self { config, now, json })
    }

    pub fn categorizer(&self) -> Categorizer {
        Categorizer::new(self.config.taxonomy.clone())
    }

    /// Load records, tagging uncategorized ones unless `no_tag` is set
    pub fn records(&self, file: &Path, no_tag: bool) -> Result<Vec<ExpenseRecord>> {
        let records = load_records(file)?;
        if no_tag {
            return Ok(records);
        }
        let proposals = self.categorizer().propose_categories(&records);
        Ok(apply_proposals(records, &proposals))
    }
}

/// Parse `--now`, defaulting to today's local date
pub fn resolve_now(now: Option<&str>) -> Result<NaiveDate> {
    match now {
        Some(text) => Ok(parse_reference_date(text)?),
        None => Ok(Local::now().date_naive()),
    }
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
