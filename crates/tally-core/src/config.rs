//! Configuration: category taxonomy and analysis thresholds
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for an override file (explicit path, or
//!    ~/.local/share/tally/config/tally.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! An override is applied on top of the embedded defaults. With
//! `inherit_defaults = true` (the default) its categories extend the built-in
//! taxonomy: keywords of an existing category are added to it and new
//! categories are appended. With `inherit_defaults = false` the override's
//! categories replace the taxonomy entirely.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::period::Granularity;
use crate::taxonomy::CategoryTaxonomy;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/tally.toml");

/// Thresholds used by the insight engine
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSettings {
    /// Bucket size for the spending trend
    pub granularity: Granularity,
    /// Outlier when amount >= mean + outlier_sigma * stddev
    pub outlier_sigma: f64,
    /// High spending when a category exceeds this multiple of the category mean
    pub high_spending_ratio: f64,
    /// Rising category when this month / last month exceeds this ratio
    pub rising_ratio: f64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            granularity: Granularity::Monthly,
            outlier_sigma: 2.0,
            high_spending_ratio: 1.5,
            rising_ratio: 1.3,
        }
    }
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct TallyConfig {
    pub taxonomy: CategoryTaxonomy,
    pub analysis: AnalysisSettings,
}

impl TallyConfig {
    /// The embedded default configuration
    pub fn builtin() -> Self {
        match parse_config(DEFAULT_CONFIG, None) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Embedded default config is invalid, using empty taxonomy");
                Self {
                    taxonomy: CategoryTaxonomy::new(),
                    analysis: AnalysisSettings::default(),
                }
            }
        }
    }

    /// Load configuration, checking the override location first
    ///
    /// `override_path` takes precedence over the default override location.
    /// A missing override file is not an error; the embedded defaults apply.
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        load_config(override_path)
    }

    /// Parse a config document applied on top of the embedded defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        parse_config(content, Some(Self::builtin()))
    }
}

impl Default for TallyConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("tally").join("config").join("tally.toml"))
}

/// Load configuration (override first, then default)
fn load_config(override_path: Option<&Path>) -> Result<TallyConfig> {
    let path = match override_path {
        Some(path) => {
            if !path.exists() {
                warn!(path = %path.display(), "Config file not found, using defaults");
            }
            Some(path.to_path_buf())
        }
        None => default_config_path(),
    };

    let base = TallyConfig::builtin();
    match path {
        Some(path) if path.exists() => {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read config {}: {}", path.display(), e))
            })?;
            info!(path = %path.display(), "Loaded config override");
            parse_config(&content, Some(base))
        }
        _ => {
            debug!("Using embedded default config");
            Ok(base)
        }
    }
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    inherit_defaults: Option<bool>,
    analysis: Option<RawAnalysis>,
    categories: Option<Vec<RawCategory>>,
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    granularity: Option<String>,
    outlier_sigma: Option<f64>,
    high_spending_ratio: Option<f64>,
    rising_ratio: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawCategory {
    name: String,
    #[serde(default)]
    keywords: Vec<String>,
}

/// Parse config from TOML content, optionally layered over `base`
fn parse_config(content: &str, base: Option<TallyConfig>) -> Result<TallyConfig> {
    let raw: RawConfig = toml::from_str(content)?;
    let inherit = raw.inherit_defaults.unwrap_or(true);

    let mut config = match base {
        Some(base) if inherit => base,
        Some(base) => TallyConfig {
            taxonomy: CategoryTaxonomy::new(),
            analysis: base.analysis,
        },
        None => TallyConfig {
            taxonomy: CategoryTaxonomy::new(),
            analysis: AnalysisSettings::default(),
        },
    };

    // Apply analysis thresholds
    if let Some(analysis) = raw.analysis {
        if let Some(granularity) = analysis.granularity {
            config.analysis.granularity = granularity.parse().map_err(Error::Config)?;
        }
        if let Some(sigma) = analysis.outlier_sigma {
            config.analysis.outlier_sigma = positive("analysis.outlier_sigma", sigma)?;
        }
        if let Some(ratio) = analysis.high_spending_ratio {
            config.analysis.high_spending_ratio = positive("analysis.high_spending_ratio", ratio)?;
        }
        if let Some(ratio) = analysis.rising_ratio {
            config.analysis.rising_ratio = positive("analysis.rising_ratio", ratio)?;
        }
    }

    // Apply categories (same name extends, new names append)
    for category in raw.categories.unwrap_or_default() {
        config
            .taxonomy
            .extend_category(&category.name, &category.keywords)
            .map_err(|e| Error::Config(format!("Invalid category '{}': {}", category.name, e)))?;
    }

    Ok(config)
}

fn positive(key: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(Error::Config(format!(
            "{} must be a positive number, got {}",
            key, value
        )))
    }
}
