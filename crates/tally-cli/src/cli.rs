//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Understand where your money goes
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Expense categorization, trends, queries and insights", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config override file (defaults to ~/.local/share/tally/config/tally.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Reference date for relative periods (YYYY-MM-DD, defaults to today)
    #[arg(long, global = true)]
    pub now: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Categorize an expense description
    Categorize {
        /// Description text (multiple words are joined)
        #[arg(required = true)]
        description: Vec<String>,

        /// Show the score of every category
        #[arg(long)]
        scores: bool,
    },

    /// Propose categories for uncategorized records
    Tag {
        /// Records CSV (id,date,description,amount[,category,created_at])
        #[arg(short, long)]
        file: PathBuf,

        /// Write the records with proposals applied to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Ask a question about your spending
    Query {
        /// Records CSV
        #[arg(short, long)]
        file: PathBuf,

        /// Question, e.g. "total spent on food last month"
        #[arg(required = true)]
        question: Vec<String>,

        /// Skip auto-tagging of uncategorized records
        #[arg(long)]
        no_tag: bool,
    },

    /// Summarize spending: totals, month over month, outliers, insights
    Report {
        /// Records CSV
        #[arg(short, long)]
        file: PathBuf,

        /// Skip auto-tagging of uncategorized records
        #[arg(long)]
        no_tag: bool,
    },

    /// Fit the spending trend and forecast upcoming periods
    Forecast {
        /// Records CSV
        #[arg(short, long)]
        file: PathBuf,

        /// Number of periods to forecast
        #[arg(short, long, default_value = "3")]
        steps: usize,

        /// Period size: monthly, weekly (defaults to the configured granularity)
        #[arg(short, long)]
        granularity: Option<String>,

        /// Only include records in this category
        #[arg(short, long)]
        category: Option<String>,

        /// Skip auto-tagging of uncategorized records
        #[arg(long)]
        no_tag: bool,
    },

    /// Show the category taxonomy in effect
    Taxonomy,
}
