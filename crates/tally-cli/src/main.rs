//! Tally CLI - Expense intelligence over a CSV snapshot
//!
//! Usage:
//!   tally categorize "Uber ride to airport"    Categorize a description
//!   tally tag --file expenses.csv               Propose categories
//!   tally query --file expenses.csv how much on food last month
//!   tally report --file expenses.csv            Spending report with insights
//!   tally forecast --file expenses.csv          Trend and forecast

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    let env = commands::Env::load(cli.config.as_deref(), cli.now.as_deref(), cli.json)?;

    match cli.command {
        Commands::Categorize {
            description,
            scores,
        } => commands::cmd_categorize(&env, &description.join(" "), scores),
        Commands::Tag { file, output } => commands::cmd_tag(&env, &file, output.as_deref()),
        Commands::Query {
            file,
            question,
            no_tag,
        } => commands::cmd_query(&env, &file, &question.join(" "), no_tag),
        Commands::Report { file, no_tag } => commands::cmd_report(&env, &file, no_tag),
        Commands::Forecast {
            file,
            steps,
            granularity,
            category,
            no_tag,
        } => commands::cmd_forecast(
            &env,
            &file,
            steps,
            granularity.as_deref(),
            category.as_deref(),
            no_tag,
        ),
        Commands::Taxonomy => commands::cmd_taxonomy(&env),
    }
}
