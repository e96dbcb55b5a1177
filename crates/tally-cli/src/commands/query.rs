//! Natural-language query command

use std::path::Path;

use anyhow::Result;
use serde_json::json;
use tally_core::{Aggregation, QueryInterpreter};

use super::core::{print_json, Env};
use super::{format_currency, truncate};

pub fn cmd_query(env: &Env, file: &Path, question: &str, no_tag: bool) -> Result<()> {
    let records = env.records(file, no_tag)?;
    let interpreter = QueryInterpreter::new(env.categorizer());

    let query = interpreter.parse(question, env.now);
    let answer = query.execute(&records);

    if env.json {
        return print_json(&json!({ "query": query, "answer": answer }));
    }

    println!();
    println!("🔎 {}", query.describe());
    println!("   ─────────────────────────────────────────────────────────────");
    if query.is_degraded() {
        println!("   \x1b[2mNo category, period or aggregation recognized; showing all records.\x1b[0m");
    }

    let value = match (answer.aggregation, answer.value) {
        (_, None) => "n/a".to_string(),
        (Aggregation::Count, Some(count)) => format!("{}", count as usize),
        (_, Some(amount)) => format_currency(amount),
    };
    println!("   {}: {}", answer.aggregation.label(), value);
    println!("   Matching expenses: {}", answer.record_count);

    if answer.records.is_empty() {
        return Ok(());
    }

    println!();
    println!(
        "   {:10} │ {:30} │ {:15} │ {:>10}",
        "Date", "Description", "Category", "Amount"
    );
    println!("   ───────────┼────────────────────────────────┼─────────────────┼───────────");
    for record in &answer.records {
        println!(
            "   {:10} │ {:30} │ {:15} │ {:>10}",
            record.date,
            truncate(&record.description, 30),
            truncate(record.category.as_str(), 15),
            format_currency(record.amount)
        );
    }
    if answer.record_count > answer.records.len() {
        println!(
            "   \x1b[2m... and {} more\x1b[0m",
            answer.record_count - answer.records.len()
        );
    }

    Ok(())
}
