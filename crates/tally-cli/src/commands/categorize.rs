//! Categorization commands (categorize, tag, taxonomy)

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;
use tracing::info;

use super::core::{print_json, Env};
use super::records::{apply_proposals, load_records, write_records};
use super::truncate;

pub fn cmd_categorize(env: &Env, description: &str, show_scores: bool) -> Result<()> {
    let categorizer = env.categorizer();
    let result = categorizer.categorize(description);

    if env.json {
        if show_scores {
            let scores = categorizer.score_categories(description);
            return print_json(&json!({ "result": result, "scores": scores }));
        }
        return print_json(&result);
    }

    println!();
    println!("🏷️  \"{}\"", truncate(description, 60));
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Category:   {}", result.category);
    println!("   Confidence: {:.2}", result.confidence);
    if !result.matched_keywords.is_empty() {
        let keywords: Vec<&str> = result.matched_keywords.iter().map(String::as_str).collect();
        println!("   Matched:    {}", keywords.join(", "));
    }

    if show_scores {
        println!();
        println!("   {:20} │ {:>6} │ Keywords", "Category", "Score");
        println!("   ─────────────────────┼────────┼──────────────────────────");
        for score in categorizer.score_categories(description) {
            let keywords: Vec<&str> = score.matched_keywords.iter().map(String::as_str).collect();
            println!(
                "   {:20} │ {:>6.1} │ {}",
                truncate(&score.category, 20),
                score.score,
                keywords.join(", ")
            );
        }
    }

    Ok(())
}

pub fn cmd_tag(env: &Env, file: &Path, output: Option<&Path>) -> Result<()> {
    let records = load_records(file)?;
    let categorizer = env.categorizer();
    let proposals = categorizer.propose_categories(&records);

    if let Some(output) = output {
        let tagged = apply_proposals(records.clone(), &proposals);
        let out = File::create(output)
            .with_context(|| format!("Failed to create {}", output.display()))?;
        write_records(out, &tagged)?;
        info!(
            path = %output.display(),
            tagged = proposals.len(),
            "Wrote tagged records"
        );
    }

    if env.json {
        return print_json(&proposals);
    }

    let uncategorized = records
        .iter()
        .filter(|r| r.category.is_uncategorized())
        .count();

    println!();
    println!("🏷️  Category Proposals");
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {} records, {} uncategorized, {} proposals",
        records.len(),
        uncategorized,
        proposals.len()
    );

    if proposals.is_empty() {
        return Ok(());
    }

    println!();
    println!(
        "   {:>5} │ {:30} │ {:15} │ {:>5}",
        "ID", "Description", "Category", "Conf"
    );
    println!("   ──────┼────────────────────────────────┼─────────────────┼──────");
    for proposal in &proposals {
        let description = records
            .iter()
            .find(|r| r.id == proposal.record_id)
            .map(|r| r.description.as_str())
            .unwrap_or("");
        println!(
            "   {:>5} │ {:30} │ {:15} │ {:>5.2}",
            proposal.record_id,
            truncate(description, 30),
            truncate(proposal.result.category.as_str(), 15),
            proposal.result.confidence
        );
    }

    Ok(())
}

pub fn cmd_taxonomy(env: &Env) -> Result<()> {
    let taxonomy = &env.config.taxonomy;

    if env.json {
        return print_json(taxonomy.categories());
    }

    println!();
    println!("📚 Categories");
    println!("   ─────────────────────────────────────────────────────────────");

    if taxonomy.is_empty() {
        println!("   No categories configured. Everything is Uncategorized.");
        return Ok(());
    }

    for category in taxonomy.categories() {
        let keywords: Vec<&str> = category.keywords.iter().map(String::as_str).collect();
        println!("   • {} ({})", category.name, keywords.len());
        println!("     \x1b[2m{}\x1b[0m", keywords.join(", "));
    }

    Ok(())
}
