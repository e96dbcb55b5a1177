//! Keyword categorizer for expense descriptions
//!
//! Every keyword of a category contributes at most once to its score:
//! 1.0 when it matches whole tokens of the normalized description (multi-word
//! keywords must match a run of consecutive tokens), 0.5 when it only occurs
//! inside a longer word ("gas" in "vegas"). The best score wins; equal scores
//! go to the category declared first.
//!
//! Confidence is `score / (score + 1)`: monotonic in the score, never 1, and
//! exactly 0 only for the Uncategorized result.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{CategorizationResult, Category, CategoryProposal, ExpenseRecord};
use crate::taxonomy::{CategoryKeywords, CategoryTaxonomy};
use crate::text::normalize;

const WHOLE_TOKEN_WEIGHT: f64 = 1.0;
const SUBSTRING_WEIGHT: f64 = 0.5;

/// Score of one category against one description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: String,
    pub score: f64,
    pub matched_keywords: BTreeSet<String>,
}

/// Stateless categorizer over an injected taxonomy
#[derive(Debug, Clone)]
pub struct Categorizer {
    taxonomy: CategoryTaxonomy,
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Categorizer {
    pub fn new(taxonomy: CategoryTaxonomy) -> Self {
        Self { taxonomy }
    }

    /// Categorizer over the built-in default taxonomy
    pub fn builtin() -> Self {
        Self::new(CategoryTaxonomy::builtin())
    }

    pub fn taxonomy(&self) -> &CategoryTaxonomy {
        &self.taxonomy
    }

    /// Categorize a free-text description
    ///
    /// Never fails: empty or unmatched text yields Uncategorized with
    /// confidence 0.0.
    pub fn categorize(&self, description: &str) -> CategorizationResult {
        let scores = self.score_categories(description);
        best_of(scores)
    }

    /// Score every category in declaration order (zero scores included)
    pub fn score_categories(&self, description: &str) -> Vec<CategoryScore> {
        let normalized = normalize(description);
        let tokens: Vec<&str> = normalized.split(' ').filter(|t| !t.is_empty()).collect();

        self.taxonomy
            .categories()
            .iter()
            .map(|category| score_category(category, &normalized, &tokens))
            .collect()
    }

    /// Look up category mentions in already-tokenized text
    ///
    /// Only whole-token matches count here, and a token equal to the
    /// category's own name ("food", "bills") counts as a keyword. Used by the
    /// query interpreter, where substring hits on short question words would
    /// be noise. Returns None when nothing matches.
    pub fn match_tokens(&self, tokens: &[String]) -> Option<CategorizationResult> {
        let tokens: Vec<&str> = tokens.iter().map(String::as_str).collect();

        let scores = self
            .taxonomy
            .categories()
            .iter()
            .map(|category| {
                let mut candidates = category.keywords.clone();
                let name = normalize(&category.name);
                if !name.is_empty() {
                    candidates.insert(name);
                }

                let matched: BTreeSet<String> = candidates
                    .into_iter()
                    .filter(|keyword| contains_token_run(&tokens, keyword))
                    .collect();

                CategoryScore {
                    category: category.name.clone(),
                    score: matched.len() as f64 * WHOLE_TOKEN_WEIGHT,
                    matched_keywords: matched,
                }
            })
            .collect();

        let result = best_of(scores);
        result.is_match().then_some(result)
    }

    /// Suggest categories for records that do not have one yet
    ///
    /// Records that already carry a category are left alone, as are records
    /// whose description matches nothing.
    pub fn propose_categories(&self, records: &[ExpenseRecord]) -> Vec<CategoryProposal> {
        let mut processed = 0usize;
        let proposals: Vec<CategoryProposal> = records
            .iter()
            .filter(|r| r.category.is_uncategorized())
            .filter_map(|record| {
                processed += 1;
                let result = self.categorize(&record.description);
                result.is_match().then(|| CategoryProposal {
                    record_id: record.id,
                    result,
                })
            })
            .collect();

        debug!(
            total = records.len(),
            processed,
            proposed = proposals.len(),
            "Category proposals complete"
        );
        proposals
    }
}

fn score_category(category: &CategoryKeywords, normalized: &str, tokens: &[&str]) -> CategoryScore {
    let mut score = 0.0;
    let mut matched = BTreeSet::new();

    for keyword in &category.keywords {
        let weight = if contains_token_run(tokens, keyword) {
            WHOLE_TOKEN_WEIGHT
        } else if normalized.contains(keyword.as_str()) {
            SUBSTRING_WEIGHT
        } else {
            continue;
        };
        score += weight;
        matched.insert(keyword.clone());
    }

    CategoryScore {
        category: category.name.clone(),
        score,
        matched_keywords: matched,
    }
}

/// True if the (normalized, space-separated) keyword appears as consecutive tokens
fn contains_token_run(tokens: &[&str], keyword: &str) -> bool {
    let parts: Vec<&str> = keyword.split(' ').filter(|p| !p.is_empty()).collect();
    if parts.is_empty() || parts.len() > tokens.len() {
        return false;
    }
    tokens.windows(parts.len()).any(|w| w == parts.as_slice())
}

/// Highest score wins; strict comparison keeps the first-declared on ties
fn best_of(scores: Vec<CategoryScore>) -> CategorizationResult {
    let mut best: Option<CategoryScore> = None;
    for candidate in scores {
        if candidate.score <= 0.0 {
            continue;
        }
        match &best {
            Some(current) if candidate.score <= current.score => {}
            _ => best = Some(candidate),
        }
    }

    match best {
        Some(best) => CategorizationResult {
            category: Category::Named(best.category),
            confidence: best.score / (best.score + 1.0),
            matched_keywords: best.matched_keywords,
            score: best.score,
        },
        None => CategorizationResult::uncategorized(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::tokenize;

    fn categorizer() -> Categorizer {
        Categorizer::builtin()
    }

    #[test]
    fn test_uber_ride_is_transportation() {
        let result = categorizer().categorize("Uber ride to airport");
        assert_eq!(result.category, Category::named("Transportation"));
        assert!(result.confidence > 0.0);
        assert!(result.matched_keywords.contains("uber"));
    }

    #[test]
    fn test_no_letters_is_uncategorized() {
        let result = categorizer().categorize("???");
        assert_eq!(result, CategorizationResult::uncategorized());

        let result = categorizer().categorize("   ");
        assert!(result.category.is_uncategorized());
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_case_insensitive_and_deterministic() {
        let c = categorizer();
        let a = c.categorize("GROCERY store");
        let b = c.categorize("grocery STORE");
        assert_eq!(a, b);
        assert_eq!(a, c.categorize("GROCERY store"));
    }

    #[test]
    fn test_multi_word_keyword_beats_single() {
        // "uber eats" + "delivery" (Food) outweigh "uber" (Transportation)
        let result = categorizer().categorize("Uber Eats delivery");
        assert_eq!(result.category, Category::named("Food"));
        assert_eq!(result.score, 2.0);
    }

    #[test]
    fn test_substring_match_weighs_half() {
        let mut taxonomy = CategoryTaxonomy::new();
        taxonomy.add_category("Transportation", ["gas"]).unwrap();
        let result = Categorizer::new(taxonomy).categorize("Vegas weekend");

        assert_eq!(result.category, Category::named("Transportation"));
        assert_eq!(result.score, 0.5);
        assert!((result.confidence - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_tie_goes_to_first_declared() {
        // "subscription" belongs to both Entertainment and Bills
        let result = categorizer().categorize("annual subscription");
        assert_eq!(result.category, Category::named("Entertainment"));

        let mut taxonomy = CategoryTaxonomy::new();
        taxonomy.add_category("Bills", ["subscription"]).unwrap();
        taxonomy.add_category("Entertainment", ["subscription"]).unwrap();
        let result = Categorizer::new(taxonomy).categorize("annual subscription");
        assert_eq!(result.category, Category::named("Bills"));
    }

    #[test]
    fn test_confidence_is_monotonic_in_score() {
        let c = categorizer();
        let one = c.categorize("pizza");
        let two = c.categorize("pizza delivery");
        assert!(two.score > one.score);
        assert!(two.confidence > one.confidence);
        assert!(two.confidence < 1.0);
        assert_eq!(one.confidence, 0.5);
    }

    #[test]
    fn test_apostrophes_are_dropped() {
        let result = categorizer().categorize("McDonald's");
        assert_eq!(result.category, Category::named("Food"));
        assert!(result.matched_keywords.contains("mcdonalds"));
    }

    #[test]
    fn test_score_categories_lists_every_category() {
        let scores = categorizer().score_categories("hotel booking");
        assert_eq!(scores.len(), 8);
        let travel = scores.iter().find(|s| s.category == "Travel").unwrap();
        assert_eq!(travel.score, 2.0);
    }

    #[test]
    fn test_match_tokens_uses_category_names() {
        let c = categorizer();
        let result = c.match_tokens(&tokenize("how much on bills")).unwrap();
        assert_eq!(result.category, Category::named("Bills"));

        let result = c.match_tokens(&tokenize("total spent on food")).unwrap();
        assert_eq!(result.category, Category::named("Food"));

        // "target" and "gas" as substrings do not count in token mode
        assert!(c.match_tokens(&tokenize("targeted vegas")).is_none());
    }

    #[test]
    fn test_propose_categories_skips_categorized() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let records = vec![
            ExpenseRecord::new(1, "Netflix", 15.0, date),
            ExpenseRecord::new(2, "Pharmacy", 20.0, date).with_category("Healthcare"),
            ExpenseRecord::new(3, "zzzz", 1.0, date),
        ];

        let proposals = categorizer().propose_categories(&records);
        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].record_id, 1);
        assert_eq!(
            proposals[0].result.category,
            Category::named("Entertainment")
        );
    }
}
