//! Constrained natural-language queries over expense records
//!
//! A sentence is run through three independent extractor rules:
//!
//! 1. **Category** - tokens looked up in the categorizer's keyword table
//! 2. **Date range** - relative and explicit date phrases resolved against `now`
//! 3. **Aggregation** - an ordered phrase table, first entry present wins;
//!    spending verbs ("spent", "how much") mean SUM only as a fallback
//!
//! Parsing never fails. Text no rule understands yields a degraded query
//! (no filters, SUM) which still executes over all records.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::categorizer::Categorizer;
use crate::models::{Category, ExpenseRecord};
use crate::period::{parse_date_range, DateRange};
use crate::text::tokenize;

/// Number of matched records returned with an answer
pub const PREVIEW_LIMIT: usize = 10;

/// How matched records are reduced to a single value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    #[default]
    Sum,
    Average,
    Count,
    Max,
    Min,
}

impl Aggregation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Average => "average",
            Self::Count => "count",
            Self::Max => "max",
            Self::Min => "min",
        }
    }

    /// Human-readable label for the aggregated value
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sum => "Total spending",
            Self::Average => "Average expense",
            Self::Count => "Number of expenses",
            Self::Max => "Highest expense",
            Self::Min => "Lowest expense",
        }
    }
}

impl FromStr for Aggregation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sum" | "total" => Ok(Self::Sum),
            "average" | "avg" | "mean" => Ok(Self::Average),
            "count" => Ok(Self::Count),
            "max" | "maximum" => Ok(Self::Max),
            "min" | "minimum" => Ok(Self::Min),
            _ => Err(format!(
                "Unknown aggregation: {} (valid: sum, average, count, max, min)",
                s
            )),
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Aggregation words, checked in order
const AGGREGATION_PHRASES: &[(Aggregation, &[&str])] = &[
    (Aggregation::Average, &["average", "avg", "mean"]),
    (Aggregation::Count, &["how many", "count", "number of"]),
    (
        Aggregation::Max,
        &["most", "highest", "max", "maximum", "biggest", "largest"],
    ),
    (
        Aggregation::Min,
        &["least", "lowest", "min", "minimum", "cheapest", "smallest"],
    ),
    (Aggregation::Sum, &["total", "sum"]),
];

/// Spending verbs that ask for a SUM only when no aggregation word is present
const SUM_FALLBACK_PHRASES: &[&str] = &["how much", "spent", "spend", "spending"];

/// Structured intent extracted from a sentence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedQuery {
    pub category_filter: Option<Category>,
    pub date_range: Option<DateRange>,
    pub aggregation: Aggregation,
    /// False when the aggregation is the SUM default rather than recognized
    #[serde(default)]
    pub explicit_aggregation: bool,
    pub raw_text: String,
}

impl ParsedQuery {
    /// The query a sentence degrades to when nothing is recognized
    pub fn degraded(raw_text: impl Into<String>) -> Self {
        Self {
            category_filter: None,
            date_range: None,
            aggregation: Aggregation::Sum,
            explicit_aggregation: false,
            raw_text: raw_text.into(),
        }
    }

    /// True when no rule recognized anything in the sentence
    pub fn is_degraded(&self) -> bool {
        self.category_filter.is_none() && self.date_range.is_none() && !self.explicit_aggregation
    }

    pub fn matches(&self, record: &ExpenseRecord) -> bool {
        let category_ok = self
            .category_filter
            .as_ref()
            .map_or(true, |c| c.same_as(&record.category));
        let date_ok = self.date_range.map_or(true, |r| r.contains(record.date));
        category_ok && date_ok
    }

    /// Filter and aggregate `records`
    pub fn execute(&self, records: &[ExpenseRecord]) -> QueryAnswer {
        let mut matched: Vec<&ExpenseRecord> = records.iter().filter(|r| self.matches(r)).collect();
        let record_count = matched.len();

        let value = match self.aggregation {
            Aggregation::Sum => Some(matched.iter().map(|r| r.amount).sum::<f64>()),
            Aggregation::Average if record_count == 0 => None,
            Aggregation::Average => {
                Some(matched.iter().map(|r| r.amount).sum::<f64>() / record_count as f64)
            }
            Aggregation::Count => Some(record_count as f64),
            Aggregation::Max => matched.iter().map(|r| r.amount).reduce(f64::max),
            Aggregation::Min => matched.iter().map(|r| r.amount).reduce(f64::min),
        };

        match self.aggregation {
            Aggregation::Max => matched.sort_by(|a, b| by_amount(b, a)),
            Aggregation::Min => matched.sort_by(|a, b| by_amount(a, b)),
            _ => matched.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id))),
        }

        debug!(
            aggregation = %self.aggregation,
            matched = record_count,
            "Query executed"
        );

        QueryAnswer {
            aggregation: self.aggregation,
            value,
            record_count,
            records: matched.into_iter().take(PREVIEW_LIMIT).cloned().collect(),
        }
    }

    /// One-line description, e.g. "Total spending on Food, 2024-02-01 to 2024-02-29"
    pub fn describe(&self) -> String {
        let mut text = self.aggregation.label().to_string();
        if let Some(category) = &self.category_filter {
            text.push_str(&format!(" on {}", category));
        }
        if let Some(range) = &self.date_range {
            text.push_str(&format!(", {}", range));
        }
        text
    }
}

fn by_amount(a: &ExpenseRecord, b: &ExpenseRecord) -> Ordering {
    a.amount
        .partial_cmp(&b.amount)
        .unwrap_or(Ordering::Equal)
        .then(a.id.cmp(&b.id))
}

/// Result of executing a [`ParsedQuery`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryAnswer {
    pub aggregation: Aggregation,
    /// None for average, max and min over no records
    pub value: Option<f64>,
    pub record_count: usize,
    /// Preview of matched records, ordered for the aggregation
    pub records: Vec<ExpenseRecord>,
}

/// Category rule
pub fn extract_category(categorizer: &Categorizer, tokens: &[String]) -> Option<Category> {
    categorizer.match_tokens(tokens).map(|result| result.category)
}

/// Date rule
pub fn extract_date_range(text: &str, now: NaiveDate) -> Option<DateRange> {
    parse_date_range(text, now)
}

/// Aggregation rule; None when neither an aggregation word nor a spending
/// verb is present
pub fn extract_aggregation(tokens: &[String]) -> Option<Aggregation> {
    let haystack = format!(" {} ", tokens.join(" "));
    let present = |phrase: &&str| haystack.contains(&format!(" {} ", phrase));

    AGGREGATION_PHRASES
        .iter()
        .find(|(_, phrases)| phrases.iter().any(present))
        .map(|(aggregation, _)| *aggregation)
        .or_else(|| SUM_FALLBACK_PHRASES.iter().any(present).then_some(Aggregation::Sum))
}

/// Parses sentences against a categorizer's keyword table
#[derive(Debug, Clone, Default)]
pub struct QueryInterpreter {
    categorizer: Categorizer,
}

impl QueryInterpreter {
    pub fn new(categorizer: Categorizer) -> Self {
        Self { categorizer }
    }

    pub fn parse(&self, sentence: &str, now: NaiveDate) -> ParsedQuery {
        let tokens = tokenize(sentence);
        let aggregation = extract_aggregation(&tokens);

        let query = ParsedQuery {
            category_filter: extract_category(&self.categorizer, &tokens),
            date_range: extract_date_range(sentence, now),
            aggregation: aggregation.unwrap_or_default(),
            explicit_aggregation: aggregation.is_some(),
            raw_text: sentence.to_string(),
        };

        debug!(
            category = ?query.category_filter.as_ref().map(Category::as_str),
            range = ?query.date_range.map(|r| r.to_string()),
            aggregation = %query.aggregation,
            degraded = query.is_degraded(),
            "Query parsed"
        );
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn now() -> NaiveDate {
        d(2024, 3, 20)
    }

    fn interpreter() -> QueryInterpreter {
        QueryInterpreter::default()
    }

    fn records() -> Vec<ExpenseRecord> {
        vec![
            ExpenseRecord::new(1, "Pizza", 20.0, d(2024, 2, 3)).with_category("Food"),
            ExpenseRecord::new(2, "Groceries", 80.0, d(2024, 2, 17)).with_category("Food"),
            ExpenseRecord::new(3, "Uber", 15.0, d(2024, 2, 20)).with_category("Transportation"),
            ExpenseRecord::new(4, "Coffee", 5.0, d(2024, 3, 2)).with_category("Food"),
        ]
    }

    #[test]
    fn test_parse_full_query() {
        let query = interpreter().parse("total spent on food last month", now());
        assert_eq!(query.category_filter, Some(Category::named("Food")));
        assert_eq!(query.aggregation, Aggregation::Sum);
        assert_eq!(
            query.date_range,
            Some(DateRange::new(d(2024, 2, 1), d(2024, 2, 29)))
        );
        assert!(!query.is_degraded());
    }

    #[test]
    fn test_gibberish_degrades() {
        let query = interpreter().parse("asdkj qwoe", now());
        assert_eq!(query.category_filter, None);
        assert_eq!(query.date_range, None);
        assert_eq!(query.aggregation, Aggregation::Sum);
        assert!(query.is_degraded());

        assert!(interpreter().parse("", now()).is_degraded());
    }

    #[test]
    fn test_aggregation_table_order() {
        let agg = |s: &str| extract_aggregation(&tokenize(s));
        assert_eq!(agg("average grocery bill"), Some(Aggregation::Average));
        assert_eq!(agg("How many coffees?"), Some(Aggregation::Count));
        assert_eq!(agg("biggest purchase"), Some(Aggregation::Max));
        assert_eq!(agg("cheapest lunch"), Some(Aggregation::Min));
        assert_eq!(agg("total spent on food"), Some(Aggregation::Sum));
        assert_eq!(agg("how much on bills"), Some(Aggregation::Sum));
        // COUNT words are checked before SUM words
        assert_eq!(agg("total number of expenses"), Some(Aggregation::Count));
        // whole words only: "summer" is not "sum"
        assert_eq!(agg("summer trip"), None);
    }

    #[test]
    fn test_aggregation_words_beat_spending_verbs() {
        let i = interpreter();
        let agg = |s: &str| i.parse(s, now()).aggregation;

        assert_eq!(agg("how much did I spend on average"), Aggregation::Average);
        assert_eq!(agg("average amount spent on food this month"), Aggregation::Average);
        assert_eq!(agg("how many times have I spent money on coffee"), Aggregation::Count);
        assert_eq!(agg("highest amount spent on travel"), Aggregation::Max);
        assert_eq!(agg("lowest amount spent on food"), Aggregation::Min);
        assert_eq!(agg("what did I spend on food"), Aggregation::Sum);
    }

    #[test]
    fn test_category_rule_uses_names_and_keywords() {
        let i = interpreter();
        let q = i.parse("how many uber rides", now());
        assert_eq!(q.category_filter, Some(Category::named("Transportation")));
        assert_eq!(q.aggregation, Aggregation::Count);

        let q = i.parse("average Healthcare cost this year", now());
        assert_eq!(q.category_filter, Some(Category::named("Healthcare")));
        assert_eq!(q.date_range, Some(DateRange::new(d(2024, 1, 1), now())));
    }

    #[test]
    fn test_execute_sum_and_count() {
        let records = records();
        let query = interpreter().parse("total spent on food last month", now());
        let answer = query.execute(&records);
        assert_eq!(answer.value, Some(100.0));
        assert_eq!(answer.record_count, 2);
        // newest first
        assert_eq!(answer.records[0].id, 2);

        let answer = ParsedQuery::degraded("x").execute(&records);
        assert_eq!(answer.value, Some(120.0));
        assert_eq!(answer.record_count, 4);
    }

    #[test]
    fn test_execute_empty_matches() {
        let records = records();
        let sum = interpreter().parse("how much on travel", now()).execute(&records);
        assert_eq!(sum.value, Some(0.0));
        assert_eq!(sum.record_count, 0);

        let avg = interpreter().parse("average travel", now()).execute(&records);
        assert_eq!(avg.value, None);

        let max = interpreter().parse("biggest travel expense", now()).execute(&records);
        assert_eq!(max.value, None);
    }

    #[test]
    fn test_execute_max_min_ordering() {
        let records = records();
        let max = interpreter().parse("largest food expense", now()).execute(&records);
        assert_eq!(max.value, Some(80.0));
        assert_eq!(max.records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2, 1, 4]);

        let min = interpreter().parse("smallest food expense", now()).execute(&records);
        assert_eq!(min.value, Some(5.0));
        assert_eq!(min.records[0].id, 4);
    }

    #[test]
    fn test_preview_is_capped() {
        let records: Vec<ExpenseRecord> = (1..=25)
            .map(|i| ExpenseRecord::new(i, "Snack", 1.0, d(2024, 3, 1)))
            .collect();
        let answer = ParsedQuery::degraded("").execute(&records);
        assert_eq!(answer.record_count, 25);
        assert_eq!(answer.records.len(), PREVIEW_LIMIT);
    }

    #[test]
    fn test_describe() {
        let query = interpreter().parse("total spent on food last month", now());
        assert_eq!(
            query.describe(),
            "Total spending on Food, 2024-02-01 to 2024-02-29"
        );
        assert_eq!("AVG".parse::<Aggregation>().unwrap(), Aggregation::Average);
    }
}
