//! Category taxonomy: ordered category names with keyword vocabularies
//!
//! Declaration order matters: the categorizer breaks score ties in favour of
//! the category declared first. Keyword sets may overlap between categories
//! ("subscription" is both Entertainment and Bills); scoring resolves that.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::models::{Category, UNCATEGORIZED};
use crate::text::normalize;

/// One category and its normalized keywords
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryKeywords {
    pub name: String,
    pub keywords: BTreeSet<String>,
}

impl CategoryKeywords {
    pub fn category(&self) -> Category {
        Category::Named(self.name.clone())
    }
}

/// Ordered registry of categories
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryTaxonomy {
    categories: Vec<CategoryKeywords>,
}

impl CategoryTaxonomy {
    /// Create an empty taxonomy
    pub fn new() -> Self {
        Self::default()
    }

    /// The taxonomy shipped in the embedded default configuration
    pub fn builtin() -> Self {
        crate::config::TallyConfig::builtin().taxonomy
    }

    /// Add a new category at the end of the declaration order
    ///
    /// Fails if the name is empty, reserved, or already declared
    /// (names compare case-insensitively).
    pub fn add_category<I, S>(&mut self, name: &str, keywords: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = name.trim();
        validate_name(name)?;
        if self.get(name).is_some() {
            return Err(Error::InvalidInput(format!(
                "Category already declared: {}",
                name
            )));
        }

        self.categories.push(CategoryKeywords {
            name: name.to_string(),
            keywords: normalize_keywords(name, keywords),
        });
        Ok(())
    }

    /// Add keywords to an existing category, or declare it if missing
    pub fn extend_category<I, S>(&mut self, name: &str, keywords: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = name.trim();
        validate_name(name)?;
        let normalized = normalize_keywords(name, keywords);

        match self.get_mut(name) {
            Some(existing) => {
                existing.keywords.extend(normalized);
                Ok(())
            }
            None => {
                self.categories.push(CategoryKeywords {
                    name: name.to_string(),
                    keywords: normalized,
                });
                Ok(())
            }
        }
    }

    /// Replace the keyword set of an existing category, keeping its position
    pub fn replace_keywords<I, S>(&mut self, name: &str, keywords: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalized = normalize_keywords(name, keywords);
        let existing = self
            .get_mut(name)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown category: {}", name)))?;
        existing.keywords = normalized;
        Ok(())
    }

    /// Remove a category; returns false if it was not declared
    pub fn remove_category(&mut self, name: &str) -> bool {
        let before = self.categories.len();
        self.categories
            .retain(|c| !c.name.eq_ignore_ascii_case(name.trim()));
        self.categories.len() != before
    }

    /// Categories in declaration order
    pub fn categories(&self) -> &[CategoryKeywords] {
        &self.categories
    }

    pub fn get(&self, name: &str) -> Option<&CategoryKeywords> {
        let name = name.trim();
        self.categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut CategoryKeywords> {
        let name = name.trim();
        self.categories
            .iter_mut()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn category_names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    /// Map a user-supplied name onto the declared spelling
    pub fn resolve(&self, name: &str) -> Category {
        self.get(name)
            .map(CategoryKeywords::category)
            .unwrap_or(Category::Uncategorized)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidInput("Category name is empty".to_string()));
    }
    if name.eq_ignore_ascii_case(UNCATEGORIZED) || name.eq_ignore_ascii_case("other") {
        return Err(Error::InvalidInput(format!(
            "Category name is reserved: {}",
            name
        )));
    }
    Ok(())
}

fn normalize_keywords<I, S>(category: &str, keywords: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut set = BTreeSet::new();
    for keyword in keywords {
        let normalized = normalize(keyword.as_ref());
        if normalized.is_empty() {
            warn!(
                category,
                keyword = keyword.as_ref(),
                "Ignoring keyword with no letters or digits"
            );
            continue;
        }
        set.insert(normalized);
    }
    set
}
