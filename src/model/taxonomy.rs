//! Fixed risk taxonomy: ordered categories and the countries they are scored against

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Pseudo-country used for categories that are scored once, globally
pub const GLOBAL: &str = "Global";

const DEFAULT_CATEGORIES: &[(&str, Scope)] = &[
    ("Global Indicator", Scope::Global),
    ("Global Trade Protectionism", Scope::Global),
    ("Emerging Market Political Crisis", Scope::PerCountry),
    ("Global Technology Decoupling", Scope::PerCountry),
    ("Major Terror Attacks", Scope::PerCountry),
    ("European Fragmentation", Scope::PerCountry),
    ("Russia-NATO Conflict", Scope::PerCountry),
    ("U.S. China Strategic Competition", Scope::PerCountry),
    ("Middle East Regional War", Scope::PerCountry),
    ("North Korea Conflict", Scope::PerCountry),
    ("Major Cyber Attacks", Scope::PerCountry),
];

const DEFAULT_COUNTRIES: &[&str] = &[
    "United States",
    "China",
    "Russia",
    "Germany",
    "United Kingdom",
    "France",
    "Japan",
    "India",
    "Brazil",
    "South Africa",
    "Saudi Arabia",
    "Iran",
    "North Korea",
    "South Korea",
    "Ukraine",
    "Israel",
    "Turkey",
    "Mexico",
    "Canada",
    "Australia",
];

/// Whether a category is assessed per country or once against [`GLOBAL`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Global,
    PerCountry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskCategory {
    pub name: String,
    pub scope: Scope,
}

impl RiskCategory {
    pub fn new(name: impl Into<String>, scope: Scope) -> Self {
        Self {
            name: name.into(),
            scope,
        }
    }

    pub fn is_global(&self) -> bool {
        self.scope == Scope::Global
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TaxonomyError {
    #[error("taxonomy has no categories")]
    NoCategories,

    #[error("taxonomy has per-country categories but no countries")]
    NoCountries,

    #[error("duplicate category: {0}")]
    DuplicateCategory(String),

    #[error("duplicate country: {0}")]
    DuplicateCountry(String),

    #[error("'Global' is reserved and cannot be listed as a country")]
    ReservedCountry,
}

/// Ordered categories and countries. Iteration order is report order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    categories: Vec<RiskCategory>,
    countries: Vec<String>,
}

impl Taxonomy {
    /// Build and validate a taxonomy
    #[cfg(test)]
    pub fn new(categories: Vec<RiskCategory>, countries: Vec<String>) -> Result<Self, TaxonomyError> {
        let taxonomy = Self {
            categories,
            countries,
        };
        taxonomy.validate()?;
        Ok(taxonomy)
    }

    pub fn categories(&self) -> &[RiskCategory] {
        &self.categories
    }

    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    /// Countries a category is assessed against, in report order
    pub fn countries_for(&self, category: &RiskCategory) -> Vec<&str> {
        match category.scope {
            Scope::Global => vec![GLOBAL],
            Scope::PerCountry => self.countries.iter().map(String::as_str).collect(),
        }
    }

    /// Number of assessments a run produces when no pair fails
    pub fn expected_assessments(&self) -> usize {
        self.categories
            .iter()
            .map(|c| match c.scope {
                Scope::Global => 1,
                Scope::PerCountry => self.countries.len(),
            })
            .sum()
    }

    pub fn validate(&self) -> Result<(), TaxonomyError> {
        if self.categories.is_empty() {
            return Err(TaxonomyError::NoCategories);
        }

        let mut seen = HashSet::new();
        for category in &self.categories {
            if !seen.insert(category.name.as_str()) {
                return Err(TaxonomyError::DuplicateCategory(category.name.clone()));
            }
        }

        let needs_countries = self.categories.iter().any(|c| !c.is_global());
        if needs_countries && self.countries.is_empty() {
            return Err(TaxonomyError::NoCountries);
        }

        let mut seen = HashSet::new();
        for country in &self.countries {
            if country.eq_ignore_ascii_case(GLOBAL) {
                return Err(TaxonomyError::ReservedCountry);
            }
            if !seen.insert(country.as_str()) {
                return Err(TaxonomyError::DuplicateCountry(country.clone()));
            }
        }

        Ok(())
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES
                .iter()
                .map(|(name, scope)| RiskCategory::new(*name, *scope))
                .collect(),
            countries: DEFAULT_COUNTRIES.iter().map(|c| c.to_string()).collect(),
        }
    }
}
