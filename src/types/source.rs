//! Source categories.
//!
//! Every corpus source is either a `Data` source (observational or statistical
//! feed, sampled uniformly) or a `Market` source (prediction-market style,
//! sampled with per-horizon stratification). The mapping is configuration,
//! not code: new sources are added through [`SourceCatalog::from_lists`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Sampling category of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceCategory {
    Data,
    Market,
}

impl SourceCategory {
    pub fn name(&self) -> &'static str {
        match self {
            SourceCategory::Data => "data",
            SourceCategory::Market => "market",
        }
    }
}

/// Default data sources of the ForecastBench corpus.
pub const DEFAULT_DATA_SOURCES: [&str; 5] = ["acled", "dbnomics", "fred", "wikipedia", "yfinance"];

/// Default market sources of the ForecastBench corpus.
pub const DEFAULT_MARKET_SOURCES: [&str; 4] = ["infer", "manifold", "metaculus", "polymarket"];

/// Mapping from source name to category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCatalog {
    categories: BTreeMap<String, SourceCategory>,
}

impl Default for SourceCatalog {
    fn default() -> Self {
        Self::forecastbench()
    }
}

impl SourceCatalog {
    /// The nine ForecastBench sources.
    pub fn forecastbench() -> Self {
        let mut categories = BTreeMap::new();
        for src in DEFAULT_DATA_SOURCES {
            categories.insert(src.to_string(), SourceCategory::Data);
        }
        for src in DEFAULT_MARKET_SOURCES {
            categories.insert(src.to_string(), SourceCategory::Market);
        }
        Self { categories }
    }

    /// Build from explicit data / market lists. The lists must be disjoint.
    pub fn from_lists<D, M>(data: D, market: M) -> Result<Self>
    where
        D: IntoIterator,
        D::Item: AsRef<str>,
        M: IntoIterator,
        M::Item: AsRef<str>,
    {
        let mut categories = BTreeMap::new();
        for src in data {
            categories.insert(src.as_ref().to_string(), SourceCategory::Data);
        }
        for src in market {
            let name = src.as_ref().to_string();
            if categories.get(&name) == Some(&SourceCategory::Data) {
                return Err(Error::Config(format!(
                    "source '{name}' listed as both data and market"
                )));
            }
            categories.insert(name, SourceCategory::Market);
        }
        Ok(Self { categories })
    }

    /// Category of a source, if known.
    pub fn category(&self, source: &str) -> Option<SourceCategory> {
        self.categories.get(source).copied()
    }

    pub fn contains(&self, source: &str) -> bool {
        self.categories.contains_key(source)
    }

    pub fn is_market(&self, source: &str) -> bool {
        self.category(source) == Some(SourceCategory::Market)
    }

    /// All known sources, sorted.
    pub fn sources(&self) -> Vec<&str> {
        self.categories.keys().map(String::as_str).collect()
    }

    /// Sources of one category, sorted.
    pub fn sources_in(&self, category: SourceCategory) -> Vec<&str> {
        self.categories
            .iter()
            .filter(|(_, c)| **c == category)
            .map(|(s, _)| s.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let catalog = SourceCatalog::forecastbench();
        assert_eq!(catalog.len(), 9);
        assert_eq!(
            catalog.sources_in(SourceCategory::Data),
            vec!["acled", "dbnomics", "fred", "wikipedia", "yfinance"]
        );
        assert_eq!(
            catalog.sources_in(SourceCategory::Market),
            vec!["infer", "manifold", "metaculus", "polymarket"]
        );
        assert!(catalog.is_market("manifold"));
        assert!(!catalog.is_market("fred"));
        assert_eq!(catalog.category("nope"), None);
    }

    #[test]
    fn test_sources_sorted() {
        let catalog = SourceCatalog::forecastbench();
        let sources = catalog.sources();
        let mut sorted = sources.clone();
        sorted.sort_unstable();
        assert_eq!(sources, sorted);
    }

    #[test]
    fn test_from_lists_rejects_overlap() {
        let err = SourceCatalog::from_lists(["fred", "acled"], ["fred"]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_from_lists_custom_source() {
        let catalog = SourceCatalog::from_lists(["fred"], ["kalshi"]).unwrap();
        assert!(catalog.is_market("kalshi"));
        assert_eq!(catalog.category("fred"), Some(SourceCategory::Data));
        assert_eq!(catalog.len(), 2);
    }
}
