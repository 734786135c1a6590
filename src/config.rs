//! Benchmark configuration.
//!
//! Loaded from TOML; every section and field has a default, so an empty file
//! (or no file at all) is a valid configuration.
//!
//! ```toml
//! [dataset]
//! dir = "data/forecastbench_v1"
//!
//! [sampling]
//! loader = "forecastbench_v1"
//! max_quest = 200
//! seed = 42
//! horizons = ["short_term", "near_term"]
//!
//! [evaluation]
//! strategy = "recent"
//!
//! [sources]
//! data = ["acled", "dbnomics", "fred", "wikipedia", "yfinance"]
//! market = ["infer", "manifold", "metaculus", "polymarket"]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::corpus::{QUESTIONS_FILE, RESOLUTIONS_FILE};
use crate::errors::{Error, Result, StrategyKind};
use crate::evaluation::SelectionStrategy;
use crate::sampling::{LoaderParams, LoaderRegistry};
use crate::types::{HorizonGroup, SourceCatalog, DEFAULT_DATA_SOURCES, DEFAULT_MARKET_SOURCES};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct BenchConfig {
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub evaluation: EvaluationConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DatasetConfig {
    /// Directory holding the resolved question / resolution files
    #[serde(default = "default_dataset_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_questions_file")]
    pub questions_file: String,
    #[serde(default = "default_resolutions_file")]
    pub resolutions_file: String,
}

fn default_dataset_dir() -> PathBuf {
    PathBuf::from("data/forecastbench_v1")
}

fn default_questions_file() -> String {
    QUESTIONS_FILE.to_string()
}

fn default_resolutions_file() -> String {
    RESOLUTIONS_FILE.to_string()
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            dir: default_dataset_dir(),
            questions_file: default_questions_file(),
            resolutions_file: default_resolutions_file(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SamplingConfig {
    /// Loader name, see [`LoaderRegistry::names`]
    #[serde(default = "default_loader")]
    pub loader: String,
    /// Target evaluation-set size
    #[serde(default = "default_max_quest")]
    pub max_quest: usize,
    /// Seed for every random draw of the loader
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Source allow-list (all sources when absent)
    #[serde(default)]
    pub sources: Option<Vec<String>>,
    /// Horizon allow-list (all horizons when absent)
    #[serde(default)]
    pub horizons: Option<Vec<String>>,
    /// Single source for `forecastbench_v1_source` / `load_by_source`
    #[serde(default)]
    pub source: Option<String>,
    /// Sample size for `load_random`
    #[serde(default)]
    pub count: Option<usize>,
}

fn default_loader() -> String {
    "forecastbench_v1".to_string()
}

fn default_max_quest() -> usize {
    200
}

fn default_seed() -> u64 {
    42
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            loader: default_loader(),
            max_quest: default_max_quest(),
            seed: default_seed(),
            sources: None,
            horizons: None,
            source: None,
            count: None,
        }
    }
}

impl SamplingConfig {
    /// Loader parameters described by this section.
    pub fn loader_params(&self) -> LoaderParams {
        LoaderParams {
            max_quest: self.max_quest,
            seed: self.seed,
            sources: self.sources.as_ref().map(|s| s.iter().cloned().collect()),
            horizons: self.horizons.as_ref().map(|h| h.iter().cloned().collect()),
            source: self.source.clone(),
            count: self.count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EvaluationConfig {
    /// Final-prediction selection: "recent" (default) or "best" (oracle)
    #[serde(default = "default_strategy")]
    pub strategy: String,
    /// Accuracy threshold; predictions at the threshold count as positive
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_strategy() -> String {
    SelectionStrategy::Recent.name().to_string()
}

fn default_threshold() -> f64 {
    0.5
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            threshold: default_threshold(),
        }
    }
}

/// Source-category mapping.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SourcesConfig {
    #[serde(default = "default_data_sources")]
    pub data: Vec<String>,
    #[serde(default = "default_market_sources")]
    pub market: Vec<String>,
}

fn default_data_sources() -> Vec<String> {
    DEFAULT_DATA_SOURCES.iter().map(|s| s.to_string()).collect()
}

fn default_market_sources() -> Vec<String> {
    DEFAULT_MARKET_SOURCES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            data: default_data_sources(),
            market: default_market_sources(),
        }
    }
}

impl SourcesConfig {
    pub fn catalog(&self) -> Result<SourceCatalog> {
        SourceCatalog::from_lists(&self.data, &self.market)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Per-call provider timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Results requested when the caller does not say
    #[serde(default = "default_k")]
    pub default_k: usize,
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_k() -> usize {
    10
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            default_k: default_k(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format: pretty, json, compact
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

impl BenchConfig {
    /// Parse from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load from `path`, or defaults if the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Startup validation of every name the run will look up.
    pub fn validate(&self) -> Result<()> {
        let catalog = self.sources.catalog()?;
        let loaders = LoaderRegistry::standard();
        if !loaders.contains(&self.sampling.loader) {
            return Err(Error::unknown(
                StrategyKind::Loader,
                &self.sampling.loader,
                loaders.names(),
            ));
        }
        self.evaluation.strategy.parse::<SelectionStrategy>()?;

        if self.sampling.max_quest == 0 {
            return Err(Error::Config("sampling.max_quest must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.evaluation.threshold) {
            return Err(Error::Config(format!(
                "evaluation.threshold must be within [0, 1], got {}",
                self.evaluation.threshold
            )));
        }
        if let Some(horizons) = &self.sampling.horizons {
            if let Some(bad) = horizons
                .iter()
                .find(|h| HorizonGroup::from_label(h).is_none())
            {
                return Err(Error::Config(format!("unknown horizon group '{bad}'")));
            }
        }
        // load_by_source takes any source; only the catalog loader is strict
        if let Some(source) = &self.sampling.source {
            if self.sampling.loader == "forecastbench_v1_source" && !catalog.contains(source) {
                return Err(Error::UnknownSource(source.clone()));
            }
        }
        if self.search.timeout_secs == 0 {
            return Err(Error::Config("search.timeout_secs must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_is_default() {
        let config = BenchConfig::from_toml("").unwrap();
        assert_eq!(config, BenchConfig::default());
        assert_eq!(config.sampling.max_quest, 200);
        assert_eq!(config.sampling.seed, 42);
        assert_eq!(config.evaluation.strategy, "recent");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = BenchConfig::from_toml(
            r#"
            [sampling]
            max_quest = 40
            horizons = ["short_term", "near_term"]

            [sources]
            market = ["manifold", "kalshi"]
            "#,
        )
        .unwrap();
        assert_eq!(config.sampling.max_quest, 40);
        assert_eq!(config.sampling.seed, 42);
        assert_eq!(config.sources.data.len(), 5);
        let catalog = config.sources.catalog().unwrap();
        assert!(catalog.is_market("kalshi"));
        assert!(!catalog.contains("metaculus"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_names() {
        let mut config = BenchConfig::default();
        config.sampling.loader = "load_everything".into();
        assert!(matches!(
            config.validate(),
            Err(Error::UnknownStrategy { .. })
        ));

        let mut config = BenchConfig::default();
        config.evaluation.strategy = "median".into();
        assert!(matches!(
            config.validate(),
            Err(Error::UnknownStrategy { .. })
        ));

        let mut config = BenchConfig::default();
        config.sampling.horizons = Some(vec!["forever".into()]);
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = BenchConfig::default();
        config.sampling.loader = "forecastbench_v1_source".into();
        config.sampling.source = Some("nowhere".into());
        assert!(matches!(config.validate(), Err(Error::UnknownSource(_))));
    }

    #[test]
    fn test_validate_allows_uncatalogued_source_for_load_by_source() {
        let mut config = BenchConfig::default();
        config.sampling.loader = "load_by_source".into();
        config.sampling.source = Some("nowhere".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = BenchConfig::default();
        config.sampling.max_quest = 0;
        assert!(config.validate().is_err());

        let mut config = BenchConfig::default();
        config.evaluation.threshold = 1.5;
        assert!(config.validate().is_err());

        let mut config = BenchConfig::default();
        config.sources.market.push("fred".into());
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = BenchConfig::default();
        config.sampling.sources = Some(vec!["fred".into()]);
        config.logging.format = LogFormat::Json;
        let text = config.to_toml().unwrap();
        assert_eq!(BenchConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file_gives_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = BenchConfig::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, BenchConfig::default());
    }
}
