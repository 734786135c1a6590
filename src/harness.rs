//! The benchmark surface a forecasting agent talks to.
//!
//! A [`Harness`] owns the normalized corpus, the active (loaded) problem set,
//! the submission store and the search registry. Agents only ever see
//! [`ProblemView`]s; ground truth stays inside the harness until scoring.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::BenchConfig;
use crate::corpus::DatasetPaths;
use crate::errors::{Error, Result, StrategyKind};
use crate::evaluation::{
    EvaluationEngine, GroupKey, MetricsSummary, SelectionStrategy, SubmissionStore,
};
use crate::sampling::{LoadContext, LoaderParams, LoaderRegistry, Selection};
use crate::search::{SearchCore, SearchOutcome, SearchParams};
use crate::types::{Problem, ProblemView, SourceCatalog};

pub struct Harness {
    corpus: Vec<Problem>,
    catalog: SourceCatalog,
    loaders: LoaderRegistry,
    default_loader: String,
    engine: EvaluationEngine,
    search: SearchCore,
    search_params: SearchParams,
    active: Selection,
    store: SubmissionStore,
}

impl std::fmt::Debug for Harness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Harness")
            .field("corpus", &self.corpus.len())
            .field("active", &self.active.len())
            .field("submissions", &self.store.total())
            .field("strategy", &self.engine.strategy())
            .finish()
    }
}

impl Harness {
    /// Harness over an already-built corpus.
    ///
    /// Validates `config` first, so an unknown loader or strategy name fails
    /// here rather than mid-run.
    pub fn new(corpus: Vec<Problem>, config: &BenchConfig) -> Result<Self> {
        config.validate()?;
        let strategy: SelectionStrategy = config.evaluation.strategy.parse()?;
        if strategy.is_oracle() {
            info!(strategy = %strategy, "Oracle selection strategy: scores are not blind");
        }
        Ok(Self {
            corpus,
            catalog: config.sources.catalog()?,
            loaders: LoaderRegistry::standard(),
            default_loader: config.sampling.loader.clone(),
            engine: EvaluationEngine::new(strategy).with_threshold(config.evaluation.threshold),
            search: SearchCore::with_builtin(Duration::from_secs(config.search.timeout_secs)),
            search_params: SearchParams {
                k: config.search.default_k,
            },
            active: Selection::new(),
            store: SubmissionStore::default(),
        })
    }

    /// Harness over the dataset named in `config`.
    pub fn from_config(config: &BenchConfig) -> Result<Self> {
        let corpus = DatasetPaths::from_config(&config.dataset).load_corpus()?;
        Self::new(corpus.problems, config)
    }

    /// Replace the search registry.
    pub fn with_search(mut self, search: SearchCore) -> Self {
        self.search = search;
        self
    }

    /// Normalized corpus the loaders draw from.
    pub fn corpus(&self) -> &[Problem] {
        &self.corpus
    }

    pub fn catalog(&self) -> &SourceCatalog {
        &self.catalog
    }

    pub fn engine(&self) -> &EvaluationEngine {
        &self.engine
    }

    /// Load the active problem set with the configured loader.
    pub fn load(&mut self, params: &LoaderParams) -> Result<&Selection> {
        let loader = self.default_loader.clone();
        self.load_with(&loader, params)
    }

    /// Load the active problem set with a named loader.
    ///
    /// Clears all submissions; they belong to the previous problem set.
    pub fn load_with(&mut self, loader: &str, params: &LoaderParams) -> Result<&Selection> {
        let ctx = LoadContext {
            corpus: &self.corpus,
            catalog: &self.catalog,
        };
        let selection = self.loaders.load(loader, &ctx, params)?;
        self.store.reset(selection.keys().cloned());
        self.active = selection;
        info!(
            loader,
            problems = self.active.len(),
            corpus = self.corpus.len(),
            "Active problem set loaded"
        );
        Ok(&self.active)
    }

    /// Active problems, ground truth included.
    pub fn problems(&self) -> &Selection {
        &self.active
    }

    /// Active problems with resolution fields removed.
    pub fn get_problems(&self) -> Vec<ProblemView> {
        self.active.values().map(ProblemView::from).collect()
    }

    /// Record a prediction stamped with the current time.
    pub fn submit_prediction(&self, problem_id: &str, prediction: f64) -> Result<()> {
        self.submit_prediction_at(problem_id, prediction, Utc::now())
    }

    pub fn submit_prediction_at(
        &self,
        problem_id: &str,
        prediction: f64,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.store.submit(problem_id, prediction, now)
    }

    /// Number of submissions so far.
    pub fn submission_count(&self) -> usize {
        self.store.total()
    }

    pub fn submissions(&self) -> &SubmissionStore {
        &self.store
    }

    pub fn compute_metrics(&self) -> Result<MetricsSummary> {
        self.engine.evaluate(self.active.values(), &self.store)
    }

    pub fn grouped_metrics(&self) -> Result<BTreeMap<GroupKey, MetricsSummary>> {
        self.engine.evaluate_grouped(self.active.values(), &self.store)
    }

    /// Selected metrics by name, or all of them for `None`.
    pub fn report(&self, metrics: Option<&[&str]>) -> Result<BTreeMap<String, f64>> {
        let names = metrics.unwrap_or(&MetricsSummary::NAMES);
        if let Some(bad) = names.iter().find(|n| !MetricsSummary::NAMES.contains(*n)) {
            return Err(Error::unknown(StrategyKind::Metric, bad, MetricsSummary::NAMES));
        }
        let summary = self.compute_metrics()?;
        let report: BTreeMap<String, f64> = names
            .iter()
            .filter_map(|n| summary.get(n).map(|v| (n.to_string(), v)))
            .collect();
        info!(
            strategy = %self.engine.strategy(),
            brier_score = summary.brier_score,
            accuracy = summary.accuracy,
            count = summary.count,
            "Evaluation report"
        );
        Ok(report)
    }

    pub fn available_search_functions(&self) -> Vec<String> {
        self.search.names()
    }

    /// Search on behalf of an active problem, cut off at its `time_testing`.
    pub async fn search(
        &self,
        function: &str,
        problem_id: &str,
        query: &str,
    ) -> Result<SearchOutcome> {
        let params = self.search_params;
        self.search_with(function, problem_id, query, &params).await
    }

    pub async fn search_with(
        &self,
        function: &str,
        problem_id: &str,
        query: &str,
        params: &SearchParams,
    ) -> Result<SearchOutcome> {
        let problem = self
            .active
            .get(problem_id)
            .ok_or_else(|| Error::UnknownProblem(problem_id.to_string()))?;
        info!(
            function,
            problem_id,
            cutoff = %problem.time_testing,
            "Search with knowledge cutoff"
        );
        self.search
            .execute(function, query, &problem.time_testing, params)
            .await
    }
}
