//! Scoring the submission store against hidden ground truth.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;

use super::metrics::{accuracy, brier_score, DEFAULT_THRESHOLD};
use super::strategy::SelectionStrategy;
use super::submissions::SubmissionStore;
use crate::errors::Result;
use crate::types::{HorizonGroup, Problem, Submission};

/// Aggregate metrics over the contributing problems.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub brier_score: f64,
    pub accuracy: f64,
    /// Problems that were resolved and had at least one submission
    pub count: usize,
}

impl MetricsSummary {
    /// Metric names accepted by [`MetricsSummary::get`].
    pub const NAMES: [&'static str; 3] = ["brier_score", "accuracy", "count"];

    /// Metric value by name.
    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            "brier_score" => Some(self.brier_score),
            "accuracy" => Some(self.accuracy),
            "count" => Some(self.count as f64),
            _ => None,
        }
    }
}

/// Grouping key for [`EvaluationEngine::evaluate_grouped`].
pub type GroupKey = (String, HorizonGroup);

/// One scored problem.
#[derive(Debug, Clone, Copy)]
struct Contribution<'a> {
    problem: &'a Problem,
    prediction: f64,
    outcome: f64,
}

/// Resolves final predictions and computes metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationEngine {
    strategy: SelectionStrategy,
    threshold: f64,
}

impl Default for EvaluationEngine {
    fn default() -> Self {
        Self::new(SelectionStrategy::default())
    }
}

impl EvaluationEngine {
    pub fn new(strategy: SelectionStrategy) -> Self {
        Self {
            strategy,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn strategy(&self) -> SelectionStrategy {
        self.strategy
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Metrics over every resolved, submitted-to problem.
    ///
    /// Unresolved problems and problems without submissions are left out of
    /// both numerator and denominator.
    pub fn evaluate<'a, I>(&self, problems: I, store: &SubmissionStore) -> Result<MetricsSummary>
    where
        I: IntoIterator<Item = &'a Problem>,
    {
        let snapshot = store.snapshot();
        let contributions = self.contributions(problems, &snapshot);
        self.summarize(&contributions)
    }

    /// Same metrics per `(source, horizon_group)`.
    ///
    /// Partition counts sum to the ungrouped count.
    pub fn evaluate_grouped<'a, I>(
        &self,
        problems: I,
        store: &SubmissionStore,
    ) -> Result<BTreeMap<GroupKey, MetricsSummary>>
    where
        I: IntoIterator<Item = &'a Problem>,
    {
        let snapshot = store.snapshot();
        let mut groups: BTreeMap<GroupKey, Vec<Contribution<'_>>> = BTreeMap::new();
        for c in self.contributions(problems, &snapshot) {
            groups
                .entry((c.problem.source.clone(), c.problem.horizon_group()))
                .or_default()
                .push(c);
        }
        let mut out = BTreeMap::new();
        for (key, group) in groups {
            out.insert(key, self.summarize(&group)?);
        }
        Ok(out)
    }

    fn contributions<'a, I>(
        &self,
        problems: I,
        history: &HashMap<String, Vec<Submission>>,
    ) -> Vec<Contribution<'a>>
    where
        I: IntoIterator<Item = &'a Problem>,
    {
        let mut unresolved = 0usize;
        let mut unsubmitted = 0usize;
        let mut out = Vec::new();
        for problem in problems {
            let Some(outcome) = problem.outcome() else {
                unresolved += 1;
                continue;
            };
            let chosen = history
                .get(&problem.id)
                .and_then(|h| self.strategy.select(h, outcome));
            match chosen {
                Some(s) => out.push(Contribution {
                    problem,
                    prediction: s.prediction,
                    outcome,
                }),
                None => unsubmitted += 1,
            }
        }
        debug!(
            strategy = %self.strategy,
            scored = out.len(),
            unresolved,
            unsubmitted,
            "Selected final predictions"
        );
        out
    }

    fn summarize(&self, contributions: &[Contribution<'_>]) -> Result<MetricsSummary> {
        let predictions: Vec<f64> = contributions.iter().map(|c| c.prediction).collect();
        let outcomes: Vec<f64> = contributions.iter().map(|c| c.outcome).collect();
        Ok(MetricsSummary {
            brier_score: brier_score(&predictions, &outcomes)?,
            accuracy: accuracy(&predictions, &outcomes, self.threshold)?,
            count: contributions.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn problem(id: &str, source: &str, days: u32, outcome: Option<f64>) -> Problem {
        Problem::new(id, source, "2024-01-01", "2024-12-31", days)
            .with_resolution(outcome.is_some(), outcome)
    }

    fn problems() -> Vec<Problem> {
        vec![
            problem("a", "fred", 100, Some(1.0)),
            problem("b", "fred", 10, Some(0.0)),
            problem("c", "manifold", 100, Some(1.0)),
            problem("d", "manifold", 100, None),
        ]
    }

    #[test]
    fn test_recent_vs_best() {
        let problems = problems();
        let store = SubmissionStore::new(problems.iter().map(|p| p.id.clone()));
        let t0 = Utc::now();
        store.submit("b", 0.8, t0).unwrap();
        store.submit("b", 0.2, t0 + Duration::seconds(1)).unwrap();

        for strategy in SelectionStrategy::all() {
            let m = EvaluationEngine::new(*strategy)
                .evaluate(&problems, &store)
                .unwrap();
            assert_eq!(m.count, 1);
            assert!((m.brier_score - 0.04).abs() < 1e-10, "{strategy}");
            assert_eq!(m.accuracy, 1.0);
        }
    }

    #[test]
    fn test_best_is_oracle() {
        let problems = problems();
        let store = SubmissionStore::new(problems.iter().map(|p| p.id.clone()));
        let t0 = Utc::now();
        store.submit("a", 0.9, t0).unwrap();
        store.submit("a", 0.1, t0 + Duration::seconds(1)).unwrap();

        let recent = EvaluationEngine::new(SelectionStrategy::Recent)
            .evaluate(&problems, &store)
            .unwrap();
        let best = EvaluationEngine::new(SelectionStrategy::Best)
            .evaluate(&problems, &store)
            .unwrap();
        assert!((recent.brier_score - 0.81).abs() < 1e-10);
        assert!((best.brier_score - 0.01).abs() < 1e-10);
    }

    #[test]
    fn test_unresolved_and_unsubmitted_excluded() {
        let problems = problems();
        let store = SubmissionStore::new(problems.iter().map(|p| p.id.clone()));
        store.submit("d", 0.7, Utc::now()).unwrap();

        let m = EvaluationEngine::default()
            .evaluate(&problems, &store)
            .unwrap();
        assert_eq!(m, MetricsSummary::default());

        store.submit("a", 0.5, Utc::now()).unwrap();
        let m = EvaluationEngine::default()
            .evaluate(&problems, &store)
            .unwrap();
        assert_eq!(m.count, 1);
        assert!((m.brier_score - 0.25).abs() < 1e-10);
    }

    #[test]
    fn test_grouped_counts_sum_to_total() {
        let problems = problems();
        let store = SubmissionStore::new(problems.iter().map(|p| p.id.clone()));
        for (id, p) in [("a", 0.6), ("b", 0.3), ("c", 0.4), ("d", 0.9)] {
            store.submit(id, p, Utc::now()).unwrap();
        }
        let engine = EvaluationEngine::default();
        let total = engine.evaluate(&problems, &store).unwrap();
        let grouped = engine.evaluate_grouped(&problems, &store).unwrap();

        assert_eq!(total.count, 3);
        assert_eq!(grouped.values().map(|m| m.count).sum::<usize>(), total.count);
        assert_eq!(grouped.len(), 3);
        let fred_long = &grouped[&("fred".to_string(), HorizonGroup::LongTerm)];
        assert_eq!(fred_long.count, 1);
        assert!((fred_long.brier_score - 0.16).abs() < 1e-10);
        let manifold = &grouped[&("manifold".to_string(), HorizonGroup::LongTerm)];
        assert_eq!(manifold.accuracy, 0.0);
    }

    #[test]
    fn test_threshold() {
        let problems = problems();
        let store = SubmissionStore::new(problems.iter().map(|p| p.id.clone()));
        store.submit("a", 0.6, Utc::now()).unwrap();
        let engine = EvaluationEngine::default().with_threshold(0.7);
        assert_eq!(engine.evaluate(&problems, &store).unwrap().accuracy, 0.0);
    }

    #[test]
    fn test_summary_get() {
        let m = MetricsSummary {
            brier_score: 0.1,
            accuracy: 0.9,
            count: 4,
        };
        assert_eq!(m.get("count"), Some(4.0));
        assert_eq!(m.get("accuracy"), Some(0.9));
        assert_eq!(m.get("log_loss"), None);
    }
}
