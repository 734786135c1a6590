//! Append-only prediction history.

use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::errors::{Error, Result};
use crate::types::Submission;

#[derive(Debug, Default)]
struct Inner {
    /// Problem ids that accept submissions
    active: HashSet<String>,
    /// Submissions per problem, in append order
    history: HashMap<String, Vec<Submission>>,
    total: usize,
}

/// Thread-safe store of submissions for the active problem set.
///
/// A problem may be submitted to any number of times. Every submission is
/// kept; the evaluation strategy decides which one counts.
#[derive(Debug, Default)]
pub struct SubmissionStore {
    inner: RwLock<Inner>,
}

impl SubmissionStore {
    /// Store accepting submissions for `active` problem ids.
    pub fn new<I, S>(active: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let store = Self::default();
        store.reset(active);
        store
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the active problem set and drop all history.
    pub fn reset<I, S>(&self, active: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut inner = self.write();
        inner.active = active.into_iter().map(Into::into).collect();
        inner.history.clear();
        inner.total = 0;
    }

    /// Append a submission.
    ///
    /// Validation and append happen under one write lock, so concurrent
    /// submitters cannot reorder a problem's history.
    pub fn submit(&self, problem_id: &str, prediction: f64, now: DateTime<Utc>) -> Result<()> {
        let mut inner = self.write();
        if !inner.active.contains(problem_id) {
            return Err(Error::UnknownProblem(problem_id.to_string()));
        }
        if !(0.0..=1.0).contains(&prediction) {
            return Err(Error::OutOfRange(prediction));
        }

        let history = inner.history.entry(problem_id.to_string()).or_default();
        if !history.is_empty() {
            warn!(
                problem_id,
                previous = history.len(),
                "Duplicate submission, appending to history"
            );
        }
        history.push(Submission::new(problem_id, prediction, now));
        inner.total += 1;
        debug!(problem_id, prediction, "Submission recorded");
        Ok(())
    }

    /// Submissions for one problem, in append order.
    pub fn history(&self, problem_id: &str) -> Vec<Submission> {
        self.read()
            .history
            .get(problem_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Snapshot of every problem's history.
    pub fn snapshot(&self) -> HashMap<String, Vec<Submission>> {
        self.read().history.clone()
    }

    /// Number of problems with at least one submission.
    pub fn len(&self) -> usize {
        self.read().history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().history.is_empty()
    }

    /// Number of submissions across all problems.
    pub fn total(&self) -> usize {
        self.read().total
    }
}
