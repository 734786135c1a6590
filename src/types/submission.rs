//! Prediction submissions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One timestamped prediction for a problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub problem_id: String,
    /// Probability of the positive outcome, in [0, 1]
    pub prediction: f64,
    pub timestamp: DateTime<Utc>,
}

impl Submission {
    pub fn new(problem_id: impl Into<String>, prediction: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            problem_id: problem_id.into(),
            prediction,
            timestamp,
        }
    }

    /// Squared error against a 0/1 outcome.
    pub fn squared_error(&self, outcome: f64) -> f64 {
        (self.prediction - outcome).powi(2)
    }
}
