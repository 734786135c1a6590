//! Final-prediction selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, StrategyKind};
use crate::types::Submission;

/// Which submission in a problem's history counts as the final prediction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Most recently timestamped submission. Later appends win ties.
    #[default]
    Recent,
    /// Submission closest to the true outcome. Earliest entry wins ties.
    ///
    /// This reads the ground truth while choosing, so it is an oracle for
    /// calibration and debugging, never a blind scoring mode.
    Best,
}

impl SelectionStrategy {
    pub fn all() -> &'static [SelectionStrategy] {
        &[SelectionStrategy::Recent, SelectionStrategy::Best]
    }

    pub fn name(&self) -> &'static str {
        match self {
            SelectionStrategy::Recent => "recent",
            SelectionStrategy::Best => "best",
        }
    }

    /// Whether selection consults the outcome.
    pub fn is_oracle(&self) -> bool {
        matches!(self, SelectionStrategy::Best)
    }

    /// Pick the final submission from a history in append order.
    pub fn select<'a>(&self, history: &'a [Submission], outcome: f64) -> Option<&'a Submission> {
        match self {
            SelectionStrategy::Recent => history.iter().max_by_key(|s| s.timestamp),
            SelectionStrategy::Best => history
                .iter()
                .min_by(|a, b| a.squared_error(outcome).total_cmp(&b.squared_error(outcome))),
        }
    }
}

impl fmt::Display for SelectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SelectionStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| {
                Error::unknown(
                    StrategyKind::Selection,
                    s,
                    Self::all().iter().map(|st| st.name()),
                )
            })
    }
}
