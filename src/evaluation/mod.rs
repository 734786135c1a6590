//! Scoring submitted forecasts.
//!
//! - **metrics**: pure Brier score / accuracy functions
//! - **SelectionStrategy**: which submission counts as final
//! - **SubmissionStore**: thread-safe append-only history per problem
//! - **EvaluationEngine**: overall and per-(source, horizon) metrics
//!
//! Only problems that are resolved and have at least one submission are
//! scored. Everything else is excluded, never counted as a miss.

mod engine;
pub mod metrics;
mod strategy;
mod submissions;

pub use engine::{EvaluationEngine, GroupKey, MetricsSummary};
pub use metrics::{accuracy, brier_score, DEFAULT_THRESHOLD};
pub use strategy::SelectionStrategy;
pub use submissions::SubmissionStore;
