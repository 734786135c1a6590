#![deny(unreachable_pub)]

// Core modules
mod errors;
pub mod types;

// Feature modules
pub mod config;
pub mod corpus;
pub mod evaluation;
pub mod harness;
pub mod sampling;
pub mod search;


// Re-exports
pub use config::{BenchConfig, LogFormat, LoggingConfig};
pub use corpus::{build_corpus, Corpus, DatasetPaths};
pub use errors::{Error, Result, StrategyKind};
pub use evaluation::{EvaluationEngine, MetricsSummary, SelectionStrategy, SubmissionStore};
pub use harness::Harness;
pub use sampling::{LoaderParams, LoaderRegistry, SamplingRequest, Selection, StratifiedSampler};
pub use search::{SearchCore, SearchOutcome, SearchParams, SearchProvider};
pub use types::*;
