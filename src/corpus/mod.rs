//! Corpus construction: raw records in, normalized [`Problem`](crate::Problem)s out.

mod builder;
mod dataset;

pub use builder::{build_corpus, compute_horizon, parse_date_part, Corpus, CorpusStats};
pub use dataset::{DatasetPaths, QUESTIONS_FILE, RESOLUTIONS_FILE};
