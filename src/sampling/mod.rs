//! Evaluation-set selection.
//!
//! - **StratifiedSampler**: deterministic per-source / per-horizon sampling
//!   with quota redistribution
//! - **LoaderRegistry**: named loaders built on top of the sampler

mod loaders;
mod sampler;

pub use loaders::{LoadContext, LoaderFn, LoaderParams, LoaderRegistry};
pub use sampler::{horizon_summary, SamplingRequest, Selection, StratifiedSampler};

use crate::types::SourceCatalog;

/// Every source known to the catalog, sorted.
pub fn sources_list(catalog: &SourceCatalog) -> Vec<String> {
    catalog.sources().into_iter().map(String::from).collect()
}
