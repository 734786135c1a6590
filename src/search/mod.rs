//! Cutoff-aware search for forecasting agents.
//!
//! - **SearchProvider**: async trait every provider implements
//! - **SearchOutcome**: standardized result / error payload
//! - **SearchCore**: explicit name -> provider registry with timeouts
//!
//! Only offline mock providers ship here. Real HTTP providers plug in through
//! [`SearchCore::register`].

mod mock;
mod provider;
mod registry;

pub use mock::{MockGoogle, MockPerplexity};
pub use provider::{
    extract_links, filter_before_cutoff, CutoffFilter, SearchOutcome, SearchParams, SearchProvider,
};
pub use registry::SearchCore;
