//! Offline providers that echo the cutoff back.

use async_trait::async_trait;
use serde_json::json;

use super::provider::{filter_before_cutoff, SearchOutcome, SearchParams, SearchProvider};

/// Web-search stand-in: one result dated at the cutoff.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockGoogle;

#[async_trait]
impl SearchProvider for MockGoogle {
    fn name(&self) -> &str {
        "mock_google"
    }

    async fn search(&self, query: &str, cutoff: &str, params: &SearchParams) -> SearchOutcome {
        let results = vec![json!({
            "title": format!("Result for {query}"),
            "snippet": format!("This info was available before {cutoff}"),
            "date": cutoff,
        })];
        match filter_before_cutoff(&results, cutoff) {
            Some(filtered) => SearchOutcome::from_filtered(results, filtered, params.k),
            None => SearchOutcome::failure(
                format!("Invalid testing_time format: {cutoff}"),
                params.k,
            ),
        }
    }
}

/// Answer-engine stand-in: a synthesized answer plus source links.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockPerplexity;

#[async_trait]
impl SearchProvider for MockPerplexity {
    fn name(&self) -> &str {
        "mock_perplexity"
    }

    async fn search(&self, query: &str, cutoff: &str, params: &SearchParams) -> SearchOutcome {
        let sources = vec![json!({"url": "source1"}), json!({"url": "source2"})];
        SearchOutcome::unfiltered(sources, params.k).with_answer(format!(
            "Simulated answer for '{query}' restricted to data before {cutoff}"
        ))
    }
}
