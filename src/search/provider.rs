//! Search provider boundary.
//!
//! Providers never raise: transport failures, missing credentials and bad
//! cutoffs all come back as a [`SearchOutcome`] with `error` set, so callers
//! handle one failure shape.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::corpus::parse_date_part;

/// Keys checked, in order, when pulling a link out of a result.
const LINK_KEYS: [&str; 4] = ["url", "link", "href", "article_url"];

/// Per-call search parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Number of results requested
    pub k: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self { k: 10 }
    }
}

/// Standardized search payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub requested_k: usize,
    pub results_before_filter: Vec<Value>,
    pub results_after_filter: Vec<Value>,
    pub returned_before_filter: usize,
    pub returned_after_filter: usize,
    pub links_before_filter: Vec<String>,
    pub links_after_filter: Vec<String>,
    /// Results whose `date` could not be parsed
    pub date_parse_failures: usize,
    /// Results without a `date`
    pub no_date_count: usize,
    /// Synthesized answer, for answer-style providers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchOutcome {
    /// Payload for results fetched and filtered against a cutoff.
    pub fn from_filtered(before: Vec<Value>, filtered: CutoffFilter, requested_k: usize) -> Self {
        Self {
            requested_k,
            returned_before_filter: before.len(),
            returned_after_filter: filtered.kept.len(),
            links_before_filter: extract_links(&before),
            links_after_filter: extract_links(&filtered.kept),
            results_before_filter: before,
            results_after_filter: filtered.kept,
            date_parse_failures: filtered.date_parse_failures,
            no_date_count: filtered.no_date_count,
            answer: None,
            error: None,
        }
    }

    /// Payload for a provider that already filtered server-side.
    pub fn unfiltered(results: Vec<Value>, requested_k: usize) -> Self {
        let filtered = CutoffFilter {
            kept: results.clone(),
            date_parse_failures: 0,
            no_date_count: 0,
        };
        Self::from_filtered(results, filtered, requested_k)
    }

    /// Error payload.
    pub fn failure(message: impl Into<String>, requested_k: usize) -> Self {
        Self {
            requested_k,
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_answer(mut self, answer: impl Into<String>) -> Self {
        self.answer = Some(answer.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Links found in a result list.
pub fn extract_links(results: &[Value]) -> Vec<String> {
    results
        .iter()
        .filter_map(|r| {
            LINK_KEYS
                .iter()
                .find_map(|k| r.get(*k).and_then(Value::as_str))
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .collect()
}

/// Result of [`filter_before_cutoff`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CutoffFilter {
    pub kept: Vec<Value>,
    pub date_parse_failures: usize,
    pub no_date_count: usize,
}

/// Keep results dated on or before the cutoff day.
///
/// Comparison is on the date portion only. Results without a `date`, or with
/// one that does not parse, are dropped and counted. Returns `None` when the
/// cutoff itself does not parse.
pub fn filter_before_cutoff(results: &[Value], cutoff: &str) -> Option<CutoffFilter> {
    let cutoff = parse_date_part(cutoff)?;
    let mut out = CutoffFilter::default();
    for r in results {
        match r.get("date").and_then(Value::as_str) {
            None | Some("") => out.no_date_count += 1,
            Some(date) => match parse_date_part(date) {
                Some(d) if d <= cutoff => out.kept.push(r.clone()),
                Some(_) => {}
                None => out.date_parse_failures += 1,
            },
        }
    }
    Some(out)
}

/// A search capability invoked with a knowledge cutoff.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Registry name.
    fn name(&self) -> &str;

    /// Run `query`, returning only information available at `cutoff`.
    async fn search(&self, query: &str, cutoff: &str, params: &SearchParams) -> SearchOutcome;
}
