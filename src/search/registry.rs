//! Named search providers with a per-call timeout.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::mock::{MockGoogle, MockPerplexity};
use super::provider::{SearchOutcome, SearchParams, SearchProvider};
use crate::errors::{Error, Result, StrategyKind};

/// Explicit registry of search providers.
///
/// Lookups of unknown names fail fast. Provider failures, including
/// timeouts, come back as error payloads.
#[derive(Clone)]
pub struct SearchCore {
    providers: BTreeMap<String, Arc<dyn SearchProvider>>,
    timeout: Duration,
}

impl std::fmt::Debug for SearchCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchCore")
            .field("providers", &self.names())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for SearchCore {
    fn default() -> Self {
        Self::with_builtin(Duration::from_secs(60))
    }
}

impl SearchCore {
    /// Empty registry.
    pub fn new(timeout: Duration) -> Self {
        Self {
            providers: BTreeMap::new(),
            timeout,
        }
    }

    /// Registry holding the offline providers.
    pub fn with_builtin(timeout: Duration) -> Self {
        let mut core = Self::new(timeout);
        core.register(Arc::new(MockGoogle));
        core.register(Arc::new(MockPerplexity));
        core
    }

    /// Add a provider, replacing any provider with the same name.
    pub fn register(&mut self, provider: Arc<dyn SearchProvider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    /// Provider names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run provider `name` with a knowledge cutoff.
    pub async fn execute(
        &self,
        name: &str,
        query: &str,
        cutoff: &str,
        params: &SearchParams,
    ) -> Result<SearchOutcome> {
        let provider = self
            .providers
            .get(name)
            .ok_or_else(|| Error::unknown(StrategyKind::Search, name, self.names()))?;

        debug!(provider = name, query, cutoff, k = params.k, "Executing search");
        let call = provider.search(query, cutoff, params);
        let outcome = match tokio::time::timeout(self.timeout, call).await {
            Ok(outcome) => outcome,
            Err(_) => SearchOutcome::failure(
                format!("{name} timed out after {:?}", self.timeout),
                params.k,
            ),
        };
        if let Some(err) = &outcome.error {
            warn!(provider = name, error = %err, "Search failed");
        }
        Ok(outcome)
    }
}
