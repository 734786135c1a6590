//! Named problem loaders.
//!
//! Every loader turns the normalized corpus into the active problem set.
//! The registry is a plain `name -> fn` table built once; config validation
//! checks names against it before a run starts.

use std::collections::{BTreeMap, BTreeSet};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use super::sampler::{SamplingRequest, Selection, StratifiedSampler};
use crate::errors::{Error, Result, StrategyKind};
use crate::types::{Problem, SourceCatalog};

/// Parameters shared by every loader. Each loader reads only what it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderParams {
    pub max_quest: usize,
    pub seed: u64,
    pub sources: Option<BTreeSet<String>>,
    pub horizons: Option<BTreeSet<String>>,
    /// Single source for `forecastbench_v1_source` / `load_by_source`
    pub source: Option<String>,
    /// Sample size for `load_random` (defaults to `max_quest`)
    pub count: Option<usize>,
}

impl Default for LoaderParams {
    fn default() -> Self {
        Self {
            max_quest: 200,
            seed: 42,
            sources: None,
            horizons: None,
            source: None,
            count: None,
        }
    }
}

impl LoaderParams {
    fn request(&self) -> SamplingRequest {
        SamplingRequest {
            max_quest: self.max_quest,
            seed: self.seed,
            sources: self.sources.clone(),
            horizons: self.horizons.clone(),
        }
    }

    fn required_source(&self) -> Result<&str> {
        self.source
            .as_deref()
            .ok_or_else(|| Error::InvalidRequest("loader requires a 'source' parameter".into()))
    }
}

/// What a loader reads from.
#[derive(Debug, Clone, Copy)]
pub struct LoadContext<'a> {
    pub corpus: &'a [Problem],
    pub catalog: &'a SourceCatalog,
}

pub type LoaderFn = fn(&LoadContext<'_>, &LoaderParams) -> Result<Selection>;

/// Static registry of loaders.
#[derive(Debug, Clone)]
pub struct LoaderRegistry {
    loaders: BTreeMap<&'static str, LoaderFn>,
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl LoaderRegistry {
    /// Registry with every built-in loader.
    pub fn standard() -> Self {
        let entries: [(&'static str, LoaderFn); 6] = [
            ("forecastbench_v1", load_stratified),
            ("forecastbench_v1_source", load_single_source),
            ("forecastbench_v1_extensive", load_extensive),
            ("load_all", load_all),
            ("load_random", load_random),
            ("load_by_source", load_by_source),
        ];
        Self {
            loaders: entries.into_iter().collect(),
        }
    }

    /// Loader names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        self.loaders.keys().copied().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.loaders.contains_key(name)
    }

    /// Run loader `name`.
    pub fn load(
        &self,
        name: &str,
        ctx: &LoadContext<'_>,
        params: &LoaderParams,
    ) -> Result<Selection> {
        let loader = self
            .loaders
            .get(name)
            .ok_or_else(|| Error::unknown(StrategyKind::Loader, name, self.names()))?;
        debug!(loader = name, corpus = ctx.corpus.len(), "Running loader");
        loader(ctx, params)
    }
}

fn load_stratified(ctx: &LoadContext<'_>, params: &LoaderParams) -> Result<Selection> {
    StratifiedSampler::new(ctx.catalog).sample(ctx.corpus, &params.request())
}

fn load_single_source(ctx: &LoadContext<'_>, params: &LoaderParams) -> Result<Selection> {
    let source = params.required_source()?;
    if !ctx.catalog.contains(source) {
        return Err(Error::UnknownSource(source.to_string()));
    }
    let mut request = params.request();
    request.sources = Some(BTreeSet::from([source.to_string()]));
    StratifiedSampler::new(ctx.catalog).sample(ctx.corpus, &request)
}

fn load_extensive(ctx: &LoadContext<'_>, params: &LoaderParams) -> Result<Selection> {
    let mut request = params.request();
    request.sources = Some(ctx.catalog.sources().into_iter().map(String::from).collect());
    request.horizons = None;
    StratifiedSampler::new(ctx.catalog).sample(ctx.corpus, &request)
}

fn load_all(ctx: &LoadContext<'_>, _params: &LoaderParams) -> Result<Selection> {
    Ok(collect(ctx.corpus.iter()))
}

fn load_random(ctx: &LoadContext<'_>, params: &LoaderParams) -> Result<Selection> {
    let count = params.count.unwrap_or(params.max_quest);
    if count == 0 {
        return Err(Error::InvalidRequest("count must be at least 1".into()));
    }
    let mut pool: Vec<&Problem> = ctx.corpus.iter().collect();
    pool.sort_by(|a, b| a.id.cmp(&b.id));
    pool.dedup_by(|a, b| a.id == b.id);
    let mut rng = StdRng::seed_from_u64(params.seed);
    pool.shuffle(&mut rng);
    pool.truncate(count);
    Ok(collect(pool))
}

fn load_by_source(ctx: &LoadContext<'_>, params: &LoaderParams) -> Result<Selection> {
    let source = params.required_source()?;
    Ok(collect(ctx.corpus.iter().filter(|p| p.source == source)))
}

fn collect<'a>(problems: impl IntoIterator<Item = &'a Problem>) -> Selection {
    problems
        .into_iter()
        .map(|p| (p.id.clone(), p.clone()))
        .collect()
}
