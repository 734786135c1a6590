//! Deterministic stratified sampling with quota redistribution.
//!
//! Builds a balanced evaluation set from an unbalanced multi-source corpus:
//!
//! 1. **Filter** by optional source / horizon allow-lists.
//! 2. **Index** by source, and within each source by horizon label.
//! 3. **Quota**: `per_source = max(1, max_quest / active_sources)`.
//! 4. **First pass**, sources in lexicographic order:
//!    - market sources take `max(1, per_source / horizons)` from each horizon
//!      group, then top up from the rest of the source's pool;
//!    - data sources take `per_source` uniformly from their whole pool.
//! 5. **Redistribution**: leftover quota goes to the sources with the most
//!    untapped supply first. Small sources are capped by their own size, so
//!    the global target is met from the largest remaining pools.
//! 6. **Trim** to `max_quest` if anything overshot.
//!
//! All randomness comes from one PRNG seeded once per call, consumed in the
//! fixed step order above. Every pool is sorted by problem id before it is
//! shuffled, so the result depends only on the corpus contents and the
//! request, never on corpus order.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::errors::{Error, Result};
use crate::types::{HorizonGroup, Problem, SourceCatalog};

/// Sampled problems keyed by problem id.
pub type Selection = BTreeMap<String, Problem>;

/// Input to [`StratifiedSampler::sample`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplingRequest {
    /// Target number of problems (at least 1)
    pub max_quest: usize,
    /// Seed for every random draw of the call
    pub seed: u64,
    /// Source allow-list; `None` keeps every source
    pub sources: Option<BTreeSet<String>>,
    /// Horizon-label allow-list; `None` keeps every horizon
    pub horizons: Option<BTreeSet<String>>,
}

impl SamplingRequest {
    pub fn new(max_quest: usize, seed: u64) -> Self {
        Self {
            max_quest,
            seed,
            sources: None,
            horizons: None,
        }
    }

    pub fn with_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources = Some(sources.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_horizons<I, S>(mut self, horizons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.horizons = Some(horizons.into_iter().map(Into::into).collect());
        self
    }

    fn admits(&self, problem: &Problem) -> bool {
        let source_ok = self
            .sources
            .as_ref()
            .map_or(true, |s| s.contains(&problem.source));
        let horizon_ok = self
            .horizons
            .as_ref()
            .map_or(true, |h| h.contains(problem.horizon_group().label()));
        source_ok && horizon_ok
    }
}

/// Retained problems of one source.
#[derive(Default)]
struct SourcePool<'a> {
    /// Every retained problem, sorted by id
    all: Vec<&'a Problem>,
    /// Same problems grouped by horizon label (lexicographic keys)
    by_horizon: BTreeMap<&'static str, Vec<&'a Problem>>,
}

/// Stratified sampler over a fixed source catalog.
#[derive(Debug, Clone, Copy)]
pub struct StratifiedSampler<'c> {
    catalog: &'c SourceCatalog,
}

impl<'c> StratifiedSampler<'c> {
    pub fn new(catalog: &'c SourceCatalog) -> Self {
        Self { catalog }
    }

    /// Select at most `max_quest` distinct problems.
    ///
    /// Returns the whole filtered corpus when it is smaller than `max_quest`,
    /// and an empty selection when the filters match nothing.
    pub fn sample(&self, corpus: &[Problem], request: &SamplingRequest) -> Result<Selection> {
        if request.max_quest == 0 {
            return Err(Error::InvalidRequest("max_quest must be at least 1".into()));
        }
        let max_quest = request.max_quest;
        let mut rng = StdRng::seed_from_u64(request.seed);

        let pools = self.index(corpus, request);
        if pools.is_empty() {
            debug!(
                sources = ?request.sources,
                horizons = ?request.horizons,
                "No problems match sampling filters"
            );
            return Ok(Selection::new());
        }

        let per_source = (max_quest / pools.len()).max(1);
        let mut selected: BTreeMap<&str, &Problem> = BTreeMap::new();
        let mut taken: BTreeMap<&str, usize> = BTreeMap::new();

        // First pass: per-source quota
        for (&source, pool) in &pools {
            let picked = if self.catalog.is_market(source) {
                pick_stratified(pool, per_source, &mut rng)
            } else {
                if !self.catalog.contains(source) {
                    debug!(source, "Source not in catalog, sampling as data source");
                }
                pick_uniform(&pool.all, per_source, &mut rng)
            };
            taken.insert(source, picked.len());
            for p in picked {
                selected.insert(p.id.as_str(), p);
            }
        }
        let first_pass = selected.len();

        // Second pass: hand leftover quota to the largest untapped pools
        let mut remaining = max_quest.saturating_sub(selected.len());
        if remaining > 0 {
            let mut with_capacity: Vec<(&str, usize)> = pools
                .iter()
                .filter_map(|(&source, pool)| {
                    let available = pool.all.len().saturating_sub(taken[source]);
                    (available > 0).then_some((source, available))
                })
                .collect();
            // Stable sort: ties stay in lexicographic order
            with_capacity.sort_by(|a, b| b.1.cmp(&a.1));

            for (source, available) in with_capacity {
                if remaining == 0 {
                    break;
                }
                let mut additional: Vec<&Problem> = pools[source]
                    .all
                    .iter()
                    .copied()
                    .filter(|p| !selected.contains_key(p.id.as_str()))
                    .collect();
                additional.shuffle(&mut rng);
                let to_add = additional.len().min(available).min(remaining);
                for p in additional.into_iter().take(to_add) {
                    selected.insert(p.id.as_str(), p);
                    remaining -= 1;
                }
            }
        }
        let redistributed = selected.len() - first_pass;

        // Safety trim; the quota arithmetic above should never overshoot
        if selected.len() > max_quest {
            let mut all: Vec<&Problem> = selected.values().copied().collect();
            all.shuffle(&mut rng);
            all.truncate(max_quest);
            selected = all.into_iter().map(|p| (p.id.as_str(), p)).collect();
        }

        info!(
            active_sources = pools.len(),
            per_source,
            first_pass,
            redistributed,
            selected = selected.len(),
            max_quest,
            seed = request.seed,
            "Stratified sample drawn"
        );

        Ok(selected
            .into_values()
            .map(|p| (p.id.clone(), p.clone()))
            .collect())
    }

    /// Filter and group by source, then by horizon label.
    fn index<'a>(
        &self,
        corpus: &'a [Problem],
        request: &SamplingRequest,
    ) -> BTreeMap<&'a str, SourcePool<'a>> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut pools: BTreeMap<&'a str, SourcePool<'a>> = BTreeMap::new();

        let mut retained: Vec<&Problem> = corpus
            .iter()
            .filter(|p| request.admits(p))
            .filter(|p| seen.insert(p.id.as_str()))
            .collect();
        retained.sort_by(|a, b| a.id.cmp(&b.id));

        for p in retained {
            let pool = pools.entry(p.source.as_str()).or_default();
            pool.all.push(p);
            pool.by_horizon
                .entry(p.horizon_group().label())
                .or_default()
                .push(p);
        }
        pools
    }
}

/// Shuffle the pool and take the first `quota`.
fn pick_uniform<'a>(pool: &[&'a Problem], quota: usize, rng: &mut StdRng) -> Vec<&'a Problem> {
    let mut shuffled = pool.to_vec();
    shuffled.shuffle(rng);
    shuffled.truncate(quota);
    shuffled
}

/// Per-horizon draws for a market source, topped up from the whole pool.
fn pick_stratified<'a>(pool: &SourcePool<'a>, quota: usize, rng: &mut StdRng) -> Vec<&'a Problem> {
    let per_horizon = (quota / pool.by_horizon.len().max(1)).max(1);

    let mut picked: Vec<&Problem> = Vec::with_capacity(quota);
    for group in pool.by_horizon.values() {
        picked.extend(pick_uniform(group, per_horizon, rng));
    }

    if picked.len() < quota {
        let picked_ids: HashSet<&str> = picked.iter().map(|p| p.id.as_str()).collect();
        let rest: Vec<&Problem> = pool
            .all
            .iter()
            .copied()
            .filter(|p| !picked_ids.contains(p.id.as_str()))
            .collect();
        let needed = quota - picked.len();
        picked.extend(pick_uniform(&rest, needed, rng));
    }

    // One draw per horizon can exceed a small quota
    picked.truncate(quota);
    picked
}

/// Count of problems per source and horizon.
pub fn horizon_summary<'a, I>(problems: I) -> BTreeMap<String, BTreeMap<HorizonGroup, usize>>
where
    I: IntoIterator<Item = &'a Problem>,
{
    let mut summary: BTreeMap<String, BTreeMap<HorizonGroup, usize>> = BTreeMap::new();
    for p in problems {
        *summary
            .entry(p.source.clone())
            .or_default()
            .entry(p.horizon_group())
            .or_default() += 1;
    }
    summary
}
