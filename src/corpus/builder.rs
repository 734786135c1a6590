//! Joins raw question and resolution records into [`Problem`]s.
//!
//! Records that cannot be stratified are dropped, never raised: a missing or
//! unparsable date, an `"N/A"` sentinel, or a horizon of zero or fewer days.
//! Partial corpora are the normal case across heterogeneous sources.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::types::{id_text, Problem, QuestionRecord, RecordKey, ResolutionRecord};

/// Placeholder used upstream for "no date".
const NOT_AVAILABLE: &str = "N/A";

/// Source tag for records without one.
const UNKNOWN_SOURCE: &str = "unknown";

/// Counters from a corpus build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusStats {
    /// Question records seen
    pub questions: usize,
    /// Problems kept
    pub kept: usize,
    /// Questions with no matching resolution record (kept if their horizon is valid)
    pub missing_resolution: usize,
    /// Questions dropped for a missing, unparsable, or non-positive horizon
    pub invalid_horizon: usize,
    /// Questions dropped because another record produced the same problem id
    pub duplicate_id: usize,
}

/// Normalized evaluation corpus.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    /// Problems sorted by id
    pub problems: Vec<Problem>,
    pub stats: CorpusStats,
}

impl Corpus {
    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }
}

/// First non-empty value, mirroring "field or fallback" on the wire.
fn first_present<'a>(primary: Option<&'a str>, fallback: Option<&'a str>) -> Option<&'a str> {
    primary
        .filter(|s| !s.is_empty())
        .or_else(|| fallback.filter(|s| !s.is_empty()))
}

fn window_start<'a>(q: &'a QuestionRecord) -> Option<&'a str> {
    first_present(q.start_date.as_deref(), q.forecast_due_date.as_deref())
}

fn window_end<'a>(q: &'a QuestionRecord, r: &'a ResolutionRecord) -> Option<&'a str> {
    first_present(q.end_date.as_deref(), r.resolution_date.as_deref())
}

/// Parse the date portion of an ISO-8601 string (`2024-01-01T00:00:00Z` → 2024-01-01).
pub fn parse_date_part(value: &str) -> Option<NaiveDate> {
    if value == NOT_AVAILABLE {
        return None;
    }
    let date = value.split('T').next().unwrap_or(value);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Signed horizon in days, or `None` when either boundary is missing or bad.
///
/// The window opens at `start_date` (else `forecast_due_date`) and closes at
/// `end_date` (else the resolution's `resolution_date`).
pub fn compute_horizon(question: &QuestionRecord, resolution: &ResolutionRecord) -> Option<i64> {
    let start = parse_date_part(window_start(question)?)?;
    let end = parse_date_part(window_end(question, resolution)?)?;
    Some((end - start).num_days())
}

fn build_problem(q: &QuestionRecord, r: &ResolutionRecord, horizon_days: u32) -> Problem {
    let source = q.source.as_deref().unwrap_or(UNKNOWN_SOURCE);
    let original_id = id_text(&q.id);
    let resolved_flag = r.resolved.unwrap_or(r.resolved_to.is_some());

    Problem::new(
        format!("fbv1_{source}_{original_id}"),
        source,
        window_start(q).unwrap_or_default(),
        window_end(q, r).unwrap_or_default(),
        horizon_days,
    )
    .with_origin(q.question_set.clone().unwrap_or_default(), original_id)
    .with_question(q.question.clone())
    .with_details(
        q.background.clone(),
        q.resolution_criteria.clone(),
        q.url.clone(),
    )
    .with_freeze_value(q.freeze_datetime_value.clone())
    .with_time_testing(q.freeze_datetime.clone().filter(|s| !s.is_empty()))
    .with_resolution(resolved_flag, r.resolved_to)
}

/// Build the corpus from the two record sets.
///
/// The surviving set depends only on the record contents, not their order:
/// when two records map to the same problem id, the one from the
/// lexicographically smallest question set wins.
pub fn build_corpus(questions: &[QuestionRecord], resolutions: &[ResolutionRecord]) -> Corpus {
    let lookup: HashMap<RecordKey, &ResolutionRecord> =
        resolutions.iter().map(|r| (r.key(), r)).collect();
    let empty = ResolutionRecord::default();

    let mut stats = CorpusStats {
        questions: questions.len(),
        ..Default::default()
    };
    let mut by_id: BTreeMap<String, Problem> = BTreeMap::new();

    for q in questions {
        let resolution = match lookup.get(&q.key()) {
            Some(r) => *r,
            None => {
                stats.missing_resolution += 1;
                &empty
            }
        };

        let horizon = compute_horizon(q, resolution)
            .filter(|d| *d > 0)
            .and_then(|d| u32::try_from(d).ok());
        let Some(horizon_days) = horizon else {
            stats.invalid_horizon += 1;
            debug!(
                id = %id_text(&q.id),
                source = ?q.source,
                "Dropping question without valid horizon"
            );
            continue;
        };

        let problem = build_problem(q, resolution, horizon_days);
        match by_id.get(&problem.id) {
            Some(existing) if existing.question_set <= problem.question_set => {
                stats.duplicate_id += 1;
            }
            Some(_) => {
                stats.duplicate_id += 1;
                by_id.insert(problem.id.clone(), problem);
            }
            None => {
                by_id.insert(problem.id.clone(), problem);
            }
        }
    }

    stats.kept = by_id.len();
    info!(
        questions = stats.questions,
        kept = stats.kept,
        missing_resolution = stats.missing_resolution,
        invalid_horizon = stats.invalid_horizon,
        duplicate_id = stats.duplicate_id,
        "Corpus built"
    );

    Corpus {
        problems: by_id.into_values().collect(),
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HorizonGroup;
    use serde_json::json;

    fn question(v: serde_json::Value) -> QuestionRecord {
        serde_json::from_value(v).unwrap()
    }

    fn resolution(v: serde_json::Value) -> ResolutionRecord {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn test_compute_horizon_valid_dates() {
        let q = question(json!({"start_date": "2024-01-01", "forecast_due_date": "2024-01-01"}));
        let r = resolution(json!({"resolution_date": "2024-01-11"}));
        assert_eq!(compute_horizon(&q, &r), Some(10));
    }

    #[test]
    fn test_compute_horizon_with_datetime() {
        let q = question(json!({"start_date": "2024-01-01T00:00:00+00:00"}));
        let r = resolution(json!({"resolution_date": "2024-02-01"}));
        assert_eq!(compute_horizon(&q, &r), Some(31));
    }

    #[test]
    fn test_compute_horizon_na_returns_none() {
        let q = question(json!({"start_date": "N/A", "forecast_due_date": "2024-01-01"}));
        let r = resolution(json!({"resolution_date": "2024-01-11"}));
        assert_eq!(compute_horizon(&q, &r), None);
    }

    #[test]
    fn test_compute_horizon_missing_dates() {
        assert_eq!(
            compute_horizon(&QuestionRecord::default(), &ResolutionRecord::default()),
            None
        );
        let q = question(json!({"start_date": "2024-01-01"}));
        assert_eq!(compute_horizon(&q, &ResolutionRecord::default()), None);
    }

    #[test]
    fn test_compute_horizon_uses_fallbacks() {
        let q = question(json!({"forecast_due_date": "2024-01-01"}));
        let r = resolution(json!({"resolution_date": "2024-01-15"}));
        assert_eq!(compute_horizon(&q, &r), Some(14));

        // end_date on the question wins over the resolution date
        let q = question(json!({"start_date": "2024-01-01", "end_date": "2024-01-03"}));
        assert_eq!(compute_horizon(&q, &r), Some(2));

        // empty string falls through to the fallback
        let q = question(json!({"start_date": "", "forecast_due_date": "2024-01-05"}));
        assert_eq!(compute_horizon(&q, &r), Some(10));
    }

    #[test]
    fn test_compute_horizon_garbage() {
        let q = question(json!({"start_date": "yesterday"}));
        let r = resolution(json!({"resolution_date": "2024-01-15"}));
        assert_eq!(compute_horizon(&q, &r), None);
    }

    #[test]
    fn test_build_corpus_joins_and_filters() {
        let questions = vec![
            question(json!({
                "id": "a", "question_set": "s1", "source": "manifold",
                "question": "Will it?", "background": "bg", "url": "https://example.com",
                "forecast_due_date": "2024-01-01",
                "freeze_datetime": "2023-12-30T00:00:00Z"
            })),
            // no resolution, end date on question: kept but unresolved
            question(json!({
                "id": "b", "question_set": "s1", "source": "fred",
                "start_date": "2024-01-01", "end_date": "2024-01-08"
            })),
            // zero horizon
            question(json!({
                "id": "c", "question_set": "s1", "source": "fred",
                "start_date": "2024-01-01", "end_date": "2024-01-01"
            })),
            // negative horizon
            question(json!({
                "id": "d", "question_set": "s1", "source": "fred",
                "start_date": "2024-02-01", "end_date": "2024-01-01"
            })),
            // no dates at all
            question(json!({"id": "e", "question_set": "s1", "source": "acled"})),
        ];
        let resolutions = vec![resolution(json!({
            "id": "a", "question_set": "s1",
            "resolution_date": "2024-03-31", "resolved_to": 0.0
        }))];

        let corpus = build_corpus(&questions, &resolutions);
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.stats.questions, 5);
        assert_eq!(corpus.stats.kept, 2);
        assert_eq!(corpus.stats.invalid_horizon, 3);
        assert_eq!(corpus.stats.missing_resolution, 4);

        let ids: Vec<&str> = corpus.problems.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["fbv1_fred_b", "fbv1_manifold_a"]);

        let a = corpus
            .problems
            .iter()
            .find(|p| p.id == "fbv1_manifold_a")
            .unwrap();
        assert_eq!(a.horizon_days(), 90);
        assert_eq!(a.horizon_group(), HorizonGroup::LongTerm);
        assert_eq!(a.time_testing, "2023-12-30T00:00:00Z");
        assert_eq!(a.time_start, "2024-01-01");
        assert_eq!(a.time_end, "2024-03-31");
        assert!(a.resolved_flag);
        assert_eq!(a.resolution_status, Some(0.0));
        assert_eq!(a.background.as_deref(), Some("bg"));

        let b = corpus
            .problems
            .iter()
            .find(|p| p.id == "fbv1_fred_b")
            .unwrap();
        assert_eq!(b.horizon_group(), HorizonGroup::NearTerm);
        assert_eq!(b.time_testing, "2024-01-01");
        assert!(!b.resolved_flag);
        assert_eq!(b.outcome(), None);
    }

    #[test]
    fn test_build_corpus_order_independent() {
        let mut questions: Vec<QuestionRecord> = (0..20)
            .map(|i| {
                question(json!({
                    "id": format!("q{i}"), "question_set": "s",
                    "source": if i % 2 == 0 { "fred" } else { "metaculus" },
                    "start_date": "2024-01-01", "end_date": format!("2024-03-{:02}", i + 1)
                }))
            })
            .collect();
        // same id/source in another question set
        questions.push(question(json!({
            "id": "q0", "question_set": "a_first", "source": "fred",
            "start_date": "2024-01-01", "end_date": "2024-12-01"
        })));

        let forward = build_corpus(&questions, &[]);
        questions.reverse();
        let backward = build_corpus(&questions, &[]);

        assert_eq!(forward.problems, backward.problems);
        assert_eq!(forward.stats.duplicate_id, 1);
        let q0 = forward
            .problems
            .iter()
            .find(|p| p.id == "fbv1_fred_q0")
            .unwrap();
        assert_eq!(q0.question_set, "a_first");
    }

    #[test]
    fn test_non_string_ids_join() {
        let questions = vec![question(json!({
            "id": ["x", "y"], "question_set": "combo", "source": "polymarket",
            "forecast_due_date": "2024-01-01"
        }))];
        let resolutions = vec![resolution(json!({
            "id": ["x", "y"], "question_set": "combo",
            "resolution_date": "2024-01-20", "resolved_to": 1.0, "resolved": true
        }))];
        let corpus = build_corpus(&questions, &resolutions);
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.problems[0].outcome(), Some(1.0));
        assert_eq!(corpus.stats.missing_resolution, 0);
    }

    #[test]
    fn test_missing_source_is_unknown() {
        let questions = vec![question(json!({
            "id": "z", "start_date": "2024-01-01", "end_date": "2024-01-02"
        }))];
        let corpus = build_corpus(&questions, &[]);
        assert_eq!(corpus.problems[0].source, "unknown");
        assert_eq!(corpus.problems[0].id, "fbv1_unknown_z");
    }
}
