//! Evaluation items.

use serde::Serialize;

use super::horizon::HorizonGroup;

/// One forecastable question paired with its ground truth.
///
/// Built once by the corpus builder and never mutated afterwards. The horizon
/// fields are private so that `horizon_group` always equals
/// `HorizonGroup::from_days(horizon_days)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Problem {
    /// Stable id, `fbv1_{source}_{original_id}`
    pub id: String,
    /// Source tag (e.g. "fred", "manifold")
    pub source: String,
    /// Question set the record came from
    pub question_set: String,
    /// Id inside the upstream question set
    pub original_id: String,
    pub question_text: Option<String>,
    pub background: Option<String>,
    pub resolution_criteria: Option<String>,
    pub url: Option<String>,
    /// Opening of the forecast window (ISO-8601)
    pub time_start: String,
    /// Close of the forecast window (ISO-8601)
    pub time_end: String,
    /// Knowledge cutoff for a forecasting agent (defaults to `time_start`)
    pub time_testing: String,
    /// Reference value at freeze time, passed through untouched
    pub freeze_datetime_value: Option<serde_json::Value>,
    /// Whether the question has resolved
    pub resolved_flag: bool,
    /// 0.0 / 1.0 outcome, `None` while unresolved
    pub resolution_status: Option<f64>,
    horizon_days: u32,
    horizon_group: HorizonGroup,
}

impl Problem {
    /// Create a problem with the required identity and horizon fields.
    ///
    /// `time_testing` starts out equal to `time_start`; override it with
    /// [`Problem::with_time_testing`].
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        time_start: impl Into<String>,
        time_end: impl Into<String>,
        horizon_days: u32,
    ) -> Self {
        let time_start = time_start.into();
        Self {
            id: id.into(),
            source: source.into(),
            question_set: String::new(),
            original_id: String::new(),
            question_text: None,
            background: None,
            resolution_criteria: None,
            url: None,
            time_testing: time_start.clone(),
            time_start,
            time_end: time_end.into(),
            freeze_datetime_value: None,
            resolved_flag: false,
            resolution_status: None,
            horizon_days,
            horizon_group: HorizonGroup::from_days(horizon_days as i64),
        }
    }

    /// Set the resolution. `None` leaves the problem unresolved.
    pub fn with_resolution(mut self, resolved_flag: bool, resolution_status: Option<f64>) -> Self {
        self.resolved_flag = resolved_flag;
        self.resolution_status = resolution_status;
        self
    }

    /// Override the knowledge cutoff. `None` keeps `time_start`.
    pub fn with_time_testing(mut self, time_testing: Option<String>) -> Self {
        if let Some(t) = time_testing {
            self.time_testing = t;
        }
        self
    }

    pub fn with_question(mut self, question_text: Option<String>) -> Self {
        self.question_text = question_text;
        self
    }

    pub fn with_origin(
        mut self,
        question_set: impl Into<String>,
        original_id: impl Into<String>,
    ) -> Self {
        self.question_set = question_set.into();
        self.original_id = original_id.into();
        self
    }

    pub fn with_details(
        mut self,
        background: Option<String>,
        resolution_criteria: Option<String>,
        url: Option<String>,
    ) -> Self {
        self.background = background;
        self.resolution_criteria = resolution_criteria;
        self.url = url;
        self
    }

    pub fn with_freeze_value(mut self, value: Option<serde_json::Value>) -> Self {
        self.freeze_datetime_value = value;
        self
    }

    pub fn horizon_days(&self) -> u32 {
        self.horizon_days
    }

    pub fn horizon_group(&self) -> HorizonGroup {
        self.horizon_group
    }

    /// Ground-truth outcome, if this problem can be scored.
    pub fn outcome(&self) -> Option<f64> {
        if self.resolved_flag {
            self.resolution_status
        } else {
            None
        }
    }

    /// Anonymized copy safe to hand to a forecasting agent.
    pub fn view(&self) -> ProblemView {
        ProblemView::from(self)
    }
}

/// A problem with its resolution stripped.
///
/// This is everything a forecasting agent is allowed to see.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProblemView {
    pub id: String,
    pub source: String,
    pub question_set: String,
    pub original_id: String,
    pub question_text: Option<String>,
    pub background: Option<String>,
    pub resolution_criteria: Option<String>,
    pub url: Option<String>,
    pub time_start: String,
    pub time_end: String,
    pub time_testing: String,
    pub freeze_datetime_value: Option<serde_json::Value>,
    pub horizon_days: u32,
    pub horizon_group: HorizonGroup,
}

impl From<&Problem> for ProblemView {
    fn from(p: &Problem) -> Self {
        Self {
            id: p.id.clone(),
            source: p.source.clone(),
            question_set: p.question_set.clone(),
            original_id: p.original_id.clone(),
            question_text: p.question_text.clone(),
            background: p.background.clone(),
            resolution_criteria: p.resolution_criteria.clone(),
            url: p.url.clone(),
            time_start: p.time_start.clone(),
            time_end: p.time_end.clone(),
            time_testing: p.time_testing.clone(),
            freeze_datetime_value: p.freeze_datetime_value.clone(),
            horizon_days: p.horizon_days,
            horizon_group: p.horizon_group,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Problem {
        Problem::new("fbv1_fred_x", "fred", "2024-01-01", "2024-04-01", 91)
            .with_resolution(true, Some(1.0))
    }

    #[test]
    fn test_horizon_group_derived_from_days() {
        let p = sample();
        assert_eq!(p.horizon_days(), 91);
        assert_eq!(p.horizon_group(), HorizonGroup::LongTerm);
    }

    #[test]
    fn test_time_testing_defaults_to_start() {
        let p = sample();
        assert_eq!(p.time_testing, "2024-01-01");

        let p = sample().with_time_testing(None);
        assert_eq!(p.time_testing, "2024-01-01");

        let p = sample().with_time_testing(Some("2023-12-25T00:00:00Z".into()));
        assert_eq!(p.time_testing, "2023-12-25T00:00:00Z");
    }

    #[test]
    fn test_outcome_requires_resolved_flag() {
        assert_eq!(sample().outcome(), Some(1.0));
        let p = sample().with_resolution(false, Some(1.0));
        assert_eq!(p.outcome(), None);
        let p = sample().with_resolution(true, None);
        assert_eq!(p.outcome(), None);
    }

    #[test]
    fn test_view_strips_resolution() {
        let view = sample().view();
        let json = serde_json::to_value(&view).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("resolved_flag"));
        assert!(!obj.contains_key("resolution_status"));
        assert_eq!(obj["horizon_group"], "long_term");
        assert_eq!(obj["id"], "fbv1_fred_x");
    }
}
