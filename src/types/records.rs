//! Raw upstream records.
//!
//! Questions and resolutions arrive as two separate JSON documents joined on
//! `(question_set, id)`. Every field is optional on the wire; validation
//! happens in the corpus builder, not here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Question side of the join.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// String for single questions, array for combinations
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub question_set: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub resolution_criteria: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub forecast_due_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub freeze_datetime: Option<String>,
    #[serde(default)]
    pub freeze_datetime_value: Option<Value>,
}

/// Resolution side of the join.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolutionRecord {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub question_set: Option<String>,
    #[serde(default)]
    pub resolution_date: Option<String>,
    #[serde(default)]
    pub resolved_to: Option<f64>,
    #[serde(default)]
    pub resolved: Option<bool>,
}

/// `{"questions": [...]}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionFile {
    #[serde(default)]
    pub questions: Vec<QuestionRecord>,
}

/// `{"resolutions": [...]}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolutionFile {
    #[serde(default)]
    pub resolutions: Vec<ResolutionRecord>,
}

/// Composite join key `(question_set, id)`.
pub type RecordKey = (String, String);

/// Textual form of a record id. Non-string ids use their JSON text.
pub fn id_text(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl QuestionRecord {
    pub fn key(&self) -> RecordKey {
        (self.question_set.clone().unwrap_or_default(), id_text(&self.id))
    }
}

impl ResolutionRecord {
    pub fn key(&self) -> RecordKey {
        (self.question_set.clone().unwrap_or_default(), id_text(&self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_text() {
        assert_eq!(id_text(&json!("abc")), "abc");
        assert_eq!(id_text(&json!(17)), "17");
        assert_eq!(id_text(&json!(["a", "b"])), "[\"a\",\"b\"]");
        assert_eq!(id_text(&Value::Null), "");
    }

    #[test]
    fn test_keys_join() {
        let q: QuestionRecord = serde_json::from_value(json!({
            "id": "q1",
            "question_set": "2024-07-21-llm.json",
            "source": "fred",
            "unexpected_field": 3
        }))
        .unwrap();
        let r: ResolutionRecord = serde_json::from_value(json!({
            "id": "q1",
            "question_set": "2024-07-21-llm.json",
            "resolved_to": 1.0
        }))
        .unwrap();
        assert_eq!(q.key(), r.key());
        assert_eq!(r.resolved, None);
    }

    #[test]
    fn test_question_file_defaults() {
        let f: QuestionFile = serde_json::from_str("{}").unwrap();
        assert!(f.questions.is_empty());
    }
}
