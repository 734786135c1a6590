//! Locating and reading the resolved question / resolution files.
//!
//! Fetching the upstream dataset is someone else's job; this module only
//! checks that it is present and reads it.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::builder::{build_corpus, Corpus};
use crate::config::DatasetConfig;
use crate::errors::{Error, Result};
use crate::types::{QuestionFile, QuestionRecord, ResolutionFile, ResolutionRecord};

/// Default question file name.
pub const QUESTIONS_FILE: &str = "X_single_resolved.json";

/// Default resolution file name.
pub const RESOLUTIONS_FILE: &str = "y_single_resolved.json";

/// Paths to the two record files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    pub questions: PathBuf,
    pub resolutions: PathBuf,
}

impl DatasetPaths {
    /// Default file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            questions: dir.join(QUESTIONS_FILE),
            resolutions: dir.join(RESOLUTIONS_FILE),
        }
    }

    pub fn from_config(config: &DatasetConfig) -> Self {
        Self {
            questions: config.dir.join(&config.questions_file),
            resolutions: config.dir.join(&config.resolutions_file),
        }
    }

    /// Succeeds without side effects when both files exist.
    pub fn ensure_present(&self) -> Result<()> {
        for path in [&self.questions, &self.resolutions] {
            if !path.is_file() {
                return Err(Error::DatasetMissing(path.display().to_string()));
            }
        }
        debug!(
            questions = %self.questions.display(),
            resolutions = %self.resolutions.display(),
            "Dataset present"
        );
        Ok(())
    }

    /// Read both record sets.
    pub fn load_records(&self) -> Result<(Vec<QuestionRecord>, Vec<ResolutionRecord>)> {
        self.ensure_present()?;
        let questions: QuestionFile = read_json(&self.questions)?;
        let resolutions: ResolutionFile = read_json(&self.resolutions)?;
        info!(
            questions = questions.questions.len(),
            resolutions = resolutions.resolutions.len(),
            "Loaded raw records"
        );
        Ok((questions.questions, resolutions.resolutions))
    }

    /// Read and normalize into a corpus.
    pub fn load_corpus(&self) -> Result<Corpus> {
        let (questions, resolutions) = self.load_records()?;
        Ok(build_corpus(&questions, &resolutions))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| Error::Json(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write(dir: &Path, name: &str, value: serde_json::Value) {
        let body = serde_json::to_string(&value).unwrap();
        std::fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn test_ensure_present_missing() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DatasetPaths::in_dir(dir.path());
        let err = paths.ensure_present().unwrap_err();
        assert!(matches!(err, Error::DatasetMissing(ref p) if p.ends_with(QUESTIONS_FILE)));
    }

    #[test]
    fn test_ensure_present_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), QUESTIONS_FILE, json!({"questions": []}));
        write(dir.path(), RESOLUTIONS_FILE, json!({"resolutions": []}));
        let paths = DatasetPaths::in_dir(dir.path());
        assert!(paths.ensure_present().is_ok());
        assert!(paths.ensure_present().is_ok());
    }

    #[test]
    fn test_load_corpus_from_files() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            QUESTIONS_FILE,
            json!({"questions": [
                {"id": "q1", "question_set": "s", "source": "fred",
                 "forecast_due_date": "2024-01-01", "freeze_datetime": "2023-12-31T00:00:00Z"},
                {"id": "q2", "question_set": "s", "source": "fred", "forecast_due_date": "N/A"}
            ]}),
        );
        write(
            dir.path(),
            RESOLUTIONS_FILE,
            json!({"resolutions": [
                {"id": "q1", "question_set": "s",
                 "resolution_date": "2024-01-31", "resolved_to": 1.0},
                {"id": "q2", "question_set": "s",
                 "resolution_date": "2024-01-31", "resolved_to": 0.0}
            ]}),
        );

        let corpus = DatasetPaths::in_dir(dir.path()).load_corpus().unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.problems[0].id, "fbv1_fred_q1");
        assert_eq!(corpus.problems[0].horizon_days(), 30);
        assert_eq!(corpus.stats.invalid_horizon, 1);
    }

    #[test]
    fn test_bad_json_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let questions = dir.path().join(QUESTIONS_FILE);
        std::fs::write(questions, "{not json").unwrap();
        write(dir.path(), RESOLUTIONS_FILE, json!({"resolutions": []}));
        let err = DatasetPaths::in_dir(dir.path()).load_records().unwrap_err();
        assert!(matches!(err, Error::Json(ref m) if m.contains(QUESTIONS_FILE)));
    }
}
