use thiserror::Error;

/// Which registry a name lookup failed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Loader,
    Selection,
    Metric,
    Search,
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            StrategyKind::Loader => "loader",
            StrategyKind::Selection => "selection strategy",
            StrategyKind::Metric => "metric",
            StrategyKind::Search => "search function",
        })
    }
}

/// Main crate error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // === Input validation ===
    /// Problem id is not part of the active corpus
    #[error("Problem ID {0} not found")]
    UnknownProblem(String),

    /// Prediction outside [0, 1]
    #[error("Prediction must be between 0.0 and 1.0, got {0}")]
    OutOfRange(f64),

    /// Name not present in one of the static registries
    #[error("{kind} '{name}' not found. Available: {available:?}")]
    UnknownStrategy {
        kind: StrategyKind,
        name: String,
        available: Vec<String>,
    },

    /// Source not present in the source catalog
    #[error("Unknown source: {0}")]
    UnknownSource(String),

    /// Metric inputs of different length
    #[error("Predictions ({predictions}) and outcomes ({outcomes}) must have the same length")]
    LengthMismatch { predictions: usize, outcomes: usize },

    /// Malformed request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // === Dataset / configuration ===
    /// Required dataset file is absent
    #[error("Dataset file not found: {0}")]
    DatasetMissing(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON parse error
    #[error("Json parse error: {0}")]
    Json(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn unknown<I, S>(kind: StrategyKind, name: &str, available: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Error::UnknownStrategy {
            kind,
            name: name.to_string(),
            available: available.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether this error was caused by caller input rather than data or environment.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::UnknownProblem(_)
                | Error::OutOfRange(_)
                | Error::UnknownStrategy { .. }
                | Error::UnknownSource(_)
                | Error::LengthMismatch { .. }
                | Error::InvalidRequest(_)
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
