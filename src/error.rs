use thiserror::Error;

pub type Result<T> = std::result::Result<T, QaError>;

#[derive(Error, Debug)]
pub enum QaError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Key '{key}' not found (literal or protocol-prefixed)")]
    KeyNotFound { key: String },

    #[error("Incomplete observation input: {0}")]
    IncompleteInput(String),

    #[error("Invalid protocol: '{0}'")]
    InvalidProtocol(String),

    #[error("Unknown flag code: '{0}'")]
    UnknownFlag(String),

    #[error("Unknown cloud cover category: '{0}'")]
    UnknownCategory(String),

    #[error("Cloud fraction {0} is outside [0.0, 1.0]")]
    FractionOutOfRange(f64),

    #[error("Grid index {index:?} is outside dataset shape {shape:?}")]
    GridIndexOutOfRange {
        index: (i64, i64, i64),
        shape: (usize, usize, usize),
    },

    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    #[error("Observations are not in chronological order at position {position}")]
    NotChronological { position: usize },

    #[error("Invalid datetime range: {0}")]
    InvalidRange(String),
}

impl From<config::ConfigError> for QaError {
    fn from(err: config::ConfigError) -> Self {
        QaError::Config(err.to_string())
    }
}
