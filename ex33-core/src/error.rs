use thiserror::Error;

pub type Ex33Result<T> = Result<T, Ex33Error>;

#[derive(Error, Debug, Clone)]
pub enum Ex33Error {
    #[error("Invalid pattern: {0}")]
    Pattern(String),

    #[error("Malformed sandbox message: {0}")]
    MalformedMessage(String),

    #[error("Sandbox load failed: {0}")]
    Sandbox(String),

    #[error("Storage error for key '{key}': {reason}")]
    Storage { key: String, reason: String },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // --- external collaborators ---

    #[error("Analysis request failed: {0}")]
    AnalysisTransport(String),

    #[error("Malformed analysis response: {0}")]
    MalformedAnalysis(String),

    #[error("Performance score {score} out of range. Expected range: 0-100")]
    ScoreOutOfRange { score: f64 },

    #[error("Clipboard access denied or unavailable: {0}")]
    Clipboard(String),

    #[error("Frame capture failed: {0}")]
    Capture(String),
}

impl From<regex::Error> for Ex33Error {
    fn from(err: regex::Error) -> Self {
        Ex33Error::Pattern(err.to_string())
    }
}

impl From<serde_json::Error> for Ex33Error {
    fn from(err: serde_json::Error) -> Self {
        Ex33Error::MalformedMessage(err.to_string())
    }
}

impl From<std::io::Error> for Ex33Error {
    fn from(err: std::io::Error) -> Self {
        Ex33Error::Io(err.to_string())
    }
}
