use std::{error::Error, fmt, io};

use ingest::ParseErr;
use machine_learning::MlErr;

/// The result type of the training and classification pipelines.
pub type Result<T> = std::result::Result<T, ClassifierError>;

/// All errors that can occur while running a pipeline.
#[derive(Debug)]
pub enum ClassifierError {
    /// Invalid configuration, caught before any input is read.
    InvalidConfig(String),
    /// The input lines could not be parsed.
    Parse(ParseErr),
    /// Normalization, training or weight persistence failed.
    Ml(MlErr),
    /// An underlying I/O error not covered by the above variants.
    Io(io::Error),
}

impl fmt::Display for ClassifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::Parse(e) => write!(f, "parse error: {e}"),
            Self::Ml(e) => write!(f, "classifier error: {e}"),
            Self::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl Error for ClassifierError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::Ml(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::InvalidConfig(_) => None,
        }
    }
}

impl From<ParseErr> for ClassifierError {
    fn from(e: ParseErr) -> Self {
        Self::Parse(e)
    }
}

impl From<MlErr> for ClassifierError {
    fn from(e: MlErr) -> Self {
        Self::Ml(e)
    }
}

impl From<io::Error> for ClassifierError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ClassifierError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidConfig(e.to_string())
    }
}
