use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

/// The result type used in the entire ingest module.
pub type Result<T> = std::result::Result<T, ParseErr>;

/// Failures while turning raw text lines into records.
///
/// Every variant produced by the parser carries the 1-based number of the
/// offending line.
#[derive(Debug)]
pub enum ParseErr {
    /// Neither an opening `[{` nor a closing `}]` marker could be recovered.
    MalformedRecord { line: usize },
    /// The label token is not part of the configured vocabulary.
    UnknownLabel { line: usize, token: String },
    /// A keyword is missing, the value count is wrong or a value is not a number.
    Format { line: usize, reason: String },
    Io(io::Error),
}

impl ParseErr {
    /// Returns the line this error originated at, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseErr::MalformedRecord { line }
            | ParseErr::UnknownLabel { line, .. }
            | ParseErr::Format { line, .. } => Some(*line),
            ParseErr::Io(_) => None,
        }
    }
}

impl Display for ParseErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErr::MalformedRecord { line } => {
                write!(f, "line {line}: no `[{{ ... }}]` frame could be recovered")
            }
            ParseErr::UnknownLabel { line, token } => {
                write!(f, "line {line}: label \"{token}\" is not in the vocabulary")
            }
            ParseErr::Format { line, reason } => write!(f, "line {line}: {reason}"),
            ParseErr::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl Error for ParseErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ParseErr::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ParseErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}
