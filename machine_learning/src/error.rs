use std::{
    error::Error,
    fmt::{self, Display},
    io,
    time::Duration,
};

/// The result type used in the entire machine learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The machine learning module's error type.
#[derive(Debug)]
pub enum MlErr {
    /// The input cannot be scaled or trained on.
    DegenerateInput(&'static str),
    /// A matrix does not have the dimensions the network is configured for.
    ShapeMismatch {
        what: &'static str,
        got: (usize, usize),
        expected: (usize, usize),
    },
    /// The loss did not fall under the threshold before the guard expired.
    DidNotConverge {
        iterations: usize,
        loss: f32,
        elapsed: Duration,
    },
    /// A persisted weight could not be read back as a number.
    InvalidWeight {
        what: &'static str,
        row: usize,
        token: String,
    },
    Io(io::Error),
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::DegenerateInput(reason) => write!(f, "degenerate input: {reason}"),
            MlErr::ShapeMismatch {
                what,
                got: (got_rows, got_cols),
                expected: (rows, cols),
            } => write!(
                f,
                "shape mismatch for {what}: got {got_rows}x{got_cols}, expected {rows}x{cols}"
            ),
            MlErr::DidNotConverge {
                iterations,
                loss,
                elapsed,
            } => write!(
                f,
                "training did not converge after {iterations} iterations ({elapsed:.2?}), last loss was {loss}"
            ),
            MlErr::InvalidWeight { what, row, token } => {
                write!(f, "invalid weight '{token}' in row {row} of {what}")
            }
            MlErr::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl Error for MlErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MlErr::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for MlErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}
