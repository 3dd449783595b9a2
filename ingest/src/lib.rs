mod calibration;
mod error;
mod parser;
mod record;
pub mod source;
mod vocabulary;

pub use calibration::{Bias, CalibrationAccumulator, AXES, CALIBRATION_WIDTH, SUB_SAMPLES};
pub use error::{ParseErr, Result};
pub use parser::{ParseMode, ParseStats, Parsed, StreamParser, DEFAULT_MIN_LINE_LEN};
pub use record::{Code, Dataset, Record};
pub use vocabulary::LabelVocabulary;
