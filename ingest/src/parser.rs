use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    CALIBRATION_WIDTH, CalibrationAccumulator, Dataset, LabelVocabulary, ParseErr, Record, Result,
};

/// Lines shorter than this are considered truncated reads and skipped.
pub const DEFAULT_MIN_LINE_LEN: usize = 20;

const OPEN_MARKER: &str = "[{";
const CLOSE_MARKER: &str = "}]";
const NOISE_TOKEN: &str = "noise";
const LABEL_KEY: &str = "\"Label\":";
const ACCELERATION_KEY: &str = "\"Acceleration\":";
const AXIS_KEYS: [&str; 3] = ["\"x-Axes\":", "\"y-Axes\":", "\"z-Axes\":"];

/// What to do with a line that cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseMode {
    /// Abort the whole parse on the first invalid line.
    #[default]
    FailFast,
    /// Drop invalid lines and count them in `ParseStats::rejected`.
    SkipInvalid,
}

/// Line counters gathered during a single parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub blank: usize,
    pub short: usize,
    pub rejected: usize,
    pub noise_frames: usize,
    pub records: usize,
}

impl ParseStats {
    /// The amount of lines skipped without raising an error.
    pub fn skipped(&self) -> usize {
        self.blank + self.short + self.rejected
    }
}

/// The output of a successful parse.
#[derive(Debug, Clone)]
pub struct Parsed {
    pub dataset: Dataset,
    pub calibration: CalibrationAccumulator,
    pub stats: ParseStats,
}

enum Frame {
    Noise(Vec<f32>),
    Step(Record),
}

/// Recovers records from loosely framed text lines of the form
///
/// ```text
/// [{"Label":"slowWalk","Acceleration":{"x-Axes":"0.1","y-Axes":"0.2","z-Axes":"0.3"},{...},{...}}]
/// ```
///
/// possibly wrapped in garbage bytes coming from the file or the serial link.
#[derive(Debug, Clone)]
pub struct StreamParser {
    vocabulary: LabelVocabulary,
    sample_width: usize,
    min_line_len: usize,
    mode: ParseMode,
}

impl StreamParser {
    /// Creates a new fail-fast `StreamParser`.
    ///
    /// # Arguments
    /// * `vocabulary` - The table resolving label tokens into codes.
    /// * `sample_width` - The amount of values every record must hold.
    pub fn new(vocabulary: LabelVocabulary, sample_width: usize) -> Self {
        Self {
            vocabulary,
            sample_width,
            min_line_len: DEFAULT_MIN_LINE_LEN,
            mode: ParseMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: ParseMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_min_line_len(mut self, min_line_len: usize) -> Self {
        self.min_line_len = min_line_len;
        self
    }

    pub fn vocabulary(&self) -> &LabelVocabulary {
        &self.vocabulary
    }

    /// Parses a fully materialized sequence of lines.
    ///
    /// Noise frames are accumulated into the calibration, every other valid
    /// line becomes a record. Blank and short lines are skipped and counted.
    ///
    /// # Arguments
    /// * `lines` - The raw lines, numbered from 1 in iteration order.
    ///
    /// # Returns
    /// The recovered dataset, calibration and counters, or the first line
    /// error when running in `ParseMode::FailFast`.
    pub fn parse<I, S>(&self, lines: I) -> Result<Parsed>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dataset = Dataset::new(self.sample_width);
        let mut calibration = CalibrationAccumulator::new();
        let mut stats = ParseStats::default();

        for (i, raw) in lines.into_iter().enumerate() {
            let line_no = i + 1;
            let line = compact(raw.as_ref());

            if line.is_empty() {
                stats.blank += 1;
                continue;
            }

            if line.chars().count() < self.min_line_len {
                debug!("line {line_no}: skipping truncated read ({} chars)", line.len());
                stats.short += 1;
                continue;
            }

            match self.parse_line(line_no, &line) {
                Ok(Frame::Noise(samples)) => {
                    calibration.add_frame(&samples);
                    stats.noise_frames += 1;
                }
                Ok(Frame::Step(record)) => {
                    dataset.push(record);
                    stats.records += 1;
                }
                Err(e) => match self.mode {
                    ParseMode::FailFast => return Err(e),
                    ParseMode::SkipInvalid => {
                        warn!("dropping invalid line: {e}");
                        stats.rejected += 1;
                    }
                },
            }
        }

        debug!(
            records = stats.records,
            noise_frames = stats.noise_frames,
            skipped = stats.skipped();
            "parse finished"
        );

        Ok(Parsed {
            dataset,
            calibration,
            stats,
        })
    }

    fn parse_line(&self, line_no: usize, line: &str) -> Result<Frame> {
        let body = unwrap_frame(line).ok_or(ParseErr::MalformedRecord { line: line_no })?;
        let (token, values) = split_label(line_no, body)?;

        if body.contains(NOISE_TOKEN) {
            let samples = parse_values(line_no, values, CALIBRATION_WIDTH)?;
            return Ok(Frame::Noise(samples));
        }

        let label = self
            .vocabulary
            .code(token)
            .ok_or_else(|| ParseErr::UnknownLabel {
                line: line_no,
                token: token.to_string(),
            })?;

        let acceleration = parse_values(line_no, values, self.sample_width)?;
        Ok(Frame::Step(Record::new(label, acceleration)))
    }
}

/// Removes spaces and line terminators.
fn compact(line: &str) -> String {
    line.chars()
        .filter(|c| !matches!(c, ' ' | '\r' | '\n'))
        .collect()
}

/// Drops everything up to and including the first `[{` and everything from
/// the last `}]` on.
fn unwrap_frame(line: &str) -> Option<&str> {
    let start = line.find(OPEN_MARKER)? + OPEN_MARKER.len();
    let end = line.rfind(CLOSE_MARKER)?;

    (end >= start).then(|| &line[start..end])
}

/// Splits a frame body into its label token and the text following the
/// `"Acceleration":` key.
fn split_label(line_no: usize, body: &str) -> Result<(&str, &str)> {
    let format_err = |reason: &str| ParseErr::Format {
        line: line_no,
        reason: reason.to_string(),
    };

    let rest = body
        .strip_prefix(LABEL_KEY)
        .ok_or_else(|| format_err("the \"Label\" key was not found"))?;

    let rest = rest
        .strip_prefix('"')
        .ok_or_else(|| format_err("the label value is not quoted"))?;

    let (token, rest) = rest
        .split_once('"')
        .ok_or_else(|| format_err("the label value is not terminated"))?;

    let rest = rest.strip_prefix(',').unwrap_or(rest);
    let values = rest
        .strip_prefix(ACCELERATION_KEY)
        .ok_or_else(|| format_err("the \"Acceleration\" key was not found"))?;

    Ok((token, values))
}

/// Strips the key tokens and punctuation off the acceleration text and parses
/// exactly `width` values out of what remains.
fn parse_values(line_no: usize, text: &str, width: usize) -> Result<Vec<f32>> {
    let mut cleaned = text.replace(ACCELERATION_KEY, "");
    for key in AXIS_KEYS {
        cleaned = cleaned.replace(key, "");
    }

    let tokens: Vec<&str> = cleaned
        .split(|c| matches!(c, ',' | '{' | '}' | '"'))
        .filter(|token| !token.is_empty())
        .collect();

    if tokens.len() != width {
        return Err(ParseErr::Format {
            line: line_no,
            reason: format!(
                "expected {width} acceleration values, found {}",
                tokens.len()
            ),
        });
    }

    tokens
        .into_iter()
        .map(|token| match token.parse::<f32>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(ParseErr::Format {
                line: line_no,
                reason: format!("cannot parse '{token}' as a number"),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: &str = r#"[{"Label":"slowWalk","Acceleration":{"x-Axes":"0.1","y-Axes":"0.2","z-Axes":"0.3"},{"x-Axes":"0.4","y-Axes":"0.5","z-Axes":"0.6"},{"x-Axes":"0.7","y-Axes":"0.8","z-Axes":"0.9"}}]"#;
    const NOISE: &str = r#"[{"Label":"noise","Acceleration":{"x-Axes":"0.5","y-Axes":"1","z-Axes":"2"},{"x-Axes":"0.5","y-Axes":"1","z-Axes":"2"},{"x-Axes":"0.5","y-Axes":"1","z-Axes":"2"}}]"#;

    fn parser() -> StreamParser {
        StreamParser::new(LabelVocabulary::default(), 9)
    }

    fn step_record() -> Record {
        Record::new(1, vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9])
    }

    #[test]
    fn parses_a_clean_line() {
        let parsed = parser().parse([STEP]).unwrap();

        assert_eq!(parsed.dataset.records(), &[step_record()]);
        assert_eq!(parsed.stats.records, 1);
        assert_eq!(parsed.calibration.frames(), 0);
    }

    #[test]
    fn leading_and_trailing_garbage_is_stripped() {
        let garbled = [
            format!("\u{0}\u{7}x]}}{STEP}"),
            format!("{STEP}%%$\r\n"),
            format!("@@\"Label\"{STEP}[}}"),
            format!("  {}  ", STEP.replace(',', " , ")),
        ];

        for line in garbled {
            let parsed = parser().parse([&line]).unwrap();
            assert_eq!(parsed.dataset.records(), &[step_record()], "line: {line}");
        }
    }

    #[test]
    fn blank_and_short_lines_are_skipped_silently() {
        let parsed = parser().parse(["", "   ", "[{\"Label\":\"x\"}]"]).unwrap();

        assert!(parsed.dataset.is_empty());
        assert_eq!(parsed.stats.blank, 2);
        assert_eq!(parsed.stats.short, 1);
        assert_eq!(parsed.stats.skipped(), 3);
    }

    #[test]
    fn noise_frames_feed_the_calibration() {
        let parsed = parser().parse([NOISE, STEP, NOISE]).unwrap();

        assert_eq!(parsed.dataset.len(), 1);
        assert_eq!(parsed.stats.noise_frames, 2);

        let bias = parsed.calibration.finalize().unwrap();
        assert_eq!(bias.as_array(), [0.5, 1.0, 2.0]);
    }

    #[test]
    fn unknown_label_names_the_token() {
        let line = STEP.replace("slowWalk", "moonWalk");
        let err = parser().parse(["", &line]).unwrap_err();

        match err {
            ParseErr::UnknownLabel { line, token } => {
                assert_eq!(line, 2);
                assert_eq!(token, "moonWalk");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_markers_are_malformed() {
        let line = STEP.trim_end_matches("}]");
        let err = parser().parse([STEP, line]).unwrap_err();

        assert!(matches!(err, ParseErr::MalformedRecord { line: 2 }));
    }

    #[test]
    fn wrong_value_count_is_a_format_error() {
        let err = StreamParser::new(LabelVocabulary::default(), 6)
            .parse([STEP])
            .unwrap_err();

        assert!(matches!(err, ParseErr::Format { line: 1, .. }));
        assert!(err.to_string().contains("expected 6"));
    }

    #[test]
    fn unparseable_number_is_a_format_error() {
        let line = STEP.replace("0.5", "0.5e");
        let err = parser().parse([line]).unwrap_err();

        assert!(matches!(err, ParseErr::Format { line: 1, .. }));
        assert!(err.to_string().contains("0.5e"));
    }

    #[test]
    fn missing_acceleration_key_is_a_format_error() {
        let line = STEP.replace("Acceleration", "Acc");
        let err = parser().parse([line]).unwrap_err();

        assert!(err.to_string().contains("Acceleration"));
    }

    #[test]
    fn fail_fast_returns_no_partial_dataset() {
        let bad = STEP.replace("slowWalk", "hop");
        assert!(parser().parse([STEP, &bad, STEP]).is_err());
    }

    #[test]
    fn skip_invalid_counts_rejected_lines() {
        let bad = STEP.replace("slowWalk", "hop");
        let parsed = parser()
            .with_mode(ParseMode::SkipInvalid)
            .parse([STEP, &bad, "garbage without any frame at all", STEP])
            .unwrap();

        assert_eq!(parsed.dataset.len(), 2);
        assert_eq!(parsed.stats.rejected, 2);
    }

    #[test]
    fn every_parse_starts_from_an_empty_dataset() {
        let parser = parser();
        parser.parse([STEP, STEP]).unwrap();
        let parsed = parser.parse([STEP]).unwrap();

        assert_eq!(parsed.dataset.len(), 1);
    }

    #[test]
    fn min_line_len_is_configurable() {
        let parsed = parser().with_min_line_len(500).parse([STEP]).unwrap();

        assert!(parsed.dataset.is_empty());
        assert_eq!(parsed.stats.short, 1);
    }
}
