use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{Datelike, NaiveDate};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::Result;

/// An inclusive range of output codes mapped to a label token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub low: i64,
    pub high: i64,
    pub token: String,
}

/// Turns the continuous network output into label tokens.
///
/// The output is first discretized into `code = round(output * 10)`, the first bucket
/// containing the code names the token, any other code maps to `fallback`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdTable {
    pub buckets: Vec<Bucket>,
    pub fallback: String,
}

impl ThresholdTable {
    /// Discretizes a network output, halves round away from zero.
    pub fn code(output: f32) -> i64 {
        (output * 10.0).round() as i64
    }

    /// Returns the token of the bucket `output` falls in.
    pub fn classify(&self, output: f32) -> &str {
        let code = Self::code(output);

        self.buckets
            .iter()
            .find(|bucket| (bucket.low..=bucket.high).contains(&code))
            .map_or(self.fallback.as_str(), |bucket| bucket.token.as_str())
    }
}

impl Default for ThresholdTable {
    /// Only a code of exactly 5 is a match, everything else is no movement.
    fn default() -> Self {
        Self {
            buckets: vec![Bucket {
                low: 5,
                high: 5,
                token: "match".to_string(),
            }],
            fallback: "noMove".to_string(),
        }
    }
}

/// A day-keyed file of comma separated label tokens.
///
/// The day of the last write is only remembered in memory, so the first write of every
/// process truncates the file even if it was written earlier that same day.
#[derive(Debug)]
pub struct ResultLog {
    path: PathBuf,
    last_day: Option<u32>,
}

impl ResultLog {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            last_day: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `tokens` as a single comma separated line.
    ///
    /// # Arguments
    /// * `tokens` - The labels to record.
    /// * `today` - The current date, the line is appended only if the last write happened
    ///   on the same day of the year and the file still exists, otherwise the file is
    ///   started anew.
    pub fn append<S: AsRef<str>>(&mut self, tokens: &[S], today: NaiveDate) -> Result<()> {
        let day = today.ordinal();
        let append = self.last_day == Some(day) && self.path.exists();

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(&self.path)?;

        let line: Vec<&str> = tokens.iter().map(|token| token.as_ref()).collect();
        writeln!(file, "{}", line.join(","))?;

        debug!(
            "{} {} tokens to {}",
            if append { "appended" } else { "wrote" },
            line.len(),
            self.path.display()
        );

        self.last_day = Some(day);
        Ok(())
    }
}

/// Classifies network outputs and records the resulting tokens.
#[derive(Debug)]
pub struct Reporter {
    table: ThresholdTable,
    log: ResultLog,
}

impl Reporter {
    pub fn new<P: Into<PathBuf>>(table: ThresholdTable, results_path: P) -> Self {
        Self {
            table,
            log: ResultLog::new(results_path),
        }
    }

    pub fn table(&self) -> &ThresholdTable {
        &self.table
    }

    /// Classifies every output and appends the tokens to the results log.
    ///
    /// # Returns
    /// The tokens, in the same order as `outputs`.
    pub fn report<I>(&mut self, outputs: I, today: NaiveDate) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = f32>,
    {
        let tokens: Vec<String> = outputs
            .into_iter()
            .map(|output| self.table.classify(output).to_string())
            .collect();

        self.log.append(&tokens, today)?;
        info!(
            "recorded {} classifications in {}",
            tokens.len(),
            self.log.path().display()
        );

        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use std::{env, fs};

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(format!("step_results_{name}_{}.txt", std::process::id()))
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn default_table_matches_only_code_five() {
        let table = ThresholdTable::default();

        assert_eq!(table.classify(0.5), "match");
        assert_eq!(table.classify(0.46), "match");
        assert_eq!(table.classify(0.1), "noMove");
        assert_eq!(table.classify(0.9), "noMove");
        assert_eq!(table.classify(f32::NAN), "noMove");
    }

    #[test]
    fn buckets_are_inclusive_ranges() {
        let table = ThresholdTable {
            buckets: vec![
                Bucket { low: 0, high: 2, token: "still".into() },
                Bucket { low: 3, high: 7, token: "walk".into() },
            ],
            fallback: "run".into(),
        };

        assert_eq!(table.classify(0.2), "still");
        assert_eq!(table.classify(0.3), "walk");
        assert_eq!(table.classify(0.7), "walk");
        assert_eq!(table.classify(1.0), "run");
    }

    #[test]
    fn writes_on_the_same_day_are_appended() {
        let path = temp_path("same_day");
        let mut log = ResultLog::new(&path);

        log.append(&["match", "noMove"], day(1)).unwrap();
        log.append(&["noMove"], day(1)).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "match,noMove\nnoMove\n");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn a_new_day_starts_a_new_file() {
        let path = temp_path("new_day");
        let mut log = ResultLog::new(&path);

        log.append(&["match"], day(1)).unwrap();
        log.append(&["noMove"], day(2)).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "noMove\n");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn first_write_of_a_process_truncates() {
        let path = temp_path("fresh_process");
        fs::write(&path, "left,over\n").unwrap();

        ResultLog::new(&path).append(&["match"], day(1)).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "match\n");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn reporter_returns_the_tokens_it_wrote() {
        let path = temp_path("reporter");
        let mut reporter = Reporter::new(ThresholdTable::default(), &path);

        let tokens = reporter.report([0.5, 0.1], day(4)).unwrap();

        assert_eq!(tokens, ["match", "noMove"]);
        assert_eq!(fs::read_to_string(&path).unwrap(), "match,noMove\n");
        let _ = fs::remove_file(&path);
    }
}
