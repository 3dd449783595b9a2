use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use ingest::{LabelVocabulary, ParseMode, StreamParser, DEFAULT_MIN_LINE_LEN};
use machine_learning::{
    arch::Shape,
    training::{ConvergenceTrainer, DEFAULT_LOG_EVERY, DEFAULT_MAX_ITERATIONS},
};
use serde::{Deserialize, Serialize};

use crate::{reporter::ThresholdTable, ClassifierError, Result};

/// Where the two weight matrices are persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightsConfig {
    pub w1: PathBuf,
    pub w2: PathBuf,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            w1: PathBuf::from("w1.txt"),
            w2: PathBuf::from("w2.txt"),
        }
    }
}

/// Everything a training or classification run needs, usually read from a JSON file.
///
/// Only `source_path` is mandatory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Config {
    pub source_path: PathBuf,
    pub label_vocabulary: LabelVocabulary,
    pub sample_width: usize,
    pub hidden_size: usize,
    pub max_loss: f32,
    pub max_iterations: usize,
    pub max_train_secs: Option<u64>,
    pub learning_rate: f32,
    pub seed: Option<u64>,
    pub log_every: usize,
    pub parse_mode: ParseMode,
    pub min_line_len: usize,
    pub subtract_bias: bool,
    pub weights: WeightsConfig,
    pub results_path: PathBuf,
    pub thresholds: ThresholdTable,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_path: PathBuf::new(),
            label_vocabulary: LabelVocabulary::default(),
            sample_width: 9,
            hidden_size: 3,
            max_loss: 0.01,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_train_secs: None,
            learning_rate: 1.0,
            seed: None,
            log_every: DEFAULT_LOG_EVERY,
            parse_mode: ParseMode::FailFast,
            min_line_len: DEFAULT_MIN_LINE_LEN,
            subtract_bias: false,
            weights: WeightsConfig::default(),
            results_path: PathBuf::from("results.txt"),
            thresholds: ThresholdTable::default(),
        }
    }
}

impl Config {
    /// Loads and validates a configuration from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not valid JSON or fails validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parses and validates a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration for values no run could succeed with.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(ClassifierError::InvalidConfig(msg.into()));

        if self.source_path.as_os_str().is_empty() {
            return invalid("source_path is required");
        }
        if self.label_vocabulary.is_empty() {
            return invalid("label_vocabulary must not be empty");
        }
        if self.label_vocabulary.classes() < 2 {
            return invalid("label_vocabulary must span at least two classes");
        }
        if self.sample_width == 0 {
            return invalid("sample_width must be greater than 0");
        }
        if self.hidden_size == 0 {
            return invalid("hidden_size must be greater than 0");
        }
        if !self.max_loss.is_finite() || self.max_loss < 0.0 {
            return invalid("max_loss must be a finite, non-negative number");
        }
        if self.max_iterations == 0 {
            return invalid("max_iterations must be greater than 0");
        }
        if self.max_train_secs == Some(0) {
            return invalid("max_train_secs must be greater than 0");
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return invalid("learning_rate must be a finite, positive number");
        }

        Ok(())
    }

    /// The layer sizes of the network.
    pub fn shape(&self) -> Shape {
        Shape::new(self.sample_width, self.hidden_size)
    }

    /// Builds the stream parser described by this configuration.
    pub fn parser(&self) -> StreamParser {
        StreamParser::new(self.label_vocabulary.clone(), self.sample_width)
            .with_mode(self.parse_mode)
            .with_min_line_len(self.min_line_len)
    }

    /// Builds the trainer described by this configuration.
    pub fn trainer(&self) -> ConvergenceTrainer {
        let trainer = ConvergenceTrainer::new(self.max_loss)
            .with_max_iterations(self.max_iterations)
            .with_log_every(self.log_every);

        match self.max_train_secs {
            Some(secs) => trainer.with_max_duration(Duration::from_secs(secs)),
            None => trainer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_source_path_is_required() {
        let config = Config::from_json(r#"{ "source_path": "steps.txt" }"#).unwrap();

        assert_eq!(config.source_path, PathBuf::from("steps.txt"));
        assert_eq!(config.sample_width, 9);
        assert_eq!(config.hidden_size, 3);
        assert_eq!(config.max_iterations, 10_000_000);
        assert_eq!(config.learning_rate, 1.0);
        assert_eq!(config.parse_mode, ParseMode::FailFast);
        assert_eq!(config.weights, WeightsConfig::default());
        assert_eq!(config.thresholds, ThresholdTable::default());
    }

    #[test]
    fn every_field_can_be_overridden() {
        let json = r#"{
            "source_path": "serial.log",
            "label_vocabulary": { "noMove": 0, "slowWalk": 1, "casualWalk": 2, "fastWalk": 2 },
            "sample_width": 6,
            "hidden_size": 4,
            "max_loss": 0.001,
            "max_iterations": 500,
            "max_train_secs": 30,
            "learning_rate": 0.5,
            "seed": 42,
            "log_every": 0,
            "parse_mode": "skip_invalid",
            "min_line_len": 10,
            "subtract_bias": true,
            "weights": { "w1": "a.txt", "w2": "b.txt" },
            "results_path": "out.txt",
            "thresholds": {
                "buckets": [{ "low": 0, "high": 3, "token": "still" }],
                "fallback": "moving"
            }
        }"#;

        let config = Config::from_json(json).unwrap();

        assert_eq!(config.label_vocabulary.classes(), 3);
        assert_eq!(config.shape(), Shape::new(6, 4));
        assert_eq!(config.parse_mode, ParseMode::SkipInvalid);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.max_train_secs, Some(30));
        assert!(config.subtract_bias);
        assert_eq!(config.weights.w2, PathBuf::from("b.txt"));
        assert_eq!(config.thresholds.classify(0.2), "still");
        assert_eq!(config.thresholds.classify(0.9), "moving");
    }

    #[test]
    fn missing_source_path_is_rejected() {
        let err = Config::from_json("{}").unwrap_err();
        assert!(err.to_string().contains("source_path"));
    }

    #[test]
    fn nonsensical_values_are_rejected() {
        let cases = [
            r#"{ "source_path": "a", "sample_width": 0 }"#,
            r#"{ "source_path": "a", "hidden_size": 0 }"#,
            r#"{ "source_path": "a", "max_loss": -1.0 }"#,
            r#"{ "source_path": "a", "max_iterations": 0 }"#,
            r#"{ "source_path": "a", "learning_rate": 0.0 }"#,
            r#"{ "source_path": "a", "label_vocabulary": {} }"#,
            r#"{ "source_path": "a", "label_vocabulary": { "only": 0 } }"#,
        ];

        for json in cases {
            let err = Config::from_json(json).unwrap_err();
            assert!(matches!(err, ClassifierError::InvalidConfig(_)), "{json}");
        }
    }

    #[test]
    fn malformed_json_is_an_invalid_config() {
        let err = Config::from_json("{ source_path: ").unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidConfig(_)));
    }
}
