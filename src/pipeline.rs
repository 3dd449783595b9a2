use chrono::NaiveDate;
use ingest::{source, Bias, ParseStats, Parsed};
use log::{info, warn};
use machine_learning::{
    arch::Network,
    dataset::{Features, Normalizer},
    training::TrainingReport,
};
use rand::{rngs::StdRng, SeedableRng};

use crate::{config::Config, reporter::Reporter, Result};

/// What a training run went through.
#[derive(Debug, Clone)]
pub struct TrainingSummary {
    pub stats: ParseStats,
    pub bias: Option<Bias>,
    pub report: TrainingReport,
    /// The value the features were divided by.
    pub scale: f32,
}

/// Trains a network on the file at `config.source_path` and saves its weights.
pub fn train(config: &Config) -> Result<(Network, TrainingSummary)> {
    let lines = source::read_file(&config.source_path)?;
    info!(
        "read {} lines from {}",
        lines.len(),
        config.source_path.display()
    );

    train_on_lines(config, lines)
}

/// Trains a network on already materialized lines and saves its weights.
///
/// # Arguments
/// * `config` - The run configuration.
/// * `lines` - The raw lines, as they came off the sensor link.
///
/// # Returns
/// The trained network and a summary of the run.
pub fn train_on_lines<I, S>(config: &Config, lines: I) -> Result<(Network, TrainingSummary)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let parsed = config.parser().parse(lines)?;
    let (features, bias) = featurize(config, &parsed)?;

    let mut rng = generate_rng(config.seed);
    let mut network =
        Network::new(config.shape(), &mut rng).with_learning_rate(config.learning_rate);

    let report = config
        .trainer()
        .train(&mut network, features.x.view(), features.y.view())?;

    network.save_weights(&config.weights.w1, &config.weights.w2)?;

    let summary = TrainingSummary {
        stats: parsed.stats,
        bias,
        report,
        scale: features.scale,
    };

    Ok((network, summary))
}

/// Classifies the file at `config.source_path` with previously saved weights.
///
/// # Returns
/// One label token per record, in input order.
pub fn classify(config: &Config, today: NaiveDate, reporter: &mut Reporter) -> Result<Vec<String>> {
    let lines = source::read_file(&config.source_path)?;
    classify_lines(config, lines, today, reporter)
}

/// Classifies already materialized lines with previously saved weights.
///
/// # Arguments
/// * `config` - The run configuration, its weight paths must point at a trained network.
/// * `lines` - The raw lines.
/// * `today` - Decides whether the results log is appended to or started anew.
/// * `reporter` - Turns outputs into tokens and records them.
pub fn classify_lines<I, S>(
    config: &Config,
    lines: I,
    today: NaiveDate,
    reporter: &mut Reporter,
) -> Result<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let network = Network::load_weights(config.shape(), &config.weights.w1, &config.weights.w2)?;

    let parsed = config.parser().parse(lines)?;
    let (features, _) = featurize(config, &parsed)?;

    let outputs = network.predict(features.x.view())?;
    reporter.report(outputs.iter().copied(), today)
}

fn featurize(config: &Config, parsed: &Parsed) -> Result<(Features, Option<Bias>)> {
    let stats = &parsed.stats;
    info!(
        records = stats.records,
        noise_frames = stats.noise_frames,
        blank = stats.blank,
        short = stats.short,
        rejected = stats.rejected;
        "parsed input"
    );

    let bias = parsed.calibration.finalize();
    match bias {
        Some(b) => info!("sensor bias x={} y={} z={}", b.x, b.y, b.z),
        None => info!("no noise frames, sensor bias unknown"),
    }

    let mut normalizer = Normalizer::new(config.label_vocabulary.classes());
    if config.subtract_bias {
        match bias {
            Some(b) => normalizer = normalizer.with_bias(b),
            None => warn!("subtract_bias is set but there is no bias to subtract"),
        }
    }

    let features = normalizer.normalize(&parsed.dataset)?;
    Ok((features, bias))
}

fn generate_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

#[cfg(test)]
mod tests {
    use std::{env, fs, path::PathBuf};

    use super::*;
    use crate::{reporter::ThresholdTable, ClassifierError};
    use machine_learning::MlErr;

    fn line(label: &str, v: f32) -> String {
        let tuple = format!(r#"{{"x-Axes":"{v}","y-Axes":"{v}","z-Axes":"{v}"}}"#);
        format!(r#"[{{"Label":"{label}","Acceleration":{tuple},{tuple},{tuple}}}]"#)
    }

    fn config(name: &str) -> (Config, PathBuf) {
        let dir = env::temp_dir().join(format!("step_pipeline_{name}_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let mut config = Config {
            source_path: dir.join("steps.txt"),
            seed: Some(3),
            max_loss: 0.05,
            max_iterations: 200_000,
            ..Config::default()
        };
        config.weights.w1 = dir.join("w1.txt");
        config.weights.w2 = dir.join("w2.txt");
        config.results_path = dir.join("results.txt");
        (config, dir)
    }

    #[test]
    fn training_saves_weights_and_reports() {
        let (config, dir) = config("train");
        let lines = [
            line("noMove", 0.0),
            line("fastWalk", 4.0),
            "garbage".to_string(),
            String::new(),
        ];

        let (_, summary) = train_on_lines(&config, lines).unwrap();

        assert_eq!(summary.stats.records, 2);
        assert_eq!(summary.stats.short, 1);
        assert_eq!(summary.stats.blank, 1);
        assert_eq!(summary.scale, 4.0);
        assert!(summary.bias.is_none());
        assert!(summary.report.final_loss <= 0.05);
        assert!(config.weights.w1.exists());
        assert!(config.weights.w2.exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn classification_needs_saved_weights() {
        let (config, dir) = config("no_weights");
        let mut reporter = Reporter::new(ThresholdTable::default(), &config.results_path);
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        let err = classify_lines(&config, [line("noMove", 1.0)], today, &mut reporter).unwrap_err();

        assert!(matches!(err, ClassifierError::Ml(MlErr::Io(_))));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn all_zero_input_is_degenerate() {
        let (config, dir) = config("zeros");

        let err = train_on_lines(&config, [line("noMove", 0.0)]).unwrap_err();

        assert!(matches!(err, ClassifierError::Ml(MlErr::DegenerateInput(_))));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let (config, dir) = config("seeded");
        let lines = [line("noMove", 0.0), line("fastWalk", 4.0)];

        let (a, _) = train_on_lines(&config, &lines).unwrap();
        let (b, _) = train_on_lines(&config, &lines).unwrap();

        assert_eq!(a.w1(), b.w1());
        assert_eq!(a.w2(), b.w2());
        let _ = fs::remove_dir_all(&dir);
    }
}
