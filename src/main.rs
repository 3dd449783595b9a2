use std::{env, process};

use anyhow::Context;
use log::info;
use step_classifier::{pipeline, reporter::Reporter, Config};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <train|classify> <config.json>", args[0]);
        process::exit(1);
    }

    let (mode, config_path) = (&args[1], &args[2]);
    let config = Config::from_file(config_path)
        .with_context(|| format!("failed to load config from {config_path}"))?;

    match mode.as_str() {
        "train" => {
            let (_, summary) = pipeline::train(&config).context("training failed")?;
            let report = summary.report;
            info!(
                "trained on {} records in {} iterations ({:.2?}), final loss {}",
                summary.stats.records, report.iterations, report.elapsed, report.final_loss
            );
        }
        "classify" => {
            let mut reporter = Reporter::new(config.thresholds.clone(), &config.results_path);
            let today = chrono::Local::now().date_naive();
            let tokens = pipeline::classify(&config, today, &mut reporter)
                .context("classification failed")?;

            println!("{}", tokens.join(","));
        }
        other => {
            eprintln!("unknown mode {other}, expected train or classify");
            process::exit(1);
        }
    }

    Ok(())
}
