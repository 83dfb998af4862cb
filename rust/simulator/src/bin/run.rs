//! Generate tidy reaction-time data for one scenario file.

use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use wiscs_simulator::{question_deltas, QuestionDelta, Scenario, TidyRow};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let mut config_path: Option<PathBuf> = None;
    let mut seed: Option<u64> = None;
    let mut pretty = false;
    let mut summary = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config_path = args.next().map(PathBuf::from),
            "--seed" => {
                let raw = args.next().unwrap_or_else(|| usage("missing value for --seed"));
                seed = Some(
                    raw.parse()
                        .unwrap_or_else(|e| usage(&format!("invalid --seed {raw}: {e}"))),
                );
            }
            "--pretty" => pretty = true,
            "--summary" => summary = true,
            other => usage(&format!("unknown argument {other}")),
        }
    }

    let config_path = config_path.unwrap_or_else(|| usage("missing --config <path>"));
    let scenario = Scenario::from_file(&config_path).unwrap_or_else(|e| fatal(&e));
    let mut generator = scenario.generator(seed).unwrap_or_else(|e| fatal(&e));
    generator.fit(None, false).unwrap_or_else(|e| fatal(&e));
    let table = generator.export().unwrap_or_else(|e| fatal(&e));

    let json = if summary {
        let output = SummaryOutput {
            scenario: &scenario.name,
            questions: question_deltas(&table),
        };
        to_json(&output, pretty)
    } else {
        let output = RunOutput {
            scenario: &scenario.name,
            rows: &table.rows,
        };
        to_json(&output, pretty)
    };
    println!("{json}");
}

#[derive(Debug, Serialize)]
struct RunOutput<'a> {
    scenario: &'a str,
    rows: &'a [TidyRow],
}

#[derive(Debug, Serialize)]
struct SummaryOutput<'a> {
    scenario: &'a str,
    questions: Vec<QuestionDelta>,
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> String {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .unwrap_or_else(|e| fatal(&format!("serialize output: {e}")))
}

fn usage(msg: &str) -> ! {
    eprintln!("{msg}");
    eprintln!("usage: wiscs-run --config <file> [--seed <n>] [--pretty] [--summary]");
    std::process::exit(1);
}

fn fatal(msg: &impl std::fmt::Display) -> ! {
    eprintln!("{msg}");
    std::process::exit(1);
}
