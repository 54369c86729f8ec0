//! Fault Score - Offline batch scoring
//!
//! Usage: fault-score <data.csv | records.json>
//!
//! Scores the file with the configured artifacts, saves the predictions to
//! history and prints the scored rows as JSON.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::process::ExitCode;

use fault_core::constants::APP_VERSION;
use fault_core::{FaultPipeline, PipelineConfig, RawBatch};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Some(input) = std::env::args().nth(1) else {
        eprintln!("usage: fault-score <data.csv | records.json>");
        return ExitCode::from(2);
    };

    log::info!("Starting fault-score v{}...", APP_VERSION);

    match run(Path::new(&input)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Prediction failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let batch = read_batch(input)?;

    let config = PipelineConfig::from_env();
    let pipeline = FaultPipeline::from_config(&config)?;
    let scored = pipeline.score(&batch)?;

    for warning in &scored.warnings {
        log::warn!("{}", warning);
    }

    let output = serde_json::json!({
        "status": "success",
        "batch_id": scored.batch_id,
        "results": scored.rows(),
        "summary": scored.summary,
        "warnings": scored.warnings,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn read_batch(input: &Path) -> Result<RawBatch, Box<dyn std::error::Error>> {
    let reader = BufReader::new(File::open(input)?);

    let is_json = input
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        let records: Vec<serde_json::Value> = serde_json::from_reader(reader)?;
        Ok(RawBatch::from_records(&records)?)
    } else {
        Ok(RawBatch::from_csv_reader(reader)?)
    }
}
