mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use reframe::{paths, pool, report};
use reframe_av::{EncodeSettings, Tools};
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Probe concurrency; ffprobe calls are short-lived so a high bound is fine.
const PROBE_WORKERS: usize = 50;

/// Bound on in-flight pool events awaiting rendering.
const EVENT_CAPACITY: usize = 256;

fn init_tracing(verbose: bool) {
    // Respect RUST_LOG if set, otherwise derive the filter from the verbose flag.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if verbose {
            "reframe=debug,reframe_av=debug".to_string()
        } else {
            "reframe=info,reframe_av=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let start = Instant::now();

    let tools = Tools::locate()?;

    let inputs = paths::collect_input_paths(&cli.inputs)?;
    if inputs.is_empty() {
        println!("nothing to convert");
        return Ok(());
    }

    std::fs::create_dir_all(&cli.output_dir).with_context(|| {
        format!(
            "could not create output directory '{}'",
            cli.output_dir.display()
        )
    })?;
    let jobs = paths::derive_jobs(&cli.output_dir, &inputs, &cli.output_type);

    let settings = EncodeSettings::for_output_type(cli.codec.clone(), &cli.output_type);
    if let Some(codec) = &settings.codec {
        info!("converting with {codec}");
    }

    let outcome = pool::probe_jobs(&tools, jobs, PROBE_WORKERS).await;
    for (job, err) in &outcome.skipped {
        warn!("skipping {}: {err}", job.input_path.display());
    }
    let skipped = outcome.skipped.len();

    println!("transcoding {} file(s)", outcome.sized.len());

    let reporter = report::Reporter::new(&outcome.sized);
    let (events_tx, events_rx) = mpsc::channel(EVENT_CAPACITY);
    let pool_task = tokio::spawn(pool::run_jobs(
        tools,
        settings,
        outcome.sized,
        cli.limit,
        events_tx,
    ));

    let summary = reporter.drive(events_rx, skipped).await;
    pool_task.await.context("conversion pool panicked")??;

    println!(
        "converted {} file(s) ({} failed, {} skipped) in {:.2}s",
        summary.converted,
        summary.failed,
        summary.skipped,
        start.elapsed().as_secs_f64()
    );

    if summary.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
