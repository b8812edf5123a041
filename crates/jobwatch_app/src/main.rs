mod artifact;
mod cli;
mod config;
mod logging;
mod render;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use jobwatch_core::{JobSnapshot, JobStatus};
use jobwatch_engine::{StaticSession, TrackerHandle};
use jobwatch_logging::{level_for_verbosity, watch_info};

use crate::cli::Cli;
use crate::render::ProgressPrinter;

/// Conventional exit code for SIGINT.
const INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::initialize(cli.log, level_for_verbosity(cli.verbose));

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let form = cli.form();
    form.validate()?;

    let settings = config::resolve(cli.config.as_deref(), cli.overrides())?;
    let session = Arc::new(StaticSession::new(cli.token.clone()));
    let tracker =
        TrackerHandle::from_settings(&settings, session).context("setting up the tracker")?;
    watch_info!("Submitting job for {:?}", form.business_name);

    let mut updates = tracker.subscribe();
    let mut printer = ProgressPrinter::default();
    tracker.submit_job(form);

    let finished: JobSnapshot = loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    bail!("tracker stopped before the job finished");
                }
                let snapshot = updates.borrow_and_update().clone();
                for line in printer.advance(&snapshot) {
                    println!("{line}");
                }
                if snapshot.is_terminal() {
                    break snapshot;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracker.shutdown();
                eprintln!("interrupted");
                return Ok(ExitCode::from(INTERRUPTED));
            }
        }
    };
    tracker.shutdown();

    for line in render::checklist(&finished) {
        println!("{line}");
    }
    println!("{}", render::summary(&finished));

    if finished.status != JobStatus::Completed {
        return Ok(ExitCode::FAILURE);
    }
    if let Some(structure) = &finished.structure {
        match &cli.output {
            Some(path) => {
                artifact::write_structure(path, structure)?;
                println!("Structure written to {}", path.display());
            }
            None => println!("{}", serde_json::to_string_pretty(structure)?),
        }
    }
    Ok(ExitCode::SUCCESS)
}
