//! Functionality relating to the `pcrqc validate` subcommand itself.

use std::collections::HashSet;
use std::path::PathBuf;

use clap::Args;
use tracing::{error, info};

use pcrqc::errors::{exit, ExitCode};

/// Clap arguments for the `pcrqc validate` subcommand.
#[derive(Args)]
pub struct ValidateArgs {
    /// JSON array of raw inputs, one per accumulation level.
    #[arg(value_name = "JSON")]
    src: PathBuf,
}

/// Main function for the `pcrqc validate` subcommand. Every accumulation
/// level is checked and every problem reported before exiting.
pub fn validate(args: ValidateArgs) -> anyhow::Result<()> {
    info!("Starting validate subcommand.");

    let inputs = super::read_inputs(&args.src)?;
    let mut seen = HashSet::new();
    let mut failures = 0usize;

    for input in &inputs {
        if !seen.insert(&input.level) {
            error!("[{}] This accumulation level is listed more than once.", input.level);
            failures += 1;
            continue;
        }

        match input.validate() {
            Ok(()) => info!("[{}] OK.", input.level),
            Err(err) => {
                error!("[{}] {}", input.level, err);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        exit(
            format!("{} of {} input(s) are invalid.", failures, inputs.len()).as_str(),
            ExitCode::InvalidInputData,
        );
    }

    info!("All {} input(s) are valid.", inputs.len());
    Ok(())
}
