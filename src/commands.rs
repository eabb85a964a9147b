//! Subcommands of the `pcrqc` command line tool.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use pcrqc::metrics::MetricsInput;

pub mod derive;
pub mod validate;

/// Reads the JSON array of [`MetricsInput`]s stored at `src`.
pub fn read_inputs(src: &Path) -> anyhow::Result<Vec<MetricsInput>> {
    let file = File::open(src).with_context(|| format!("opening {}", src.display()))?;
    let inputs = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing metrics inputs from {}", src.display()))?;

    Ok(inputs)
}
