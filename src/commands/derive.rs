//! Functionality relating to the `pcrqc derive` subcommand itself.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::{info, warn};

use pcrqc::errors::{exit, ExitCode};
use pcrqc::metrics::sensitivity::{
    DEFAULT_HET_ALLELE_FRACTION, DEFAULT_MAX_HET_SNP_Q, DEFAULT_MIN_ALT_READS,
};
use pcrqc::metrics::{self, GenotypingModel};
use pcrqc::utils::display::{CountFormat, PercentageFormat};

/// Utility method to parse the heterozygous allele fraction passed in on the
/// command line and ensure the value is within the range (0.0, 1.0].
pub fn allele_fraction_in_range(fraction_raw: &str) -> Result<f64, String> {
    let fraction: f64 = fraction_raw
        .parse()
        .map_err(|_| format!("{} isn't a float", fraction_raw))?;

    match fraction > 0.0 && fraction <= 1.0 {
        true => Ok(fraction),
        false => Err(String::from(
            "Heterozygous allele fraction must be greater than 0.0 and at most 1.0",
        )),
    }
}

/// Utility method to parse the maximum Q score passed in on the command line
/// and ensure it is positive.
pub fn q_score_is_positive(q_raw: &str) -> Result<f64, String> {
    let q: f64 = q_raw
        .parse()
        .map_err(|_| format!("{} isn't a float", q_raw))?;

    match q.is_finite() && q > 0.0 {
        true => Ok(q),
        false => Err(String::from("Maximum HET_SNP_Q must be positive")),
    }
}

/// Clap arguments for the `pcrqc derive` subcommand.
#[derive(Args)]
pub struct DeriveArgs {
    /// JSON array of raw inputs, one per accumulation level.
    #[arg(value_name = "JSON")]
    src: PathBuf,

    /// Write the derived metrics to this file instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Number of alternate reads required to detect a heterozygous SNP.
    #[arg(long, value_name = "U32", default_value_t = DEFAULT_MIN_ALT_READS)]
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    min_alt_reads: u32,

    /// Expected fraction of reads carrying the alternate allele at a
    /// heterozygous site.
    #[arg(long, value_name = "F64", default_value_t = DEFAULT_HET_ALLELE_FRACTION)]
    #[arg(value_parser = allele_fraction_in_range)]
    het_allele_fraction: f64,

    /// Largest HET_SNP_Q reported.
    #[arg(long, value_name = "F64", default_value_t = DEFAULT_MAX_HET_SNP_Q)]
    #[arg(value_parser = q_score_is_positive)]
    max_het_snp_q: f64,
}

/// Main function for the `pcrqc derive` subcommand.
pub fn derive(args: DeriveArgs) -> anyhow::Result<()> {
    info!("Starting derive subcommand.");

    let model = GenotypingModel::new(
        args.min_alt_reads,
        args.het_allele_fraction,
        args.max_het_snp_q,
    )?;

    // (1) Read the raw inputs for every accumulation level.
    let inputs = super::read_inputs(&args.src)?;
    info!(
        "Read {} accumulation level(s) from {}.",
        inputs.len(),
        args.src.display()
    );

    // (2) Derive the metrics. Invalid inputs end the run without output.
    let results = match metrics::derive_stratified(&inputs, &model) {
        Ok(results) => results,
        Err(err) => exit(err.to_string().as_str(), ExitCode::InvalidInputData),
    };

    for (level, derived) in results.iter() {
        info!(
            "[{}] PF reads: {} ({}), amplified bases: {}, mean target coverage: {:.2}x.",
            level,
            CountFormat(derived.counters().pf_reads),
            PercentageFormat(*derived.ratios().pct_pf_reads()),
            PercentageFormat(*derived.ratios().pct_amplified_bases()),
            derived.coverage().mean_target_coverage()
        );

        if !derived.diagnostics().is_empty() {
            warn!(
                "[{}] {} field(s) were undefined and reported as 0.0.",
                level,
                derived.diagnostics().len()
            );
        }
    }

    // (3) Write the output as JSON (more support for different output types
    // may be added in the future, but for now, only JSON).
    let output = serde_json::to_string_pretty(&results)?;

    match args.output {
        Some(path) => {
            let mut file =
                File::create(&path).with_context(|| format!("creating {}", path.display()))?;
            file.write_all(output.as_bytes())?;
            info!("Wrote derived metrics to {}.", path.display());
        }
        None => print!("{}", output),
    }

    Ok(())
}
