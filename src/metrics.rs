//! Derivation of targeted PCR metrics from raw counts and coverage.
//!
//! # Overview
//!
//! Upstream tools (alignment, duplicate marking, interval overlap, coverage
//! accumulation, GC binning) produce three inputs for an experiment:
//!
//! - [`RawCounters`]: read and base counts, territories, and exclusions.
//! - [`CoverageHistogram`]: the observed depth of every target base.
//! - [`GcBinTable`]: the share of territory and of aligned reads per GC bin.
//!
//! [`derive`] validates these and turns them into a [`DerivedMetrics`]
//! record: percentages, fold enrichment, coverage uniformity, GC dropout,
//! and genotyping sensitivity. Invalid inputs are rejected with an
//! [`Error`] before anything is derived. Ratios with a zero denominator and
//! coverage statistics over an uncovered target set are reported as `0.0`
//! and noted as a [`Diagnostic`] on the record.
//!
//! Experiments stratified by sample, library, or read group are handled by
//! [`derive_stratified`], which produces one record per [`LevelKey`].
//!
//! ```
//! use pcrqc::metrics::{self, CoverageHistogram, GcBinTable, GenotypingModel, RawCounters};
//!
//! let counters = RawCounters {
//!     total_reads: 1000,
//!     pf_reads: 900,
//!     ..Default::default()
//! };
//!
//! let derived = metrics::derive(
//!     &counters,
//!     &CoverageHistogram::new(vec![0, 0, 5, 5, 5, 5, 10, 10, 10, 10]),
//!     &GcBinTable::default(),
//!     &GenotypingModel::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(*derived.ratios().pct_pf_reads(), 0.9);
//! assert_eq!(*derived.coverage().mean_target_coverage(), 6.0);
//! ```

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub mod counters;
pub mod coverage;
pub mod diagnostics;
pub mod gc_dropout;
pub mod levels;
pub mod ratios;
pub mod results;
pub mod sensitivity;

pub use self::counters::{ExcludedBases, RawCounters};
pub use self::coverage::{CoverageHistogram, CoverageMetrics};
pub use self::diagnostics::{Diagnostic, Diagnostics};
pub use self::gc_dropout::{GcBin, GcBinTable, GcDropoutMetrics};
pub use self::levels::{LevelKey, MetricAccumulationLevel, StratifiedMetrics};
pub use self::ratios::RatioMetrics;
pub use self::results::DerivedMetrics;
pub use self::sensitivity::{GenotypingModel, SensitivityMetrics};

use crate::errors::Error;

/// The inputs for one stratum of an experiment.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct MetricsInput {
    /// Which stratum these inputs describe.
    #[serde(default)]
    pub level: LevelKey,

    /// The raw counters.
    pub counters: RawCounters,

    /// The depth of every target base.
    #[serde(default)]
    pub coverage: CoverageHistogram,

    /// The GC bins of the target territory.
    #[serde(default)]
    pub gc_bins: GcBinTable,
}

impl MetricsInput {
    /// Checks every input invariant.
    pub fn validate(&self) -> Result<(), Error> {
        self.counters.validate()?;
        self.gc_bins.validate()?;

        let target_territory = self.counters.target_territory;
        if !self.coverage.is_empty() && self.coverage.len() as u64 != target_territory {
            warn!(
                "[{}] The coverage histogram covers {} bases, but TARGET_TERRITORY is {}.",
                self.level,
                self.coverage.len(),
                target_territory
            );
        }

        Ok(())
    }
}

/// Derives every metric from inputs that are already known to be valid.
fn derive_valid(
    counters: &RawCounters,
    coverage: &CoverageHistogram,
    gc_bins: &GcBinTable,
    model: &GenotypingModel,
) -> DerivedMetrics {
    let mut diagnostics = Diagnostics::default();

    let histogram = coverage.to_histogram();

    let ratios = ratios::derive_ratios(counters, &mut diagnostics);
    let coverage_metrics = coverage::derive_coverage(&histogram, &mut diagnostics);
    let gc_dropout = gc_dropout::derive_gc_dropout(gc_bins);
    let sensitivity = sensitivity::derive_sensitivity(&histogram, model);

    let diagnostics = diagnostics.into_inner();
    debug!(
        "Derived metrics for amplicon set '{}' with {} degenerate field(s).",
        counters.custom_amplicon_set,
        diagnostics.len()
    );

    DerivedMetrics::new(
        counters.clone(),
        ratios,
        coverage_metrics,
        gc_dropout,
        sensitivity,
        diagnostics,
    )
}

/// Validates the inputs for one experiment and derives its metrics.
pub fn derive(
    counters: &RawCounters,
    coverage: &CoverageHistogram,
    gc_bins: &GcBinTable,
    model: &GenotypingModel,
) -> Result<DerivedMetrics, Error> {
    counters.validate()?;
    gc_bins.validate()?;

    Ok(derive_valid(counters, coverage, gc_bins, model))
}

/// Validates the inputs for every stratum, then derives the metrics of all
/// strata in parallel. If any stratum is invalid, or two strata share a
/// [`LevelKey`], nothing is derived.
pub fn derive_stratified(
    inputs: &[MetricsInput],
    model: &GenotypingModel,
) -> Result<StratifiedMetrics, Error> {
    // (1) Reject the whole batch before doing any work.
    let mut seen = std::collections::HashSet::new();
    for input in inputs {
        if !seen.insert(&input.level) {
            return Err(Error::DuplicateLevel {
                level: input.level.to_string(),
            });
        }

        input.validate()?;
    }

    // (2) Each stratum is independent.
    let derived: Vec<DerivedMetrics> = inputs
        .par_iter()
        .map(|input| derive_valid(&input.counters, &input.coverage, &input.gc_bins, model))
        .collect();

    // (3) Gather the results in input order.
    let mut results = StratifiedMetrics::default();
    for (input, metrics) in inputs.iter().zip(derived) {
        results.insert(input.level.clone(), metrics)?;
    }

    Ok(results)
}
