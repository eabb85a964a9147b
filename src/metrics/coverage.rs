//! Coverage uniformity statistics over the per-base depth of the targets.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

use super::diagnostics::{Diagnostic, Diagnostics};
use crate::utils::histogram::Histogram;

/// Depths at which the fraction of target bases covered is reported.
pub const COVERAGE_THRESHOLDS: [usize; 5] = [1, 2, 10, 20, 30];

/// The lowest-coverage 1/5 (20%) of covered bases is what FOLD_80_BASE_PENALTY
/// aims to raise.
const FOLD_80_LOW_DIVISOR: u64 = 5;

/// The observed read depth of every target base. Serialized as a plain array
/// of depths.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoverageHistogram {
    depths: Vec<u32>,
}

impl CoverageHistogram {
    /// Creates a [`CoverageHistogram`] from the depth of each target base.
    pub fn new(depths: Vec<u32>) -> Self {
        Self { depths }
    }

    /// Creates a [`CoverageHistogram`] from `(depth, number of bases)` pairs.
    pub fn from_depth_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (u32, usize)>,
    {
        let depths = counts
            .into_iter()
            .flat_map(|(depth, bases)| std::iter::repeat(depth).take(bases))
            .collect();

        Self { depths }
    }

    /// The depth of each target base.
    pub fn depths(&self) -> &[u32] {
        &self.depths
    }

    /// Number of target bases observed.
    pub fn len(&self) -> usize {
        self.depths.len()
    }

    /// Whether no target bases were observed.
    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    /// Counts how many target bases were seen at each depth.
    pub fn to_histogram(&self) -> Histogram {
        Histogram::from_observations(self.depths.iter().copied())
    }
}

/// Coverage statistics over the target bases.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Getters)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct CoverageMetrics {
    /// Mean depth over all target bases.
    mean_target_coverage: f64,

    /// Median depth over all target bases.
    median_target_coverage: f64,

    /// Fraction of target bases with no coverage at all.
    zero_cvg_targets_pct: f64,

    /// Fraction of target bases with a depth of at least 1.
    pct_target_bases_1x: f64,

    /// Fraction of target bases with a depth of at least 2.
    pct_target_bases_2x: f64,

    /// Fraction of target bases with a depth of at least 10.
    pct_target_bases_10x: f64,

    /// Fraction of target bases with a depth of at least 20.
    pct_target_bases_20x: f64,

    /// Fraction of target bases with a depth of at least 30.
    pct_target_bases_30x: f64,

    /// Fold over-coverage needed to raise 80% of the covered target bases to
    /// the mean target depth.
    fold_80_base_penalty: f64,
}

impl CoverageMetrics {
    /// The PCT_TARGET_BASES_*X fields in the order of [`COVERAGE_THRESHOLDS`].
    pub fn pct_target_bases(&self) -> [f64; 5] {
        [
            self.pct_target_bases_1x,
            self.pct_target_bases_2x,
            self.pct_target_bases_10x,
            self.pct_target_bases_20x,
            self.pct_target_bases_30x,
        ]
    }
}

/// Computes the FOLD_80 base penalty, or `None` if no base has coverage.
///
/// D is the depth below which the lowest-covered 20% of the nonzero-coverage
/// bases fall. The penalty is `mean_target_coverage` over D, and is never
/// below 1.0.
pub fn fold_80_base_penalty(histogram: &Histogram, mean_target_coverage: f64) -> Option<f64> {
    let covered = histogram.count_from_top_until(1);
    if covered == 0 {
        return None;
    }

    // Zero-based rank of D among the covered bases, sorted by depth.
    let rank = (covered + FOLD_80_LOW_DIVISOR - 1) / FOLD_80_LOW_DIVISOR - 1;

    let mut seen = 0u64;
    let low_depth = histogram
        .occupied_bins()
        .filter(|(depth, _)| *depth > 0)
        .find(|(_, bases)| {
            seen += bases;
            seen > rank
        })
        .map(|(depth, _)| depth as f64)?;

    Some((mean_target_coverage / low_depth).max(1.0))
}

/// Derives the [`CoverageMetrics`] from the depth histogram of the target
/// bases (see [`CoverageHistogram::to_histogram`]).
pub fn derive_coverage(histogram: &Histogram, diagnostics: &mut Diagnostics) -> CoverageMetrics {
    let total = histogram.sum();

    if total == 0 {
        diagnostics.note(Diagnostic::EmptyCoverageHistogram);
        diagnostics.note(Diagnostic::NoCoveredTargetBases);
        return CoverageMetrics::default();
    }

    let at_least = |depth: usize| histogram.count_from_top_until(depth) as f64 / total as f64;
    let mean_target_coverage = histogram.mean().unwrap_or(0.0);

    let fold_80_base_penalty = match fold_80_base_penalty(histogram, mean_target_coverage) {
        Some(penalty) => penalty,
        None => {
            diagnostics.note(Diagnostic::NoCoveredTargetBases);
            0.0
        }
    };

    CoverageMetrics {
        mean_target_coverage,
        median_target_coverage: histogram.median().unwrap_or(0.0),
        zero_cvg_targets_pct: histogram.count_from_bottom_until(0) as f64 / total as f64,
        pct_target_bases_1x: at_least(COVERAGE_THRESHOLDS[0]),
        pct_target_bases_2x: at_least(COVERAGE_THRESHOLDS[1]),
        pct_target_bases_10x: at_least(COVERAGE_THRESHOLDS[2]),
        pct_target_bases_20x: at_least(COVERAGE_THRESHOLDS[3]),
        pct_target_bases_30x: at_least(COVERAGE_THRESHOLDS[4]),
        fold_80_base_penalty,
    }
}
