//! The derived metrics record for one targeted PCR experiment.

use derive_getters::Getters;
use serde::Serialize;

use super::counters::RawCounters;
use super::coverage::CoverageMetrics;
use super::diagnostics::{has_zero_denominator, Diagnostic};
use super::gc_dropout::GcDropoutMetrics;
use super::ratios::RatioMetrics;
use super::sensitivity::SensitivityMetrics;

/// Every metric derived for one experiment (or one stratum of it), alongside
/// the raw counters it was derived from. Produced by [`derive`] and never
/// changed afterwards; serializes as a single flat record keyed by metric
/// name.
///
/// [`derive`]: super::derive
#[derive(Clone, Debug, PartialEq, Serialize, Getters)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct DerivedMetrics {
    /// The raw counters the metrics were derived from.
    #[serde(flatten)]
    counters: RawCounters,

    /// Metrics derived only from the counters.
    #[serde(flatten)]
    ratios: RatioMetrics,

    /// Coverage uniformity over the targets.
    #[serde(flatten)]
    coverage: CoverageMetrics,

    /// AT and GC dropout.
    #[serde(flatten)]
    gc_dropout: GcDropoutMetrics,

    /// Theoretical heterozygous SNP sensitivity.
    #[serde(flatten)]
    sensitivity: SensitivityMetrics,

    /// Fields that were reported as zero because they were undefined.
    diagnostics: Vec<Diagnostic>,
}

impl DerivedMetrics {
    pub(crate) fn new(
        counters: RawCounters,
        ratios: RatioMetrics,
        coverage: CoverageMetrics,
        gc_dropout: GcDropoutMetrics,
        sensitivity: SensitivityMetrics,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        Self {
            counters,
            ratios,
            coverage,
            gc_dropout,
            sensitivity,
            diagnostics,
        }
    }

    /// Whether `field` was reported as zero because its denominator was zero.
    pub fn is_degenerate(&self, field: &str) -> bool {
        has_zero_denominator(&self.diagnostics, field)
    }

    /// Whether FOLD_80_BASE_PENALTY was undefined for lack of covered bases.
    pub fn is_fold_80_degenerate(&self) -> bool {
        self.diagnostics.contains(&Diagnostic::NoCoveredTargetBases)
    }
}
