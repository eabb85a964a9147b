//! Percentages, ratios, and folds derived directly from the raw counters.

use derive_getters::Getters;
use serde::Serialize;

use super::counters::RawCounters;
use super::diagnostics::{Diagnostic, Diagnostics};

/// Metrics derived only from [`RawCounters`]. All percentages are fractions
/// in `[0.0, 1.0]`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Getters)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct RatioMetrics {
    /// PF_READS / TOTAL_READS.
    pct_pf_reads: f64,

    /// PF_UNIQUE_READS / PF_READS.
    pct_pf_uq_reads: f64,

    /// PF_UQ_READS_ALIGNED / PF_UNIQUE_READS.
    pct_pf_uq_reads_aligned: f64,

    /// (ON_AMPLICON_BASES + NEAR_AMPLICON_BASES) / PF_BASES_ALIGNED.
    pct_amplified_bases: f64,

    /// OFF_AMPLICON_BASES / PF_BASES_ALIGNED.
    pct_off_amplicon: f64,

    /// ON_AMPLICON_BASES / (ON_AMPLICON_BASES + NEAR_AMPLICON_BASES).
    on_amplicon_vs_selected: f64,

    /// ON_AMPLICON_BASES / AMPLICON_TERRITORY.
    mean_amplicon_coverage: f64,

    /// Density of bases on amplicons over the genome-wide background density.
    fold_enrichment: f64,

    /// Fraction of aligned bases excluded as duplicates.
    pct_exc_dupe: f64,

    /// Fraction of aligned bases excluded for low mapping quality.
    pct_exc_mapq: f64,

    /// Fraction of aligned bases excluded for low base quality.
    pct_exc_baseq: f64,

    /// Fraction of aligned bases excluded as overlapping mate observations.
    pct_exc_overlap: f64,

    /// Fraction of aligned bases excluded for falling outside any target.
    pct_exc_off_target: f64,
}

impl RatioMetrics {
    /// Every percentage field, paired with its name.
    pub fn percentages(&self) -> [(&'static str, f64); 11] {
        [
            ("PCT_PF_READS", self.pct_pf_reads),
            ("PCT_PF_UQ_READS", self.pct_pf_uq_reads),
            ("PCT_PF_UQ_READS_ALIGNED", self.pct_pf_uq_reads_aligned),
            ("PCT_AMPLIFIED_BASES", self.pct_amplified_bases),
            ("PCT_OFF_AMPLICON", self.pct_off_amplicon),
            ("ON_AMPLICON_VS_SELECTED", self.on_amplicon_vs_selected),
            ("PCT_EXC_DUPE", self.pct_exc_dupe),
            ("PCT_EXC_MAPQ", self.pct_exc_mapq),
            ("PCT_EXC_BASEQ", self.pct_exc_baseq),
            ("PCT_EXC_OVERLAP", self.pct_exc_overlap),
            ("PCT_EXC_OFF_TARGET", self.pct_exc_off_target),
        ]
    }
}

/// Computes FOLD_ENRICHMENT: the depth of aligned bases on the amplicons
/// relative to the depth of aligned bases across the whole genome.
fn fold_enrichment(counters: &RawCounters, diagnostics: &mut Diagnostics) -> f64 {
    if counters.amplicon_territory == 0
        || counters.genome_size == 0
        || counters.pf_bases_aligned == 0
    {
        diagnostics.note(Diagnostic::ZeroDenominator {
            field: "FOLD_ENRICHMENT",
        });
        return 0.0;
    }

    let on_amplicon_density =
        counters.on_amplicon_bases as f64 / counters.amplicon_territory as f64;
    let background_density = counters.pf_bases_aligned as f64 / counters.genome_size as f64;

    on_amplicon_density / background_density
}

/// Derives the [`RatioMetrics`] from a set of counters. Counters that were
/// never validated still produce a record, though not a meaningful one.
pub fn derive_ratios(counters: &RawCounters, diagnostics: &mut Diagnostics) -> RatioMetrics {
    let aligned = counters.pf_bases_aligned;
    let selected = counters
        .on_amplicon_bases
        .saturating_add(counters.near_amplicon_bases);
    let excluded = &counters.excluded;

    RatioMetrics {
        pct_pf_reads: diagnostics.count_ratio(
            "PCT_PF_READS",
            counters.pf_reads,
            counters.total_reads,
        ),
        pct_pf_uq_reads: diagnostics.count_ratio(
            "PCT_PF_UQ_READS",
            counters.pf_unique_reads,
            counters.pf_reads,
        ),
        pct_pf_uq_reads_aligned: diagnostics.count_ratio(
            "PCT_PF_UQ_READS_ALIGNED",
            counters.pf_uq_reads_aligned,
            counters.pf_unique_reads,
        ),
        pct_amplified_bases: diagnostics.count_ratio("PCT_AMPLIFIED_BASES", selected, aligned),
        pct_off_amplicon: diagnostics.count_ratio(
            "PCT_OFF_AMPLICON",
            counters.off_amplicon_bases,
            aligned,
        ),
        on_amplicon_vs_selected: diagnostics.count_ratio(
            "ON_AMPLICON_VS_SELECTED",
            counters.on_amplicon_bases,
            selected,
        ),
        mean_amplicon_coverage: diagnostics.count_ratio(
            "MEAN_AMPLICON_COVERAGE",
            counters.on_amplicon_bases,
            counters.amplicon_territory,
        ),
        fold_enrichment: fold_enrichment(counters, diagnostics),
        pct_exc_dupe: diagnostics.count_ratio(
            "PCT_EXC_DUPE",
            excluded.excluded_dupe_bases,
            aligned,
        ),
        pct_exc_mapq: diagnostics.count_ratio(
            "PCT_EXC_MAPQ",
            excluded.excluded_mapq_bases,
            aligned,
        ),
        pct_exc_baseq: diagnostics.count_ratio(
            "PCT_EXC_BASEQ",
            excluded.excluded_baseq_bases,
            aligned,
        ),
        pct_exc_overlap: diagnostics.count_ratio(
            "PCT_EXC_OVERLAP",
            excluded.excluded_overlap_bases,
            aligned,
        ),
        pct_exc_off_target: diagnostics.count_ratio(
            "PCT_EXC_OFF_TARGET",
            excluded.excluded_off_target_bases,
            aligned,
        ),
    }
}
