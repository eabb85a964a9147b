//! Theoretical sensitivity for detecting heterozygous SNPs given the depth of
//! coverage over the targets.
//!
//! A heterozygous site sequenced to depth `d` shows the alternate allele in
//! each read with probability `het_allele_fraction`, so the number of
//! alternate reads follows `Binomial(d, het_allele_fraction)`. The site is
//! considered detected when at least `min_alt_reads` reads carry the
//! alternate allele. The sensitivity over the targets is the detection
//! probability averaged over the depth of every target base.

use derive_getters::Getters;
use serde::Serialize;

use crate::errors::Error;
use crate::utils::histogram::Histogram;

/// Default number of alternate reads needed to call a heterozygous site.
pub const DEFAULT_MIN_ALT_READS: u32 = 3;

/// Default expected fraction of reads carrying the alternate allele.
pub const DEFAULT_HET_ALLELE_FRACTION: f64 = 0.5;

/// Default cap for HET_SNP_Q, reported when the sensitivity is one.
pub const DEFAULT_MAX_HET_SNP_Q: f64 = 100.0;

/// Parameters of the heterozygous SNP detection model.
#[derive(Clone, Debug, PartialEq, Serialize, Getters)]
pub struct GenotypingModel {
    /// Minimum number of alternate reads for a site to be detected.
    min_alt_reads: u32,

    /// Probability that a read at a heterozygous site carries the alternate
    /// allele.
    het_allele_fraction: f64,

    /// Largest HET_SNP_Q that is reported.
    max_het_snp_q: f64,
}

impl Default for GenotypingModel {
    fn default() -> Self {
        Self {
            min_alt_reads: DEFAULT_MIN_ALT_READS,
            het_allele_fraction: DEFAULT_HET_ALLELE_FRACTION,
            max_het_snp_q: DEFAULT_MAX_HET_SNP_Q,
        }
    }
}

impl GenotypingModel {
    /// Creates a new [`GenotypingModel`], ensuring every parameter is usable.
    pub fn new(
        min_alt_reads: u32,
        het_allele_fraction: f64,
        max_het_snp_q: f64,
    ) -> Result<Self, Error> {
        if min_alt_reads == 0 {
            return Err(Error::InvalidGenotypingModel {
                reason: String::from("at least one alternate read must be required"),
            });
        }

        if !(het_allele_fraction > 0.0 && het_allele_fraction <= 1.0) {
            return Err(Error::InvalidGenotypingModel {
                reason: format!(
                    "heterozygous allele fraction {} is not within (0, 1]",
                    het_allele_fraction
                ),
            });
        }

        if !(max_het_snp_q.is_finite() && max_het_snp_q > 0.0) {
            return Err(Error::InvalidGenotypingModel {
                reason: format!("maximum HET_SNP_Q {} must be positive", max_het_snp_q),
            });
        }

        Ok(Self {
            min_alt_reads,
            het_allele_fraction,
            max_het_snp_q,
        })
    }

    /// Probability of detecting a heterozygous site sequenced to `depth`,
    /// i.e. `P(X >= min_alt_reads)` for `X ~ Binomial(depth, p)`.
    pub fn detection_probability(&self, depth: usize) -> f64 {
        let k = self.min_alt_reads as usize;
        if depth < k {
            return 0.0;
        }

        let p = self.het_allele_fraction;
        if p >= 1.0 {
            return 1.0;
        }

        // Sum the lower tail P(X < k) in log space so deep sites don't
        // underflow before the terms are combined.
        let n = depth as f64;
        let log_odds = p.ln() - (1.0 - p).ln();
        let mut log_pmf = n * (1.0 - p).ln();
        let mut lower_tail = log_pmf.exp();

        for i in 1..k {
            let i = i as f64;
            log_pmf += (n - i + 1.0).ln() - i.ln() + log_odds;
            lower_tail += log_pmf.exp();
        }

        (1.0 - lower_tail).clamp(0.0, 1.0)
    }

    /// Converts a sensitivity into its Phred-scaled Q score, capped at
    /// `max_het_snp_q` (a sensitivity of one reports the cap).
    pub fn phred_score(&self, sensitivity: f64) -> f64 {
        if sensitivity <= 0.0 {
            return 0.0;
        }

        if sensitivity >= 1.0 {
            return self.max_het_snp_q;
        }

        (-10.0 * (1.0 - sensitivity).log10()).min(self.max_het_snp_q)
    }
}

/// Theoretical heterozygous SNP sensitivity over the targets.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Getters)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct SensitivityMetrics {
    /// Probability of detecting a heterozygous SNP at a random target base.
    het_snp_sensitivity: f64,

    /// HET_SNP_SENSITIVITY as a Phred-scaled Q score.
    het_snp_q: f64,
}

/// Derives the [`SensitivityMetrics`] from the depth histogram of the target
/// bases.
pub fn derive_sensitivity(histogram: &Histogram, model: &GenotypingModel) -> SensitivityMetrics {
    let total = histogram.sum();
    if total == 0 {
        return SensitivityMetrics::default();
    }

    let detected: f64 = histogram
        .occupied_bins()
        .map(|(depth, bases)| bases as f64 * model.detection_probability(depth))
        .sum();

    let het_snp_sensitivity = (detected / total as f64).clamp(0.0, 1.0);

    SensitivityMetrics {
        het_snp_sensitivity,
        het_snp_q: model.phred_score(het_snp_sensitivity),
    }
}
