//! Raw counts produced upstream by alignment, duplicate marking, and interval
//! overlap, along with the invariants they must satisfy.

use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// Aligned bases that were excluded from coverage calculations, by reason.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ExcludedBases {
    /// Bases in reads marked as duplicates.
    pub excluded_dupe_bases: u64,

    /// Bases in reads with low mapping quality.
    pub excluded_mapq_bases: u64,

    /// Bases with low base quality.
    pub excluded_baseq_bases: u64,

    /// Bases that were the second observation from an insert with
    /// overlapping reads.
    pub excluded_overlap_bases: u64,

    /// Bases that did not map within a target region.
    pub excluded_off_target_bases: u64,
}

impl ExcludedBases {
    /// Every exclusion count, paired with its name.
    pub fn named(&self) -> [(&'static str, u64); 5] {
        [
            ("EXCLUDED_DUPE_BASES", self.excluded_dupe_bases),
            ("EXCLUDED_MAPQ_BASES", self.excluded_mapq_bases),
            ("EXCLUDED_BASEQ_BASES", self.excluded_baseq_bases),
            ("EXCLUDED_OVERLAP_BASES", self.excluded_overlap_bases),
            ("EXCLUDED_OFF_TARGET_BASES", self.excluded_off_target_bases),
        ]
    }

    /// The total pool of excluded bases, or `None` on overflow.
    pub fn total(&self) -> Option<u64> {
        self.named()
            .iter()
            .try_fold(0u64, |acc, (_, count)| acc.checked_add(*count))
    }
}

/// The raw counters for one targeted PCR experiment (or one stratum of it).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct RawCounters {
    /// The name of the amplicon set used in this metrics collection run.
    pub custom_amplicon_set: String,

    /// The number of bases in the reference genome used for alignment.
    pub genome_size: u64,

    /// The number of unique bases covered by the intervals of all amplicons.
    pub amplicon_territory: u64,

    /// The number of unique bases covered by the intervals of all targets.
    pub target_territory: u64,

    /// The total number of reads examined.
    pub total_reads: u64,

    /// The number of reads that pass the vendor's quality filter.
    pub pf_reads: u64,

    /// The number of bases within the PF reads.
    pub pf_bases: u64,

    /// The number of PF reads not marked as duplicates.
    pub pf_unique_reads: u64,

    /// The number of PF unique reads aligned with a mapping quality > 0.
    pub pf_uq_reads_aligned: u64,

    /// The number of read pairs that pass the vendor's filter.
    pub pf_selected_pairs: u64,

    /// The number of PF read pairs without any observed duplicates.
    pub pf_selected_unique_pairs: u64,

    /// The number of bases from PF reads aligned with a mapping quality > 0.
    pub pf_bases_aligned: u64,

    /// The number of bases from unique PF reads aligned with a mapping
    /// quality > 0.
    pub pf_uq_bases_aligned: u64,

    /// PF aligned bases that map onto an amplicon.
    pub on_amplicon_bases: u64,

    /// PF aligned bases that map near, but not onto, an amplicon.
    pub near_amplicon_bases: u64,

    /// PF aligned bases that map neither onto nor near an amplicon.
    pub off_amplicon_bases: u64,

    /// PF aligned bases that map onto a target.
    pub on_target_bases: u64,

    /// Bases from PF read pairs that map onto a target.
    pub on_target_from_pair_bases: u64,

    /// Aligned bases excluded from coverage, by reason.
    #[serde(flatten)]
    pub excluded: ExcludedBases,
}

/// Ensures `subset <= superset`.
fn ensure_subset(
    subset: &'static str,
    subset_value: u64,
    superset: &'static str,
    superset_value: u64,
) -> Result<(), Error> {
    if subset_value > superset_value {
        return Err(Error::SubsetViolation {
            subset,
            subset_value,
            superset,
            superset_value,
        });
    }

    Ok(())
}

impl RawCounters {
    /// Checks every invariant the counters must satisfy before any metric is
    /// derived from them. The first violation found is returned.
    pub fn validate(&self) -> Result<(), Error> {
        // (1) Territories are unique bases of the genome.
        ensure_subset(
            "AMPLICON_TERRITORY",
            self.amplicon_territory,
            "GENOME_SIZE",
            self.genome_size,
        )?;
        ensure_subset(
            "TARGET_TERRITORY",
            self.target_territory,
            "GENOME_SIZE",
            self.genome_size,
        )?;

        // (2) Read-level subsets.
        ensure_subset("PF_READS", self.pf_reads, "TOTAL_READS", self.total_reads)?;
        ensure_subset(
            "PF_UNIQUE_READS",
            self.pf_unique_reads,
            "PF_READS",
            self.pf_reads,
        )?;
        ensure_subset(
            "PF_UQ_READS_ALIGNED",
            self.pf_uq_reads_aligned,
            "PF_UNIQUE_READS",
            self.pf_unique_reads,
        )?;
        ensure_subset(
            "PF_SELECTED_UNIQUE_PAIRS",
            self.pf_selected_unique_pairs,
            "PF_SELECTED_PAIRS",
            self.pf_selected_pairs,
        )?;

        // (3) Base-level subsets.
        ensure_subset(
            "PF_BASES_ALIGNED",
            self.pf_bases_aligned,
            "PF_BASES",
            self.pf_bases,
        )?;
        ensure_subset(
            "PF_UQ_BASES_ALIGNED",
            self.pf_uq_bases_aligned,
            "PF_BASES_ALIGNED",
            self.pf_bases_aligned,
        )?;
        ensure_subset(
            "ON_TARGET_BASES",
            self.on_target_bases,
            "PF_BASES_ALIGNED",
            self.pf_bases_aligned,
        )?;
        ensure_subset(
            "ON_TARGET_FROM_PAIR_BASES",
            self.on_target_from_pair_bases,
            "ON_TARGET_BASES",
            self.on_target_bases,
        )?;

        // (4) On/near/off amplicon bases partition the aligned bases.
        let partition = self
            .on_amplicon_bases
            .checked_add(self.near_amplicon_bases)
            .and_then(|sum| sum.checked_add(self.off_amplicon_bases));

        if partition != Some(self.pf_bases_aligned) {
            return Err(Error::PartitionViolation {
                on_amplicon: self.on_amplicon_bases,
                near_amplicon: self.near_amplicon_bases,
                off_amplicon: self.off_amplicon_bases,
                pf_bases_aligned: self.pf_bases_aligned,
            });
        }

        // (5) Exclusions are drawn from a single pool of aligned bases.
        for (name, count) in self.excluded.named() {
            ensure_subset(name, count, "PF_BASES_ALIGNED", self.pf_bases_aligned)?;
        }

        ensure_subset(
            "TOTAL_EXCLUDED_BASES",
            self.excluded.total().unwrap_or(u64::MAX),
            "PF_BASES_ALIGNED",
            self.pf_bases_aligned,
        )?;

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A small, internally consistent set of counters.
    pub(crate) fn valid_counters() -> RawCounters {
        RawCounters {
            custom_amplicon_set: String::from("panel_v1"),
            genome_size: 3_000_000,
            amplicon_territory: 2_000,
            target_territory: 1_500,
            total_reads: 1000,
            pf_reads: 900,
            pf_bases: 1500,
            pf_unique_reads: 800,
            pf_uq_reads_aligned: 760,
            pf_selected_pairs: 450,
            pf_selected_unique_pairs: 400,
            pf_bases_aligned: 1000,
            pf_uq_bases_aligned: 900,
            on_amplicon_bases: 700,
            near_amplicon_bases: 100,
            off_amplicon_bases: 200,
            on_target_bases: 650,
            on_target_from_pair_bases: 600,
            excluded: ExcludedBases {
                excluded_dupe_bases: 100,
                excluded_mapq_bases: 50,
                excluded_baseq_bases: 20,
                excluded_overlap_bases: 30,
                excluded_off_target_bases: 200,
            },
        }
    }

    #[test]
    fn test_valid_counters_pass_validation() {
        assert_eq!(valid_counters().validate(), Ok(()));
        assert_eq!(RawCounters::default().validate(), Ok(()));
    }

    #[test]
    fn test_pf_reads_exceeding_total_reads_is_rejected() {
        let counters = RawCounters {
            pf_reads: 1001,
            ..valid_counters()
        };

        assert_eq!(
            counters.validate(),
            Err(Error::SubsetViolation {
                subset: "PF_READS",
                subset_value: 1001,
                superset: "TOTAL_READS",
                superset_value: 1000,
            })
        );
    }

    #[test]
    fn test_unique_reads_exceeding_pf_reads_is_rejected() {
        let counters = RawCounters {
            pf_unique_reads: 901,
            pf_uq_reads_aligned: 700,
            ..valid_counters()
        };

        assert!(matches!(
            counters.validate(),
            Err(Error::SubsetViolation {
                subset: "PF_UNIQUE_READS",
                ..
            })
        ));
    }

    #[test]
    fn test_territory_larger_than_genome_is_rejected() {
        let counters = RawCounters {
            genome_size: 1_000,
            ..valid_counters()
        };

        assert!(matches!(
            counters.validate(),
            Err(Error::SubsetViolation {
                subset: "AMPLICON_TERRITORY",
                superset: "GENOME_SIZE",
                ..
            })
        ));
    }

    #[test]
    fn test_broken_partition_is_rejected() {
        let counters = RawCounters {
            off_amplicon_bases: 199,
            ..valid_counters()
        };

        assert_eq!(
            counters.validate(),
            Err(Error::PartitionViolation {
                on_amplicon: 700,
                near_amplicon: 100,
                off_amplicon: 199,
                pf_bases_aligned: 1000,
            })
        );
    }

    #[test]
    fn test_overflowing_partition_is_rejected() {
        let counters = RawCounters {
            on_amplicon_bases: u64::MAX,
            near_amplicon_bases: 1,
            off_amplicon_bases: 0,
            ..valid_counters()
        };

        assert!(matches!(
            counters.validate(),
            Err(Error::PartitionViolation { .. })
        ));
    }

    #[test]
    fn test_exclusion_pool_exceeding_aligned_bases_is_rejected() {
        let mut counters = valid_counters();
        counters.excluded.excluded_off_target_bases = 900;

        assert!(matches!(
            counters.validate(),
            Err(Error::SubsetViolation {
                subset: "TOTAL_EXCLUDED_BASES",
                ..
            })
        ));

        counters.excluded.excluded_off_target_bases = 1001;
        assert!(matches!(
            counters.validate(),
            Err(Error::SubsetViolation {
                subset: "EXCLUDED_OFF_TARGET_BASES",
                ..
            })
        ));
    }

    #[test]
    fn test_counters_deserialize_from_metric_names() {
        let json = r#"{
            "CUSTOM_AMPLICON_SET": "panel_v1",
            "GENOME_SIZE": 100,
            "AMPLICON_TERRITORY": 10,
            "TARGET_TERRITORY": 8,
            "TOTAL_READS": 4,
            "PF_READS": 4,
            "PF_BASES": 40,
            "PF_UNIQUE_READS": 4,
            "PF_UQ_READS_ALIGNED": 4,
            "PF_SELECTED_PAIRS": 2,
            "PF_SELECTED_UNIQUE_PAIRS": 2,
            "PF_BASES_ALIGNED": 40,
            "PF_UQ_BASES_ALIGNED": 40,
            "ON_AMPLICON_BASES": 30,
            "NEAR_AMPLICON_BASES": 5,
            "OFF_AMPLICON_BASES": 5,
            "ON_TARGET_BASES": 25,
            "ON_TARGET_FROM_PAIR_BASES": 25,
            "EXCLUDED_DUPE_BASES": 0,
            "EXCLUDED_MAPQ_BASES": 0,
            "EXCLUDED_BASEQ_BASES": 0,
            "EXCLUDED_OVERLAP_BASES": 0,
            "EXCLUDED_OFF_TARGET_BASES": 15
        }"#;

        let counters: RawCounters = serde_json::from_str(json).unwrap();
        assert_eq!(counters.on_amplicon_bases, 30);
        assert_eq!(counters.excluded.excluded_off_target_bases, 15);
        assert_eq!(counters.validate(), Ok(()));
    }
}
