//! Under-representation of reads in AT-rich and GC-rich targets.
//!
//! For every GC bin, the share of the target territory in that bin is
//! compared with the share of aligned reads that landed there. Whatever the
//! reads fall short of the territory is summed over the low-GC bins
//! (AT_DROPOUT) and over the high-GC bins (GC_DROPOUT).
//!
//! The bin at exactly 50% GC belongs to _both_ sums, so its shortfall is
//! counted twice. It is unclear whether this was ever intended, but the
//! metric has always been reported this way and so it is kept.

use std::collections::HashSet;

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// GC percentage that bounds AT_DROPOUT from above and GC_DROPOUT from below
/// (inclusive on both sides).
pub const DROPOUT_BOUNDARY_GC: u8 = 50;

// Room for rounding when checking that a column of fractions sums to one.
const FRACTION_SUM_TOLERANCE: f64 = 1e-6;

/// One GC-content bin of the target territory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct GcBin {
    /// GC content of the bin, as a percentage in `[0, 100]`.
    pub gc: u8,

    /// Fraction of the target territory with this GC content.
    pub territory_fraction: f64,

    /// Fraction of aligned reads attributed to targets with this GC content.
    pub aligned_fraction: f64,
}

impl GcBin {
    /// How far the aligned reads fall short of the territory in this bin.
    /// Zero if the bin is not under-represented.
    pub fn shortfall(&self) -> f64 {
        (self.territory_fraction - self.aligned_fraction).max(0.0)
    }
}

/// The GC bins spanning the target territory. Serialized as a plain array of
/// [`GcBin`]s.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GcBinTable {
    bins: Vec<GcBin>,
}

impl GcBinTable {
    /// Creates a [`GcBinTable`] from already normalized bins.
    pub fn new(bins: Vec<GcBin>) -> Self {
        Self { bins }
    }

    /// Creates a [`GcBinTable`] from `(gc, territory bases, aligned reads)`
    /// counts, normalizing each column by its total. A column with a total
    /// of zero is all zero fractions.
    pub fn from_counts<I>(counts: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (u8, u64, u64)>,
    {
        let counts: Vec<_> = counts.into_iter().collect();

        let territory_total: u64 = counts.iter().map(|(_, territory, _)| territory).sum();
        let aligned_total: u64 = counts.iter().map(|(_, _, aligned)| aligned).sum();

        let fraction = |count: u64, total: u64| {
            if total == 0 {
                0.0
            } else {
                count as f64 / total as f64
            }
        };

        let table = Self {
            bins: counts
                .into_iter()
                .map(|(gc, territory, aligned)| GcBin {
                    gc,
                    territory_fraction: fraction(territory, territory_total),
                    aligned_fraction: fraction(aligned, aligned_total),
                })
                .collect(),
        };

        table.validate()?;
        Ok(table)
    }

    /// The bins of the table.
    pub fn bins(&self) -> &[GcBin] {
        &self.bins
    }

    /// Checks that every bin is within range, no GC percentage is repeated,
    /// and neither column of fractions sums beyond one.
    pub fn validate(&self) -> Result<(), Error> {
        let mut seen = HashSet::new();
        let mut territory_sum = 0.0;
        let mut aligned_sum = 0.0;

        for bin in &self.bins {
            let invalid = |reason: String| Error::InvalidGcBin { gc: bin.gc, reason };

            if bin.gc > 100 {
                return Err(invalid(String::from("GC content exceeds 100%")));
            }

            if !seen.insert(bin.gc) {
                return Err(invalid(String::from("bin is listed more than once")));
            }

            for (name, value) in [
                ("territory fraction", bin.territory_fraction),
                ("aligned fraction", bin.aligned_fraction),
            ] {
                if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                    return Err(invalid(format!("{} {} is not within [0, 1]", name, value)));
                }
            }

            territory_sum += bin.territory_fraction;
            aligned_sum += bin.aligned_fraction;

            if territory_sum > 1.0 + FRACTION_SUM_TOLERANCE {
                return Err(invalid(String::from("territory fractions sum beyond 1")));
            }

            if aligned_sum > 1.0 + FRACTION_SUM_TOLERANCE {
                return Err(invalid(String::from("aligned fractions sum beyond 1")));
            }
        }

        Ok(())
    }
}

/// Dropout metrics for the extremes of GC content.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Getters)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct GcDropoutMetrics {
    /// Summed shortfall of aligned reads over bins with GC <= 50%.
    at_dropout: f64,

    /// Summed shortfall of aligned reads over bins with GC >= 50%.
    gc_dropout: f64,
}

/// Derives the [`GcDropoutMetrics`] from a validated [`GcBinTable`].
pub fn derive_gc_dropout(table: &GcBinTable) -> GcDropoutMetrics {
    let mut metrics = GcDropoutMetrics::default();

    for bin in table.bins() {
        let shortfall = bin.shortfall();

        if bin.gc <= DROPOUT_BOUNDARY_GC {
            metrics.at_dropout += shortfall;
        }

        if bin.gc >= DROPOUT_BOUNDARY_GC {
            metrics.gc_dropout += shortfall;
        }
    }

    metrics
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    fn bin(gc: u8, territory_fraction: f64, aligned_fraction: f64) -> GcBin {
        GcBin {
            gc,
            territory_fraction,
            aligned_fraction,
        }
    }

    #[test]
    fn test_only_shortfalls_count_towards_dropout() {
        let table = GcBinTable::new(vec![
            bin(20, 0.25, 0.10),
            bin(40, 0.25, 0.40),
            bin(60, 0.25, 0.35),
            bin(80, 0.25, 0.15),
        ]);
        assert_eq!(table.validate(), Ok(()));

        let metrics = derive_gc_dropout(&table);
        assert!((metrics.at_dropout() - 0.15).abs() < TOLERANCE);
        assert!((metrics.gc_dropout() - 0.10).abs() < TOLERANCE);
    }

    #[test]
    fn test_fifty_percent_bin_counts_towards_both_dropouts() {
        let table = GcBinTable::new(vec![
            bin(30, 0.3, 0.3),
            bin(50, 0.4, 0.1),
            bin(70, 0.3, 0.6),
        ]);

        let metrics = derive_gc_dropout(&table);
        assert!((metrics.at_dropout() - 0.3).abs() < TOLERANCE);
        assert!((metrics.gc_dropout() - 0.3).abs() < TOLERANCE);
    }

    #[test]
    fn test_perfectly_represented_bins_have_no_dropout() {
        let table = GcBinTable::new(vec![bin(10, 0.5, 0.5), bin(90, 0.5, 0.5)]);
        assert_eq!(derive_gc_dropout(&table), GcDropoutMetrics::default());
        assert_eq!(derive_gc_dropout(&GcBinTable::default()), GcDropoutMetrics::default());
    }

    #[test]
    fn test_from_counts_normalizes_columns() {
        let table = GcBinTable::from_counts([(40, 300, 10), (50, 100, 10), (60, 0, 0)]).unwrap();

        assert_eq!(table.bins()[0], bin(40, 0.75, 0.5));
        assert_eq!(table.bins()[1], bin(50, 0.25, 0.5));
        assert_eq!(table.bins()[2], bin(60, 0.0, 0.0));

        let empty = GcBinTable::from_counts([(40, 0, 0)]).unwrap();
        assert_eq!(empty.bins()[0], bin(40, 0.0, 0.0));
    }

    #[test]
    fn test_invalid_bins_are_rejected() {
        let over_hundred = GcBinTable::new(vec![bin(101, 0.1, 0.1)]);
        assert!(matches!(
            over_hundred.validate(),
            Err(Error::InvalidGcBin { gc: 101, .. })
        ));

        let duplicate = GcBinTable::new(vec![bin(40, 0.1, 0.1), bin(40, 0.1, 0.1)]);
        assert!(matches!(
            duplicate.validate(),
            Err(Error::InvalidGcBin { gc: 40, .. })
        ));

        let negative = GcBinTable::new(vec![bin(40, -0.1, 0.1)]);
        assert!(negative.validate().is_err());

        let not_a_number = GcBinTable::new(vec![bin(40, 0.1, f64::NAN)]);
        assert!(not_a_number.validate().is_err());

        let oversubscribed = GcBinTable::new(vec![bin(40, 0.6, 0.1), bin(60, 0.6, 0.1)]);
        assert!(matches!(
            oversubscribed.validate(),
            Err(Error::InvalidGcBin { gc: 60, .. })
        ));

        assert!(GcBinTable::from_counts([(120, 1, 1)]).is_err());
    }

    #[test]
    fn test_gc_bin_table_deserialization() {
        let json = r#"[
            {"GC": 45, "TERRITORY_FRACTION": 0.5, "ALIGNED_FRACTION": 0.4},
            {"GC": 55, "TERRITORY_FRACTION": 0.5, "ALIGNED_FRACTION": 0.6}
        ]"#;

        let table: GcBinTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.bins().len(), 2);
        assert_eq!(table.validate(), Ok(()));
        assert!((derive_gc_dropout(&table).at_dropout() - 0.1).abs() < TOLERANCE);
    }
}
