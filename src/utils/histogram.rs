//! Histogram of read depths used as the basis for the coverage reductions.
//!
//! # Overview
//!
//! Coverage over a set of targets is naturally a long list of per-base depth
//! observations, but almost every statistic we report (mean, median, the
//! fraction of bases at or above some depth, the genotyping sensitivity) only
//! needs to know _how many_ bases were seen at each depth. The [`Histogram`]
//! in this module stores exactly that: bin `i` holds the number of target
//! bases that were observed at a depth of `i`.
//!
//! The histogram follows these rules:
//!
//! 1. Only discrete depths are considered as bins. In other words, bins
//!    represent values in the range of `[0, 1, 2, 3, ..., n]`.
//! 2. The range of values always starts at zero, as zero coverage is one of
//!    the most interesting observations for targeted sequencing.
//! 3. Only occupied bins are stored, so a handful of extremely deep bases
//!    costs no more than a handful of shallow ones.
//!
//! # Usage
//!
//! Histograms can be created empty with
//! [`zero_based_with_capacity`][Histogram::zero_based_with_capacity], or
//! directly from a set of observed depths with
//! [`from_observations`][Histogram::from_observations].
//!
//! ```
//! use pcrqc::utils::histogram::Histogram;
//! let mut hist = Histogram::zero_based_with_capacity(10);
//!
//! // One base seen at zero depth.
//! let result = hist.increment(0);
//! assert!(result.is_ok());
//!
//! // Forty-two bases seen at a depth of one.
//! let result = hist.increment_by(1, 42);
//! assert!(result.is_ok());
//!
//! assert_eq!(hist.get(0), 1);
//! assert_eq!(hist.get(1), 42);
//! assert_eq!(hist.sum(), 43);
//! ```
//!
//! Incrementing a bin outside of the range of the [`Histogram`] results in a
//! [`BinOutOfBoundsError`].
//!
//! ```
//! use pcrqc::utils::histogram::Histogram;
//! use pcrqc::utils::histogram::BinOutOfBoundsError;
//! let mut hist = Histogram::zero_based_with_capacity(10);
//!
//! let result = hist.increment(11);
//! assert_eq!(result.unwrap_err(), BinOutOfBoundsError);
//! ```
//!
//! Once populated, you can:
//!
//! - Find the mean of the distribution ([`mean`][Histogram::mean]).
//! - Find an arbitrary percentile of the distribution ([`percentile`][Histogram::percentile]).
//! - Find the median of the distribution ([`median`][Histogram::median]).
//! - Count the observations at or above a depth
//!   ([`count_from_top_until`][Histogram::count_from_top_until]).
//!
//! ```
//! use pcrqc::utils::histogram::Histogram;
//! let hist = Histogram::from_observations([0, 0, 5, 5, 5, 5, 10, 10, 10, 10]);
//!
//! assert_eq!(hist.mean(), Some(6.0));
//! assert_eq!(hist.median(), Some(5.0));
//! assert_eq!(hist.count_from_top_until(1), 8);
//! assert_eq!(hist.count_from_top_until(11), 0);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Histogram of per-base read depths. For more in depth information, please
/// see the [module-level documentation].
///
/// [module-level documentation]: self
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Histogram {
    // Occupied bins of the histogram, keyed by bin. Bins that were never
    // incremented are absent rather than zero.
    values: BTreeMap<usize, u64>,
    // Ending range for the histogram (the starting range is always zero).
    range_stop: usize,
}

/// An error that occurs if we try to increment a bin of the histogram that is
/// out-of-bounds for that histogram.
#[derive(Debug, PartialEq, Eq)]
pub struct BinOutOfBoundsError;

/// An error that occurs if a percentile outside of `[0.0, 1.0]` is requested.
#[derive(Debug, PartialEq, Eq)]
pub struct PercentileOutOfRangeError;

impl Histogram {
    //=================//
    // Initializations //
    //=================//

    /// Creates a zero-based histogram with a given capacity.
    pub fn zero_based_with_capacity(capacity: usize) -> Self {
        Self {
            values: BTreeMap::new(),
            range_stop: capacity,
        }
    }

    /// Creates a histogram sized to fit the largest observation and counts
    /// every observation into its bin.
    pub fn from_observations<I>(observations: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        let mut histogram = Self::default();

        for depth in observations {
            let bin = depth as usize;
            histogram.range_stop = histogram.range_stop.max(bin);
            *histogram.values.entry(bin).or_insert(0) += 1;
        }

        histogram
    }

    //=================================//
    // Getting and incrementing values //
    //=================================//

    /// Increments a particular bin in the histogram by one.
    pub fn increment(&mut self, bin: usize) -> Result<(), BinOutOfBoundsError> {
        self.increment_by(bin, 1)
    }

    /// Increments a particular bin in the histogram by the specified value.
    pub fn increment_by(&mut self, bin: usize, value: u64) -> Result<(), BinOutOfBoundsError> {
        if !self.in_range(bin) {
            return Err(BinOutOfBoundsError);
        }

        if value > 0 {
            *self.values.entry(bin).or_insert(0) += value;
        }

        Ok(())
    }

    /// Gets the count for a bin. Bins that were never incremented, including
    /// those past the end of the histogram, are simply empty.
    pub fn get(&self, bin: usize) -> u64 {
        self.values.get(&bin).copied().unwrap_or(0)
    }

    /// Iterates over `(bin, count)` for every bin with a nonzero count, from
    /// the lowest bin up.
    pub fn occupied_bins(&self) -> impl DoubleEndedIterator<Item = (usize, u64)> + '_ {
        self.values.iter().map(|(bin, count)| (*bin, *count))
    }

    //=======//
    // Range //
    //=======//

    /// Gives the stopping position for the range of the histogram.
    pub fn range_stop(&self) -> usize {
        self.range_stop
    }

    /// Indicates whether a particular value falls within the range of the histogram.
    pub fn in_range(&self, value: usize) -> bool {
        value <= self.range_stop
    }

    //========================//
    // Numerical computations //
    //========================//

    /// Computes the sum of the counts within the distribution.
    pub fn sum(&self) -> u64 {
        self.values.values().sum()
    }

    /// Computes the mean depth, or `None` if the histogram is empty.
    pub fn mean(&self) -> Option<f64> {
        let total = self.sum();
        if total == 0 {
            return None;
        }

        let weighted: f64 = self
            .occupied_bins()
            .map(|(bin, count)| bin as f64 * count as f64)
            .sum();

        Some(weighted / total as f64)
    }

    /// Computes the value of the nth percentile based on an exhaustive search.
    ///
    /// When the cumulative count lands exactly on the requested percentile,
    /// the result is the midpoint of that bin and the next occupied bin. For
    /// the median, this is the average of the two central observations.
    pub fn percentile(&self, percentile: f64) -> Result<Option<f64>, PercentileOutOfRangeError> {
        // (1) Bounds check on the input data
        if !(0.0..=1.0).contains(&percentile) {
            return Err(PercentileOutOfRangeError);
        }

        // (2) If the number of items is zero, then there is no percentile.
        let num_items = self.sum();
        if num_items == 0 {
            return Ok(None);
        }

        // (3) Some simple math to figure out how many items constitutes
        // the nth percentile.
        let needed_items = percentile * num_items as f64;

        // (4) Starting at the lowest bin, step through the histogram until
        // we have collected `needed_items`.
        let mut collected_items = 0u64;
        let mut bins = self.occupied_bins().peekable();

        while let Some((bin, count)) = bins.next() {
            collected_items += count;
            let collected = collected_items as f64;

            if collected > needed_items {
                return Ok(Some(bin as f64));
            }

            // (4a) A runoff: take the middle of this bin and the next occupied
            // bin, if there is one.
            if collected == needed_items {
                return match bins.peek() {
                    Some((next, _)) => Ok(Some(bin as f64 + (*next - bin) as f64 / 2.0)),
                    None => Ok(Some(bin as f64)),
                };
            }
        }

        // Only reachable through floating point error at the very top.
        Ok(self.occupied_bins().next_back().map(|(bin, _)| bin as f64))
    }

    /// Computes the median of the distribution.
    pub fn median(&self) -> Option<f64> {
        // 0.5 is always a valid percentile.
        self.percentile(0.5).unwrap_or(None)
    }

    /// Counts the observations from the bottom of the histogram up to and
    /// including a certain bin.
    pub fn count_from_bottom_until(&self, bin: usize) -> u64 {
        self.values.range(..=bin).map(|(_, count)| count).sum()
    }

    /// Counts the observations from a certain bin (inclusive) to the top of
    /// the histogram. In coverage terms, this is the number of bases with a
    /// depth of at least `bin`.
    pub fn count_from_top_until(&self, bin: usize) -> u64 {
        self.values.range(bin..).map(|(_, count)| count).sum()
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::zero_based_with_capacity(0)
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    pub fn test_initialization() {
        let s = Histogram::zero_based_with_capacity(100);
        assert_eq!(s.occupied_bins().count(), 0);
        assert_eq!(s.range_stop(), 100);
        assert!(s.in_range(100));
        assert!(!s.in_range(101));
    }

    #[test]
    pub fn test_valid_incremements_and_mean_median() {
        let mut s = Histogram::zero_based_with_capacity(100);
        s.increment(25).unwrap();
        s.increment(50).unwrap();
        s.increment_by(75, 3).unwrap();
        s.increment_by(100, 5).unwrap();

        assert_eq!(s.get(25), 1);
        assert_eq!(s.get(50), 1);
        assert_eq!(s.get(75), 3);
        assert_eq!(s.get(100), 5);

        assert_eq!(s.mean(), Some(80.0));
        assert_eq!(s.percentile(0.25).unwrap(), Some(75.0));
        assert_eq!(s.median(), Some(87.5));
        assert_eq!(s.percentile(0.75).unwrap(), Some(100.0));
    }

    #[test]
    pub fn test_mean_and_median_on_empty_histogram() {
        let s = Histogram::zero_based_with_capacity(5000);
        assert!(s.mean().is_none());
        assert!(s.median().is_none());
    }

    #[test]
    pub fn test_median_extensively() {
        let mut s = Histogram::zero_based_with_capacity(5000);

        s.increment_by(0, 2500).unwrap();
        s.increment_by(10, 2500).unwrap();
        s.increment_by(100, 2500).unwrap();
        s.increment_by(5000, 5000).unwrap();
        assert_eq!(s.median(), Some(100.0));

        // If there is a tie, take the value in between the two middle values
        s.increment_by(200, 2500).unwrap();
        assert_eq!(s.median(), Some(150.0));

        // If we add one more to sway the vote, should shift the median
        s.increment(200).unwrap();
        assert_eq!(s.median(), Some(200.0));
    }

    #[test]
    pub fn test_percentile_at_the_top_does_not_run_off() {
        let s = Histogram::from_observations([1, 2, 3]);
        assert_eq!(s.percentile(1.0).unwrap(), Some(3.0));
        assert_eq!(s.percentile(1.5), Err(PercentileOutOfRangeError));
    }

    #[test]
    pub fn test_invalid_increments() {
        let mut s = Histogram::zero_based_with_capacity(100);
        assert_eq!(s.increment(101).unwrap_err(), BinOutOfBoundsError);
    }

    #[test]
    pub fn test_from_observations() {
        let s = Histogram::from_observations([3, 0, 3, 1]);
        assert_eq!(s.range_stop(), 3);
        assert_eq!(s.get(2), 0);
        assert_eq!(s.occupied_bins().collect::<Vec<_>>(), [(0, 1), (1, 1), (3, 2)]);

        let empty = Histogram::from_observations(Vec::<u32>::new());
        assert_eq!(empty.sum(), 0);
        assert_eq!(empty, Histogram::default());
    }

    #[test]
    pub fn test_extremely_deep_bins_are_stored_sparsely() {
        let s = Histogram::from_observations([u32::MAX, 5, 0]);
        assert_eq!(s.range_stop(), u32::MAX as usize);
        assert_eq!(s.occupied_bins().count(), 3);
        assert_eq!(s.get(u32::MAX as usize), 1);
        assert_eq!(s.sum(), 3);
        assert_eq!(s.median(), Some(5.0));
        assert_eq!(s.count_from_top_until(6), 1);
        assert_eq!(s.count_from_bottom_until(5), 2);

        let mut s = Histogram::zero_based_with_capacity(usize::MAX);
        s.increment_by(usize::MAX, 2).unwrap();
        assert_eq!(s.percentile(1.0).unwrap(), Some(usize::MAX as f64));
    }

    #[test]
    pub fn test_count_values_from_bottom() {
        let mut histogram = Histogram::zero_based_with_capacity(3);
        histogram.increment_by(0, 5).unwrap();
        histogram.increment_by(1, 3).unwrap();
        histogram.increment_by(2, 6).unwrap();
        assert_eq!(histogram.count_from_bottom_until(0), 5);
        assert_eq!(histogram.count_from_bottom_until(1), 8);
        assert_eq!(histogram.count_from_bottom_until(2), 14);
        assert_eq!(histogram.count_from_bottom_until(3), 14);
        assert_eq!(histogram.count_from_bottom_until(30), 14);
    }

    #[test]
    pub fn test_count_values_from_top() {
        let mut histogram = Histogram::zero_based_with_capacity(3);
        histogram.increment_by(0, 5).unwrap();
        histogram.increment_by(1, 3).unwrap();
        histogram.increment_by(2, 6).unwrap();
        assert_eq!(histogram.count_from_top_until(3), 0);
        assert_eq!(histogram.count_from_top_until(2), 6);
        assert_eq!(histogram.count_from_top_until(1), 9);
        assert_eq!(histogram.count_from_top_until(0), 14);
        assert_eq!(histogram.count_from_top_until(4), 0);
    }
}
