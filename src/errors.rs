//! Errors raised when the raw inputs to the metrics derivation are invalid.

use std::fmt;

use tracing::error;

/// An invalid input to the metrics derivation. Every variant is fatal for the
/// whole derivation: no metrics are produced from inputs that fail validation.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// A count that must be a subset of another count exceeds it.
    SubsetViolation {
        /// Name of the count that should be the subset.
        subset: &'static str,
        /// Value of the subset count.
        subset_value: u64,
        /// Name of the count that should be the superset.
        superset: &'static str,
        /// Value of the superset count.
        superset_value: u64,
    },

    /// The on-, near-, and off-amplicon bases do not sum to the number of PF
    /// aligned bases.
    PartitionViolation {
        /// Bases aligned onto an amplicon.
        on_amplicon: u64,
        /// Bases aligned near an amplicon.
        near_amplicon: u64,
        /// Bases aligned away from any amplicon.
        off_amplicon: u64,
        /// PF bases aligned.
        pf_bases_aligned: u64,
    },

    /// A GC bin that cannot be used.
    InvalidGcBin {
        /// The GC percentage of the offending bin.
        gc: u8,
        /// What is wrong with the bin.
        reason: String,
    },

    /// Parameters of the genotyping model are out of range.
    InvalidGenotypingModel {
        /// What is wrong with the model.
        reason: String,
    },

    /// Two stratified inputs were given for the same accumulation level.
    DuplicateLevel {
        /// The repeated level, as displayed.
        level: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SubsetViolation {
                subset,
                subset_value,
                superset,
                superset_value,
            } => write!(
                f,
                "invalid input: {} ({}) must not exceed {} ({})",
                subset, subset_value, superset, superset_value
            ),
            Error::PartitionViolation {
                on_amplicon,
                near_amplicon,
                off_amplicon,
                pf_bases_aligned,
            } => write!(
                f,
                "invalid input: ON_AMPLICON_BASES ({}) + NEAR_AMPLICON_BASES ({}) + \
                 OFF_AMPLICON_BASES ({}) must equal PF_BASES_ALIGNED ({})",
                on_amplicon, near_amplicon, off_amplicon, pf_bases_aligned
            ),
            Error::InvalidGcBin { gc, reason } => {
                write!(f, "invalid input: GC bin {}%: {}", gc, reason)
            }
            Error::InvalidGenotypingModel { reason } => {
                write!(f, "invalid genotyping model: {}", reason)
            }
            Error::DuplicateLevel { level } => {
                write!(f, "invalid input: metrics given twice for level {}", level)
            }
        }
    }
}

impl std::error::Error for Error {}

/// Exit codes used by the command line tool.
pub enum ExitCode {
    /// Indicates that invalid data was supplied to the given subcommand.
    InvalidInputData = 1,
}

/// Logs the message as an error and exits the process with the given code.
pub fn exit<I>(message: I, code: ExitCode) -> !
where
    I: tracing::Value,
{
    error!(message);
    std::process::exit(code as i32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subset_violation_display() {
        let err = Error::SubsetViolation {
            subset: "PF_READS",
            subset_value: 10,
            superset: "TOTAL_READS",
            superset_value: 5,
        };
        assert_eq!(
            err.to_string(),
            "invalid input: PF_READS (10) must not exceed TOTAL_READS (5)"
        );
    }

    #[test]
    fn test_partition_violation_display() {
        let err = Error::PartitionViolation {
            on_amplicon: 1,
            near_amplicon: 2,
            off_amplicon: 3,
            pf_bases_aligned: 7,
        };
        assert!(err.to_string().contains("PF_BASES_ALIGNED (7)"));
    }
}
