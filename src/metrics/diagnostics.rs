//! Non-fatal conditions noted while deriving metrics.
//!
//! A ratio with a zero denominator, or a coverage statistic over a histogram
//! that has nothing to reduce, is reported as `0.0`. Each such field is noted
//! here so a consumer can tell a genuine zero from an undefined one.

use serde::Serialize;
use tracing::{debug, warn};

/// A field whose value was forced to zero because it was undefined.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "KIND", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Diagnostic {
    /// The denominator of a ratio was zero.
    ZeroDenominator {
        /// The metric that was forced to zero.
        #[serde(rename = "FIELD")]
        field: &'static str,
    },

    /// The coverage histogram held no observations at all.
    EmptyCoverageHistogram,

    /// No target base had nonzero coverage, so FOLD_80_BASE_PENALTY is
    /// undefined.
    NoCoveredTargetBases,
}

/// Whether `field` appears among `diagnostics` as having a zero denominator.
pub fn has_zero_denominator(diagnostics: &[Diagnostic], field: &str) -> bool {
    diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::ZeroDenominator { field: f } if *f == field))
}

/// Collects the [`Diagnostic`]s raised during one derivation.
#[derive(Clone, Debug, Default)]
pub struct Diagnostics {
    notes: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Records a diagnostic, logging it as it arrives.
    pub fn note(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::ZeroDenominator { field } => {
                debug!("{} has a zero denominator; reporting 0.0.", field)
            }
            Diagnostic::EmptyCoverageHistogram => {
                warn!("The coverage histogram is empty; coverage metrics are reported as 0.0.")
            }
            Diagnostic::NoCoveredTargetBases => {
                warn!("No target bases have coverage; FOLD_80_BASE_PENALTY is reported as 0.0.")
            }
        }

        self.notes.push(diagnostic);
    }

    /// Divides `numerator` by `denominator`, or notes the field and returns
    /// `0.0` if the denominator is zero.
    pub fn ratio(&mut self, field: &'static str, numerator: f64, denominator: f64) -> f64 {
        if denominator == 0.0 {
            self.note(Diagnostic::ZeroDenominator { field });
            return 0.0;
        }

        numerator / denominator
    }

    /// [`ratio`](Self::ratio) over integer counts.
    pub fn count_ratio(&mut self, field: &'static str, numerator: u64, denominator: u64) -> f64 {
        self.ratio(field, numerator as f64, denominator as f64)
    }

    /// Whether any diagnostic has been noted for `field`.
    pub fn is_degenerate(&self, field: &str) -> bool {
        has_zero_denominator(&self.notes, field)
    }

    /// Consumes the collector, returning the diagnostics in the order they
    /// were noted.
    pub fn into_inner(self) -> Vec<Diagnostic> {
        self.notes
    }
}
