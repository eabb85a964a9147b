//! Utilities related to displaying things.

use std::fmt;

use num_format::Locale;
use num_format::ToFormattedString;

/// Utility struct for displaying a fraction in `[0.0, 1.0]` as a percentage.
pub struct PercentageFormat(pub f64);

impl fmt::Display for PercentageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_finite() {
            write!(f, "{:.2}%", self.0 * 100.0)
        } else {
            f.write_str("N/A")
        }
    }
}

/// Utility struct for displaying a count with thousands separators.
pub struct CountFormat(pub u64);

impl fmt::Display for CountFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_formatted_string(&Locale::en))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_format() {
        assert_eq!(PercentageFormat(0.9).to_string(), "90.00%");
        assert_eq!(PercentageFormat(0.0).to_string(), "0.00%");
        assert_eq!(PercentageFormat(f64::NAN).to_string(), "N/A");
    }

    #[test]
    fn test_count_format() {
        assert_eq!(CountFormat(1_234_567).to_string(), "1,234,567");
        assert_eq!(CountFormat(12).to_string(), "12");
    }
}
