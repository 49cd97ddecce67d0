//! Exact time values.
//!
//! Cycle and base times are entered as decimal text ("4.5", "18.0") and are
//! compared against each other inside integer feasibility constraints. A value
//! like `4.8` has no exact binary floating-point representation, so deriving a
//! fraction from an `f64` can move a threshold by one unit in the last place
//! and flip a feasibility boundary. Times are therefore parsed straight from
//! their decimal text: the digits become the numerator, the number of
//! fractional digits selects a power of ten for the denominator, and the
//! result is reduced.
//!
//! # Example
//! ```
//! use u_staffing::time::parse_minutes;
//!
//! let t = parse_minutes("4.5").unwrap();
//! assert_eq!((*t.numer(), *t.denom()), (9, 2));
//! ```

use num_rational::Ratio;
use rust_decimal::Decimal;

use crate::error::AllocationError;

/// Exact duration in minutes.
pub type Minutes = Ratio<i64>;

/// Parses decimal text into an exact rational number of minutes.
///
/// Leading and trailing whitespace is ignored. Signed values are accepted;
/// positivity is a property of the line catalog and is checked during
/// validation.
///
/// # Errors
/// `InvalidTimeFormat` if the text is not a plain finite decimal, or if the
/// reduced fraction does not fit in 64-bit numerator and denominator.
pub fn parse_minutes(text: &str) -> Result<Minutes, AllocationError> {
    let trimmed = text.trim();
    // from_str_exact refuses to round away digits it cannot hold
    let decimal = Decimal::from_str_exact(trimmed)
        .map_err(|e| AllocationError::invalid_time(text, e.to_string()))?;

    let mantissa = decimal.mantissa();
    let scale = decimal.scale();
    let denominator = 10_i128
        .checked_pow(scale)
        .ok_or_else(|| AllocationError::invalid_time(text, "too many fractional digits"))?;

    let exact = Ratio::new(mantissa, denominator);
    let numer = i64::try_from(*exact.numer())
        .map_err(|_| AllocationError::invalid_time(text, "value out of range"))?;
    let denom = i64::try_from(*exact.denom())
        .map_err(|_| AllocationError::invalid_time(text, "value out of range"))?;

    Ok(Ratio::new(numer, denom))
}

/// Decimal approximation for display.
///
/// Never feed the result back into a feasibility check.
pub fn approx(value: &Minutes) -> f64 {
    *value.numer() as f64 / *value.denom() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integral() {
        let t = parse_minutes("18").unwrap();
        assert_eq!(t, Ratio::from_integer(18));
        let t = parse_minutes("18.0").unwrap();
        assert_eq!(t, Ratio::from_integer(18));
    }

    #[test]
    fn test_parse_reduces() {
        let t = parse_minutes("4.5").unwrap();
        assert_eq!(*t.numer(), 9);
        assert_eq!(*t.denom(), 2);

        let t = parse_minutes("0.50").unwrap();
        assert_eq!((*t.numer(), *t.denom()), (1, 2));
    }

    #[test]
    fn test_parse_exact_where_float_is_not() {
        // 4.8 and 0.1 have no exact f64 representation
        let t = parse_minutes("4.8").unwrap();
        assert_eq!((*t.numer(), *t.denom()), (24, 5));
        let t = parse_minutes("0.1").unwrap();
        assert_eq!((*t.numer(), *t.denom()), (1, 10));
        assert_eq!(t * Ratio::from_integer(3), Ratio::new(3, 10));
    }

    #[test]
    fn test_parse_whitespace_and_sign() {
        assert_eq!(parse_minutes("  3.2 ").unwrap(), Ratio::new(16, 5));
        assert_eq!(parse_minutes("-2.5").unwrap(), Ratio::new(-5, 2));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "abc", "4.5.1", "1/2", "NaN", "inf", "4,5"] {
            let err = parse_minutes(bad).unwrap_err();
            assert!(
                matches!(err, AllocationError::InvalidTimeFormat { .. }),
                "expected InvalidTimeFormat for {bad:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn test_approx_display_only() {
        let t = parse_minutes("3.2").unwrap();
        assert!((approx(&t) - 3.2).abs() < 1e-12);
    }
}
