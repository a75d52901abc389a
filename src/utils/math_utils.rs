//! Lossy numeric conversions used when sizing and indexing distance grids.

#[must_use]
pub const fn usize_to_f64(value: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let newval = value as f64;
    newval
}

/// Convert a (non-negative) `f64` into a `usize`, truncating the fractional part.
///
/// Negative values and NaN saturate to 0.
#[must_use]
pub const fn f64_to_usize(value: f64) -> usize {
    #[allow(clippy::cast_possible_truncation)]
    #[allow(clippy::cast_sign_loss)]
    let newval = value as usize;
    newval
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn usize_to_f64_test() {
        assert_eq!(usize_to_f64(0), 0.0);
        assert_eq!(usize_to_f64(12), 12.0);
    }
    #[test]
    fn f64_to_usize_test() {
        assert_eq!(f64_to_usize(3.9), 3);
        assert_eq!(f64_to_usize(-1.0), 0);
        assert_eq!(f64_to_usize(f64::NAN), 0);
    }
}
