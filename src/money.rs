//! Currency normalization.
//!
//! Every monetary amount the engine computes passes through [`round2`] so
//! that totals accumulated over long timelines stay comparable with `==`
//! and never drift below the cent.

/// Values closer to zero than this are snapped to exactly 0.0 before
/// rounding, so that residues like `-1.4210854715202004e-14` from a long
/// cumulative sum do not survive as `-0.0`.
const ZERO_EPSILON: f64 = 1e-9;

/// Rounds a monetary amount to 2 decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    let value = sanitize(value);
    if value.abs() < ZERO_EPSILON {
        return 0.0;
    }
    (value * 100.0).round() / 100.0
}

/// Coerces non-finite input to 0.0. The engine favors total functions:
/// a NaN or infinity in caller data becomes a zero amount, not a panic.
pub fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Sum of amounts, normalized after every addition.
pub fn sum2<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    values.into_iter().fold(0.0, |acc, v| round2(acc + v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2_basic() {
        assert_eq!(round2(3.0198), 3.02);
        assert_eq!(round2(2.346), 2.35);
        assert_eq!(round2(-2.346), -2.35);
        assert_eq!(round2(100.0), 100.0);
    }

    #[test]
    fn test_round2_snaps_residue_to_zero() {
        assert_eq!(round2(-1.4210854715202004e-14), 0.0);
        assert!(round2(1e-12).is_sign_positive());
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_sanitize_non_finite() {
        assert_eq!(sanitize(f64::NAN), 0.0);
        assert_eq!(sanitize(f64::INFINITY), 0.0);
        assert_eq!(sanitize(f64::NEG_INFINITY), 0.0);
        assert_eq!(sanitize(12.5), 12.5);
    }

    #[test]
    fn test_sum2_no_drift() {
        let total = sum2(std::iter::repeat(0.1).take(1000));
        assert_eq!(total, 100.0);
    }
}
