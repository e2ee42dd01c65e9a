//! Decibel PSD samples to linear bin power.
//!
//! A PSD value is power per unit bin width, so the power carried by one bin
//! is the linear PSD times the width. Each bin is integrated with a constant
//! height equal to the mean of its two edge samples:
//!
//! ```text
//!      _   _
//!     | |_| |
//!     |_|_|_|
//! ```

/// Convert a decibel power value to linear power.
#[inline]
pub fn db_to_power(db: f64) -> f64 {
    10.0_f64.powf(db / 10.0)
}

/// Linear power of the bin spanning `x0..x1`.
///
/// `d0` and `d1` are the dB PSD values at the bin edges. The x values may be
/// frequencies or periods and may come in either order. NaN input yields NaN.
#[inline]
pub fn integrate_power(d0: f64, d1: f64, x0: f64, x1: f64) -> f64 {
    let mean = 0.5 * (db_to_power(d0) + db_to_power(d1));
    mean * (x1 - x0).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_conversion() {
        assert!((db_to_power(0.0) - 1.0).abs() < 1e-12);
        assert!((db_to_power(10.0) - 10.0).abs() < 1e-12);
        assert!((db_to_power(-30.0) - 1e-3).abs() < 1e-15);
    }

    #[test]
    fn flat_bin_power() {
        let p = integrate_power(-100.0, -100.0, 1.0, 1.1);
        assert!((p - 1e-11).abs() < 1e-20, "got {p}");
    }

    #[test]
    fn averages_the_two_edges() {
        // 10 dB and 20 dB -> (10 + 100) / 2 = 55, width 2
        let p = integrate_power(10.0, 20.0, 3.0, 5.0);
        assert!((p - 110.0).abs() < 1e-9, "got {p}");
    }

    #[test]
    fn width_is_unsigned() {
        let forward = integrate_power(-50.0, -40.0, 0.5, 0.25);
        let backward = integrate_power(-50.0, -40.0, 0.25, 0.5);
        assert_eq!(forward, backward);
        assert!(forward > 0.0);
    }

    #[test]
    fn nan_propagates() {
        assert!(integrate_power(f64::NAN, -100.0, 1.0, 1.1).is_nan());
        assert!(integrate_power(-100.0, -100.0, f64::NAN, 1.1).is_nan());
    }
}
