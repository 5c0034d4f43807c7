//! Three-point (PERT) risk parameters and confidence intervals.
//!
//! A `RiskParameter` is a calibrated (low, mode, high) subjective estimate.
//! Confidence intervals come from the standard PERT-to-Normal approximation:
//! mean = (low + 4*mode + high) / 6, stdev = (high - low) / 6.

use serde::{Deserialize, Serialize};

/// Positivity floor applied when repairing estimates.
pub const MIN_ESTIMATE: f64 = 0.1;

/// Calibrated three-point estimate, invariant: 0 < low <= mode <= high.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskParameter {
    pub low: f64,
    pub mode: f64,
    pub high: f64,
}

impl RiskParameter {
    /// Build an estimate, repairing out-of-order or non-positive inputs by
    /// clamping rather than rejecting. Idempotent on already-valid input.
    pub fn clamped(low: f64, mode: f64, high: f64) -> Self {
        let low = low.max(MIN_ESTIMATE);
        let mode = mode.max(low);
        let high = high.max(mode);
        Self { low, mode, high }
    }

    pub fn mean(&self) -> f64 {
        (self.low + 4.0 * self.mode + self.high) / 6.0
    }

    pub fn stdev(&self) -> f64 {
        (self.high - self.low) / 6.0
    }

    /// Two-sided interval at the given confidence level (e.g. 0.95).
    pub fn confidence_interval(&self, level: f64) -> ConfidenceInterval {
        let z = normal_inverse_cdf((1.0 + level) / 2.0);
        let margin = z * self.stdev();
        let mean = self.mean();
        ConfidenceInterval {
            level,
            lower: mean - margin,
            upper: mean + margin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub level: f64,
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Inverse standard-normal CDF.
///
/// Acklam's rational approximation; absolute error below 1.15e-9 across
/// the open unit interval, far tighter than the calibration noise of the
/// estimates it is applied to.
pub fn normal_inverse_cdf(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];
    const P_LOW: f64 = 0.02425;

    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_repairs_out_of_order_input() {
        let p = RiskParameter::clamped(5.0, 2.0, 1.0);
        assert_eq!(p.low, 5.0);
        assert_eq!(p.mode, 5.0);
        assert_eq!(p.high, 5.0);

        let p = RiskParameter::clamped(-1.0, 0.0, 0.05);
        assert_eq!(p.low, MIN_ESTIMATE);
        assert_eq!(p.mode, MIN_ESTIMATE);
        assert_eq!(p.high, MIN_ESTIMATE);
    }

    #[test]
    fn test_clamp_idempotent_on_valid_input() {
        let p = RiskParameter::clamped(1.0, 2.0, 3.0);
        let q = RiskParameter::clamped(p.low, p.mode, p.high);
        assert_eq!(p, q);
    }

    #[test]
    fn test_pert_mean_and_stdev() {
        let p = RiskParameter::clamped(10.0, 20.0, 40.0);
        assert!((p.mean() - (10.0 + 80.0 + 40.0) / 6.0).abs() < 1e-12);
        assert!((p.stdev() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_inverse_cdf_known_values() {
        assert!((normal_inverse_cdf(0.5)).abs() < 1e-9);
        assert!((normal_inverse_cdf(0.975) - 1.959964).abs() < 1e-4);
        assert!((normal_inverse_cdf(0.995) - 2.575829).abs() < 1e-4);
        // Symmetry
        assert!((normal_inverse_cdf(0.3) + normal_inverse_cdf(0.7)).abs() < 1e-9);
    }

    #[test]
    fn test_interval_symmetric_and_nested() {
        let p = RiskParameter::clamped(100.0, 200.0, 400.0);
        let i90 = p.confidence_interval(0.90);
        let i95 = p.confidence_interval(0.95);
        let i99 = p.confidence_interval(0.99);

        let mean = p.mean();
        assert!(((mean - i95.lower) - (i95.upper - mean)).abs() < 1e-9);

        assert!(i95.width() > i90.width());
        assert!(i99.width() > i95.width());
        assert!(i99.lower < i95.lower && i95.lower < i90.lower);
        assert!(i99.upper > i95.upper && i95.upper > i90.upper);
    }
}
