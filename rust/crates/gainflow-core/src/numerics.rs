/// Tolerance used when checking capacity and conservation of a returned flow.
pub const FLOW_EPSILON: f64 = 1e-6;

/// Rounds `value` to `decimals` places, half away from zero.
pub fn round_to_decimals(value: f64, decimals: u32) -> f64 {
    let scale = 10_f64.powi(decimals as i32);
    (value * scale).round() / scale
}

/// Absolute tolerance scaled by the largest magnitude involved, never below
/// `epsilon` itself.
pub fn scaled_tolerance(epsilon: f64, magnitude: f64) -> f64 {
    epsilon * magnitude.abs().max(1.0)
}

pub fn approx_eq(lhs: f64, rhs: f64, epsilon: f64) -> bool {
    (lhs - rhs).abs() <= scaled_tolerance(epsilon, lhs.abs().max(rhs.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rounds_to_three_decimals() {
        assert_relative_eq!(round_to_decimals(0.12345, 3), 0.123);
        assert_relative_eq!(round_to_decimals(0.9996, 3), 1.0);
        assert_relative_eq!(round_to_decimals(0.0004, 3), 0.0);
    }

    #[test]
    fn tolerance_scales_with_magnitude() {
        assert_relative_eq!(scaled_tolerance(1e-6, 0.5), 1e-6);
        assert_relative_eq!(scaled_tolerance(1e-6, -1000.0), 1e-3);
    }

    #[test]
    fn approx_eq_is_relative_for_large_values() {
        assert!(approx_eq(1_000_000.0, 1_000_000.5, 1e-6));
        assert!(!approx_eq(1.0, 1.001, 1e-6));
        assert!(approx_eq(0.0, 5e-7, 1e-6));
    }
}
