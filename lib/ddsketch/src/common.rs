use float_cmp::{ApproxEq as _, F64Margin};

/// Absolute tolerance used when deciding whether two index mappings are interchangeable.
///
/// Mappings are compared on their derived parameters (multiplier and index offset), not on the accuracy or gamma they
/// were originally constructed from.
pub const MAPPING_EQUALITY_TOLERANCE: f64 = 1e-12;

/// Compares two floating-point values for equality within an absolute tolerance.
pub fn within_tolerance(l_value: f64, r_value: f64, tolerance: f64) -> bool {
    l_value.approx_eq(
        r_value,
        F64Margin {
            epsilon: tolerance,
            ulps: 0,
        },
    )
}

/// Compares two floating-point values for approximate equality using a ratio-based approach.
///
/// When comparing two values, the smaller value cannot deviate by more than 0.0000001% of the larger value.
/// This handles NaN values by considering two NaN values as equal.
#[cfg(test)]
pub fn float_eq(l_value: f64, r_value: f64) -> bool {
    use float_cmp::ApproxEqRatio as _;

    const RATIO_ERROR: f64 = 0.00000001;

    (l_value.is_nan() && r_value.is_nan()) || l_value.approx_eq_ratio(&r_value, RATIO_ERROR)
}
