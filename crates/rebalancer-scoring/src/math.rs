//! Bounded normalization helpers shared by the scoring factors.

/// Scales `value` against `cap` and clamps into [0, 1].
///
/// Values at or above the cap saturate to 1.
pub fn normalize(value: f64, cap: f64) -> f64 {
	if cap <= 0.0 {
		return 0.0;
	}
	(value / cap).clamp(0.0, 1.0)
}

/// Turns a normalized cost into a score: lower cost, higher score.
pub fn invert(value: f64) -> f64 {
	1.0 - value.clamp(0.0, 1.0)
}

/// Division that is defined as 0 for a non-positive denominator.
///
/// Callers are expected to validate `amount_in > 0` upstream; a zero amount
/// still must not abort a scoring pass.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
	if denominator <= 0.0 {
		return 0.0;
	}
	numerator / denominator
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_normalize_saturates_at_cap() {
		assert_eq!(normalize(0.01, 0.02), 0.5);
		assert_eq!(normalize(0.02, 0.02), 1.0);
		assert_eq!(normalize(0.05, 0.02), 1.0);
		assert_eq!(normalize(-1.0, 0.02), 0.0);
	}

	#[test]
	fn test_invert_clamps() {
		assert_eq!(invert(0.25), 0.75);
		assert_eq!(invert(2.0), 0.0);
		assert_eq!(invert(-0.5), 1.0);
	}

	#[test]
	fn test_safe_ratio_zero_denominator() {
		assert_eq!(safe_ratio(5.0, 0.0), 0.0);
		assert_eq!(safe_ratio(5.0, -1.0), 0.0);
		assert_eq!(safe_ratio(5.0, 2.0), 2.5);
	}
}
