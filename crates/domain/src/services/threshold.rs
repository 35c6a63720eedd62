//! Sensor threshold evaluation.
//!
//! Every sensor surface goes through [`is_alert`] so the boundary rule stays
//! in one place.

/// Returns true when `current` lies outside `[min, max]`.
///
/// Both bounds are inclusive: a reading equal to `min` or `max` is in range.
pub fn is_alert(current: f64, min: f64, max: f64) -> bool {
    current < min || current > max
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_are_in_range() {
        assert!(!is_alert(10.0, 10.0, 20.0));
        assert!(!is_alert(20.0, 10.0, 20.0));
    }

    #[test]
    fn test_outside_range_alerts() {
        assert!(is_alert(21.0, 10.0, 20.0));
        assert!(is_alert(9.0, 10.0, 20.0));
        assert!(is_alert(9.999, 10.0, 20.0));
    }

    #[test]
    fn test_inside_range() {
        assert!(!is_alert(15.0, 10.0, 20.0));
    }

    #[test]
    fn test_infinite_bounds() {
        assert!(!is_alert(1e9, 0.0, f64::INFINITY));
        assert!(!is_alert(-1e9, f64::NEG_INFINITY, 0.0));
    }
}
