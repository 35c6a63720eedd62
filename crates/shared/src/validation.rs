//! Common validation utilities.

use validator::ValidationError;

/// Maximum length of a group name.
pub const MAX_GROUP_NAME_LENGTH: usize = 100;

/// Validates that a string contains something other than whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value cannot be empty".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Validates a group name after trimming surrounding whitespace.
pub fn validate_group_name(name: &str) -> Result<(), ValidationError> {
    validate_not_blank(name)?;
    if name.trim().chars().count() > MAX_GROUP_NAME_LENGTH {
        let mut err = ValidationError::new("group_name_length");
        err.message = Some("Group name must be at most 100 characters".into());
        return Err(err);
    }
    Ok(())
}

/// Validates that a produced volume is non-negative.
pub fn validate_volume(volume: f64) -> Result<(), ValidationError> {
    if volume >= 0.0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("volume_range");
        err.message = Some("Volume must be non-negative".into());
        Err(err)
    }
}

/// Validates that a sensor's lower bound does not exceed its upper bound.
///
/// A missing bound leaves that side open, so only a pair of present bounds
/// can be inconsistent.
pub fn validate_bounds(min: Option<f64>, max: Option<f64>) -> Result<(), ValidationError> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => {
            let mut err = ValidationError::new("bounds_order");
            err.message = Some("Minimum value cannot exceed maximum value".into());
            Err(err)
        }
        _ => Ok(()),
    }
}
