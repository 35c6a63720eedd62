//! Environment sensor domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::services::threshold;

/// A sensor as reported by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Sensor {
    pub id: i64,
    pub name: String,
    pub current_value: f64,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub unit: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Sensor {
    /// Reading triple with open sides mapped to infinite bounds.
    pub fn reading(&self) -> SensorReading {
        SensorReading {
            current: self.current_value,
            min: self.min_value.unwrap_or(f64::NEG_INFINITY),
            max: self.max_value.unwrap_or(f64::INFINITY),
        }
    }

    pub fn is_alert(&self) -> bool {
        self.reading().is_alert()
    }
}

/// Current value of a sensor together with its acceptable range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub current: f64,
    pub min: f64,
    pub max: f64,
}

impl SensorReading {
    pub fn new(current: f64, min: f64, max: f64) -> Self {
        Self { current, min, max }
    }

    pub fn is_alert(&self) -> bool {
        threshold::is_alert(self.current, self.min, self.max)
    }
}

/// Request payload for creating or updating a sensor.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct SensorRequest {
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: String,

    pub current_value: f64,

    pub min_value: Option<f64>,

    pub max_value: Option<f64>,

    #[validate(length(max = 20, message = "Unit must be at most 20 characters"))]
    pub unit: Option<String>,
}

impl SensorRequest {
    /// Field validation plus the cross-field bounds check.
    pub fn check(&self) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        if let Err(err) = shared::validation::validate_bounds(self.min_value, self.max_value) {
            errors.add("min_value", err);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl From<&Sensor> for SensorRequest {
    fn from(sensor: &Sensor) -> Self {
        Self {
            name: sensor.name.clone(),
            current_value: sensor.current_value,
            min_value: sensor.min_value,
            max_value: sensor.max_value,
            unit: sensor.unit.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sensor(current: f64, min: Option<f64>, max: Option<f64>) -> Sensor {
        Sensor {
            id: 1,
            name: "Ammonia".to_string(),
            current_value: current,
            min_value: min,
            max_value: max,
            unit: Some("ppm".to_string()),
            timestamp: None,
        }
    }

    #[test]
    fn test_reading_boundaries_are_not_alerts() {
        assert!(!SensorReading::new(10.0, 10.0, 20.0).is_alert());
        assert!(!SensorReading::new(20.0, 10.0, 20.0).is_alert());
        assert!(SensorReading::new(21.0, 10.0, 20.0).is_alert());
        assert!(SensorReading::new(9.0, 10.0, 20.0).is_alert());
    }

    #[test]
    fn test_sensor_missing_bounds_are_open() {
        assert!(!sensor(1000.0, Some(10.0), None).is_alert());
        assert!(sensor(5.0, Some(10.0), None).is_alert());
        assert!(!sensor(-40.0, None, Some(30.0)).is_alert());
        assert!(!sensor(0.0, None, None).is_alert());
    }

    #[test]
    fn test_sensor_request_check() {
        let mut request = SensorRequest::from(&sensor(20.0, Some(10.0), Some(30.0)));
        assert!(request.check().is_ok());

        request.min_value = Some(40.0);
        let errors = request.check().unwrap_err();
        assert!(errors.field_errors().contains_key("min_value"));

        request.min_value = None;
        request.name = " ".to_string();
        assert!(request.check().is_err());
    }
}
