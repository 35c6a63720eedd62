//! Veterinary appointment domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::animal::AnimalId;

/// An appointment as reported by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Appointment {
    pub id: i64,
    pub sheep_id: AnimalId,
    pub vet_id: i64,
    pub date: DateTime<Utc>,
    pub reason: Option<String>,
    pub comments: Option<String>,
}

impl Appointment {
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.date >= now
    }
}

/// Request payload for scheduling an appointment.
///
/// The server's field names are `motivo` and `comentarios`.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateAppointmentRequest {
    pub sheep_id: AnimalId,

    pub vet_id: i64,

    #[serde(rename = "motivo", skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 255, message = "Reason must be at most 255 characters"))]
    pub reason: Option<String>,

    #[serde(rename = "comentarios", skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000, message = "Comments must be at most 2000 characters"))]
    pub comments: Option<String>,
}

/// Request payload for updating an appointment's notes.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct UpdateAppointmentRequest {
    #[serde(rename = "motivo", skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 255, message = "Reason must be at most 255 characters"))]
    pub reason: Option<String>,

    #[serde(rename = "comentarios", skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000, message = "Comments must be at most 2000 characters"))]
    pub comments: Option<String>,
}

/// Splits appointments into upcoming and past, both sorted by date.
pub fn partition_by_date(
    appointments: Vec<Appointment>,
    now: DateTime<Utc>,
) -> (Vec<Appointment>, Vec<Appointment>) {
    let (mut upcoming, mut past): (Vec<_>, Vec<_>) =
        appointments.into_iter().partition(|a| a.is_upcoming(now));
    upcoming.sort_by_key(|a| a.date);
    past.sort_by(|a, b| b.date.cmp(&a.date));
    (upcoming, past)
}
