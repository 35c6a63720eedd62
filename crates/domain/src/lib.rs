//! Domain layer for the Farm Manager client.
//!
//! This crate contains:
//! - Domain models (Animal, Group, Sensor, production aggregates)
//! - Membership reconciliation and time-series grid construction
//! - Threshold and variance evaluators used by dashboard cards

pub mod models;
pub mod services;
