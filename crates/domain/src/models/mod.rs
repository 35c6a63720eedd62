//! Domain models for the Farm Manager client.

pub mod animal;
pub mod appointment;
pub mod group;
pub mod inventory;
pub mod membership;
pub mod production;
pub mod sensor;

pub use animal::{Animal, AnimalFilter, AnimalId, Gender};
pub use appointment::Appointment;
pub use group::{derive_groups, Group, GroupId, GroupRecord};
pub use inventory::InventoryItem;
pub use membership::{GroupSnapshot, MembershipEdit, MembershipOperation};
pub use production::{
    DailyGroupTotal, DailyTotal, GroupVolume, ProductionCard, ProductionPeriod, TimeSeriesSample,
    TOTAL_SERIES_KEY,
};
pub use sensor::{Sensor, SensorReading};
