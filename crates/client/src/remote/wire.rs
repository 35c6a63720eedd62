//! Decoding of server payloads into domain values.
//!
//! The backend is loose about types: ids sometimes arrive as strings, and
//! measures may be missing or null. Everything is normalized here so the
//! rest of the crate only sees typed values. Missing measures become zero,
//! while a missing id or an unparseable date or gender is a [`DecodeError`].

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};

use domain::models::{
    Animal, AnimalId, Appointment, DailyGroupTotal, DailyTotal, Gender, GroupId, GroupRecord,
    GroupVolume, InventoryItem, Sensor,
};

use crate::error::DecodeError;

type Object = Map<String, Value>;

// ===== Field helpers =====

fn list<'a>(value: &'a Value, entity: &'static str) -> Result<&'a [Value], DecodeError> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| DecodeError::Shape(format!("expected a list of {}", entity)))
}

fn object<'a>(value: &'a Value, entity: &'static str) -> Result<&'a Object, DecodeError> {
    value
        .as_object()
        .ok_or_else(|| DecodeError::Shape(format!("expected a {} object", entity)))
}

fn present<'a>(obj: &'a Object, field: &str) -> Option<&'a Value> {
    obj.get(field).filter(|v| !v.is_null())
}

/// Reads an integer that may be sent as a JSON number or a numeric string.
fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn required_id(obj: &Object, entity: &'static str, field: &'static str) -> Result<i64, DecodeError> {
    let value = present(obj, field).ok_or(DecodeError::MissingField { entity, field })?;
    integer(value).ok_or_else(|| DecodeError::InvalidValue {
        entity,
        field,
        value: value.to_string(),
    })
}

fn optional_id(
    obj: &Object,
    entity: &'static str,
    field: &'static str,
) -> Result<Option<i64>, DecodeError> {
    match present(obj, field) {
        None => Ok(None),
        Some(value) => integer(value)
            .map(Some)
            .ok_or_else(|| DecodeError::InvalidValue {
                entity,
                field,
                value: value.to_string(),
            }),
    }
}

/// A measure that defaults to zero when missing or malformed.
fn measure(obj: &Object, field: &str) -> f64 {
    present(obj, field).and_then(number).unwrap_or(0.0)
}

fn optional_measure(obj: &Object, field: &str) -> Option<f64> {
    present(obj, field).and_then(number)
}

fn text(obj: &Object, field: &str) -> Option<String> {
    match present(obj, field)? {
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn required_date(
    obj: &Object,
    entity: &'static str,
    field: &'static str,
) -> Result<NaiveDate, DecodeError> {
    let raw = present(obj, field)
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingField { entity, field })?;
    shared::dates::parse_iso_date(raw).map_err(|_| DecodeError::InvalidValue {
        entity,
        field,
        value: raw.to_string(),
    })
}

fn optional_date(
    obj: &Object,
    entity: &'static str,
    field: &'static str,
) -> Result<Option<NaiveDate>, DecodeError> {
    match present(obj, field) {
        None => Ok(None),
        Some(_) => required_date(obj, entity, field).map(Some),
    }
}

fn required_timestamp(
    obj: &Object,
    entity: &'static str,
    field: &'static str,
) -> Result<DateTime<Utc>, DecodeError> {
    let raw = present(obj, field)
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingField { entity, field })?;
    shared::dates::parse_timestamp(raw).map_err(|_| DecodeError::InvalidValue {
        entity,
        field,
        value: raw.to_string(),
    })
}

fn optional_timestamp(
    obj: &Object,
    entity: &'static str,
    field: &'static str,
) -> Result<Option<DateTime<Utc>>, DecodeError> {
    match present(obj, field) {
        None => Ok(None),
        Some(_) => required_timestamp(obj, entity, field).map(Some),
    }
}

// ===== Animals & groups =====

pub fn animal(value: &Value) -> Result<Animal, DecodeError> {
    const ENTITY: &str = "sheep";
    let obj = object(value, ENTITY)?;

    let raw_gender = text(obj, "gender").ok_or(DecodeError::MissingField {
        entity: ENTITY,
        field: "gender",
    })?;
    let gender: Gender = raw_gender.parse().map_err(|_| DecodeError::InvalidValue {
        entity: ENTITY,
        field: "gender",
        value: raw_gender.clone(),
    })?;

    Ok(Animal {
        id: AnimalId(required_id(obj, ENTITY, "id")?),
        gender,
        group_id: optional_id(obj, ENTITY, "group_id")?.map(GroupId),
        birth_date: optional_date(obj, ENTITY, "birth_date")?,
        farm_id: optional_id(obj, ENTITY, "farm_id")?,
    })
}

pub fn animals(value: &Value) -> Result<Vec<Animal>, DecodeError> {
    list(value, "sheep")?.iter().map(animal).collect()
}

pub fn group(value: &Value) -> Result<GroupRecord, DecodeError> {
    const ENTITY: &str = "sheep group";
    let obj = object(value, ENTITY)?;
    Ok(GroupRecord {
        id: GroupId(required_id(obj, ENTITY, "id")?),
        name: text(obj, "name").unwrap_or_default(),
        description: text(obj, "description"),
    })
}

pub fn groups(value: &Value) -> Result<Vec<GroupRecord>, DecodeError> {
    list(value, "sheep groups")?.iter().map(group).collect()
}

// ===== Sensors =====

pub fn sensor(value: &Value) -> Result<Sensor, DecodeError> {
    const ENTITY: &str = "sensor";
    let obj = object(value, ENTITY)?;
    Ok(Sensor {
        id: required_id(obj, ENTITY, "id")?,
        name: text(obj, "name").unwrap_or_default(),
        current_value: measure(obj, "current_value"),
        min_value: optional_measure(obj, "min_value"),
        max_value: optional_measure(obj, "max_value"),
        unit: text(obj, "unit"),
        timestamp: optional_timestamp(obj, ENTITY, "timestamp")?,
    })
}

pub fn sensors(value: &Value) -> Result<Vec<Sensor>, DecodeError> {
    list(value, "sensors")?.iter().map(sensor).collect()
}

// ===== Milk production =====

pub fn daily_totals(value: &Value) -> Result<Vec<DailyTotal>, DecodeError> {
    const ENTITY: &str = "daily production";
    list(value, ENTITY)?
        .iter()
        .map(|item| {
            let obj = object(item, ENTITY)?;
            Ok(DailyTotal {
                date: required_date(obj, ENTITY, "date")?,
                total_volume: measure(obj, "total_volume"),
            })
        })
        .collect()
}

pub fn daily_group_totals(value: &Value) -> Result<Vec<DailyGroupTotal>, DecodeError> {
    const ENTITY: &str = "daily group production";
    list(value, ENTITY)?
        .iter()
        .map(|item| {
            let obj = object(item, ENTITY)?;
            let group_id = optional_id(obj, ENTITY, "group_id")?.map(GroupId);
            Ok(DailyGroupTotal {
                date: required_date(obj, ENTITY, "date")?,
                group_id,
                group_name: group_label(obj, group_id),
                total_volume: measure(obj, "total_volume"),
            })
        })
        .collect()
}

pub fn group_volumes(value: &Value) -> Result<Vec<GroupVolume>, DecodeError> {
    const ENTITY: &str = "group production";
    list(value, ENTITY)?
        .iter()
        .map(|item| {
            let obj = object(item, ENTITY)?;
            let group_id = optional_id(obj, ENTITY, "group_id")?.map(GroupId);
            Ok(GroupVolume {
                group_id,
                group_name: group_label(obj, group_id),
                total_volume: measure(obj, "total_volume"),
            })
        })
        .collect()
}

/// Total volume of a period endpoint.
///
/// Daily endpoints answer with a single `{"total_volume": ..}` object,
/// weekly ones with a per-group list whose volumes are summed.
pub fn period_total(value: &Value) -> Result<f64, DecodeError> {
    match value {
        Value::Object(obj) => Ok(measure(obj, "total_volume")),
        Value::Array(_) => Ok(group_volumes(value)?
            .iter()
            .map(|g| g.total_volume)
            .sum()),
        Value::Null => Ok(0.0),
        other => Err(DecodeError::Shape(format!(
            "expected a production total, got {}",
            other
        ))),
    }
}

fn group_label(obj: &Object, group_id: Option<GroupId>) -> String {
    text(obj, "group_name").unwrap_or_else(|| match group_id {
        Some(id) => format!("Group {}", id),
        None => "Ungrouped".to_string(),
    })
}

// ===== Records =====

pub fn appointment(value: &Value) -> Result<Appointment, DecodeError> {
    const ENTITY: &str = "appointment";
    let obj = object(value, ENTITY)?;
    Ok(Appointment {
        id: required_id(obj, ENTITY, "id")?,
        sheep_id: AnimalId(required_id(obj, ENTITY, "sheep_id")?),
        vet_id: required_id(obj, ENTITY, "vet_id")?,
        date: required_timestamp(obj, ENTITY, "date")?,
        reason: text(obj, "motivo"),
        comments: text(obj, "comentarios"),
    })
}

pub fn appointments(value: &Value) -> Result<Vec<Appointment>, DecodeError> {
    list(value, "appointments")?.iter().map(appointment).collect()
}

pub fn inventory_item(value: &Value) -> Result<InventoryItem, DecodeError> {
    const ENTITY: &str = "inventory item";
    let obj = object(value, ENTITY)?;
    Ok(InventoryItem {
        id: required_id(obj, ENTITY, "id")?,
        item_name: text(obj, "item_name").unwrap_or_default(),
        quantity: present(obj, "quantity").and_then(integer).unwrap_or(0),
        unit: text(obj, "unit").unwrap_or_default(),
        consumption_rate: measure(obj, "consumption_rate"),
        category: text(obj, "category").unwrap_or_default(),
        last_updated: optional_timestamp(obj, ENTITY, "last_updated")?,
    })
}

pub fn inventory(value: &Value) -> Result<Vec<InventoryItem>, DecodeError> {
    list(value, "inventory")?.iter().map(inventory_item).collect()
}

/// Extracts the `detail` message FastAPI-style error bodies carry.
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| match value.get("detail")? {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
        .unwrap_or_else(|| body.trim().to_string())
}
