use booker_client::{Booking, BookingRecord};
use serde_json::{Map, Value};

use super::AssertionError;

/// Fields every stored booking must echo back unchanged
pub const CORE_FIELDS: [&str; 5] = ["firstname", "lastname", "totalprice", "depositpaid", "bookingdates"];

fn to_object(booking: &Booking) -> Result<Map<String, Value>, AssertionError> {
    match serde_json::to_value(booking) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(AssertionError::Other(format!("booking serialized to {other}"))),
        Err(e) => Err(AssertionError::Other(format!("booking not serializable: {e}"))),
    }
}

fn record_object(record: &BookingRecord) -> Result<&Map<String, Value>, AssertionError> {
    record
        .body()
        .as_object()
        .ok_or_else(|| AssertionError::Other(format!("record is not an object: {}", record.body())))
}

fn mismatch(field: &str, expected: Option<&Value>, actual: Option<&Value>) -> AssertionError {
    let render = |value: Option<&Value>| value.map_or_else(|| "<absent>".to_string(), Value::to_string);
    AssertionError::FieldMismatch {
        field: field.to_string(),
        expected: render(expected),
        actual: render(actual),
    }
}

/// Asserts that the record echoes the core fields of the submitted booking.
pub fn assert_core_fields_match(expected: &Booking, actual: &BookingRecord) -> Result<(), AssertionError> {
    let expected = to_object(expected)?;
    let actual = record_object(actual)?;

    for field in CORE_FIELDS {
        if expected.get(field) != actual.get(field) {
            return Err(mismatch(field, expected.get(field), actual.get(field)));
        }
    }
    Ok(())
}

/// Asserts that `after` carries the patched values and that every field
/// absent from `patch` kept its value from `before`.
pub fn assert_partial_update(before: &Booking, patch: &Value, after: &BookingRecord) -> Result<(), AssertionError> {
    let patch = patch
        .as_object()
        .ok_or_else(|| AssertionError::Other(format!("patch is not an object: {patch}")))?;
    let before = to_object(before)?;
    let after = record_object(after)?;

    for (field, value) in patch {
        if after.get(field) != Some(value) {
            return Err(mismatch(field, Some(value), after.get(field)));
        }
    }

    for (field, value) in &before {
        if !patch.contains_key(field) && after.get(field) != Some(value) {
            return Err(mismatch(field, Some(value), after.get(field)));
        }
    }
    Ok(())
}
