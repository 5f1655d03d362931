//! Soil and weather readings submitted with a recommendation request.

use serde_json::{Map, Value};

/// Key every soil mapping must carry.
pub const PH_KEY: &str = "ph";

/// Key every weather mapping must carry.
pub const TEMPERATURE_KEY: &str = "temperature";

/// Soil readings; `ph` is guaranteed present, other keys are opaque.
#[derive(Debug, Clone, PartialEq)]
pub struct SoilData {
    fields: Map<String, Value>,
}

/// Weather readings; `temperature` is guaranteed present.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherData {
    fields: Map<String, Value>,
}

impl SoilData {
    /// Accepts a JSON object carrying `ph`.
    pub fn from_value(value: &Value) -> Option<Self> {
        required_mapping(value, PH_KEY).map(|fields| Self { fields })
    }

    /// The pH reading.
    pub fn ph(&self) -> &Value {
        &self.fields[PH_KEY]
    }

    /// Compact JSON rendering of every reading, in submission order.
    pub fn to_json(&self) -> String {
        Value::Object(self.fields.clone()).to_string()
    }
}

impl WeatherData {
    /// Accepts a JSON object carrying `temperature`.
    pub fn from_value(value: &Value) -> Option<Self> {
        required_mapping(value, TEMPERATURE_KEY).map(|fields| Self { fields })
    }

    /// The temperature reading, in °C.
    pub fn temperature(&self) -> &Value {
        &self.fields[TEMPERATURE_KEY]
    }

    /// Compact JSON rendering of every reading, in submission order.
    pub fn to_json(&self) -> String {
        Value::Object(self.fields.clone()).to_string()
    }
}

fn required_mapping(value: &Value, key: &str) -> Option<Map<String, Value>> {
    value
        .as_object()
        .filter(|fields| fields.contains_key(key))
        .cloned()
}

/// Falsy JSON: null, false, zero, and empty strings, arrays or objects.
///
/// Such values count as "not provided" for request bodies and sub-objects.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}
