//! Sample payloads for generated modules and test fixtures.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::config::Config;
use crate::error::GenError;
use crate::fields::{ID_FIELD, InputField, OutputField};
use crate::types::FieldType;

/// Sample values keyed by field key, in field order.
pub type SampleData = IndexMap<String, SampleValue>;

#[derive(Debug, Clone, PartialEq)]
pub enum SampleValue {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    /// A value taken verbatim from `sampleFieldValues`.
    Json(Value),
    /// Stands for the time the file is rendered.
    Timestamp,
    Object(SampleData),
}

impl SampleValue {
    /// Converts to JSON, writing `timestamp` wherever the current time is
    /// called for.
    pub fn to_json(&self, timestamp: &str) -> Value {
        match self {
            SampleValue::String(s) => Value::String(s.clone()),
            SampleValue::Integer(i) => Value::from(*i),
            SampleValue::Number(n) => Value::from(*n),
            SampleValue::Boolean(b) => Value::Bool(*b),
            SampleValue::Json(v) => v.clone(),
            SampleValue::Timestamp => Value::String(timestamp.to_string()),
            SampleValue::Object(data) => to_json(data, timestamp),
        }
    }
}

pub fn to_json(data: &SampleData, timestamp: &str) -> Value {
    Value::Object(to_json_map(data, timestamp))
}

pub fn to_json_map(data: &SampleData, timestamp: &str) -> Map<String, Value> {
    data.iter()
        .map(|(k, v)| (k.clone(), v.to_json(timestamp)))
        .collect()
}

pub fn synthesize_inputs(config: &Config, fields: &[InputField]) -> Result<SampleData, GenError> {
    let mut data = SampleData::new();
    for field in fields {
        let value = if !field.children.is_empty() {
            SampleValue::Object(synthesize_inputs(config, &field.children)?)
        } else if let Some(field_type) = field.field_type {
            sample_value(config, &field.key, field_type, &field.choices)?
        } else {
            continue;
        };
        data.insert(field.key.clone(), value);
    }
    Ok(data)
}

pub fn synthesize_outputs(config: &Config, fields: &[OutputField]) -> Result<SampleData, GenError> {
    fields
        .iter()
        .map(|field| {
            let value = sample_value(config, &field.key, field.field_type, &[])?;
            Ok((field.key.clone(), value))
        })
        .collect()
}

/// Picks a value for one field. First match wins: enum choice, exact key,
/// key prefix, key suffix, then a default for the type.
pub fn sample_value(
    config: &Config,
    key: &str,
    field_type: FieldType,
    choices: &[String],
) -> Result<SampleValue, GenError> {
    if let Some(choice) = choices.first() {
        return Ok(SampleValue::String(choice.clone()));
    }

    let samples = &config.sample_field_values;
    let key_lower = key.to_lowercase();
    let configured = samples
        .exact
        .iter()
        .find(|(k, _)| k.to_lowercase() == key_lower)
        .or_else(|| {
            samples
                .starting_with
                .iter()
                .find(|(prefix, _)| key_lower.starts_with(&prefix.to_lowercase()))
        })
        .or_else(|| {
            samples
                .ending_with
                .iter()
                .find(|(suffix, _)| key_lower.ends_with(&suffix.to_lowercase()))
        });
    if let Some((_, value)) = configured {
        return Ok(SampleValue::Json(value.clone()));
    }

    match field_type {
        FieldType::String | FieldType::Text | FieldType::Password | FieldType::Code => {
            let s = if key == ID_FIELD { "1" } else { "Something" };
            Ok(SampleValue::String(s.to_string()))
        }
        FieldType::Number => Ok(SampleValue::Number(1.0)),
        FieldType::Integer => Ok(SampleValue::Integer(1)),
        FieldType::Boolean => Ok(SampleValue::Boolean(true)),
        FieldType::Datetime => Ok(SampleValue::Timestamp),
        FieldType::File | FieldType::Copy => Err(GenError::UnsupportedSampleType {
            key: key.to_string(),
            field_type,
        }),
    }
}
