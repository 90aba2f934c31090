//! JSON object -> entity

use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::core::codec;
use crate::core::entity::{Entity, Model};
use crate::core::error::{ApiResult, MappingError};
use crate::core::field::FieldValue;
use crate::core::schema::{FieldDescriptor, Schema, ValueKind};
use crate::mapper::{Decoded, Diagnostic, Operation};

/// A JSON payload may carry a single object or a list of them
#[derive(Debug, Clone, PartialEq)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

/// Build a new, unsaved entity of `schema`'s kind from a JSON object.
///
/// Undeclared keys are skipped and reported; a single bad value aborts the
/// whole call.
pub fn decode(schema: &Arc<Schema>, mapping: &Map<String, Value>) -> ApiResult<Decoded<Entity>> {
    let mut diagnostics = Vec::new();
    let mut values = IndexMap::with_capacity(mapping.len());

    for (key, value) in mapping {
        let Some(descriptor) = schema.field(key) else {
            diagnostics.push(Diagnostic::unknown_field(
                Operation::Decode,
                schema.kind(),
                key,
            ));
            continue;
        };
        values.insert(key.clone(), decode_field(descriptor, value)?);
    }

    let mut entity = Entity::new(Arc::clone(schema));
    entity.populate(values)?;

    Ok(Decoded {
        value: entity,
        diagnostics,
    })
}

/// Decode every object of a JSON array
pub fn decode_many(schema: &Arc<Schema>, items: &[Value]) -> ApiResult<Decoded<Vec<Entity>>> {
    let mut diagnostics = Vec::new();
    let mut entities = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let Value::Object(mapping) = item else {
            return Err(MappingError::InvalidValue {
                field: format!("[{}]", index),
                expected: "an object".to_string(),
                found: json_type_name(item).to_string(),
            }
            .into());
        };
        let decoded = decode(schema, mapping)?;
        diagnostics.extend(decoded.diagnostics);
        entities.push(decoded.value);
    }

    Ok(Decoded {
        value: entities,
        diagnostics,
    })
}

/// Decode an already parsed payload that is either an object or an array
pub fn decode_value(schema: &Arc<Schema>, value: &Value) -> ApiResult<Decoded<OneOrMany<Entity>>> {
    match value {
        Value::Object(mapping) => {
            let decoded = decode(schema, mapping)?;
            Ok(Decoded {
                value: OneOrMany::One(decoded.value),
                diagnostics: decoded.diagnostics,
            })
        }
        Value::Array(items) => {
            let decoded = decode_many(schema, items)?;
            Ok(Decoded {
                value: OneOrMany::Many(decoded.value),
                diagnostics: decoded.diagnostics,
            })
        }
        other => Err(MappingError::InvalidValue {
            field: "$".to_string(),
            expected: "an object or an array".to_string(),
            found: json_type_name(other).to_string(),
        }
        .into()),
    }
}

/// Parse JSON text and decode it against `schema`
pub fn decode_json(schema: &Arc<Schema>, text: &str) -> ApiResult<Decoded<OneOrMany<Entity>>> {
    let value: Value = serde_json::from_str(text)?;
    decode_value(schema, &value)
}

/// Decode straight into a typed model
pub fn decode_model<M: Model>(mapping: &Map<String, Value>) -> ApiResult<Decoded<M>> {
    let decoded = decode(&M::schema(), mapping)?;
    Ok(Decoded {
        value: M::from_entity(decoded.value)?,
        diagnostics: decoded.diagnostics,
    })
}

fn decode_field(descriptor: &FieldDescriptor, value: &Value) -> ApiResult<FieldValue> {
    if descriptor.value_kind == ValueKind::Generic {
        return Ok(FieldValue::from_json(value.clone()));
    }

    if !descriptor.repeated {
        if value.is_null() {
            return Ok(FieldValue::Null);
        }
        return decode_scalar(descriptor, value);
    }

    match value {
        Value::Null => Ok(FieldValue::List(Vec::new())),
        Value::Array(items) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(|item| decode_scalar(descriptor, item))
            .collect::<ApiResult<Vec<_>>>()
            .map(FieldValue::List),
        other => Err(invalid(descriptor, "an array", other)),
    }
}

fn decode_scalar(descriptor: &FieldDescriptor, value: &Value) -> ApiResult<FieldValue> {
    let field = descriptor.name.as_str();
    let codec_err = |err| MappingError::from_codec(Some(field), err);

    let decoded = match (descriptor.value_kind, value) {
        (ValueKind::Timestamp, Value::Number(n)) => {
            let millis = codec::json_number_to_millis(n)
                .ok_or_else(|| invalid(descriptor, "epoch milliseconds", value))?;
            FieldValue::DateTime(codec::epoch_millis_to_timestamp(millis).map_err(codec_err)?)
        }
        (ValueKind::Date, Value::Number(n)) => {
            let millis = codec::json_number_to_millis(n)
                .ok_or_else(|| invalid(descriptor, "epoch milliseconds", value))?;
            FieldValue::Date(codec::epoch_millis_to_date(millis).map_err(codec_err)?)
        }
        (ValueKind::Reference, Value::String(s)) => FieldValue::Reference(
            codec::string_to_reference(s, descriptor.reference_kind.as_deref())
                .map_err(codec_err)?,
        ),
        (ValueKind::Blob, Value::String(s)) => {
            FieldValue::Blob(codec::string_to_blob_key(s).map_err(codec_err)?)
        }
        (ValueKind::Generic, other) => FieldValue::from_json(other.clone()),
        (ValueKind::Timestamp | ValueKind::Date, other) => {
            return Err(invalid(descriptor, "epoch milliseconds", other));
        }
        (ValueKind::Reference, other) => {
            return Err(invalid(descriptor, "a url-safe reference string", other));
        }
        (ValueKind::Blob, other) => {
            return Err(invalid(descriptor, "a blob key string", other));
        }
    };
    Ok(decoded)
}

fn invalid(descriptor: &FieldDescriptor, expected: &str, found: &Value) -> crate::core::ApiError {
    MappingError::InvalidValue {
        field: descriptor.name.clone(),
        expected: expected.to_string(),
        found: json_type_name(found).to_string(),
    }
    .into()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
