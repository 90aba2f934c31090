//! Entity -> JSON object

use serde_json::{Map, Number, Value};

use crate::core::codec;
use crate::core::entity::{Encodable, Entity};
use crate::core::error::{ApiResult, MappingError};
use crate::core::field::FieldValue;
use crate::core::schema::{IDENTITY_KEY, IDENTITY_RAW_ID_KEY};
use crate::mapper::{Diagnostic, EncodeOptions, Encoded, Operation};

/// Encode an entity (or typed model) into a JSON object.
///
/// Declared fields are always emitted; `identity`/`identity_raw_id` are added
/// for saved entities; `includes` adds accessors and undeclared attributes;
/// `excludes` is applied last.
pub fn encode<E: Encodable + ?Sized>(value: &E, options: &EncodeOptions) -> ApiResult<Encoded> {
    let entity = value.as_entity();
    let mut diagnostics = Vec::new();
    let mapping = encode_entity(&entity, options, &mut diagnostics)?;
    Ok(Encoded {
        value: mapping,
        diagnostics,
    })
}

pub(crate) fn encode_entity(
    entity: &Entity,
    options: &EncodeOptions,
    diagnostics: &mut Vec<Diagnostic>,
) -> ApiResult<Map<String, Value>> {
    let schema = entity.schema();
    let mut mapping = Map::new();

    if let Some(identity) = entity.identity() {
        if !options.is_excluded(IDENTITY_KEY) {
            mapping.insert(
                IDENTITY_KEY.to_string(),
                Value::String(codec::reference_to_string(identity)),
            );
            mapping.insert(IDENTITY_RAW_ID_KEY.to_string(), identity.id().to_json());
        }
    }

    for field in schema.fields() {
        let value = entity.get(&field.name).unwrap_or(&FieldValue::Null);
        mapping.insert(field.name.clone(), encode_value(value, options, diagnostics)?);
    }

    for name in &options.includes {
        if schema.field(name).is_some() {
            continue;
        }
        let resolved = match schema.accessor(name) {
            Some(accessor) => accessor(entity),
            None => match entity.attribute(name) {
                Some(value) => value.clone(),
                None => {
                    diagnostics.push(Diagnostic::unknown_field(
                        Operation::Encode,
                        entity.kind(),
                        name,
                    ));
                    continue;
                }
            },
        };
        mapping.insert(name.clone(), encode_value(&resolved, options, diagnostics)?);
    }

    mapping.retain(|key, _| !options.is_excluded(key));
    Ok(mapping)
}

/// Encode a single field value to its JSON-safe form.
///
/// Nested entities are encoded with the same options.
pub fn encode_value(
    value: &FieldValue,
    options: &EncodeOptions,
    diagnostics: &mut Vec<Diagnostic>,
) -> ApiResult<Value> {
    let encoded = match value {
        FieldValue::Null => Value::Null,
        FieldValue::Boolean(b) => Value::Bool(*b),
        FieldValue::Integer(i) => Value::from(*i),
        FieldValue::Float(f) => Number::from_f64(*f).map(Value::Number).ok_or_else(|| {
            MappingError::Unserializable {
                type_name: format!("non-finite float {}", f),
            }
        })?,
        FieldValue::String(s) => Value::String(s.clone()),
        FieldValue::DateTime(t) => Value::from(codec::timestamp_to_epoch_millis(t)),
        FieldValue::Date(d) => Value::from(codec::date_to_epoch_millis(d)),
        FieldValue::Reference(r) => Value::String(codec::reference_to_string(r)),
        FieldValue::Blob(b) => Value::String(codec::blob_key_to_string(b)),
        FieldValue::Entity(nested) => Value::Object(encode_entity(nested, options, diagnostics)?),
        FieldValue::List(items) => Value::Array(
            items
                .iter()
                .map(|item| encode_value(item, options, diagnostics))
                .collect::<ApiResult<Vec<_>>>()?,
        ),
        FieldValue::Json(json) => json.clone(),
    };
    Ok(encoded)
}
