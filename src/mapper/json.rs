//! JSON rendering of API values
//!
//! Handlers hand the encoder an [`ApiValue`] tree (query results, cursors,
//! entities, plain JSON...) and get JSON back. Every entity met during one
//! pass is encoded with the encoder's own includes/excludes.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};

use crate::core::codec;
use crate::core::entity::{Encodable, Entity};
use crate::core::error::{ApiResult, MappingError};
use crate::core::field::FieldValue;
use crate::core::reference::{BlobKey, Cursor, Reference};
use crate::mapper::encode::{encode_entity, encode_value};
use crate::mapper::{Diagnostic, EncodeOptions, Encoded};

/// The closed set of values the encoder knows how to render
pub enum ApiValue<'a> {
    /// Lazy query results, materialized before encoding
    Query(Box<dyn Iterator<Item = ApiValue<'a>> + 'a>),
    Sequence(Vec<ApiValue<'a>>),
    Object(Vec<(String, ApiValue<'a>)>),
    Cursor(Cursor),
    Reference(Reference),
    Blob(BlobKey),
    Entity(&'a dyn Encodable),
    Timestamp(DateTime<Utc>),
    Date(NaiveDate),
    Field(FieldValue),
    Json(Value),
    /// A value with no JSON form, named by its type
    Opaque(&'static str),
}

impl<'a> ApiValue<'a> {
    pub fn entity<E: Encodable>(value: &'a E) -> Self {
        ApiValue::Entity(value)
    }

    /// Lazy sequence of entities, e.g. a query iterator
    pub fn query<I, E>(items: I) -> Self
    where
        I: IntoIterator<Item = &'a E>,
        I::IntoIter: 'a,
        E: Encodable + 'a,
    {
        ApiValue::Query(Box::new(
            items.into_iter().map(|item| ApiValue::Entity(item)),
        ))
    }

    pub fn object<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, ApiValue<'a>)>,
        K: Into<String>,
    {
        ApiValue::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<Value> for ApiValue<'_> {
    fn from(value: Value) -> Self {
        ApiValue::Json(value)
    }
}

impl From<FieldValue> for ApiValue<'_> {
    fn from(value: FieldValue) -> Self {
        ApiValue::Field(value)
    }
}

impl From<Reference> for ApiValue<'_> {
    fn from(value: Reference) -> Self {
        ApiValue::Reference(value)
    }
}

impl From<BlobKey> for ApiValue<'_> {
    fn from(value: BlobKey) -> Self {
        ApiValue::Blob(value)
    }
}

impl From<Cursor> for ApiValue<'_> {
    fn from(value: Cursor) -> Self {
        ApiValue::Cursor(value)
    }
}

impl From<DateTime<Utc>> for ApiValue<'_> {
    fn from(value: DateTime<Utc>) -> Self {
        ApiValue::Timestamp(value)
    }
}

impl From<NaiveDate> for ApiValue<'_> {
    fn from(value: NaiveDate) -> Self {
        ApiValue::Date(value)
    }
}

impl<'a> From<&'a Entity> for ApiValue<'a> {
    fn from(value: &'a Entity) -> Self {
        ApiValue::Entity(value)
    }
}

/// Serialization front-end configured once per pass
#[derive(Debug, Clone, Default)]
pub struct JsonEncoder {
    options: EncodeOptions,
    pretty: bool,
}

impl JsonEncoder {
    pub fn new(options: EncodeOptions) -> Self {
        Self {
            options,
            pretty: false,
        }
    }

    /// Indent the rendered text
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    /// Convert to a JSON tree, collecting diagnostics of every nested entity
    pub fn to_value(&self, value: ApiValue<'_>) -> ApiResult<Encoded<Value>> {
        let mut diagnostics = Vec::new();
        let rendered = self.render(value, &mut diagnostics)?;
        Ok(Encoded {
            value: rendered,
            diagnostics,
        })
    }

    /// Convert to JSON text
    pub fn to_string(&self, value: ApiValue<'_>) -> ApiResult<String> {
        let rendered = self.to_value(value)?.value;
        let text = if self.pretty {
            serde_json::to_string_pretty(&rendered)?
        } else {
            serde_json::to_string(&rendered)?
        };
        Ok(text)
    }

    /// Render as a `200 OK` JSON response
    pub fn into_response(&self, value: ApiValue<'_>) -> ApiResult<Response> {
        let rendered = self.to_value(value)?.value;
        Ok((StatusCode::OK, Json(rendered)).into_response())
    }

    fn render(&self, value: ApiValue<'_>, diagnostics: &mut Vec<Diagnostic>) -> ApiResult<Value> {
        let rendered = match value {
            ApiValue::Query(items) => {
                let materialized: Vec<ApiValue<'_>> = items.collect();
                self.render_all(materialized, diagnostics)?
            }
            ApiValue::Sequence(items) => self.render_all(items, diagnostics)?,
            ApiValue::Object(entries) => {
                let mut object = Map::with_capacity(entries.len());
                for (key, entry) in entries {
                    object.insert(key, self.render(entry, diagnostics)?);
                }
                Value::Object(object)
            }
            ApiValue::Cursor(cursor) => Value::String(cursor.urlsafe()),
            ApiValue::Reference(reference) => {
                Value::String(codec::reference_to_string(&reference))
            }
            ApiValue::Blob(key) => Value::String(codec::blob_key_to_string(&key)),
            ApiValue::Entity(encodable) => {
                let entity = encodable.as_entity();
                Value::Object(encode_entity(&entity, &self.options, diagnostics)?)
            }
            ApiValue::Timestamp(timestamp) => {
                Value::from(codec::timestamp_to_epoch_millis(&timestamp))
            }
            ApiValue::Date(date) => Value::from(codec::date_to_epoch_millis(&date)),
            ApiValue::Field(field) => encode_value(&field, &self.options, diagnostics)?,
            ApiValue::Json(json) => json,
            ApiValue::Opaque(type_name) => {
                return Err(MappingError::Unserializable {
                    type_name: type_name.to_string(),
                }
                .into());
            }
        };
        Ok(rendered)
    }

    fn render_all(
        &self,
        items: Vec<ApiValue<'_>>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> ApiResult<Value> {
        items
            .into_iter()
            .map(|item| self.render(item, diagnostics))
            .collect::<ApiResult<Vec<_>>>()
            .map(Value::Array)
    }
}

/// One-shot JSON text for `value` with the given allow/deny lists
pub fn dumps(value: ApiValue<'_>, includes: &[&str], excludes: &[&str]) -> ApiResult<String> {
    let options = EncodeOptions::new()
        .include(includes.iter().copied())
        .exclude(excludes.iter().copied());
    JsonEncoder::new(options).to_string(value)
}
