//! Entity <-> JSON mapping engine
//!
//! - [`encode()`] walks an entity's declared fields and produces a JSON object
//! - [`decode()`] rebuilds an entity of a given schema from a JSON object
//! - [`JsonEncoder`] renders arbitrary API values, deferring entities to [`encode()`]
//!
//! Unknown names never fail a call. They come back as [`Diagnostic`]s next
//! to the result (and are logged), so producers and consumers can drift
//! apart without breaking each other.

pub mod decode;
pub mod encode;
pub mod json;

pub use decode::{OneOrMany, decode, decode_json, decode_many, decode_model, decode_value};
pub use encode::{encode, encode_value};
pub use json::{ApiValue, JsonEncoder, dumps};

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Which side of the mapper produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Encode,
    Decode,
}

/// A name the mapper could not resolve and skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub operation: Operation,
    pub kind: String,
    pub field: String,
}

impl Diagnostic {
    pub(crate) fn unknown_field(operation: Operation, kind: &str, field: &str) -> Self {
        match operation {
            Operation::Encode => {
                tracing::warn!(kind, field, "cannot encode: attribute is not defined")
            }
            Operation::Decode => {
                tracing::warn!(kind, field, "cannot decode: property is not defined")
            }
        }
        Self {
            operation,
            kind: kind.to_string(),
            field: field.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.operation {
            Operation::Encode => "encode",
            Operation::Decode => "decode",
        };
        write!(
            f,
            "cannot {} '{}': not defined on '{}'",
            verb, self.field, self.kind
        )
    }
}

/// Field allow/deny lists applied while encoding
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Extra names to resolve beyond the declared fields
    pub includes: Vec<String>,
    /// Names removed from every encoded object, after everything else
    pub excludes: Vec<String>,
}

impl EncodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.includes.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.excludes.iter().any(|excluded| excluded == name)
    }
}

/// Result of an encode pass plus everything that was skipped on the way
#[derive(Debug, Clone, PartialEq)]
pub struct Encoded<T = Map<String, Value>> {
    pub value: T,
    pub diagnostics: Vec<Diagnostic>,
}

/// Result of a decode pass plus everything that was skipped on the way
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub value: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Decoded<T> {
    pub fn into_inner(self) -> T {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_options_builder() {
        let options = EncodeOptions::new()
            .include(["full_name"])
            .exclude(vec!["secret".to_string()]);
        assert_eq!(options.includes, vec!["full_name"]);
        assert!(options.is_excluded("secret"));
        assert!(!options.is_excluded("name"));
    }

    #[test]
    fn test_diagnostic_display() {
        let diagnostic = Diagnostic::unknown_field(Operation::Decode, "Person", "nickname");
        assert_eq!(
            diagnostic.to_string(),
            "cannot decode 'nickname': not defined on 'Person'"
        );
    }
}
