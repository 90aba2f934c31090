//! Opaque datastore handles: entity references, blob keys and query cursors
//!
//! All three travel over the wire as plain strings. References carry a kind
//! tag and an id per path element and serialize to url-safe base64, so they
//! can be embedded in URLs and JSON without escaping.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::core::codec::CodecError;

const SEPARATOR: char = '\0';

/// The id part of a reference path element
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReferenceId {
    /// Numeric id allocated by the datastore
    Integer(i64),
    /// Application-chosen string id
    Name(String),
}

impl ReferenceId {
    /// JSON form used for the `identity_raw_id` key
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ReferenceId::Integer(id) => serde_json::Value::from(*id),
            ReferenceId::Name(name) => serde_json::Value::from(name.as_str()),
        }
    }
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceId::Integer(id) => write!(f, "{}", id),
            ReferenceId::Name(name) => write!(f, "{}", name),
        }
    }
}

impl From<i64> for ReferenceId {
    fn from(id: i64) -> Self {
        ReferenceId::Integer(id)
    }
}

impl From<&str> for ReferenceId {
    fn from(name: &str) -> Self {
        ReferenceId::Name(name.to_string())
    }
}

impl From<String> for ReferenceId {
    fn from(name: String) -> Self {
        ReferenceId::Name(name)
    }
}

/// A reference to a stored entity: a non-empty path of `(kind, id)` pairs,
/// ancestors first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    path: Vec<(String, ReferenceId)>,
}

impl Reference {
    /// Create a root-level reference.
    ///
    /// Kinds and name ids must be non-empty and free of NUL, so every
    /// reference built here survives a trip through its url-safe form.
    pub fn new(
        kind: impl Into<String>,
        id: impl Into<ReferenceId>,
    ) -> Result<Self, CodecError> {
        let kind = kind.into();
        let id = id.into();
        validate_element(&kind, &id)?;
        Ok(Self {
            path: vec![(kind, id)],
        })
    }

    /// Create a reference nested under `self`
    pub fn child(
        &self,
        kind: impl Into<String>,
        id: impl Into<ReferenceId>,
    ) -> Result<Self, CodecError> {
        let kind = kind.into();
        let id = id.into();
        validate_element(&kind, &id)?;
        let mut path = self.path.clone();
        path.push((kind, id));
        Ok(Self { path })
    }

    /// Kind of the referenced entity (last path element)
    pub fn kind(&self) -> &str {
        &self.last().0
    }

    /// Id of the referenced entity (last path element)
    pub fn id(&self) -> &ReferenceId {
        &self.last().1
    }

    /// Parent reference, if this one is nested
    pub fn parent(&self) -> Option<Reference> {
        if self.path.len() < 2 {
            return None;
        }
        Some(Self {
            path: self.path[..self.path.len() - 1].to_vec(),
        })
    }

    /// Full `(kind, id)` path, ancestors first
    pub fn pairs(&self) -> &[(String, ReferenceId)] {
        &self.path
    }

    /// Url-safe string form
    pub fn urlsafe(&self) -> String {
        let mut raw = String::new();
        for (index, (kind, id)) in self.path.iter().enumerate() {
            if index > 0 {
                raw.push(SEPARATOR);
            }
            raw.push_str(kind);
            raw.push(SEPARATOR);
            match id {
                ReferenceId::Integer(value) => {
                    raw.push('i');
                    raw.push_str(&value.to_string());
                }
                ReferenceId::Name(name) => {
                    raw.push('s');
                    raw.push_str(name);
                }
            }
        }
        URL_SAFE_NO_PAD.encode(raw.as_bytes())
    }

    /// Parse the url-safe string form produced by [`Reference::urlsafe`]
    pub fn from_urlsafe(value: &str) -> Result<Self, CodecError> {
        let invalid = |reason: &str| CodecError::InvalidReference {
            value: value.to_string(),
            reason: reason.to_string(),
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(value.trim_end_matches('='))
            .map_err(|_| invalid("not url-safe base64"))?;
        let raw = String::from_utf8(bytes).map_err(|_| invalid("not valid UTF-8"))?;

        let parts: Vec<&str> = raw.split(SEPARATOR).collect();
        if parts.len() < 2 || parts.len() % 2 != 0 {
            return Err(invalid("incomplete kind/id path"));
        }

        let mut path = Vec::with_capacity(parts.len() / 2);
        for pair in parts.chunks(2) {
            let kind = pair[0];
            let id = match pair[1].split_at_checked(1) {
                Some(("i", digits)) => ReferenceId::Integer(
                    digits
                        .parse()
                        .map_err(|_| invalid("numeric id is not an integer"))?,
                ),
                Some(("s", name)) => ReferenceId::Name(name.to_string()),
                _ => return Err(invalid("unknown id tag")),
            };
            validate_element(kind, &id).map_err(|_| invalid("empty kind or id"))?;
            path.push((kind.to_string(), id));
        }

        Ok(Self { path })
    }

    fn last(&self) -> &(String, ReferenceId) {
        // path is never empty: every constructor pushes at least one element
        &self.path[self.path.len() - 1]
    }
}

fn validate_element(kind: &str, id: &ReferenceId) -> Result<(), CodecError> {
    let reject = |reason: &str| CodecError::InvalidReference {
        value: format!("{}:{}", kind, id),
        reason: reason.to_string(),
    };
    if kind.is_empty() || kind.contains(SEPARATOR) {
        return Err(reject("kind must be non-empty and free of NUL"));
    }
    match id {
        ReferenceId::Name(name) if name.is_empty() || name.contains(SEPARATOR) => {
            Err(reject("name id must be non-empty and free of NUL"))
        }
        _ => Ok(()),
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .path
            .iter()
            .map(|(kind, id)| format!("{}({})", kind, id))
            .collect();
        write!(f, "Reference({})", rendered.join(", "))
    }
}

impl Serialize for Reference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.urlsafe())
    }
}

impl<'de> Deserialize<'de> for Reference {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Reference::from_urlsafe(&value).map_err(serde::de::Error::custom)
    }
}

/// Handle to binary content held by the blob store
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobKey(String);

impl BlobKey {
    /// Wrap a raw blob identifier; only the empty string is rejected
    pub fn new(value: impl Into<String>) -> Result<Self, CodecError> {
        let value = value.into();
        if value.is_empty() {
            return Err(CodecError::EmptyBlobKey);
        }
        Ok(Self(value))
    }

    /// Allocate a fresh random key
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for BlobKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for BlobKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        BlobKey::new(value).map_err(serde::de::Error::custom)
    }
}

/// Opaque query position returned by the datastore for paging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor(Vec<u8>);

impl Cursor {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Url-safe string form
    pub fn urlsafe(&self) -> String {
        URL_SAFE_NO_PAD.encode(&self.0)
    }

    pub fn from_urlsafe(value: &str) -> Result<Self, CodecError> {
        URL_SAFE_NO_PAD
            .decode(value.trim_end_matches('='))
            .map(Self)
            .map_err(|_| CodecError::InvalidCursor {
                value: value.to_string(),
            })
    }
}

impl Serialize for Cursor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.urlsafe())
    }
}

impl<'de> Deserialize<'de> for Cursor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Cursor::from_urlsafe(&value).map_err(serde::de::Error::custom)
    }
}

/// Parse an optional reference from user input
///
/// Empty input yields `None`; anything else must be a valid url-safe reference.
pub fn parse_optional_reference(value: Option<&str>) -> Result<Option<Reference>, CodecError> {
    match value {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => Reference::from_urlsafe(s).map(Some),
    }
}
