//! Flat field set produced by one flush.
//!
//! A `Snapshot` is rebuilt from scratch on every flush: it starts from the
//! caller's default fields and metric fields are layered on top with
//! last-write-wins semantics. The encoded form is a single JSON object.
//!
//! JSON has no NaN or infinity, so a snapshot holding a non-finite float
//! fails to encode instead of emitting `null`.

use std::collections::HashMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StashError};

/// Scalar value carried by a snapshot field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Str(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Str(v)
    }
}

/// Key/value mapping used for default fields.
pub type Fields = HashMap<String, FieldValue>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    fields: Fields,
}

impl Snapshot {
    /// Empty snapshot seeded with `defaults`. Empty default keys are dropped.
    pub fn new(defaults: &Fields) -> Self {
        let mut snap = Self {
            fields: HashMap::with_capacity(defaults.len()),
        };
        for (k, v) in defaults {
            if let Err(e) = snap.set(k.clone(), v.clone()) {
                tracing::debug!(error = %e, "default field skipped");
            }
        }
        snap
    }

    /// Insert or overwrite a field.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Result<()> {
        let key = key.into();
        if key.is_empty() {
            return Err(StashError::InvalidKey);
        }
        self.fields.insert(key, value.into());
        Ok(())
    }

    /// Write a gauge reading under `<name>.gauge`.
    pub fn set_gauge(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<()> {
        if name.is_empty() {
            return Err(StashError::InvalidKey);
        }
        self.set(format!("{name}.gauge"), value)
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Encode as one JSON object, ready to be sent as a single datagram.
    pub fn serialize(&self) -> Result<Bytes> {
        if let Some(key) = self.fields.iter().find_map(|(k, v)| match v {
            FieldValue::Float(f) if !f.is_finite() => Some(k),
            _ => None,
        }) {
            return Err(StashError::Serialize(format!("field {key} is not a finite number")));
        }
        serde_json::to_vec(&self.fields)
            .map(Bytes::from)
            .map_err(|e| StashError::Serialize(e.to_string()))
    }
}
