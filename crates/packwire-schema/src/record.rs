//! Packet values.

use std::collections::BTreeMap;

use packwire_codec::Value;
use serde::{Deserialize, Serialize};

use crate::DiscriminatorValue;

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// Field values for one part of a packet, keyed by field name.
///
/// A record has no order of its own; the schema decides the wire order.
/// Fields the schema doesn't mention are ignored on encode.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field and returns the record, for chaining.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets a field, returning the previous value if there was one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// ---------------------------------------------------------------------------
// Packets
// ---------------------------------------------------------------------------

/// A plain packet: headers and data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Packet {
    pub headers: Record,
    pub data: Record,
}

impl Packet {
    pub fn new(headers: Record, data: Record) -> Self {
        Self { headers, data }
    }
}

/// A packet whose data layout is chosen by `kind`.
///
/// `kind` travels as a header field on the wire but never appears in
/// `headers` after decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscriminatedPacket {
    pub kind: DiscriminatorValue,
    pub headers: Record,
    pub data: Record,
}

impl DiscriminatedPacket {
    pub fn new(kind: impl Into<DiscriminatorValue>, headers: Record, data: Record) -> Self {
        Self {
            kind: kind.into(),
            headers,
            data,
        }
    }
}
