#![forbid(unsafe_code)]

//! Ordered parameter snapshots.
//!
//! A snapshot is what a producer hands over: every tensor of the network at
//! one point in time, keyed by name. Key order is significant (it defines
//! layer order), so (de)serialisation walks the map in document order instead
//! of going through a hash map.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A 1-D bias vector or a 2-D weight matrix (rows of columns).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tensor {
    Matrix(Vec<Vec<f64>>),
    Vector(Vec<f64>),
}

impl Tensor {
    /// Number of dimensions: 2 for a matrix, 1 for a vector.
    pub fn rank(&self) -> usize {
        match self {
            Self::Matrix(_) => 2,
            Self::Vector(_) => 1,
        }
    }

    /// Row count for a matrix, length for a vector.
    pub fn len(&self) -> usize {
        match self {
            Self::Matrix(rows) => rows.len(),
            Self::Vector(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<f64>> for Tensor {
    fn from(values: Vec<f64>) -> Self {
        Self::Vector(values)
    }
}

impl From<Vec<Vec<f64>>> for Tensor {
    fn from(rows: Vec<Vec<f64>>) -> Self {
        Self::Matrix(rows)
    }
}

/// An immutable, ordered `name -> tensor` mapping.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterSnapshot {
    entries: Vec<(String, Tensor)>,
}

impl ParameterSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style append.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, tensor: impl Into<Tensor>) -> Self {
        self.push(name, tensor);
        self
    }

    /// Append an entry. A repeated name replaces the earlier tensor in place.
    pub fn push(&mut self, name: impl Into<String>, tensor: impl Into<Tensor>) {
        let name = name.into();
        let tensor = tensor.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = tensor,
            None => self.entries.push((name, tensor)),
        }
    }

    pub fn entries(&self) -> &[(String, Tensor)] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&Tensor> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl FromIterator<(String, Tensor)> for ParameterSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, Tensor)>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        for (name, tensor) in iter {
            snapshot.push(name, tensor);
        }
        snapshot
    }
}

impl Serialize for ParameterSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, tensor) in &self.entries {
            map.serialize_entry(name, tensor)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ParameterSnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = ParameterSnapshot;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of tensor names to numeric arrays")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut snapshot = ParameterSnapshot::new();
                while let Some((name, tensor)) = access.next_entry::<String, Tensor>()? {
                    snapshot.push(name, tensor);
                }
                Ok(snapshot)
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}
