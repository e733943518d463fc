use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Unsigned or signed rational as stored in an image tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rational {
    pub num: i64,
    pub denom: i64,
}

impl Rational {
    pub fn new(num: i64, denom: i64) -> Self {
        Self { num, denom }
    }

    /// `None` when the denominator is zero.
    pub fn to_f64(&self) -> Option<f64> {
        if self.denom == 0 {
            None
        } else {
            Some(self.num as f64 / self.denom as f64)
        }
    }
}

/// Decoded value of a single metadata tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Text(String),
    Integers(Vec<i64>),
    Rationals(Vec<Rational>),
    Floats(Vec<f64>),
}

impl TagValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TagValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Shape of a parsed metadata entry.
///
/// Consumers must branch on the variant before reading nested values: a tag
/// that normally holds a group (such as `GPSInfo`) can arrive as a bare scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataField {
    Missing,
    Scalar(TagValue),
    Group(BTreeMap<String, TagValue>),
}

impl MetadataField {
    pub fn is_missing(&self) -> bool {
        matches!(self, MetadataField::Missing)
    }
}

/// Parsed metadata keyed by tag name.
pub type MetadataMap = BTreeMap<String, MetadataField>;
