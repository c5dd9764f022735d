//! PackStream value types.

use std::collections::HashMap;

/// A PackStream value as it travels over the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum PackStreamValue {
    /// Null value
    Null,
    /// Boolean value
    Boolean(bool),
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point
    Float(f64),
    /// UTF-8 string
    String(String),
    /// List of values
    List(Vec<PackStreamValue>),
    /// Map of string keys to values
    Map(HashMap<String, PackStreamValue>),
    /// Structure (signature + fields)
    Structure(PackStreamStructure),
    /// Pre-encoded PackStream bytes, written verbatim by the encoder.
    ///
    /// Outbound only: the decoder never produces this variant. It exists so a
    /// caller holding already-encoded data can splice it into an outgoing
    /// message without a second encoding pass.
    Raw(Vec<u8>),
}

/// A PackStream structure: a one-byte signature and an ordered field list.
///
/// Structures serve double duty as the message envelope (RUN, SUCCESS, ...)
/// and as the wire form of graph entities (Node, Relationship, Path).
#[derive(Debug, Clone, PartialEq)]
pub struct PackStreamStructure {
    /// Structure signature byte
    pub signature: u8,
    /// Structure fields
    pub fields: Vec<PackStreamValue>,
}

impl PackStreamStructure {
    /// Create a new structure with the given signature and fields.
    pub fn new(signature: u8, fields: Vec<PackStreamValue>) -> Self {
        Self { signature, fields }
    }

    /// Get the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the structure has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl PackStreamValue {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, PackStreamValue::Null)
    }

    /// Try to get as boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PackStreamValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PackStreamValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            PackStreamValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Try to get as string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PackStreamValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as list reference.
    pub fn as_list(&self) -> Option<&[PackStreamValue]> {
        match self {
            PackStreamValue::List(l) => Some(l),
            _ => None,
        }
    }

    /// Try to get as map reference.
    pub fn as_map(&self) -> Option<&HashMap<String, PackStreamValue>> {
        match self {
            PackStreamValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Try to get as structure reference.
    pub fn as_structure(&self) -> Option<&PackStreamStructure> {
        match self {
            PackStreamValue::Structure(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for PackStreamValue {
    fn from(v: bool) -> Self {
        PackStreamValue::Boolean(v)
    }
}

impl From<i64> for PackStreamValue {
    fn from(v: i64) -> Self {
        PackStreamValue::Integer(v)
    }
}

impl From<f64> for PackStreamValue {
    fn from(v: f64) -> Self {
        PackStreamValue::Float(v)
    }
}

impl From<&str> for PackStreamValue {
    fn from(v: &str) -> Self {
        PackStreamValue::String(v.to_string())
    }
}

impl From<String> for PackStreamValue {
    fn from(v: String) -> Self {
        PackStreamValue::String(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        assert!(PackStreamValue::Null.is_null());
        assert_eq!(PackStreamValue::Boolean(true).as_bool(), Some(true));
        assert_eq!(PackStreamValue::Integer(7).as_int(), Some(7));
        assert_eq!(PackStreamValue::Float(1.5).as_float(), Some(1.5));
        assert_eq!(PackStreamValue::from("x").as_str(), Some("x"));
        assert_eq!(PackStreamValue::Integer(7).as_str(), None);
    }

    #[test]
    fn test_structure_len() {
        let s = PackStreamStructure::new(0x4E, vec![PackStreamValue::Null]);
        assert_eq!(s.len(), 1);
        assert!(!s.is_empty());
        assert!(PackStreamStructure::new(0x70, vec![]).is_empty());
    }

    #[test]
    fn test_from_impls() {
        assert_eq!(PackStreamValue::from(true), PackStreamValue::Boolean(true));
        assert_eq!(PackStreamValue::from(3i64), PackStreamValue::Integer(3));
        assert_eq!(
            PackStreamValue::from("hi".to_string()),
            PackStreamValue::String("hi".into())
        );
    }
}
