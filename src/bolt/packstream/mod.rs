//! PackStream serialization format.
//!
//! PackStream is the self-describing binary encoding used by the Bolt
//! protocol. Every value is a marker byte followed by an optional payload;
//! collections nest recursively.
//!
//! # Supported Types
//!
//! - **Null**: single byte marker
//! - **Boolean**: true/false markers
//! - **Integer**: 64-bit signed, encoded at the narrowest of five widths
//! - **Float**: 64-bit IEEE 754, big-endian
//! - **String**: UTF-8, length-prefixed
//! - **List**: ordered values
//! - **Map**: string keys to values
//! - **Structure**: one signature byte plus an ordered field list, used both
//!   for protocol messages and for graph entities on the wire
//!
//! The outbound-only [`PackStreamValue::Raw`] variant splices pre-encoded
//! bytes into a message verbatim; it has no inbound counterpart.

pub mod decoder;
pub mod encoder;
pub mod marker;
pub mod types;

pub use decoder::{decode, PackStreamDecoder};
pub use encoder::{encode, PackStreamEncoder};
pub use types::{PackStreamStructure, PackStreamValue};

use std::fmt;

/// PackStream codec errors.
///
/// Decode-side variants carry the byte position at which decoding failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackStreamError {
    /// Input ended inside a value
    UnexpectedEof {
        /// Byte offset at which more input was needed
        position: usize,
    },
    /// Marker byte does not introduce any known value type
    UnknownMarker {
        /// The offending marker
        marker: u8,
        /// Byte offset of the marker
        position: usize,
    },
    /// String payload is not valid UTF-8
    InvalidUtf8 {
        /// Byte offset of the string payload
        position: usize,
    },
    /// Map key is not a string
    InvalidMapKey {
        /// Byte offset of the key
        position: usize,
    },
    /// Input continues after a complete top-level value
    TrailingBytes {
        /// Byte offset of the first unconsumed byte
        position: usize,
    },
    /// Value too large to encode
    ValueTooLarge(&'static str, usize),
}

impl fmt::Display for PackStreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackStreamError::UnexpectedEof { position } => {
                write!(f, "unexpected end of PackStream data at byte {}", position)
            }
            PackStreamError::UnknownMarker { marker, position } => {
                write!(f, "unknown marker 0x{:02X} at byte {}", marker, position)
            }
            PackStreamError::InvalidUtf8 { position } => {
                write!(f, "invalid UTF-8 in string at byte {}", position)
            }
            PackStreamError::InvalidMapKey { position } => {
                write!(f, "map key at byte {} is not a string", position)
            }
            PackStreamError::TrailingBytes { position } => {
                write!(f, "trailing bytes after value at byte {}", position)
            }
            PackStreamError::ValueTooLarge(what, len) => {
                write!(f, "{} too large to encode: {} entries", what, len)
            }
        }
    }
}

impl std::error::Error for PackStreamError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_roundtrip_null() {
        let value = PackStreamValue::Null;
        let bytes = encode(&value).unwrap();
        assert_eq!(decode(&bytes).unwrap(), value);
    }

    #[test]
    fn test_roundtrip_bool() {
        for v in [true, false] {
            let value = PackStreamValue::Boolean(v);
            let bytes = encode(&value).unwrap();
            assert_eq!(decode(&bytes).unwrap(), value);
        }
    }

    #[test]
    fn test_roundtrip_int() {
        for v in [
            0i64,
            1,
            -1,
            127,
            -16,
            -17,
            128,
            -128,
            200,
            1000,
            -1000,
            32767,
            32768,
            2147483647,
            2147483648,
            i64::MAX,
            i64::MIN,
        ] {
            let value = PackStreamValue::Integer(v);
            let bytes = encode(&value).unwrap();
            assert_eq!(decode(&bytes).unwrap(), value, "failed for {}", v);
        }
    }

    #[test]
    fn test_roundtrip_float() {
        for v in [0.0f64, 1.0, -1.0, 3.14159, f64::MAX, f64::MIN] {
            let value = PackStreamValue::Float(v);
            let bytes = encode(&value).unwrap();
            assert_eq!(decode(&bytes).unwrap(), value);
        }
    }

    #[test]
    fn test_roundtrip_string() {
        for s in ["", "a", "hello", &"x".repeat(16), &"y".repeat(300), &"z".repeat(70000)] {
            let value = PackStreamValue::String(s.to_string());
            let bytes = encode(&value).unwrap();
            assert_eq!(decode(&bytes).unwrap(), value);
        }
    }

    #[test]
    fn test_roundtrip_list() {
        let value = PackStreamValue::List(vec![
            PackStreamValue::Integer(1),
            PackStreamValue::String("two".into()),
            PackStreamValue::Boolean(true),
            PackStreamValue::Null,
        ]);
        let bytes = encode(&value).unwrap();
        assert_eq!(decode(&bytes).unwrap(), value);
    }

    #[test]
    fn test_roundtrip_long_list() {
        let value = PackStreamValue::List(
            (0..300).map(PackStreamValue::Integer).collect(),
        );
        let bytes = encode(&value).unwrap();
        assert_eq!(decode(&bytes).unwrap(), value);
    }

    #[test]
    fn test_roundtrip_map() {
        let mut map = HashMap::new();
        map.insert("a".to_string(), PackStreamValue::Integer(1));
        map.insert("b".to_string(), PackStreamValue::String("hello".into()));
        map.insert("c".to_string(), PackStreamValue::Boolean(false));

        let value = PackStreamValue::Map(map);
        let bytes = encode(&value).unwrap();
        assert_eq!(decode(&bytes).unwrap(), value);
    }

    #[test]
    fn test_roundtrip_structure() {
        let s = PackStreamStructure::new(
            marker::NODE_SIG,
            vec![
                PackStreamValue::Integer(1),
                PackStreamValue::List(vec![PackStreamValue::String("Person".into())]),
                PackStreamValue::Map(HashMap::new()),
            ],
        );
        let value = PackStreamValue::Structure(s);
        let bytes = encode(&value).unwrap();
        assert_eq!(decode(&bytes).unwrap(), value);
    }

    #[test]
    fn test_roundtrip_deeply_nested() {
        let mut inner = HashMap::new();
        inner.insert(
            "items".to_string(),
            PackStreamValue::List(vec![
                PackStreamValue::Integer(1),
                PackStreamValue::Integer(2),
            ]),
        );
        let value = PackStreamValue::List(vec![
            PackStreamValue::Map(inner.clone()),
            PackStreamValue::Map(inner),
        ]);
        let bytes = encode(&value).unwrap();
        assert_eq!(decode(&bytes).unwrap(), value);
    }

    #[test]
    fn test_error_display_carries_position() {
        let err = decode(&[0xC0, 0xC0]).unwrap_err();
        assert_eq!(err.to_string(), "trailing bytes after value at byte 1");
    }
}
