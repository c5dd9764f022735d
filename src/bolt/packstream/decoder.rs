//! PackStream decoder.
//!
//! The decoder accepts any legal width for a value (a tiny int and an INT_64
//! carrying the same number are both readable) and reports failures with the
//! byte position at which they occurred.

use bytes::Buf;
use std::collections::HashMap;

use super::marker::*;
use super::types::{PackStreamStructure, PackStreamValue};
use super::PackStreamError;

/// PackStream decoder that reads values from a complete message buffer.
pub struct PackStreamDecoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> PackStreamDecoder<'a> {
    /// Create a new decoder for the given bytes.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Get the current position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Get remaining bytes count.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Check if all data has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Decode the next value.
    pub fn decode(&mut self) -> Result<PackStreamValue, PackStreamError> {
        let marker = self.read_u8()?;

        // Tiny variants carry their payload or size in the marker itself
        if is_tiny_int(marker) {
            return Ok(PackStreamValue::Integer(decode_tiny_int(marker) as i64));
        }
        if is_tiny_string(marker) {
            return self.read_string_data(tiny_size(marker));
        }
        if is_tiny_list(marker) {
            return self.read_list_data(tiny_size(marker));
        }
        if is_tiny_map(marker) {
            return self.read_map_data(tiny_size(marker));
        }
        if is_tiny_struct(marker) {
            return self.read_struct_data(tiny_size(marker));
        }

        match marker {
            NULL => Ok(PackStreamValue::Null),
            TRUE => Ok(PackStreamValue::Boolean(true)),
            FALSE => Ok(PackStreamValue::Boolean(false)),

            FLOAT_64 => Ok(PackStreamValue::Float(self.read_f64()?)),

            INT_8 => Ok(PackStreamValue::Integer(self.read_i8()? as i64)),
            INT_16 => Ok(PackStreamValue::Integer(self.read_i16()? as i64)),
            INT_32 => Ok(PackStreamValue::Integer(self.read_i32()? as i64)),
            INT_64 => Ok(PackStreamValue::Integer(self.read_i64()?)),

            STRING_8 => {
                let len = self.read_u8()? as usize;
                self.read_string_data(len)
            }
            STRING_16 => {
                let len = self.read_u16()? as usize;
                self.read_string_data(len)
            }
            STRING_32 => {
                let len = self.read_u32()? as usize;
                self.read_string_data(len)
            }

            LIST_8 => {
                let len = self.read_u8()? as usize;
                self.read_list_data(len)
            }
            LIST_16 => {
                let len = self.read_u16()? as usize;
                self.read_list_data(len)
            }
            LIST_32 => {
                let len = self.read_u32()? as usize;
                self.read_list_data(len)
            }

            MAP_8 => {
                let len = self.read_u8()? as usize;
                self.read_map_data(len)
            }
            MAP_16 => {
                let len = self.read_u16()? as usize;
                self.read_map_data(len)
            }
            MAP_32 => {
                let len = self.read_u32()? as usize;
                self.read_map_data(len)
            }

            STRUCT_8 => {
                let len = self.read_u8()? as usize;
                self.read_struct_data(len)
            }
            STRUCT_16 => {
                let len = self.read_u16()? as usize;
                self.read_struct_data(len)
            }

            _ => Err(PackStreamError::UnknownMarker {
                marker,
                position: self.pos - 1,
            }),
        }
    }

    fn read_string_data(&mut self, len: usize) -> Result<PackStreamValue, PackStreamError> {
        let position = self.pos;
        let bytes = self.read_bytes(len)?;
        let s = std::str::from_utf8(bytes)
            .map_err(|_| PackStreamError::InvalidUtf8 { position })?;
        Ok(PackStreamValue::String(s.to_string()))
    }

    fn read_list_data(&mut self, len: usize) -> Result<PackStreamValue, PackStreamError> {
        let mut items = Vec::with_capacity(len.min(1024));
        for _ in 0..len {
            items.push(self.decode()?);
        }
        Ok(PackStreamValue::List(items))
    }

    fn read_map_data(&mut self, len: usize) -> Result<PackStreamValue, PackStreamError> {
        let mut map = HashMap::with_capacity(len.min(1024));
        for _ in 0..len {
            let position = self.pos;
            let key = match self.decode()? {
                PackStreamValue::String(s) => s,
                _ => return Err(PackStreamError::InvalidMapKey { position }),
            };
            let value = self.decode()?;
            map.insert(key, value);
        }
        Ok(PackStreamValue::Map(map))
    }

    fn read_struct_data(&mut self, field_count: usize) -> Result<PackStreamValue, PackStreamError> {
        let signature = self.read_u8()?;
        let mut fields = Vec::with_capacity(field_count.min(64));
        for _ in 0..field_count {
            fields.push(self.decode()?);
        }
        Ok(PackStreamValue::Structure(PackStreamStructure::new(
            signature, fields,
        )))
    }

    // Low-level reads, all big-endian

    fn read_u8(&mut self) -> Result<u8, PackStreamError> {
        if self.remaining() < 1 {
            return Err(PackStreamError::UnexpectedEof { position: self.pos });
        }
        let value = self.data[self.pos];
        self.pos += 1;
        Ok(value)
    }

    fn read_i8(&mut self) -> Result<i8, PackStreamError> {
        Ok(self.read_u8()? as i8)
    }

    fn read_u16(&mut self) -> Result<u16, PackStreamError> {
        if self.remaining() < 2 {
            return Err(PackStreamError::UnexpectedEof { position: self.pos });
        }
        let value = (&self.data[self.pos..]).get_u16();
        self.pos += 2;
        Ok(value)
    }

    fn read_i16(&mut self) -> Result<i16, PackStreamError> {
        Ok(self.read_u16()? as i16)
    }

    fn read_u32(&mut self) -> Result<u32, PackStreamError> {
        if self.remaining() < 4 {
            return Err(PackStreamError::UnexpectedEof { position: self.pos });
        }
        let value = (&self.data[self.pos..]).get_u32();
        self.pos += 4;
        Ok(value)
    }

    fn read_i32(&mut self) -> Result<i32, PackStreamError> {
        Ok(self.read_u32()? as i32)
    }

    fn read_i64(&mut self) -> Result<i64, PackStreamError> {
        if self.remaining() < 8 {
            return Err(PackStreamError::UnexpectedEof { position: self.pos });
        }
        let value = (&self.data[self.pos..]).get_i64();
        self.pos += 8;
        Ok(value)
    }

    fn read_f64(&mut self) -> Result<f64, PackStreamError> {
        if self.remaining() < 8 {
            return Err(PackStreamError::UnexpectedEof { position: self.pos });
        }
        let value = (&self.data[self.pos..]).get_f64();
        self.pos += 8;
        Ok(value)
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], PackStreamError> {
        if self.remaining() < len {
            return Err(PackStreamError::UnexpectedEof { position: self.pos });
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }
}

/// Decode exactly one value from a complete message buffer.
///
/// Trailing bytes after the value are an error: a logical message carries one
/// value and nothing else.
pub fn decode(data: &[u8]) -> Result<PackStreamValue, PackStreamError> {
    let mut decoder = PackStreamDecoder::new(data);
    let value = decoder.decode()?;
    if !decoder.is_empty() {
        return Err(PackStreamError::TrailingBytes {
            position: decoder.position(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_null() {
        assert!(decode(&[0xC0]).unwrap().is_null());
    }

    #[test]
    fn test_decode_bool() {
        assert_eq!(decode(&[0xC3]).unwrap(), PackStreamValue::Boolean(true));
        assert_eq!(decode(&[0xC2]).unwrap(), PackStreamValue::Boolean(false));
    }

    #[test]
    fn test_decode_tiny_int() {
        assert_eq!(decode(&[0x00]).unwrap(), PackStreamValue::Integer(0));
        assert_eq!(decode(&[0x7F]).unwrap(), PackStreamValue::Integer(127));
        assert_eq!(decode(&[0xF0]).unwrap(), PackStreamValue::Integer(-16));
        assert_eq!(decode(&[0xFF]).unwrap(), PackStreamValue::Integer(-1));
    }

    #[test]
    fn test_decode_int_widths() {
        assert_eq!(decode(&[0xC8, 0xEF]).unwrap(), PackStreamValue::Integer(-17));
        assert_eq!(
            decode(&[0xC9, 0x03, 0xE8]).unwrap(),
            PackStreamValue::Integer(1000)
        );
        assert_eq!(
            decode(&[0xCA, 0x00, 0x01, 0x86, 0xA0]).unwrap(),
            PackStreamValue::Integer(100000)
        );
        assert_eq!(
            decode(&[0xCB, 0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]).unwrap(),
            PackStreamValue::Integer(i64::MAX)
        );
    }

    #[test]
    fn test_decode_accepts_wide_encoding() {
        // 1 fits a tiny int but an INT_32 encoding is still legal input
        assert_eq!(
            decode(&[0xCA, 0x00, 0x00, 0x00, 0x01]).unwrap(),
            PackStreamValue::Integer(1)
        );
    }

    #[test]
    fn test_decode_float() {
        let data = [0xC1, 0x40, 0x09, 0x1E, 0xB8, 0x51, 0xEB, 0x85, 0x1F];
        match decode(&data).unwrap() {
            PackStreamValue::Float(f) => assert!((f - 3.14).abs() < 0.001),
            other => panic!("expected float, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_tiny_string() {
        let data = [0x85, b'h', b'e', b'l', b'l', b'o'];
        assert_eq!(
            decode(&data).unwrap(),
            PackStreamValue::String("hello".to_string())
        );
    }

    #[test]
    fn test_decode_string_8() {
        let mut data = vec![0xD0, 20];
        data.extend_from_slice(&[b'a'; 20]);
        assert_eq!(
            decode(&data).unwrap(),
            PackStreamValue::String("a".repeat(20))
        );
    }

    #[test]
    fn test_decode_tiny_list() {
        let value = decode(&[0x93, 1, 2, 3]).unwrap();
        assert_eq!(
            value,
            PackStreamValue::List(vec![
                PackStreamValue::Integer(1),
                PackStreamValue::Integer(2),
                PackStreamValue::Integer(3),
            ])
        );
    }

    #[test]
    fn test_decode_tiny_map() {
        let data = [0xA1, 0x81, b'a', 1];
        match decode(&data).unwrap() {
            PackStreamValue::Map(m) => {
                assert_eq!(m.len(), 1);
                assert_eq!(m.get("a"), Some(&PackStreamValue::Integer(1)));
            }
            other => panic!("expected map, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_map_key_must_be_string() {
        // Map of one entry whose key is the integer 1
        let err = decode(&[0xA1, 0x01, 0x02]).unwrap_err();
        assert!(matches!(err, PackStreamError::InvalidMapKey { position: 1 }));
    }

    #[test]
    fn test_decode_structure() {
        let data = [0xB1, 0x4E, 1];
        match decode(&data).unwrap() {
            PackStreamValue::Structure(s) => {
                assert_eq!(s.signature, 0x4E);
                assert_eq!(s.fields, vec![PackStreamValue::Integer(1)]);
            }
            other => panic!("expected structure, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_unexpected_eof() {
        let err = decode(&[0xC9]).unwrap_err(); // INT_16 with no payload
        assert!(matches!(err, PackStreamError::UnexpectedEof { position: 1 }));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let err = decode(&[0x82, 0xFF, 0xFE]).unwrap_err();
        assert!(matches!(err, PackStreamError::InvalidUtf8 { .. }));
    }

    #[test]
    fn test_decode_unknown_marker() {
        // Byte-array markers are not part of the value domain
        let err = decode(&[0xCC, 0x01, 0xAA]).unwrap_err();
        assert!(matches!(
            err,
            PackStreamError::UnknownMarker {
                marker: 0xCC,
                position: 0
            }
        ));
    }

    #[test]
    fn test_decode_trailing_bytes() {
        let err = decode(&[0xC0, 0x00]).unwrap_err();
        assert!(matches!(err, PackStreamError::TrailingBytes { position: 1 }));
    }

    #[test]
    fn test_decode_nested() {
        let data = [
            0x91, // list of 1
            0xA1, // map of 1
            0x81, b'x', // key "x"
            0x05, // value 5
        ];
        match decode(&data).unwrap() {
            PackStreamValue::List(l) => match &l[0] {
                PackStreamValue::Map(m) => {
                    assert_eq!(m.get("x"), Some(&PackStreamValue::Integer(5)));
                }
                other => panic!("expected map in list, got {:?}", other),
            },
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_decoder_position() {
        let data = [0x01, 0x02];
        let mut decoder = PackStreamDecoder::new(&data);
        assert_eq!(decoder.position(), 0);
        assert_eq!(decoder.remaining(), 2);

        decoder.decode().unwrap();
        assert_eq!(decoder.position(), 1);
        assert_eq!(decoder.remaining(), 1);
        assert!(!decoder.is_empty());
    }
}
