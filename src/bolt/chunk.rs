//! Chunked message framing.
//!
//! A logical Bolt message is carried as one or more chunks, each prefixed
//! with a 2-byte big-endian length, and terminated by a zero-length chunk.
//! The reader hands the codec a complete message buffer, so value decoding
//! never has to backtrack over a partial read.

use bytes::BytesMut;
use std::io::{Read, Write};

use super::error::BoltResult;

/// Maximum payload of a single chunk.
pub const MAX_CHUNK_SIZE: usize = u16::MAX as usize;

/// End-of-message marker: a zero-length chunk.
pub const MESSAGE_END: [u8; 2] = [0x00, 0x00];

/// Writer half of the framing layer.
///
/// Bytes are buffered up to the chunk cap; a full buffer is emitted as one
/// chunk and buffering continues with the remainder. The writer holds no
/// reference to the stream; each call borrows it from the session.
#[derive(Debug, Default)]
pub struct ChunkWriter {
    buf: BytesMut,
}

impl ChunkWriter {
    /// Create a new chunk writer.
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(MAX_CHUNK_SIZE),
        }
    }

    /// Number of bytes currently buffered.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Append `data` to the chunk buffer, emitting full chunks to `wr` as the
    /// cap is crossed. On success the whole slice is accepted.
    pub fn write<W: Write>(&mut self, wr: &mut W, data: &[u8]) -> BoltResult<usize> {
        let mut written = 0;
        while written < data.len() {
            let room = MAX_CHUNK_SIZE - self.buf.len();
            let take = room.min(data.len() - written);
            self.buf.extend_from_slice(&data[written..written + take]);
            written += take;
            if self.buf.len() == MAX_CHUNK_SIZE {
                self.flush(wr, false)?;
            }
        }
        Ok(written)
    }

    /// Emit any buffered bytes as one chunk. When `end_message` is set, also
    /// emit the zero-length terminator chunk.
    pub fn flush<W: Write>(&mut self, wr: &mut W, end_message: bool) -> BoltResult<()> {
        if !self.buf.is_empty() {
            let header = (self.buf.len() as u16).to_be_bytes();
            wr.write_all(&header)?;
            wr.write_all(&self.buf)?;
            self.buf.clear();
        }
        if end_message {
            wr.write_all(&MESSAGE_END)?;
        }
        wr.flush()?;
        Ok(())
    }
}

/// Reader half of the framing layer.
///
/// Reassembles one logical message per call by concatenating chunk payloads
/// until the zero-length terminator. EOF anywhere inside a message, including
/// at a chunk-length read, is `UnexpectedEof`: the protocol never permits
/// half-messages.
#[derive(Debug, Default)]
pub struct ChunkReader {
    message: BytesMut,
}

impl ChunkReader {
    /// Create a new chunk reader.
    pub fn new() -> Self {
        Self {
            message: BytesMut::with_capacity(4096),
        }
    }

    /// Read one complete logical message from `rd`.
    pub fn read_message<R: Read>(&mut self, rd: &mut R) -> BoltResult<BytesMut> {
        loop {
            let mut header = [0u8; 2];
            rd.read_exact(&mut header)?;
            let size = u16::from_be_bytes(header) as usize;
            if size == 0 {
                return Ok(self.message.split());
            }
            let start = self.message.len();
            self.message.resize(start + size, 0);
            rd.read_exact(&mut self.message[start..])?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bolt::error::BoltError;
    use std::io::Cursor;

    fn write_message(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        let mut writer = ChunkWriter::new();
        writer.write(&mut out, data).unwrap();
        writer.flush(&mut out, true).unwrap();
        out
    }

    #[test]
    fn test_empty_message() {
        // Nothing buffered: only the terminator goes out
        assert_eq!(write_message(&[]), MESSAGE_END);
    }

    #[test]
    fn test_single_chunk() {
        let framed = write_message(b"abc");
        assert_eq!(framed, [0x00, 0x03, b'a', b'b', b'c', 0x00, 0x00]);
    }

    #[test]
    fn test_exactly_max_chunk() {
        let data = vec![0xAB; MAX_CHUNK_SIZE];
        let framed = write_message(&data);
        assert_eq!(framed.len(), 2 + MAX_CHUNK_SIZE + 2);
        assert_eq!(&framed[0..2], &[0xFF, 0xFF]);
        assert_eq!(&framed[2..2 + MAX_CHUNK_SIZE], &data[..]);
        assert_eq!(&framed[2 + MAX_CHUNK_SIZE..], &MESSAGE_END);
    }

    #[test]
    fn test_split_into_two_chunks() {
        let data = vec![0x01; MAX_CHUNK_SIZE + 1];
        let framed = write_message(&data);
        // FF FF <65535 bytes> 00 01 <1 byte> 00 00
        assert_eq!(&framed[0..2], &[0xFF, 0xFF]);
        let second = 2 + MAX_CHUNK_SIZE;
        assert_eq!(&framed[second..second + 2], &[0x00, 0x01]);
        assert_eq!(framed.len(), 2 + MAX_CHUNK_SIZE + 2 + 1 + 2);
    }

    #[test]
    fn test_roundtrip_sizes() {
        for size in [0usize, 1, MAX_CHUNK_SIZE, MAX_CHUNK_SIZE + 1, 200_000] {
            let data: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
            let framed = write_message(&data);

            let mut reader = ChunkReader::new();
            let mut cursor = Cursor::new(framed);
            let message = reader.read_message(&mut cursor).unwrap();
            assert_eq!(&message[..], &data[..], "roundtrip for size {}", size);
        }
    }

    #[test]
    fn test_flush_without_terminator() {
        let mut out = Vec::new();
        let mut writer = ChunkWriter::new();
        writer.write(&mut out, b"xy").unwrap();
        writer.flush(&mut out, false).unwrap();
        assert_eq!(out, [0x00, 0x02, b'x', b'y']);
        assert_eq!(writer.buffered(), 0);
    }

    #[test]
    fn test_read_two_messages_in_sequence() {
        let mut framed = write_message(b"one");
        framed.extend_from_slice(&write_message(b"two"));

        let mut reader = ChunkReader::new();
        let mut cursor = Cursor::new(framed);
        assert_eq!(&reader.read_message(&mut cursor).unwrap()[..], b"one");
        assert_eq!(&reader.read_message(&mut cursor).unwrap()[..], b"two");
    }

    #[test]
    fn test_read_message_spanning_chunks() {
        // Hand-framed: two chunks of 2 and 3 bytes, then the terminator
        let framed = [
            0x00, 0x02, b'h', b'e', //
            0x00, 0x03, b'l', b'l', b'o', //
            0x00, 0x00,
        ];
        let mut reader = ChunkReader::new();
        let mut cursor = Cursor::new(framed.to_vec());
        assert_eq!(&reader.read_message(&mut cursor).unwrap()[..], b"hello");
    }

    #[test]
    fn test_eof_mid_payload() {
        let framed = [0x00, 0x05, b'a', b'b']; // claims 5 bytes, carries 2
        let mut reader = ChunkReader::new();
        let mut cursor = Cursor::new(framed.to_vec());
        let err = reader.read_message(&mut cursor).unwrap_err();
        assert!(err.is_disconnect(), "expected disconnect, got {}", err);
    }

    #[test]
    fn test_eof_at_chunk_header() {
        // Stream ends where the next chunk length should start
        let framed = [0x00, 0x01, b'a'];
        let mut reader = ChunkReader::new();
        let mut cursor = Cursor::new(framed.to_vec());
        let err = reader.read_message(&mut cursor).unwrap_err();
        assert!(matches!(err, BoltError::Io(_)));
        assert!(err.is_disconnect());
    }
}
