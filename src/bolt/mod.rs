//! # Bolt v1 Protocol Implementation
//!
//! Low-level protocol engine for talking to Bolt-compatible graph databases.
//!
//! ## Overview
//!
//! Bolt is a binary, length-prefixed, message-oriented protocol. This module
//! provides the pieces the driver layer composes:
//!
//! - [`packstream`] - the self-describing value encoding
//! - [`chunk`] - chunked framing of logical messages
//! - [`message`] - request/response message types
//! - [`handshake`] - preamble and version negotiation
//! - [`error`] - protocol-level error types
//!
//! ## Note
//!
//! Most users should use the high-level [`crate::driver`] module instead of
//! interacting with the protocol directly.

pub mod chunk;
pub mod error;
pub mod handshake;
pub mod message;
pub mod packstream;

pub use chunk::{ChunkReader, ChunkWriter, MAX_CHUNK_SIZE};
pub use error::{BoltError, BoltResult};
pub use handshake::{BOLT_MAGIC, BOLT_V1};
pub use message::{FailureMessage, RecordMessage, Request, Response, SuccessMessage};
pub use packstream::{
    PackStreamDecoder, PackStreamEncoder, PackStreamError, PackStreamStructure, PackStreamValue,
};
