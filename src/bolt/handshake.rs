//! Bolt connection handshake.
//!
//! Before any framed message, the client writes a 4-byte preamble followed by
//! four 4-byte big-endian version proposals, highest preferred first, with
//! unused slots zeroed. The server answers with a single 4-byte version, or
//! all zeros when no proposal is acceptable. This client speaks Bolt v1 only.

/// Magic preamble that opens every Bolt connection.
pub const BOLT_MAGIC: [u8; 4] = [0x60, 0x60, 0xB0, 0x17];

/// The one protocol version this client implements.
pub const BOLT_V1: u32 = 1;

/// Version proposals sent during the handshake.
pub const PROPOSED_VERSIONS: [u32; 4] = [BOLT_V1, 0, 0, 0];

/// Total size of the client handshake: preamble plus four proposals.
pub const HANDSHAKE_SIZE: usize = 20;

/// Size of the server's version response.
pub const HANDSHAKE_RESPONSE_SIZE: usize = 4;

/// Build the 20-byte client handshake: preamble followed by the version
/// proposals in big-endian.
pub fn handshake_request() -> [u8; HANDSHAKE_SIZE] {
    let mut request = [0u8; HANDSHAKE_SIZE];
    request[0..4].copy_from_slice(&BOLT_MAGIC);
    for (i, version) in PROPOSED_VERSIONS.iter().enumerate() {
        let offset = 4 + i * 4;
        request[offset..offset + 4].copy_from_slice(&version.to_be_bytes());
    }
    request
}

/// Parse the server's 4-byte response into the agreed version number.
///
/// Zero means the server rejected every proposal.
pub fn agreed_version(response: [u8; HANDSHAKE_RESPONSE_SIZE]) -> u32 {
    u32::from_be_bytes(response)
}
