//! Catalog response decoding
//!
//! The catalog may answer with a zlib or gzip compressed body depending on
//! the negotiated encoding. The first bytes decide how the body is read.

use flate2::read::{GzDecoder, ZlibDecoder};
use modman_errors::{Error, NetworkError};
use modman_types::ListingEntry;
use std::io::Read;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Compression detected at the start of a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadEncoding {
    Gzip,
    Zlib,
    Plain,
}

impl PayloadEncoding {
    #[must_use]
    pub fn sniff(data: &[u8]) -> Self {
        match data {
            [a, b, ..] if [*a, *b] == GZIP_MAGIC => Self::Gzip,
            // zlib: deflate method in the low nibble, header checksum over both bytes
            [cmf, flg, ..]
                if cmf & 0x0f == 8 && ((u16::from(*cmf) << 8) | u16::from(*flg)) % 31 == 0 =>
            {
                Self::Zlib
            }
            _ => Self::Plain,
        }
    }
}

/// Inflate a payload if it is compressed
///
/// # Errors
///
/// Returns `NetworkError::InvalidPayload` if the compressed stream is corrupt.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>, Error> {
    let mut out = Vec::new();
    let result = match PayloadEncoding::sniff(data) {
        PayloadEncoding::Gzip => GzDecoder::new(data).read_to_end(&mut out),
        PayloadEncoding::Zlib => ZlibDecoder::new(data).read_to_end(&mut out),
        PayloadEncoding::Plain => return Ok(data.to_vec()),
    };
    result.map_err(|e| NetworkError::InvalidPayload(format!("decompression failed: {e}")))?;
    Ok(out)
}

/// Decode a catalog listing response into entries
///
/// # Errors
///
/// Returns `NetworkError::InvalidPayload` if the body cannot be inflated or
/// is not a JSON array of listing entries.
pub fn decode_listing(data: &[u8]) -> Result<Vec<ListingEntry>, Error> {
    let body = inflate(data)?;
    serde_json::from_slice(&body)
        .map_err(|e| NetworkError::InvalidPayload(format!("invalid catalog JSON: {e}")).into())
}
