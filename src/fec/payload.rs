use crate::error::{CodecError, Result};
use log::error;

/// Length of the seed prefix on the wire.
pub const SEED_SIZE: usize = 4;

/// A coded symbol together with the seed that produced it.
///
/// Frame format: `<seed (4, big-endian)> <symbol (symbol_size)>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodedPayload {
    pub seed: u32,
    pub symbol: Vec<u8>,
}

impl CodedPayload {
    pub fn new(seed: u32, symbol: Vec<u8>) -> Self {
        Self { seed, symbol }
    }

    /// Wire size of a payload carrying a `symbol_size` byte symbol.
    pub fn wire_size(symbol_size: usize) -> usize {
        SEED_SIZE + symbol_size
    }

    pub fn wire_len(&self) -> usize {
        Self::wire_size(self.symbol.len())
    }

    /// Serializes into `buffer` and returns the number of bytes written.
    pub fn write_to(&self, buffer: &mut [u8]) -> Result<usize> {
        let required_len = self.wire_len();
        if buffer.len() < required_len {
            return Err(CodecError::MalformedPayload {
                expected: required_len,
                actual: buffer.len(),
            });
        }
        buffer[..SEED_SIZE].copy_from_slice(&self.seed.to_be_bytes());
        buffer[SEED_SIZE..required_len].copy_from_slice(&self.symbol);
        Ok(required_len)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut raw = Vec::with_capacity(self.wire_len());
        raw.extend_from_slice(&self.seed.to_be_bytes());
        raw.extend_from_slice(&self.symbol);
        raw
    }

    /// Parses a frame that must be exactly `SEED_SIZE + symbol_size` bytes.
    pub fn from_bytes(raw: &[u8], symbol_size: usize) -> Result<Self> {
        let expected = Self::wire_size(symbol_size);
        if raw.len() != expected {
            error!("from_bytes: expected {} bytes, got {}", expected, raw.len());
            return Err(CodecError::MalformedPayload {
                expected,
                actual: raw.len(),
            });
        }
        let seed = u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]);
        Ok(Self {
            seed,
            symbol: raw[SEED_SIZE..].to_vec(),
        })
    }
}
