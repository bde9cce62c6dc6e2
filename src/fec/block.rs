use crate::error::{CodecError, Result};
use rand::Rng;

/// `symbols` equally sized symbols stored back to back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolBlock {
    data: Vec<u8>,
    symbols: usize,
    symbol_size: usize,
}

impl SymbolBlock {
    /// A zero-filled block.
    pub fn new(symbols: usize, symbol_size: usize) -> Self {
        Self {
            data: vec![0u8; symbols * symbol_size],
            symbols,
            symbol_size,
        }
    }

    /// Wraps a contiguous buffer of exactly `symbols * symbol_size` bytes.
    pub fn from_bytes(data: Vec<u8>, symbols: usize, symbol_size: usize) -> Result<Self> {
        if data.len() != symbols * symbol_size {
            return Err(CodecError::SizeMismatch {
                expected_symbols: symbols,
                expected_size: symbol_size,
                actual_symbols: if symbol_size == 0 { 0 } else { data.len() / symbol_size },
                actual_size: if symbols == 0 { 0 } else { data.len() / symbols },
            });
        }
        Ok(Self {
            data,
            symbols,
            symbol_size,
        })
    }

    /// Concatenates individual symbols; all must share the first one's size.
    pub fn from_symbols<S: AsRef<[u8]>>(symbols: &[S]) -> Result<Self> {
        let symbol_size = symbols.first().map(|s| s.as_ref().len()).unwrap_or(0);
        let mut data = Vec::with_capacity(symbols.len() * symbol_size);
        for s in symbols {
            let s = s.as_ref();
            if s.len() != symbol_size {
                return Err(CodecError::SizeMismatch {
                    expected_symbols: symbols.len(),
                    expected_size: symbol_size,
                    actual_symbols: symbols.len(),
                    actual_size: s.len(),
                });
            }
            data.extend_from_slice(s);
        }
        Ok(Self {
            data,
            symbols: symbols.len(),
            symbol_size,
        })
    }

    /// Fills a block with bytes drawn from `rng`.
    pub fn random<R: Rng + ?Sized>(symbols: usize, symbol_size: usize, rng: &mut R) -> Self {
        let mut block = Self::new(symbols, symbol_size);
        rng.fill_bytes(&mut block.data);
        block
    }

    pub fn symbols(&self) -> usize {
        self.symbols
    }

    pub fn symbol_size(&self) -> usize {
        self.symbol_size
    }

    pub fn block_size(&self) -> usize {
        self.data.len()
    }

    /// Panics if `index >= symbols()`.
    pub fn symbol(&self, index: usize) -> &[u8] {
        assert!(index < self.symbols, "symbol index {} out of range", index);
        &self.data[index * self.symbol_size..(index + 1) * self.symbol_size]
    }

    pub fn symbol_mut(&mut self, index: usize) -> &mut [u8] {
        assert!(index < self.symbols, "symbol index {} out of range", index);
        &mut self.data[index * self.symbol_size..(index + 1) * self.symbol_size]
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        // chunks_exact panics on a zero chunk size
        self.data.chunks_exact(self.symbol_size.max(1))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}
