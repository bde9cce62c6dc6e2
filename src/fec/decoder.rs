use super::block::SymbolBlock;
use super::field::{Binary, Binary16, Binary4, Binary8, Field, FieldKind};
use super::generator::SeedGenerator;
use super::payload::CodedPayload;
use super::validate_parameters;
use crate::config::CodecConfig;
use crate::error::{CodecError, Result};
use crate::telemetry;
use log::{debug, info, trace, warn};

/// Online Gauss-Jordan decoder.
///
/// Every accepted equation is stored in the row of its pivot column, and the
/// stored rows are kept fully reduced: row `i` has a one in column `i` and
/// zeros in every other pivot column. Once all `symbols` rows are filled the
/// coefficient matrix is the identity and the symbol rows are the source.
#[derive(Debug, Clone)]
pub struct Decoder<F: Field> {
    symbol_size: usize,
    generator: SeedGenerator<F>,
    coefficient_rows: Vec<u8>,
    symbol_rows: Vec<u8>,
    pivots: Vec<bool>,
    rank: usize,
    coefficients: Vec<u8>,
    symbol: Vec<u8>,
}

impl<F: Field> Decoder<F> {
    pub fn new(symbols: usize, symbol_size: usize) -> Result<Self> {
        validate_parameters(F::KIND, symbols, symbol_size)?;
        let generator = SeedGenerator::<F>::new(symbols);
        let coefficients_size = generator.max_coefficients_size();
        debug!(
            "decoder: field={} symbols={} symbol_size={}",
            F::KIND,
            symbols,
            symbol_size
        );
        Ok(Self {
            symbol_size,
            generator,
            coefficient_rows: vec![0u8; symbols * coefficients_size],
            symbol_rows: vec![0u8; symbols * symbol_size],
            pivots: vec![false; symbols],
            rank: 0,
            coefficients: vec![0u8; coefficients_size],
            symbol: vec![0u8; symbol_size],
        })
    }

    /// Folds one `(seed, symbol)` equation into the decoding state.
    ///
    /// Returns `Ok(true)` if the equation raised the rank and `Ok(false)` if
    /// it was linearly dependent on what is already known. Dependent
    /// equations leave the state untouched.
    pub fn decode(&mut self, seed: u32, symbol: &[u8]) -> Result<bool> {
        if self.is_complete() {
            warn!("decoder: payload with seed {} after completion", seed);
            return Err(CodecError::AlreadyComplete);
        }
        if symbol.len() != self.symbol_size {
            return Err(CodecError::symbol_mismatch(self.symbol_size, symbol.len()));
        }
        telemetry::PAYLOADS_RECEIVED.inc();

        self.generator.generate_into(seed, &mut self.coefficients);
        self.symbol.copy_from_slice(symbol);

        let symbols = self.symbols();
        let coefficients_size = self.coefficients.len();
        let symbol_size = self.symbol_size;

        // Forward reduction against the stored pivots.
        for col in 0..symbols {
            if !self.pivots[col] {
                continue;
            }
            let c = F::get(&self.coefficients, col);
            if c == F::ZERO {
                continue;
            }
            let row = &self.coefficient_rows[col * coefficients_size..(col + 1) * coefficients_size];
            F::vector_multiply_subtract(&mut self.coefficients, row, c);
            let row = &self.symbol_rows[col * symbol_size..(col + 1) * symbol_size];
            F::vector_multiply_subtract(&mut self.symbol, row, c);
        }

        let pivot = match (0..symbols).find(|&col| F::get(&self.coefficients, col) != F::ZERO) {
            Some(pivot) => pivot,
            None => {
                trace!("decoder: seed {} is redundant at rank {}", seed, self.rank);
                telemetry::REDUNDANT_PAYLOADS.inc();
                return Ok(false);
            }
        };
        debug_assert!(!self.pivots[pivot]);

        let inverse = F::invert(F::get(&self.coefficients, pivot));
        F::vector_multiply(&mut self.coefficients, inverse);
        F::vector_multiply(&mut self.symbol, inverse);

        // Back substitution keeps every stored row reduced in the new column.
        for row in 0..symbols {
            if !self.pivots[row] {
                continue;
            }
            let coefficients =
                &mut self.coefficient_rows[row * coefficients_size..(row + 1) * coefficients_size];
            let c = F::get(coefficients, pivot);
            if c == F::ZERO {
                continue;
            }
            F::vector_multiply_subtract(coefficients, &self.coefficients, c);
            let symbol = &mut self.symbol_rows[row * symbol_size..(row + 1) * symbol_size];
            F::vector_multiply_subtract(symbol, &self.symbol, c);
        }

        self.coefficient_rows[pivot * coefficients_size..(pivot + 1) * coefficients_size]
            .copy_from_slice(&self.coefficients);
        self.symbol_rows[pivot * symbol_size..(pivot + 1) * symbol_size]
            .copy_from_slice(&self.symbol);
        self.pivots[pivot] = true;
        self.rank += 1;

        trace!("decoder: seed {} pivots column {}, rank {}", seed, pivot, self.rank);
        if self.is_complete() {
            info!(
                "decoder: complete, {} symbols of {} bytes recovered",
                symbols, symbol_size
            );
            telemetry::DECODERS_COMPLETED.inc();
        }
        Ok(true)
    }

    pub fn decode_payload(&mut self, payload: &CodedPayload) -> Result<bool> {
        self.decode(payload.seed, &payload.symbol)
    }

    pub fn is_complete(&self) -> bool {
        self.rank == self.symbols()
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    /// True once symbol `index` is known, which can happen before the whole
    /// block is complete.
    pub fn is_symbol_decoded(&self, index: usize) -> bool {
        if index >= self.symbols() || !self.pivots[index] {
            return false;
        }
        let size = self.coefficients.len();
        let row = &self.coefficient_rows[index * size..(index + 1) * size];
        (0..self.symbols()).all(|col| {
            let expected = if col == index { F::ONE } else { F::ZERO };
            F::get(row, col) == expected
        })
    }

    pub fn symbols_decoded(&self) -> usize {
        (0..self.symbols()).filter(|&i| self.is_symbol_decoded(i)).count()
    }

    /// The recovered symbol at `index`, if it is already known.
    pub fn decoded_symbol(&self, index: usize) -> Option<&[u8]> {
        if !self.is_symbol_decoded(index) {
            return None;
        }
        Some(&self.symbol_rows[index * self.symbol_size..(index + 1) * self.symbol_size])
    }

    /// The recovered block. Fails with `NotComplete` below full rank.
    pub fn decoded_symbols(&self) -> Result<SymbolBlock> {
        if !self.is_complete() {
            return Err(CodecError::NotComplete {
                rank: self.rank,
                symbols: self.symbols(),
            });
        }
        SymbolBlock::from_bytes(self.symbol_rows.clone(), self.symbols(), self.symbol_size)
    }

    pub fn generate(&self, seed: u32) -> Vec<u8> {
        self.generator.generate(seed)
    }

    pub fn symbols(&self) -> usize {
        self.generator.symbols()
    }

    pub fn symbol_size(&self) -> usize {
        self.symbol_size
    }

    pub fn block_size(&self) -> usize {
        self.symbols() * self.symbol_size
    }

    pub fn payload_size(&self) -> usize {
        CodedPayload::wire_size(self.symbol_size)
    }
}

/// A decoder over a field chosen at runtime.
#[derive(Debug, Clone)]
pub enum DecoderVariant {
    Binary(Decoder<Binary>),
    Binary4(Decoder<Binary4>),
    Binary8(Decoder<Binary8>),
    Binary16(Decoder<Binary16>),
}

macro_rules! each_decoder {
    ($self:expr, $d:ident => $body:expr) => {
        match $self {
            DecoderVariant::Binary($d) => $body,
            DecoderVariant::Binary4($d) => $body,
            DecoderVariant::Binary8($d) => $body,
            DecoderVariant::Binary16($d) => $body,
        }
    };
}

impl DecoderVariant {
    pub fn new(field: FieldKind, symbols: usize, symbol_size: usize) -> Result<Self> {
        Ok(match field {
            FieldKind::Binary => DecoderVariant::Binary(Decoder::new(symbols, symbol_size)?),
            FieldKind::Binary4 => DecoderVariant::Binary4(Decoder::new(symbols, symbol_size)?),
            FieldKind::Binary8 => DecoderVariant::Binary8(Decoder::new(symbols, symbol_size)?),
            FieldKind::Binary16 => DecoderVariant::Binary16(Decoder::new(symbols, symbol_size)?),
        })
    }

    pub fn from_config(config: &CodecConfig) -> Result<Self> {
        Self::new(config.field, config.symbols, config.symbol_size)
    }

    pub fn field(&self) -> FieldKind {
        match self {
            DecoderVariant::Binary(_) => FieldKind::Binary,
            DecoderVariant::Binary4(_) => FieldKind::Binary4,
            DecoderVariant::Binary8(_) => FieldKind::Binary8,
            DecoderVariant::Binary16(_) => FieldKind::Binary16,
        }
    }

    pub fn decode(&mut self, seed: u32, symbol: &[u8]) -> Result<bool> {
        each_decoder!(self, d => d.decode(seed, symbol))
    }

    pub fn decode_payload(&mut self, payload: &CodedPayload) -> Result<bool> {
        each_decoder!(self, d => d.decode_payload(payload))
    }

    pub fn is_complete(&self) -> bool {
        each_decoder!(self, d => d.is_complete())
    }

    pub fn rank(&self) -> usize {
        each_decoder!(self, d => d.rank())
    }

    pub fn is_symbol_decoded(&self, index: usize) -> bool {
        each_decoder!(self, d => d.is_symbol_decoded(index))
    }

    pub fn symbols_decoded(&self) -> usize {
        each_decoder!(self, d => d.symbols_decoded())
    }

    pub fn decoded_symbol(&self, index: usize) -> Option<&[u8]> {
        each_decoder!(self, d => d.decoded_symbol(index))
    }

    pub fn decoded_symbols(&self) -> Result<SymbolBlock> {
        each_decoder!(self, d => d.decoded_symbols())
    }

    pub fn generate(&self, seed: u32) -> Vec<u8> {
        each_decoder!(self, d => d.generate(seed))
    }

    pub fn symbols(&self) -> usize {
        each_decoder!(self, d => d.symbols())
    }

    pub fn symbol_size(&self) -> usize {
        each_decoder!(self, d => d.symbol_size())
    }

    pub fn payload_size(&self) -> usize {
        each_decoder!(self, d => d.payload_size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fec::encoder::Encoder;

    fn source() -> SymbolBlock {
        SymbolBlock::from_symbols(&[[1u8, 2], [3, 4], [5, 6]]).unwrap()
    }

    #[test]
    fn three_binary_symbols_from_first_seeds() {
        let mut enc = Encoder::<Binary>::new(3, 2).unwrap();
        enc.bind_source(source()).unwrap();
        let mut dec = Decoder::<Binary>::new(3, 2).unwrap();
        for seed in 0..3 {
            let symbol = enc.encode(seed).unwrap().to_vec();
            assert!(dec.decode(seed, &symbol).unwrap());
            assert_eq!(dec.rank(), seed as usize + 1);
        }
        assert!(dec.is_complete());
        assert_eq!(dec.decoded_symbols().unwrap(), source());
    }

    #[test]
    fn redundant_equation_leaves_state_untouched() {
        let mut enc = Encoder::<Binary>::new(3, 2).unwrap();
        enc.bind_source(source()).unwrap();
        let mut dec = Decoder::<Binary>::new(3, 2).unwrap();
        let s0 = enc.encode(0).unwrap().to_vec();
        assert!(dec.decode(0, &s0).unwrap());
        let before = dec.clone();
        assert!(!dec.decode(0, &s0).unwrap());
        assert_eq!(dec.rank(), 1);
        assert_eq!(dec.coefficient_rows, before.coefficient_rows);
        assert_eq!(dec.symbol_rows, before.symbol_rows);
    }

    #[test]
    fn partial_symbols_become_available() {
        let mut enc = Encoder::<Binary>::new(3, 2).unwrap();
        enc.bind_source(source()).unwrap();
        let mut dec = Decoder::<Binary>::new(3, 2).unwrap();
        // [1,1,1] and [1,0,1] together pin down symbol 1
        for seed in 0..2 {
            let symbol = enc.encode(seed).unwrap().to_vec();
            dec.decode(seed, &symbol).unwrap();
        }
        assert!(!dec.is_complete());
        assert!(dec.is_symbol_decoded(1));
        assert_eq!(dec.decoded_symbol(1), Some(&[3u8, 4][..]));
        assert_eq!(dec.symbols_decoded(), 1);
        assert_eq!(dec.decoded_symbol(0), None);
    }

    #[test]
    fn decode_after_completion_is_rejected() {
        let mut dec = Decoder::<Binary8>::new(1, 4).unwrap();
        let coefficient = dec.generate(0)[0];
        assert_ne!(coefficient, 0);
        let coded: Vec<u8> = [9u8, 8, 7, 6]
            .iter()
            .map(|&b| Binary8::multiply(coefficient, b))
            .collect();
        assert!(dec.decode(0, &coded).unwrap());
        assert_eq!(dec.decoded_symbols().unwrap().as_bytes(), &[9, 8, 7, 6]);
        assert_eq!(dec.decode(1, &coded), Err(CodecError::AlreadyComplete));
        assert_eq!(dec.rank(), 1);
    }

    #[test]
    fn incomplete_extraction_fails() {
        let dec = Decoder::<Binary16>::new(4, 8).unwrap();
        assert_eq!(
            dec.decoded_symbols().unwrap_err(),
            CodecError::NotComplete { rank: 0, symbols: 4 }
        );
    }

    #[test]
    fn wrong_symbol_length_rejected() {
        let mut dec = Decoder::<Binary4>::new(4, 8).unwrap();
        assert!(matches!(
            dec.decode(0, &[0u8; 7]),
            Err(CodecError::SizeMismatch { .. })
        ));
        assert_eq!(dec.rank(), 0);
    }
}
