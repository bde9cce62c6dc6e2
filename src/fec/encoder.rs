use super::block::SymbolBlock;
use super::field::{Binary, Binary16, Binary4, Binary8, Field, FieldKind};
use super::generator::SeedGenerator;
use super::payload::CodedPayload;
use super::validate_parameters;
use crate::config::CodecConfig;
use crate::error::{CodecError, Result};
use crate::telemetry;
use log::debug;
use rayon::prelude::*;
use std::sync::Arc;

/// Produces coded symbols from a bound source block.
///
/// The block is shared through an `Arc`, so cloning an encoder is cheap and
/// clones can encode concurrently.
#[derive(Debug, Clone)]
pub struct Encoder<F: Field> {
    symbol_size: usize,
    generator: SeedGenerator<F>,
    coefficients: Vec<u8>,
    symbol: Vec<u8>,
    source: Option<Arc<SymbolBlock>>,
}

impl<F: Field> Encoder<F> {
    pub fn new(symbols: usize, symbol_size: usize) -> Result<Self> {
        validate_parameters(F::KIND, symbols, symbol_size)?;
        let generator = SeedGenerator::new(symbols);
        debug!(
            "encoder: field={} symbols={} symbol_size={}",
            F::KIND,
            symbols,
            symbol_size
        );
        Ok(Self {
            symbol_size,
            coefficients: vec![0u8; generator.max_coefficients_size()],
            symbol: vec![0u8; symbol_size],
            generator,
            source: None,
        })
    }

    /// Binds the block that coded symbols are computed from. Rebinding
    /// replaces the previous block.
    pub fn bind_source(&mut self, block: impl Into<Arc<SymbolBlock>>) -> Result<()> {
        let block = block.into();
        if block.symbols() != self.symbols() || block.symbol_size() != self.symbol_size {
            return Err(CodecError::SizeMismatch {
                expected_symbols: self.symbols(),
                expected_size: self.symbol_size,
                actual_symbols: block.symbols(),
                actual_size: block.symbol_size(),
            });
        }
        debug!("encoder: bound {} byte source block", block.block_size());
        self.source = Some(block);
        Ok(())
    }

    pub fn source(&self) -> Option<&SymbolBlock> {
        self.source.as_deref()
    }

    /// Returns the coded symbol for `seed`. The slice borrows the encoder's
    /// output buffer and is overwritten by the next call.
    pub fn encode(&mut self, seed: u32) -> Result<&[u8]> {
        let source = self.source.as_deref().ok_or(CodecError::SourceNotBound)?;
        self.generator.generate_into(seed, &mut self.coefficients);
        combine::<F>(&self.coefficients, source, &mut self.symbol);
        telemetry::CODED_SYMBOLS.inc();
        Ok(&self.symbol)
    }

    /// Writes the coded symbol for `seed` into `out`, which must be exactly
    /// one symbol long.
    pub fn encode_into(&mut self, seed: u32, out: &mut [u8]) -> Result<()> {
        if out.len() != self.symbol_size {
            return Err(CodecError::symbol_mismatch(self.symbol_size, out.len()));
        }
        let source = self.source.as_deref().ok_or(CodecError::SourceNotBound)?;
        self.generator.generate_into(seed, &mut self.coefficients);
        combine::<F>(&self.coefficients, source, out);
        telemetry::CODED_SYMBOLS.inc();
        Ok(())
    }

    pub fn encode_payload(&mut self, seed: u32) -> Result<CodedPayload> {
        let symbol = self.encode(seed)?.to_vec();
        Ok(CodedPayload::new(seed, symbol))
    }

    /// Encodes every seed on the rayon pool. Output order follows `seeds`.
    pub fn encode_batch(&self, seeds: &[u32]) -> Result<Vec<CodedPayload>> {
        let source = self.source.as_deref().ok_or(CodecError::SourceNotBound)?;
        let generator = self.generator;
        let payloads: Vec<CodedPayload> = seeds
            .par_iter()
            .map_init(
                || vec![0u8; generator.max_coefficients_size()],
                |coefficients, &seed| {
                    generator.generate_into(seed, coefficients);
                    let mut symbol = vec![0u8; source.symbol_size()];
                    combine::<F>(coefficients, source, &mut symbol);
                    CodedPayload::new(seed, symbol)
                },
            )
            .collect();
        telemetry::CODED_SYMBOLS.inc_by(payloads.len() as u64);
        Ok(payloads)
    }

    /// The packed coefficient vector `seed` maps to.
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

/// `out = sum(coefficients[i] * source[i])`
fn combine<F: Field>(coefficients: &[u8], source: &SymbolBlock, out: &mut [u8]) {
    out.fill(0);
    for (i, symbol) in source.iter().enumerate() {
        let c = F::get(coefficients, i);
        if c != F::ZERO {
            F::vector_multiply_add(out, symbol, c);
        }
    }
}

/// An encoder over a field chosen at runtime.
#[derive(Debug, Clone)]
pub enum EncoderVariant {
    Binary(Encoder<Binary>),
    Binary4(Encoder<Binary4>),
    Binary8(Encoder<Binary8>),
    Binary16(Encoder<Binary16>),
}

macro_rules! each_encoder {
    ($self:expr, $e:ident => $body:expr) => {
        match $self {
            EncoderVariant::Binary($e) => $body,
            EncoderVariant::Binary4($e) => $body,
            EncoderVariant::Binary8($e) => $body,
            EncoderVariant::Binary16($e) => $body,
        }
    };
}

impl EncoderVariant {
    pub fn new(field: FieldKind, symbols: usize, symbol_size: usize) -> Result<Self> {
        Ok(match field {
            FieldKind::Binary => EncoderVariant::Binary(Encoder::new(symbols, symbol_size)?),
            FieldKind::Binary4 => EncoderVariant::Binary4(Encoder::new(symbols, symbol_size)?),
            FieldKind::Binary8 => EncoderVariant::Binary8(Encoder::new(symbols, symbol_size)?),
            FieldKind::Binary16 => EncoderVariant::Binary16(Encoder::new(symbols, symbol_size)?),
        })
    }

    pub fn from_config(config: &CodecConfig) -> Result<Self> {
        Self::new(config.field, config.symbols, config.symbol_size)
    }

    pub fn field(&self) -> FieldKind {
        match self {
            EncoderVariant::Binary(_) => FieldKind::Binary,
            EncoderVariant::Binary4(_) => FieldKind::Binary4,
            EncoderVariant::Binary8(_) => FieldKind::Binary8,
            EncoderVariant::Binary16(_) => FieldKind::Binary16,
        }
    }

    pub fn bind_source(&mut self, block: impl Into<Arc<SymbolBlock>>) -> Result<()> {
        let block = block.into();
        each_encoder!(self, e => e.bind_source(block))
    }

    pub fn encode(&mut self, seed: u32) -> Result<&[u8]> {
        each_encoder!(self, e => e.encode(seed))
    }

    pub fn encode_into(&mut self, seed: u32, out: &mut [u8]) -> Result<()> {
        each_encoder!(self, e => e.encode_into(seed, out))
    }

    pub fn encode_payload(&mut self, seed: u32) -> Result<CodedPayload> {
        each_encoder!(self, e => e.encode_payload(seed))
    }

    pub fn encode_batch(&self, seeds: &[u32]) -> Result<Vec<CodedPayload>> {
        each_encoder!(self, e => e.encode_batch(seeds))
    }

    pub fn generate(&self, seed: u32) -> Vec<u8> {
        each_encoder!(self, e => e.generate(seed))
    }

    pub fn symbols(&self) -> usize {
        each_encoder!(self, e => e.symbols())
    }

    pub fn symbol_size(&self) -> usize {
        each_encoder!(self, e => e.symbol_size())
    }

    pub fn payload_size(&self) -> usize {
        each_encoder!(self, e => e.payload_size())
    }
}
