// Copyright (c) 2024, The QuicFuscate Project Authors.
// All rights reserved.
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are
// met:
//
//     * Redistributions of source code must retain the above copyright
//       notice, this list of conditions and the following disclaimer.
//
//     * Redistributions in binary form must reproduce the above
//       copyright notice, this list of conditions and the following disclaimer
//       in the documentation and/or other materials provided with the
//       distribution.
//
//     * Neither the name of the copyright holder nor the names of its
//       contributors may be used to endorse or promote products derived from
//       this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS
// "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT
// LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR
// A PARTICULAR PURPOSE ARE DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT
// OWNER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL,
// SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT
// LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE,
// DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY
// THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT
// (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

//! # Seeded RLNC codec
//!
//! Random linear network coding over a fixed block of source symbols. A coded
//! symbol is the field-linear combination of all source symbols weighted by a
//! coefficient vector that both ends derive from a 32-bit seed, so only the
//! seed travels with the symbol. The decoder folds each `(seed, symbol)`
//! equation into an online Gauss-Jordan elimination and recovers the block
//! as soon as it holds `symbols` linearly independent equations.
//!
//! Four fields are supported: GF(2), GF(2^4), GF(2^8) and GF(2^16). Higher
//! fields make dependent equations rarer at the cost of slower arithmetic.

pub mod block;
pub mod decoder;
pub mod encoder;
pub mod field;
pub mod generator;
pub(crate) mod gf_tables;
pub mod payload;

pub use block::SymbolBlock;
pub use decoder::{Decoder, DecoderVariant};
pub use encoder::{Encoder, EncoderVariant};
pub use field::{Binary, Binary16, Binary4, Binary8, Field, FieldKind};
pub use generator::SeedGenerator;
pub use payload::CodedPayload;

use crate::error::{CodecError, Result};

/// Checks codec dimensions for a field: at least one symbol, and a non-empty
/// symbol holding a whole number of field elements.
pub fn validate_parameters(field: FieldKind, symbols: usize, symbol_size: usize) -> Result<()> {
    if symbols == 0 {
        return Err(CodecError::InvalidParameters(
            "symbols must be greater than zero".to_string(),
        ));
    }
    if symbol_size == 0 {
        return Err(CodecError::InvalidParameters(
            "symbol_size must be greater than zero".to_string(),
        ));
    }
    if symbol_size % field.symbol_alignment() != 0 {
        return Err(CodecError::InvalidParameters(format!(
            "symbol_size {} is not a multiple of {} bytes required by {}",
            symbol_size,
            field.symbol_alignment(),
            field
        )));
    }
    Ok(())
}
