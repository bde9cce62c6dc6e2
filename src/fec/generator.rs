//! Seed to coefficient vector mapping.
//!
//! Both ends of a session must derive bit-identical vectors, so the mapping
//! is a pure function of `(seed, field, symbols)`: a fresh ChaCha8 stream is
//! keyed from the seed on every call and one standard-distribution draw is
//! taken per coefficient.

use super::field::Field;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::marker::PhantomData;

/// Derives packed coefficient vectors of a fixed length over `F`.
#[derive(Debug, Clone, Copy)]
pub struct SeedGenerator<F: Field> {
    symbols: usize,
    _field: PhantomData<F>,
}

impl<F: Field> SeedGenerator<F> {
    pub fn new(symbols: usize) -> Self {
        Self {
            symbols,
            _field: PhantomData,
        }
    }

    pub fn symbols(&self) -> usize {
        self.symbols
    }

    /// Bytes of one packed coefficient vector.
    pub fn max_coefficients_size(&self) -> usize {
        F::vector_size(self.symbols)
    }

    /// Writes the vector for `seed` into `coefficients`, which must be
    /// `max_coefficients_size()` bytes. Padding bits past the last element
    /// are left zero.
    pub fn generate_into(&self, seed: u32, coefficients: &mut [u8]) {
        debug_assert_eq!(coefficients.len(), self.max_coefficients_size());
        coefficients.fill(0);
        let mut rng = ChaCha8Rng::seed_from_u64(seed as u64);
        for i in 0..self.symbols {
            F::set(coefficients, i, F::random(&mut rng));
        }
    }

    pub fn generate(&self, seed: u32) -> Vec<u8> {
        let mut coefficients = vec![0u8; self.max_coefficients_size()];
        self.generate_into(seed, &mut coefficients);
        coefficients
    }
}
