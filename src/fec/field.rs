//! Finite field variants and the packed vector kernels built on them.
//!
//! Coefficient vectors and symbols share one packing so the same kernels
//! drive both the encoder's linear combination and the decoder's row
//! operations:
//!
//! - `Binary`: eight elements per byte, least significant bit first.
//! - `Binary4`: two elements per byte, even indices in the low nibble.
//! - `Binary8`: one element per byte.
//! - `Binary16`: one element per two bytes, big-endian.

use super::gf_tables::*;
use crate::error::CodecError;
use crate::optimize;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Runtime tag for a field variant, used for configuration and at the
/// encoder/decoder construction boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[serde(alias = "binary2", alias = "gf2")]
    Binary,
    #[serde(alias = "gf16")]
    Binary4,
    #[serde(alias = "gf256")]
    Binary8,
    #[serde(alias = "gf65536")]
    Binary16,
}

impl FieldKind {
    pub const ALL: [FieldKind; 4] = [
        FieldKind::Binary,
        FieldKind::Binary4,
        FieldKind::Binary8,
        FieldKind::Binary16,
    ];

    /// Width of one element in bits.
    pub fn bits(self) -> u32 {
        match self {
            FieldKind::Binary => 1,
            FieldKind::Binary4 => 4,
            FieldKind::Binary8 => 8,
            FieldKind::Binary16 => 16,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Binary => "binary",
            FieldKind::Binary4 => "binary4",
            FieldKind::Binary8 => "binary8",
            FieldKind::Binary16 => "binary16",
        }
    }

    /// Symbol sizes must be a multiple of this many bytes.
    pub fn symbol_alignment(self) -> usize {
        match self {
            FieldKind::Binary16 => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for FieldKind {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "binary" | "binary2" | "gf2" => Ok(FieldKind::Binary),
            "binary4" | "gf16" => Ok(FieldKind::Binary4),
            "binary8" | "gf256" => Ok(FieldKind::Binary8),
            "binary16" | "gf65536" => Ok(FieldKind::Binary16),
            other => Err(CodecError::InvalidParameters(format!(
                "unknown field variant '{}'",
                other
            ))),
        }
    }
}

/// Arithmetic over one field variant.
///
/// Scalar operations work on single elements. The `vector_*` operations work
/// on packed byte slices holding whole runs of elements; callers keep both
/// slices the same length.
pub trait Field: Copy + Default + fmt::Debug + Send + Sync + 'static {
    type Element: Copy + Eq + Default + fmt::Debug + Send + Sync + 'static;

    const KIND: FieldKind;
    const ZERO: Self::Element;
    const ONE: Self::Element;

    fn add(a: Self::Element, b: Self::Element) -> Self::Element;

    fn multiply(a: Self::Element, b: Self::Element) -> Self::Element;

    /// Multiplicative inverse. Panics on zero.
    fn invert(a: Self::Element) -> Self::Element;

    /// Bytes needed to hold `elements` packed elements.
    fn vector_size(elements: usize) -> usize;

    fn get(vector: &[u8], index: usize) -> Self::Element;

    fn set(vector: &mut [u8], index: usize, value: Self::Element);

    /// Draws one uniformly distributed element.
    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self::Element;

    /// `dst += c * src`
    fn vector_multiply_add(dst: &mut [u8], src: &[u8], c: Self::Element);

    /// `dst *= c`
    fn vector_multiply(dst: &mut [u8], c: Self::Element);

    /// Subtraction is addition in characteristic two.
    fn subtract(a: Self::Element, b: Self::Element) -> Self::Element {
        Self::add(a, b)
    }

    /// `dst -= c * src`
    fn vector_multiply_subtract(dst: &mut [u8], src: &[u8], c: Self::Element) {
        Self::vector_multiply_add(dst, src, c)
    }
}

/// GF(2).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Binary;

/// GF(2^4), reduction polynomial x^4 + x + 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Binary4;

/// GF(2^8), reduction polynomial x^8 + x^4 + x^3 + x^2 + 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Binary8;

/// GF(2^16), reduction polynomial x^16 + x^12 + x^3 + x + 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Binary16;

impl Field for Binary {
    type Element = u8;

    const KIND: FieldKind = FieldKind::Binary;
    const ZERO: u8 = 0;
    const ONE: u8 = 1;

    #[inline]
    fn add(a: u8, b: u8) -> u8 {
        (a ^ b) & 1
    }

    #[inline]
    fn multiply(a: u8, b: u8) -> u8 {
        a & b & 1
    }

    #[inline]
    fn invert(a: u8) -> u8 {
        if a & 1 == 0 {
            panic!("Inverse of 0 is undefined in GF(2)");
        }
        1
    }

    fn vector_size(elements: usize) -> usize {
        elements.div_ceil(8)
    }

    #[inline]
    fn get(vector: &[u8], index: usize) -> u8 {
        (vector[index / 8] >> (index % 8)) & 1
    }

    #[inline]
    fn set(vector: &mut [u8], index: usize, value: u8) {
        let mask = 1u8 << (index % 8);
        if value & 1 != 0 {
            vector[index / 8] |= mask;
        } else {
            vector[index / 8] &= !mask;
        }
    }

    fn random<R: Rng + ?Sized>(rng: &mut R) -> u8 {
        rng.gen::<bool>() as u8
    }

    fn vector_multiply_add(dst: &mut [u8], src: &[u8], c: u8) {
        if c & 1 != 0 {
            optimize::xor_slice(dst, src);
        }
    }

    fn vector_multiply(dst: &mut [u8], c: u8) {
        if c & 1 == 0 {
            dst.fill(0);
        }
    }
}

impl Field for Binary4 {
    type Element = u8;

    const KIND: FieldKind = FieldKind::Binary4;
    const ZERO: u8 = 0;
    const ONE: u8 = 1;

    #[inline]
    fn add(a: u8, b: u8) -> u8 {
        (a ^ b) & 0x0f
    }

    #[inline]
    fn multiply(a: u8, b: u8) -> u8 {
        gf4_mul(a, b)
    }

    #[inline]
    fn invert(a: u8) -> u8 {
        gf4_inv(a)
    }

    fn vector_size(elements: usize) -> usize {
        elements.div_ceil(2)
    }

    #[inline]
    fn get(vector: &[u8], index: usize) -> u8 {
        let byte = vector[index / 2];
        if index % 2 == 0 {
            byte & 0x0f
        } else {
            byte >> 4
        }
    }

    #[inline]
    fn set(vector: &mut [u8], index: usize, value: u8) {
        let byte = &mut vector[index / 2];
        if index % 2 == 0 {
            *byte = (*byte & 0xf0) | (value & 0x0f);
        } else {
            *byte = (*byte & 0x0f) | (value << 4);
        }
    }

    fn random<R: Rng + ?Sized>(rng: &mut R) -> u8 {
        rng.gen::<u8>() >> 4
    }

    fn vector_multiply_add(dst: &mut [u8], src: &[u8], c: u8) {
        match c & 0x0f {
            0 => {}
            1 => optimize::xor_slice(dst, src),
            c => optimize::xor_apply_table(dst, src, &GF4_BYTE_TABLES[c as usize]),
        }
    }

    fn vector_multiply(dst: &mut [u8], c: u8) {
        match c & 0x0f {
            0 => dst.fill(0),
            1 => {}
            c => optimize::apply_table(dst, &GF4_BYTE_TABLES[c as usize]),
        }
    }
}

impl Field for Binary8 {
    type Element = u8;

    const KIND: FieldKind = FieldKind::Binary8;
    const ZERO: u8 = 0;
    const ONE: u8 = 1;

    #[inline]
    fn add(a: u8, b: u8) -> u8 {
        a ^ b
    }

    #[inline]
    fn multiply(a: u8, b: u8) -> u8 {
        gf_mul(a, b)
    }

    #[inline]
    fn invert(a: u8) -> u8 {
        gf_inv(a)
    }

    fn vector_size(elements: usize) -> usize {
        elements
    }

    #[inline]
    fn get(vector: &[u8], index: usize) -> u8 {
        vector[index]
    }

    #[inline]
    fn set(vector: &mut [u8], index: usize, value: u8) {
        vector[index] = value;
    }

    fn random<R: Rng + ?Sized>(rng: &mut R) -> u8 {
        rng.gen::<u8>()
    }

    fn vector_multiply_add(dst: &mut [u8], src: &[u8], c: u8) {
        match c {
            0 => {}
            1 => optimize::xor_slice(dst, src),
            c => optimize::xor_apply_table(dst, src, &GF_MUL_TABLES[c as usize]),
        }
    }

    fn vector_multiply(dst: &mut [u8], c: u8) {
        match c {
            0 => dst.fill(0),
            1 => {}
            c => optimize::apply_table(dst, &GF_MUL_TABLES[c as usize]),
        }
    }
}

/// Below this many elements building split tables costs more than it saves.
const GF16_TABLE_THRESHOLD: usize = 256;

impl Field for Binary16 {
    type Element = u16;

    const KIND: FieldKind = FieldKind::Binary16;
    const ZERO: u16 = 0;
    const ONE: u16 = 1;

    #[inline]
    fn add(a: u16, b: u16) -> u16 {
        a ^ b
    }

    #[inline]
    fn multiply(a: u16, b: u16) -> u16 {
        gf16_mul(a, b)
    }

    #[inline]
    fn invert(a: u16) -> u16 {
        gf16_inv(a)
    }

    fn vector_size(elements: usize) -> usize {
        elements * 2
    }

    #[inline]
    fn get(vector: &[u8], index: usize) -> u16 {
        u16::from_be_bytes([vector[2 * index], vector[2 * index + 1]])
    }

    #[inline]
    fn set(vector: &mut [u8], index: usize, value: u16) {
        vector[2 * index..2 * index + 2].copy_from_slice(&value.to_be_bytes());
    }

    fn random<R: Rng + ?Sized>(rng: &mut R) -> u16 {
        rng.gen::<u16>()
    }

    fn vector_multiply_add(dst: &mut [u8], src: &[u8], c: u16) {
        match c {
            0 => {}
            1 => optimize::xor_slice(dst, src),
            c if dst.len() / 2 >= GF16_TABLE_THRESHOLD => {
                let (hi, lo) = gf16_mul_tables(c);
                for (d, s) in dst.chunks_exact_mut(2).zip(src.chunks_exact(2)) {
                    let v = hi[s[0] as usize] ^ lo[s[1] as usize];
                    let b = v.to_be_bytes();
                    d[0] ^= b[0];
                    d[1] ^= b[1];
                }
            }
            c => {
                for (d, s) in dst.chunks_exact_mut(2).zip(src.chunks_exact(2)) {
                    let v = gf16_mul(c, u16::from_be_bytes([s[0], s[1]]));
                    let b = v.to_be_bytes();
                    d[0] ^= b[0];
                    d[1] ^= b[1];
                }
            }
        }
    }

    fn vector_multiply(dst: &mut [u8], c: u16) {
        match c {
            0 => dst.fill(0),
            1 => {}
            c if dst.len() / 2 >= GF16_TABLE_THRESHOLD => {
                let (hi, lo) = gf16_mul_tables(c);
                for d in dst.chunks_exact_mut(2) {
                    let v = hi[d[0] as usize] ^ lo[d[1] as usize];
                    d.copy_from_slice(&v.to_be_bytes());
                }
            }
            c => {
                for d in dst.chunks_exact_mut(2) {
                    let v = gf16_mul(c, u16::from_be_bytes([d[0], d[1]]));
                    d.copy_from_slice(&v.to_be_bytes());
                }
            }
        }
    }
}
