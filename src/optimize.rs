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

//! # Optimization Module
//!
//! Runtime CPU feature detection and dispatch for the vector kernels that sit
//! under the field arithmetic. Every kernel has a scalar reference version and
//! the accelerated versions must produce identical output.

use log::debug;
use std::any::Any;
use std::collections::HashMap;
use std::sync::OnceLock;

#[cfg(target_arch = "x86_64")]
cpufeatures::new!(cpuid_avx2, "avx2");

/// CPU features the codec kernels can take advantage of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CpuFeature {
    AVX2,
}

/// Singleton for accessing detected CPU features.
/// Detection runs once, on first use.
pub struct FeatureDetector {
    features: HashMap<CpuFeature, bool>,
}

static DETECTOR: OnceLock<FeatureDetector> = OnceLock::new();

impl FeatureDetector {
    /// Returns a static reference to the `FeatureDetector` singleton.
    pub fn instance() -> &'static Self {
        DETECTOR.get_or_init(|| {
            let mut features = HashMap::new();
            #[cfg(target_arch = "x86_64")]
            features.insert(CpuFeature::AVX2, cpuid_avx2::get());
            debug!("detected cpu features: {:?}", features);
            FeatureDetector { features }
        })
    }

    /// Checks if a specific CPU feature is supported.
    pub fn has_feature(&self, feature: CpuFeature) -> bool {
        *self.features.get(&feature).unwrap_or(&false)
    }
}

//
// SIMD Dispatching
//

/// Represents the execution policy for SIMD operations.
pub trait SimdPolicy: Any {
    fn as_any(&self) -> &dyn Any;
}

/// Marker struct for AVX2 execution.
pub struct Avx2;
impl SimdPolicy for Avx2 {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Marker struct for scalar (non-SIMD) execution.
pub struct Scalar;
impl SimdPolicy for Scalar {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Dispatches to the best available implementation at runtime.
pub fn dispatch<F, R>(f: F) -> R
where
    F: FnOnce(&dyn SimdPolicy) -> R,
{
    if FeatureDetector::instance().has_feature(CpuFeature::AVX2) {
        f(&Avx2)
    } else {
        f(&Scalar)
    }
}

//
// Byte kernels
//
// `table` arguments map a byte to its product with a fixed field scalar. The
// map must be GF(2)-linear (`table[a ^ b] == table[a] ^ table[b]`), which
// holds for multiplication by a constant in binary4 and binary8. The SIMD
// kernels rely on it to split every byte into two nibble lookups.

/// `dst ^= src`
pub fn xor_slice(dst: &mut [u8], src: &[u8]) {
    debug_assert_eq!(dst.len(), src.len());
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= *s;
    }
}

/// `dst[i] = table[dst[i]]`
pub fn apply_table(dst: &mut [u8], table: &[u8; 256]) {
    dispatch(|policy| {
        #[cfg(target_arch = "x86_64")]
        {
            if policy.as_any().is::<Avx2>() {
                // Avx2 is only dispatched after runtime detection.
                unsafe { apply_table_avx2(dst, table) };
                return;
            }
        }
        let _ = policy;
        apply_table_scalar(dst, table)
    })
}

/// `dst[i] ^= table[src[i]]`
pub fn xor_apply_table(dst: &mut [u8], src: &[u8], table: &[u8; 256]) {
    debug_assert_eq!(dst.len(), src.len());
    dispatch(|policy| {
        #[cfg(target_arch = "x86_64")]
        {
            if policy.as_any().is::<Avx2>() {
                // Avx2 is only dispatched after runtime detection.
                unsafe { xor_apply_table_avx2(dst, src, table) };
                return;
            }
        }
        let _ = policy;
        xor_apply_table_scalar(dst, src, table)
    })
}

#[inline]
pub(crate) fn apply_table_scalar(dst: &mut [u8], table: &[u8; 256]) {
    for d in dst.iter_mut() {
        *d = table[*d as usize];
    }
}

#[inline]
pub(crate) fn xor_apply_table_scalar(dst: &mut [u8], src: &[u8], table: &[u8; 256]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= table[*s as usize];
    }
}

#[cfg(target_arch = "x86_64")]
fn nibble_tables(table: &[u8; 256]) -> ([u8; 16], [u8; 16]) {
    let mut lo = [0u8; 16];
    let mut hi = [0u8; 16];
    for i in 0..16 {
        lo[i] = table[i];
        hi[i] = table[i << 4];
    }
    (lo, hi)
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn apply_table_avx2(dst: &mut [u8], table: &[u8; 256]) {
    use std::arch::x86_64::*;

    let (lo, hi) = nibble_tables(table);
    let lo_tbl = _mm256_broadcastsi128_si256(_mm_loadu_si128(lo.as_ptr() as *const __m128i));
    let hi_tbl = _mm256_broadcastsi128_si256(_mm_loadu_si128(hi.as_ptr() as *const __m128i));
    let mask = _mm256_set1_epi8(0x0f);

    let len = dst.len();
    let body = len - len % 32;
    let mut off = 0;
    while off < body {
        let ptr = dst.as_mut_ptr().add(off) as *mut __m256i;
        let v = _mm256_loadu_si256(ptr as *const __m256i);
        let l = _mm256_and_si256(v, mask);
        let h = _mm256_and_si256(_mm256_srli_epi64(v, 4), mask);
        let p = _mm256_xor_si256(_mm256_shuffle_epi8(lo_tbl, l), _mm256_shuffle_epi8(hi_tbl, h));
        _mm256_storeu_si256(ptr, p);
        off += 32;
    }
    apply_table_scalar(&mut dst[body..], table);
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn xor_apply_table_avx2(dst: &mut [u8], src: &[u8], table: &[u8; 256]) {
    use std::arch::x86_64::*;

    let (lo, hi) = nibble_tables(table);
    let lo_tbl = _mm256_broadcastsi128_si256(_mm_loadu_si128(lo.as_ptr() as *const __m128i));
    let hi_tbl = _mm256_broadcastsi128_si256(_mm_loadu_si128(hi.as_ptr() as *const __m128i));
    let mask = _mm256_set1_epi8(0x0f);

    let len = dst.len().min(src.len());
    let body = len - len % 32;
    let mut off = 0;
    while off < body {
        let s = _mm256_loadu_si256(src.as_ptr().add(off) as *const __m256i);
        let dptr = dst.as_mut_ptr().add(off) as *mut __m256i;
        let d = _mm256_loadu_si256(dptr as *const __m256i);
        let l = _mm256_and_si256(s, mask);
        let h = _mm256_and_si256(_mm256_srli_epi64(s, 4), mask);
        let p = _mm256_xor_si256(_mm256_shuffle_epi8(lo_tbl, l), _mm256_shuffle_epi8(hi_tbl, h));
        _mm256_storeu_si256(dptr, _mm256_xor_si256(d, p));
        off += 32;
    }
    xor_apply_table_scalar(&mut dst[body..len], &src[body..len], table);
}
