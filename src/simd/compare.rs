//! Vector-width key comparison with runtime tier selection
//!
//! Two [`KeyBlock`]s are equal when the byte-wise equality mask of their
//! vector registers is all ones. One implementation exists per supported
//! instruction set plus a scalar fallback; the tier is picked once from the
//! detected CPU features. Blocks wider than one register are compared a
//! register at a time.

use super::key_block::KeyBlock;
use crate::system::{get_cpu_features, CpuFeature, CpuFeatureSet};
use std::sync::OnceLock;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

#[cfg(target_arch = "aarch64")]
use std::arch::aarch64::*;

/// Key comparison implementation tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimdTier {
    /// 64-bit word compares
    Scalar,
    /// x86_64 SSE2 `pcmpeqb` + `pmovmskb`, 16 bytes per step
    Sse2,
    /// x86_64 AVX2 `vpcmpeqb` + `vpmovmskb`, 32 bytes per step
    Avx2,
    /// AArch64 NEON `cmeq` + `uminv`, 16 bytes per step
    Neon,
}

impl SimdTier {
    /// Short lowercase name used in logs and dumps
    pub fn name(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Sse2 => "sse2",
            Self::Avx2 => "avx2",
            Self::Neon => "neon",
        }
    }

    /// Bytes compared per instruction
    pub fn register_width(self) -> usize {
        match self {
            Self::Scalar => 8,
            Self::Sse2 | Self::Neon => 16,
            Self::Avx2 => 32,
        }
    }
}

/// Compares inline key blocks using the best available instructions
#[derive(Debug, Clone, Copy)]
pub struct KeyComparator {
    tier: SimdTier,
}

impl KeyComparator {
    /// Creates a comparator for the CPU this process runs on
    pub fn new() -> Self {
        Self::for_features(get_cpu_features())
    }

    /// Creates a comparator restricted to the given feature set
    pub fn for_features(features: &CpuFeatureSet) -> Self {
        Self {
            tier: Self::select_optimal_tier(features),
        }
    }

    /// Creates a comparator that never uses vector instructions
    pub fn scalar() -> Self {
        Self {
            tier: SimdTier::Scalar,
        }
    }

    fn select_optimal_tier(features: &CpuFeatureSet) -> SimdTier {
        #[cfg(target_arch = "x86_64")]
        {
            if features.has_feature(CpuFeature::AVX2) {
                return SimdTier::Avx2;
            }
            if features.has_feature(CpuFeature::SSE2) {
                return SimdTier::Sse2;
            }
        }

        #[cfg(target_arch = "aarch64")]
        if features.has_feature(CpuFeature::NEON) {
            return SimdTier::Neon;
        }

        let _ = features;
        SimdTier::Scalar
    }

    /// Returns the selected tier
    pub fn tier(&self) -> SimdTier {
        self.tier
    }

    /// Bit `i` is set when byte `i` of both blocks is equal
    pub fn equality_mask<const N: usize>(&self, a: &KeyBlock<N>, b: &KeyBlock<N>) -> u64 {
        match self.tier {
            // SAFETY: the Avx2 tier is only selected when AVX2 was detected.
            #[cfg(target_arch = "x86_64")]
            SimdTier::Avx2 if N % 32 == 0 => unsafe { avx2_equality_mask(a, b) },
            // SAFETY: both x86 vector tiers imply SSE2.
            #[cfg(target_arch = "x86_64")]
            SimdTier::Avx2 | SimdTier::Sse2 => unsafe { sse2_equality_mask(a, b) },
            // SAFETY: the Neon tier is only selected when NEON was detected.
            #[cfg(target_arch = "aarch64")]
            SimdTier::Neon => unsafe { neon_equality_mask(a, b) },
            _ => scalar_equality_mask(a, b),
        }
    }

    /// Whether two blocks hold identical bytes
    #[inline]
    pub fn blocks_equal<const N: usize>(&self, a: &KeyBlock<N>, b: &KeyBlock<N>) -> bool {
        match self.tier {
            #[cfg(target_arch = "x86_64")]
            SimdTier::Avx2 | SimdTier::Sse2 => {
                self.equality_mask(a, b) == KeyBlock::<N>::ALL_EQUAL_MASK
            }
            // SAFETY: the Neon tier is only selected when NEON was detected.
            #[cfg(target_arch = "aarch64")]
            SimdTier::Neon => unsafe { neon_blocks_equal(a, b) },
            _ => scalar_blocks_equal(a, b),
        }
    }
}

impl Default for KeyComparator {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_COMPARATOR: OnceLock<KeyComparator> = OnceLock::new();

/// Gets the process-wide comparator for the detected CPU
pub fn get_global_comparator() -> &'static KeyComparator {
    GLOBAL_COMPARATOR.get_or_init(KeyComparator::new)
}

// =============================================================================
// SCALAR FALLBACK
// =============================================================================

#[inline]
fn scalar_blocks_equal<const N: usize>(a: &KeyBlock<N>, b: &KeyBlock<N>) -> bool {
    a.words().zip(b.words()).fold(0u64, |diff, (x, y)| diff | (x ^ y)) == 0
}

fn scalar_equality_mask<const N: usize>(a: &KeyBlock<N>, b: &KeyBlock<N>) -> u64 {
    a.as_bytes()
        .iter()
        .zip(b.as_bytes())
        .enumerate()
        .fold(0u64, |mask, (i, (x, y))| mask | (u64::from(x == y) << i))
}

// =============================================================================
// SSE2 / AVX2 IMPLEMENTATIONS
// =============================================================================

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse2")]
unsafe fn sse2_equality_mask<const N: usize>(a: &KeyBlock<N>, b: &KeyBlock<N>) -> u64 {
    let mut mask = 0u64;
    for offset in (0..N).step_by(16) {
        // SAFETY: KeyBlock is 16-byte aligned and N is a multiple of 16.
        let lane = unsafe {
            let va = _mm_load_si128(a.as_ptr().add(offset).cast::<__m128i>());
            let vb = _mm_load_si128(b.as_ptr().add(offset).cast::<__m128i>());
            _mm_movemask_epi8(_mm_cmpeq_epi8(va, vb)) as u32
        };
        mask |= u64::from(lane) << offset;
    }
    mask
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn avx2_equality_mask<const N: usize>(a: &KeyBlock<N>, b: &KeyBlock<N>) -> u64 {
    let mut mask = 0u64;
    for offset in (0..N).step_by(32) {
        // SAFETY: callers only pass widths that are a multiple of 32.
        let lane = unsafe {
            let va = _mm256_loadu_si256(a.as_ptr().add(offset).cast::<__m256i>());
            let vb = _mm256_loadu_si256(b.as_ptr().add(offset).cast::<__m256i>());
            _mm256_movemask_epi8(_mm256_cmpeq_epi8(va, vb)) as u32
        };
        mask |= u64::from(lane) << offset;
    }
    mask
}

// =============================================================================
// NEON IMPLEMENTATION
// =============================================================================

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
unsafe fn neon_blocks_equal<const N: usize>(a: &KeyBlock<N>, b: &KeyBlock<N>) -> bool {
    (0..N).step_by(16).all(|offset| {
        // SAFETY: offset + 16 <= N readable bytes in both blocks.
        unsafe {
            let eq = vceqq_u8(
                vld1q_u8(a.as_ptr().add(offset)),
                vld1q_u8(b.as_ptr().add(offset)),
            );
            vminvq_u8(eq) == 0xFF
        }
    })
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
unsafe fn neon_equality_mask<const N: usize>(a: &KeyBlock<N>, b: &KeyBlock<N>) -> u64 {
    let mut mask = 0u64;
    let mut lanes = [0u8; 16];
    for offset in (0..N).step_by(16) {
        // SAFETY: offset + 16 <= N readable bytes; `lanes` holds 16 bytes.
        unsafe {
            let eq = vceqq_u8(
                vld1q_u8(a.as_ptr().add(offset)),
                vld1q_u8(b.as_ptr().add(offset)),
            );
            vst1q_u8(lanes.as_mut_ptr(), eq);
        }
        for (i, &lane) in lanes.iter().enumerate() {
            mask |= u64::from(lane & 1) << (offset + i);
        }
    }
    mask
}
