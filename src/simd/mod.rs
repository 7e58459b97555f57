//! SIMD key storage and comparison
//!
//! - [`KeyBlock`]: a short key zero-padded to 16, 32 or 64 bytes
//! - [`KeyComparator`]: byte-wise vector equality with a scalar fallback,
//!   selected at runtime via [`SimdTier`] (SSE2, AVX2 or NEON)

mod compare;
mod key_block;

pub use compare::{get_global_comparator, KeyComparator, SimdTier};
pub use key_block::{KeyBlock, SMALL_KEY_LEN, SUPPORTED_KEY_WIDTHS};
