//! CRC-32 string hashes
//!
//! - [`crc32`]: table-driven software CRC-32 (IEEE polynomial, reflected),
//!   init and final XOR with all ones
//! - [`crc32_block`]: hardware CRC over zero-padded 8-byte words using
//!   SSE4.2 `crc32q` or the ARMv8 CRC32 extension; inline key blocks feed it
//!   two, four or eight words depending on their width
//!
//! The hardware instruction computes CRC-32C (Castagnoli), so its values differ
//! from the software table. When no instruction is available, `crc32_block`
//! falls back to the software CRC of the padded block. Hash values are therefore
//! only stable for a fixed CPU capability set, which is enough for a table that
//! lives inside one process.

use crate::system::get_cpu_features;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

#[cfg(target_arch = "aarch64")]
use std::arch::aarch64::*;

/// Reflected CRC-32 (IEEE 802.3) polynomial
const CRC32_POLY: u32 = 0xEDB8_8320;

/// Width of one hardware CRC step
pub const CRC_WORD_LEN: usize = 8;

static CRC32_TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ CRC32_POLY
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Table-driven software CRC-32 of `bytes`
pub fn crc32(bytes: &[u8]) -> u64 {
    let crc = bytes.iter().fold(0xFFFF_FFFFu32, |crc, &byte| {
        (crc >> 8) ^ CRC32_TABLE[((crc ^ u32::from(byte)) & 0xFF) as usize]
    });
    u64::from(crc ^ 0xFFFF_FFFF)
}

/// Hardware CRC over a zero-padded block.
///
/// The caller guarantees `block` is zero-padded to a multiple of
/// [`CRC_WORD_LEN`]; any trailing partial word is still folded in byte by byte.
/// Falls back to [`crc32`] when the CPU has no CRC instruction.
pub fn crc32_block(block: &[u8]) -> u64 {
    debug_assert_eq!(block.len() % CRC_WORD_LEN, 0, "block is not word padded");

    #[cfg(target_arch = "x86_64")]
    if get_cpu_features().has_sse42 {
        // SAFETY: SSE4.2 detected at runtime.
        return unsafe { crc32_block_sse42(block) };
    }

    #[cfg(target_arch = "aarch64")]
    if get_cpu_features().has_crc32 {
        // SAFETY: CRC extension detected at runtime.
        return unsafe { crc32_block_arm(block) };
    }

    crc32(block)
}

/// Whether [`crc32_block`] runs on a hardware instruction
pub fn has_hardware_crc() -> bool {
    let features = get_cpu_features();
    (cfg!(target_arch = "x86_64") && features.has_sse42)
        || (cfg!(target_arch = "aarch64") && features.has_crc32)
}

#[inline]
fn word_at(chunk: &[u8]) -> u64 {
    let mut word = [0u8; CRC_WORD_LEN];
    word.copy_from_slice(chunk);
    u64::from_le_bytes(word)
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse4.2")]
unsafe fn crc32_block_sse42(block: &[u8]) -> u64 {
    let mut crc: u64 = 0xFFFF_FFFF;
    let chunks = block.chunks_exact(CRC_WORD_LEN);
    let tail = chunks.remainder();
    for chunk in chunks {
        crc = _mm_crc32_u64(crc, word_at(chunk));
    }
    let mut crc = crc as u32;
    for &byte in tail {
        crc = _mm_crc32_u8(crc, byte);
    }
    u64::from(crc)
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "crc")]
unsafe fn crc32_block_arm(block: &[u8]) -> u64 {
    let mut crc: u32 = 0xFFFF_FFFF;
    let chunks = block.chunks_exact(CRC_WORD_LEN);
    let tail = chunks.remainder();
    for chunk in chunks {
        crc = __crc32cd(crc, word_at(chunk));
    }
    for &byte in tail {
        crc = __crc32cb(crc, byte);
    }
    u64::from(crc)
}
