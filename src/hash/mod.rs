//! String hash functions for bucket selection
//!
//! All variants map a byte string to a 64-bit digest and depend only on the
//! key bytes:
//! - [`checksum`]: additive sum of byte values, a deliberately weak baseline
//! - [`djb2`]: polynomial rolling hash (`h = 33 * h + c`, seeded with 5381)
//! - [`crc32`]: table-driven software CRC-32
//! - [`crc32_block`]: hardware CRC over a zero-padded fixed-size block
//! - [`ahash64`]: AHash with fixed seeds
//!
//! [`HashKind`] names a variant so it can be chosen through configuration.

mod crc32;

pub use self::crc32::{crc32, crc32_block, has_hardware_crc, CRC_WORD_LEN};

use crate::error::{Result, TableError};
use crate::simd::{KeyBlock, SMALL_KEY_LEN};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{BuildHasher, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;

/// Seed of the polynomial rolling hash
pub const DJB2_SEED: u64 = 5381;

/// Additive checksum: the sum of all byte values
pub fn checksum(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(0u64, |hash, &byte| hash.wrapping_add(u64::from(byte)))
}

/// Polynomial rolling hash with multiplier 33
pub fn djb2(bytes: &[u8]) -> u64 {
    bytes.iter().fold(DJB2_SEED, |hash, &byte| {
        (hash << 5).wrapping_add(hash).wrapping_add(u64::from(byte))
    })
}

static AHASH_STATE: OnceLock<ahash::RandomState> = OnceLock::new();

/// AHash with fixed seeds, so digests are reproducible within a build
pub fn ahash64(bytes: &[u8]) -> u64 {
    let state = AHASH_STATE.get_or_init(|| {
        ahash::RandomState::with_seeds(
            0x243F_6A88_85A3_08D3,
            0x1319_8A2E_0370_7344,
            0xA409_3822_299F_31D0,
            0x082E_FA98_EC4E_6C89,
        )
    });
    let mut hasher = state.build_hasher();
    hasher.write(bytes);
    hasher.finish()
}

/// Selectable hash function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashKind {
    /// Sum of byte values
    Checksum,
    /// Polynomial rolling hash
    #[default]
    Djb2,
    /// Software table-driven CRC-32
    Crc32,
    /// Hardware CRC over the zero-padded inline key block
    HardwareCrc32,
    /// AHash with fixed seeds
    AHash,
}

impl HashKind {
    /// Every variant, in declaration order
    pub const ALL: [HashKind; 5] = [
        HashKind::Checksum,
        HashKind::Djb2,
        HashKind::Crc32,
        HashKind::HardwareCrc32,
        HashKind::AHash,
    ];

    /// Configuration name of the variant
    pub fn name(self) -> &'static str {
        match self {
            Self::Checksum => "checksum",
            Self::Djb2 => "djb2",
            Self::Crc32 => "crc32",
            Self::HardwareCrc32 => "hardware_crc32",
            Self::AHash => "ahash",
        }
    }

    /// Whether the variant consumes a zero-padded block instead of the raw key
    pub fn uses_padded_block(self) -> bool {
        matches!(self, Self::HardwareCrc32)
    }

    /// Hashes an arbitrary key.
    ///
    /// Block-based variants pad the key with zeros to the next multiple of
    /// [`CRC_WORD_LEN`] (at least one inline block) before hashing.
    pub fn hash(self, key: &[u8]) -> u64 {
        match self {
            Self::Checksum => checksum(key),
            Self::Djb2 => djb2(key),
            Self::Crc32 => crc32(key),
            Self::AHash => ahash64(key),
            Self::HardwareCrc32 if key.len() < SMALL_KEY_LEN => {
                crc32_block(KeyBlock::<SMALL_KEY_LEN>::from_short(key).as_bytes())
            }
            Self::HardwareCrc32 => {
                let padded_len = key.len().next_multiple_of(CRC_WORD_LEN);
                let mut padded = key.to_vec();
                padded.resize(padded_len, 0);
                crc32_block(&padded)
            }
        }
    }

    /// Hashes a short key already held in an inline block.
    ///
    /// Byte-wise variants ignore the padding. [`HashKind::HardwareCrc32`]
    /// hashes the whole block, two, four or eight words for 16-, 32- and
    /// 64-byte blocks, so only 16-byte blocks agree with [`HashKind::hash`].
    #[inline]
    pub fn hash_block<const N: usize>(self, block: &KeyBlock<N>, len: usize) -> u64 {
        match self {
            Self::HardwareCrc32 => crc32_block(block.as_bytes()),
            other => other.hash(block.key(len)),
        }
    }
}

impl fmt::Display for HashKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashKind {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| TableError::configuration(format!("Unknown hash function: {}", s)))
    }
}
