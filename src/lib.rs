//! # Wordtable: Fixed-Bucket Hash Table for Short String Keys
//!
//! A hash table tuned for word counting: millions of lookups of short keys
//! against a table whose bucket count is chosen once, up front.
//!
//! ## Key Features
//!
//! - **Pluggable hashing**: additive checksum, polynomial rolling hash,
//!   software CRC-32, hardware CRC over padded blocks, AHash
//! - **Inline short keys**: keys under the inline width (16 bytes by default,
//!   32 or 64 through a const parameter) live inside the entry and are
//!   compared with SSE2, AVX2 or NEON instructions picked at runtime
//! - **Long-key overflow**: longer keys go to a single linearly scanned array
//! - **Two layouts**: contiguous array buckets or head-inserted chains behind
//!   one [`BucketStorage`] strategy
//! - **Diagnostics**: structural verification, textual dumps, occupancy
//!   statistics with a bar chart, per-bucket export to a file
//!
//! ## Quick Start
//!
//! ```rust
//! use wordtable::{HashTable, Location};
//!
//! let mut table = HashTable::new(4, 1500)?;
//! table.insert(b"cat", &1u32.to_ne_bytes())?;
//! table.insert(b"dog", &2u32.to_ne_bytes())?;
//! table.insert(b"cat", &5u32.to_ne_bytes())?;
//!
//! assert_eq!(table.len(), 2);
//! assert_eq!(table.find(b"cat"), Some(&5u32.to_ne_bytes()[..]));
//! assert_eq!(table.find(b"fox"), None);
//! assert_eq!(table.locate(b"a key of twenty bytes"), Location::Overflow);
//!
//! table.verify()?;
//! let stats = table.distribution();
//! assert_eq!(stats.total, 2);
//! # Ok::<(), wordtable::TableError>(())
//! ```
//!
//! Neither layout supports removal or resizing, and the table has no internal
//! locking: shared references may be read from many threads, mutation needs
//! exclusive access.

#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod config;
pub mod error;
pub mod hash;
pub mod simd;
pub mod statistics;
pub mod system;
pub mod table;

pub use config::{Config, TableConfig, TableConfigBuilder};
pub use error::{Result, TableError};
pub use hash::HashKind;
pub use simd::{KeyBlock, KeyComparator, SimdTier, SMALL_KEY_LEN, SUPPORTED_KEY_WIDTHS};
pub use statistics::BucketDistribution;
pub use table::{
    ArrayBuckets, BucketStorage, ChainedBuckets, ChainedHashTable, Entry, GrowthPolicy,
    HashTable, Location, VerifyLevel, WideChainedHashTable, WideHashTable,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Check if key comparison runs on vector instructions on this CPU
pub fn has_simd_support() -> bool {
    simd::get_global_comparator().tier() != SimdTier::Scalar
}

/// Initialize the library: logs the version and the detected key comparison tier
pub fn init() {
    log::debug!(
        "Initializing wordtable v{} (key compare: {}, hardware CRC: {})",
        VERSION,
        simd::get_global_comparator().tier().name(),
        hash::has_hardware_crc()
    );
}
