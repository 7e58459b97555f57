//! Fixed-bucket hash table for short string keys
//!
//! Keys shorter than the inline width (by default [`SMALL_KEY_LEN`]) are
//! hashed into one of a fixed number of buckets and stored inline in a
//! [`KeyBlock`], where vector compares decide equality. Longer keys skip
//! hashing and live in one overflow array that is scanned linearly with a
//! length pre-check.
//!
//! The inline width is the const parameter `N` of [`HashTable`]: 16 bytes
//! matches one SSE2/NEON register, 32 one AVX2 register, 64 four 128-bit
//! registers. [`WideHashTable`] names the wider array-layout tables.
//!
//! The bucket layout is a [`BucketStorage`] strategy chosen by type parameter:
//! [`ArrayBuckets`] (contiguous arrays, the default) or [`ChainedBuckets`]
//! (head-inserted chains). Both hold the same logical contents.
//!
//! There is no removal and no rehashing: the bucket count is fixed at
//! construction and entries live until the table is dropped.

mod array;
mod chained;
mod diagnostics;
mod entry;
mod storage;

pub use self::array::ArrayBuckets;
pub use self::chained::{ChainIter, ChainedBuckets};
pub use self::diagnostics::VerifyLevel;
pub use self::entry::{Entry, StoredKey, ValueSlot, INLINE_VALUE_LEN};
pub use self::storage::{BucketStorage, EntryId, GrowthPolicy};

use crate::config::{Config, TableConfig};
use crate::error::{Result, TableError};
use crate::hash::{has_hardware_crc, HashKind};
use crate::simd::{get_global_comparator, KeyBlock, KeyComparator, SimdTier, SMALL_KEY_LEN};
use log::{debug, trace, warn};
use std::fmt;

/// Container a key belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    /// Bucket index selected by the key's hash
    Bucket(usize),
    /// The long-key overflow array
    Overflow,
}

impl Location {
    /// Whether this is the overflow array
    pub fn is_overflow(&self) -> bool {
        matches!(self, Self::Overflow)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bucket(idx) => write!(f, "bucket #{}", idx),
            Self::Overflow => f.write_str("overflow array"),
        }
    }
}

/// Routing decision for one key
enum Probe<const N: usize> {
    Short {
        block: KeyBlock<N>,
        len: usize,
        bucket: usize,
    },
    Long,
}

/// Position of an existing entry
#[derive(Clone, Copy)]
enum Slot {
    Bucket(EntryId),
    Overflow(usize),
}

/// Hash table with fixed bucket count and fixed value size.
///
/// Values are opaque byte blobs of exactly [`value_size`](Self::value_size)
/// bytes. References returned by [`find`](Self::find) or
/// [`access_or_insert_default`](Self::access_or_insert_default) borrow the
/// table, so they cannot be held across a mutation that might move entries:
///
/// ```compile_fail
/// use wordtable::HashTable;
///
/// let mut table = HashTable::new(4, 8).unwrap();
/// let count = table.access_or_insert_default(b"word").unwrap();
/// table.insert(b"other", &[0; 4]).unwrap();
/// count[0] += 1;
/// ```
///
/// # Examples
///
/// ```
/// use wordtable::HashTable;
///
/// let mut table = HashTable::new(4, 1500)?;
/// for word in ["the", "cat", "the"] {
///     let count = table.access_or_insert_default(word.as_bytes())?;
///     let next = u32::from_ne_bytes((&*count).try_into().unwrap()) + 1;
///     count.copy_from_slice(&next.to_ne_bytes());
/// }
/// assert_eq!(table.len(), 2);
/// assert_eq!(table.find(b"the"), Some(&2u32.to_ne_bytes()[..]));
/// table.verify()?;
/// # Ok::<(), wordtable::TableError>(())
/// ```
#[derive(Debug, Clone)]
pub struct HashTable<S = ArrayBuckets, const N: usize = SMALL_KEY_LEN>
where
    S: BucketStorage<N>,
{
    buckets: S,
    overflow: Vec<Entry<N>>,
    value_size: usize,
    len: usize,
    hash: HashKind,
    comparator: KeyComparator,
    growth: GrowthPolicy,
    verify_level: VerifyLevel,
    verify_on_mutation: bool,
}

/// Table using the chained reference layout
pub type ChainedHashTable = HashTable<ChainedBuckets>;

/// Array-layout table with `N`-byte inline keys, e.g. `WideHashTable<32>`
/// for one AVX2 register per key
pub type WideHashTable<const N: usize> = HashTable<ArrayBuckets<N>, N>;

/// Chained-layout table with `N`-byte inline keys
pub type WideChainedHashTable<const N: usize> = HashTable<ChainedBuckets<N>, N>;

impl HashTable<ArrayBuckets> {
    /// Creates an array-layout table with `buckets_count` buckets holding
    /// values of `value_size` bytes; every other setting takes its default.
    ///
    /// # Errors
    ///
    /// [`TableError::NoInit`] when `buckets_count` is zero,
    /// [`TableError::OutOfMemory`] when the buckets cannot be allocated.
    pub fn new(value_size: usize, buckets_count: usize) -> Result<Self> {
        Self::with_layout(value_size, buckets_count)
    }

    /// Creates an array-layout table from a full configuration
    pub fn with_config(config: TableConfig) -> Result<Self> {
        Self::with_layout_config(config)
    }
}

impl<S: BucketStorage<N>, const N: usize> HashTable<S, N> {
    /// Creates a table in layout `S`, otherwise like [`HashTable::new`]
    pub fn with_layout(value_size: usize, buckets_count: usize) -> Result<Self> {
        Self::with_layout_config(TableConfig {
            value_size,
            buckets_count,
            ..TableConfig::default()
        })
    }

    /// Creates a table in layout `S` from a full configuration.
    ///
    /// # Errors
    ///
    /// [`TableError::NoInit`] when the bucket count is zero,
    /// [`TableError::Configuration`] when the configuration is inconsistent,
    /// [`TableError::OutOfMemory`] when the buckets cannot be allocated.
    pub fn with_layout_config(config: TableConfig) -> Result<Self> {
        if config.buckets_count == 0 {
            return Err(TableError::NoInit);
        }
        config.validate()?;

        let comparator = if config.enable_simd {
            *get_global_comparator()
        } else {
            warn!("SIMD key comparison disabled by configuration");
            KeyComparator::scalar()
        };
        if config.hash == HashKind::HardwareCrc32 && !has_hardware_crc() {
            warn!("No hardware CRC instruction available, falling back to software CRC-32");
        }

        let buckets = S::with_buckets(config.buckets_count)?;
        debug!(
            "Created {} hash table: {} buckets, {}-byte inline keys, value size {}, hash {}, compare tier {}",
            S::NAME,
            config.buckets_count,
            N,
            config.value_size,
            config.hash,
            comparator.tier().name()
        );

        Ok(Self {
            buckets,
            overflow: Vec::new(),
            value_size: config.value_size,
            len: 0,
            hash: config.hash,
            comparator,
            growth: config.growth,
            verify_level: config.verify,
            verify_on_mutation: config.verify_on_mutation,
        })
    }

    /// Number of entries
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the table holds no entries
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Fixed value size in bytes
    #[inline]
    pub fn value_size(&self) -> usize {
        self.value_size
    }

    /// Fixed number of buckets
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.bucket_count()
    }

    /// Hash function in use
    pub fn hash_kind(&self) -> HashKind {
        self.hash
    }

    /// Inline key width; keys this long or longer go to the overflow array
    #[inline]
    pub fn small_key_len(&self) -> usize {
        N
    }

    /// Key comparison tier in use
    pub fn simd_tier(&self) -> SimdTier {
        self.comparator.tier()
    }

    /// Growth policy of buckets and the overflow array
    pub fn growth_policy(&self) -> GrowthPolicy {
        self.growth
    }

    /// Bucket storage layout name
    pub fn layout_name(&self) -> &'static str {
        S::NAME
    }

    /// Number of entries in `bucket`.
    ///
    /// # Panics
    ///
    /// Panics if `bucket >= self.bucket_count()`.
    pub fn bucket_len(&self, bucket: usize) -> usize {
        self.buckets.bucket_len(bucket)
    }

    /// Entry counts of all buckets, in bucket order
    pub fn bucket_sizes(&self) -> Vec<usize> {
        (0..self.bucket_count())
            .map(|b| self.buckets.bucket_len(b))
            .collect()
    }

    /// Number of long-key entries
    pub fn overflow_len(&self) -> usize {
        self.overflow.len()
    }

    /// Container that holds or would hold `key`. Never allocates.
    pub fn locate(&self, key: &[u8]) -> Location {
        match self.probe(key) {
            Probe::Short { bucket, .. } => Location::Bucket(bucket),
            Probe::Long => Location::Overflow,
        }
    }

    /// Value stored under `key`
    pub fn find(&self, key: &[u8]) -> Option<&[u8]> {
        let probe = self.probe(key);
        self.search(key, &probe).map(|slot| self.entry_at(slot).value())
    }

    /// Value stored under `key`, for in-place mutation
    pub fn find_mut(&mut self, key: &[u8]) -> Option<&mut [u8]> {
        let probe = self.probe(key);
        let slot = self.search(key, &probe)?;
        Some(self.entry_at_mut(slot).value_mut())
    }

    /// Whether `key` is present
    pub fn contains_key(&self, key: &[u8]) -> bool {
        let probe = self.probe(key);
        self.search(key, &probe).is_some()
    }

    /// Inserts `key` or overwrites its value.
    ///
    /// # Errors
    ///
    /// [`TableError::OutOfMemory`] when a new entry cannot be allocated; the
    /// table is unchanged then. With `verify_on_mutation`, any violation found
    /// by [`verify`](Self::verify) afterwards. That check runs after the write,
    /// so on such an error the new entry or the overwritten value is kept.
    ///
    /// # Panics
    ///
    /// Panics if `value.len()` differs from [`value_size`](Self::value_size).
    pub fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        assert_eq!(
            value.len(),
            self.value_size,
            "value of {} bytes inserted into a table of {}-byte values",
            value.len(),
            self.value_size
        );
        let slot = self.find_or_create(key)?;
        self.entry_at_mut(slot).value_mut().copy_from_slice(value);
        self.check_after_mutation()
    }

    /// Returns the value of `key`, inserting a zero-filled one first if the key
    /// is new. Repeated calls return the same storage.
    ///
    /// # Errors
    ///
    /// As for [`insert`](Self::insert): an allocation failure leaves the table
    /// unchanged, while a failed `verify_on_mutation` check keeps the entry
    /// that was just created.
    pub fn access_or_insert_default(&mut self, key: &[u8]) -> Result<&mut [u8]> {
        let slot = self.find_or_create(key)?;
        self.check_after_mutation()?;
        Ok(self.entry_at_mut(slot).value_mut())
    }

    /// All `(key, value)` pairs: buckets in index order, then the overflow array
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> + '_ {
        (0..self.bucket_count())
            .flat_map(move |b| self.buckets.iter_bucket(b))
            .chain(self.overflow.iter())
            .map(|entry| (entry.key(), entry.value()))
    }

    fn probe(&self, key: &[u8]) -> Probe<N> {
        if key.len() >= N {
            return Probe::Long;
        }
        let block = KeyBlock::<N>::from_short(key);
        let digest = self.hash.hash_block(&block, key.len());
        Probe::Short {
            block,
            len: key.len(),
            bucket: self.bucket_index(digest),
        }
    }

    #[inline]
    fn bucket_index(&self, digest: u64) -> usize {
        (digest % self.bucket_count() as u64) as usize
    }

    fn search(&self, key: &[u8], probe: &Probe<N>) -> Option<Slot> {
        match probe {
            Probe::Short { block, len, bucket } => {
                let cmp = &self.comparator;
                self.buckets
                    .position(*bucket, |entry| entry.matches_short(block, *len, cmp))
                    .map(Slot::Bucket)
            }
            Probe::Long => self
                .overflow
                .iter()
                .position(|entry| entry.matches_long(key))
                .map(Slot::Overflow),
        }
    }

    fn find_or_create(&mut self, key: &[u8]) -> Result<Slot> {
        let probe = self.probe(key);
        if let Some(slot) = self.search(key, &probe) {
            return Ok(slot);
        }

        let slot = match probe {
            Probe::Short { block, len, bucket } => {
                let entry = Entry::short(block, len, self.value_size)?;
                let id = self.buckets.push(bucket, entry, self.growth)?;
                trace!("New entry \"{}\" in bucket #{}", key.escape_ascii(), bucket);
                Slot::Bucket(id)
            }
            Probe::Long => {
                let entry = Entry::long(key, self.value_size)?;
                self.growth.reserve_one(&mut self.overflow)?;
                self.overflow.push(entry);
                trace!("New entry \"{}\" in overflow array", key.escape_ascii());
                Slot::Overflow(self.overflow.len() - 1)
            }
        };
        self.len += 1;
        Ok(slot)
    }

    fn check_after_mutation(&self) -> Result<()> {
        if self.verify_on_mutation {
            self.verify()?;
        }
        Ok(())
    }

    #[inline]
    fn entry_at(&self, slot: Slot) -> &Entry<N> {
        match slot {
            Slot::Bucket(id) => self.buckets.get(id),
            Slot::Overflow(idx) => &self.overflow[idx],
        }
    }

    #[inline]
    fn entry_at_mut(&mut self, slot: Slot) -> &mut Entry<N> {
        match slot {
            Slot::Bucket(id) => self.buckets.get_mut(id),
            Slot::Overflow(idx) => &mut self.overflow[idx],
        }
    }
}
