//! Bucket storage strategy
//!
//! A [`BucketStorage`] owns every bucket of a table and nothing else: hashing,
//! key routing and the overflow array stay in [`HashTable`](super::HashTable).
//! Both layouts hand out [`EntryId`]s so the table can search once and then
//! borrow the matching entry mutably without a second scan.

use super::entry::Entry;
use crate::error::{Result, TableError};
use crate::simd::SMALL_KEY_LEN;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How containers grow when one more entry is appended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthPolicy {
    /// Capacity grows to exactly `len + 1`
    #[default]
    Exact,
    /// Capacity doubles when full
    Amortized,
}

impl GrowthPolicy {
    /// Configuration name of the policy
    pub fn name(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Amortized => "amortized",
        }
    }

    /// Makes room for one more element so the following push cannot reallocate.
    ///
    /// Reports allocation failure instead of aborting; `vec` is untouched then.
    pub fn reserve_one<T>(self, vec: &mut Vec<T>) -> Result<()> {
        if vec.len() < vec.capacity() {
            return Ok(());
        }
        let reserved = match self {
            Self::Exact => vec.try_reserve_exact(1),
            Self::Amortized => vec.try_reserve(1),
        };
        reserved.map_err(|_| {
            TableError::out_of_memory((vec.len() + 1).saturating_mul(std::mem::size_of::<T>()))
        })
    }
}

impl fmt::Display for GrowthPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GrowthPolicy {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "amortized" => Ok(Self::Amortized),
            _ => Err(TableError::configuration(format!(
                "Unknown growth policy: {}",
                s
            ))),
        }
    }
}

/// Handle to an entry inside a [`BucketStorage`].
///
/// Only valid for the storage that produced it and only until that storage is
/// mutated again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryId {
    pub(crate) bucket: usize,
    pub(crate) slot: usize,
}

impl EntryId {
    /// Bucket the entry belongs to
    pub fn bucket(&self) -> usize {
        self.bucket
    }
}

/// Storage strategy for the per-bucket entry collections, holding entries
/// with `N`-byte inline keys
pub trait BucketStorage<const N: usize = SMALL_KEY_LEN>: Sized {
    /// Iterator over one bucket's entries, in scan order
    type Iter<'a>: Iterator<Item = &'a Entry<N>>
    where
        Self: 'a;

    /// Short layout name used in logs and dumps
    const NAME: &'static str;

    /// Allocates `count` empty buckets
    fn with_buckets(count: usize) -> Result<Self>;

    /// Number of buckets
    fn bucket_count(&self) -> usize;

    /// Number of entries in `bucket`
    fn bucket_len(&self, bucket: usize) -> usize;

    /// Entries of `bucket` in scan order; stable until the next push
    fn iter_bucket(&self, bucket: usize) -> Self::Iter<'_>;

    /// First entry of `bucket` satisfying `pred`
    fn position<F>(&self, bucket: usize, pred: F) -> Option<EntryId>
    where
        F: FnMut(&Entry<N>) -> bool;

    /// Entry behind `id`
    fn get(&self, id: EntryId) -> &Entry<N>;

    /// Entry behind `id`, mutable
    fn get_mut(&mut self, id: EntryId) -> &mut Entry<N>;

    /// Appends `entry` to `bucket`, growing storage according to `growth`.
    ///
    /// On error the storage is unchanged.
    fn push(&mut self, bucket: usize, entry: Entry<N>, growth: GrowthPolicy) -> Result<EntryId>;

    /// Total entries across all buckets
    fn total_len(&self) -> usize {
        (0..self.bucket_count()).map(|b| self.bucket_len(b)).sum()
    }
}
