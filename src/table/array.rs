//! Contiguous array buckets

use super::entry::Entry;
use super::storage::{BucketStorage, EntryId, GrowthPolicy};
use crate::error::{Result, TableError};
use crate::simd::SMALL_KEY_LEN;

/// One growable array of entries per bucket.
///
/// Appending may reallocate the bucket, which moves every entry in it; the
/// borrow checker keeps references from outliving that.
#[derive(Debug, Clone, Default)]
pub struct ArrayBuckets<const N: usize = SMALL_KEY_LEN> {
    buckets: Vec<Vec<Entry<N>>>,
}

impl<const N: usize> BucketStorage<N> for ArrayBuckets<N> {
    type Iter<'a> = std::slice::Iter<'a, Entry<N>>;

    const NAME: &'static str = "array";

    fn with_buckets(count: usize) -> Result<Self> {
        let mut buckets = Vec::new();
        buckets
            .try_reserve_exact(count)
            .map_err(|_| {
                TableError::out_of_memory(count.saturating_mul(std::mem::size_of::<Vec<Entry<N>>>()))
            })?;
        buckets.resize_with(count, Vec::new);
        Ok(Self { buckets })
    }

    #[inline]
    fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    fn bucket_len(&self, bucket: usize) -> usize {
        self.buckets[bucket].len()
    }

    #[inline]
    fn iter_bucket(&self, bucket: usize) -> Self::Iter<'_> {
        self.buckets[bucket].iter()
    }

    #[inline]
    fn position<F>(&self, bucket: usize, pred: F) -> Option<EntryId>
    where
        F: FnMut(&Entry<N>) -> bool,
    {
        self.buckets[bucket]
            .iter()
            .position(pred)
            .map(|slot| EntryId { bucket, slot })
    }

    #[inline]
    fn get(&self, id: EntryId) -> &Entry<N> {
        &self.buckets[id.bucket][id.slot]
    }

    #[inline]
    fn get_mut(&mut self, id: EntryId) -> &mut Entry<N> {
        &mut self.buckets[id.bucket][id.slot]
    }

    fn push(&mut self, bucket: usize, entry: Entry<N>, growth: GrowthPolicy) -> Result<EntryId> {
        let entries = &mut self.buckets[bucket];
        growth.reserve_one(entries)?;
        entries.push(entry);
        Ok(EntryId {
            bucket,
            slot: entries.len() - 1,
        })
    }

    fn total_len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }
}

impl<const N: usize> ArrayBuckets<N> {
    /// Allocated entry slots of `bucket`
    pub fn bucket_capacity(&self, bucket: usize) -> usize {
        self.buckets[bucket].capacity()
    }

    #[cfg(test)]
    pub(crate) fn bucket_mut(&mut self, bucket: usize) -> &mut Vec<Entry<N>> {
        &mut self.buckets[bucket]
    }
}
