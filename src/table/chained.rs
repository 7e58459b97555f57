//! Chained buckets over a shared node arena
//!
//! Each bucket is a singly-linked chain; new entries are linked at the head.
//! Nodes live in one arena and link by index, so there is no per-node
//! allocation and no raw next pointer.

use super::entry::Entry;
use super::storage::{BucketStorage, EntryId, GrowthPolicy};
use crate::error::{Result, TableError};
use crate::simd::SMALL_KEY_LEN;

#[derive(Debug, Clone)]
struct ChainNode<const N: usize> {
    entry: Entry<N>,
    next: Option<usize>,
}

/// Reference layout: per-bucket chains with head insertion
#[derive(Debug, Clone, Default)]
pub struct ChainedBuckets<const N: usize = SMALL_KEY_LEN> {
    nodes: Vec<ChainNode<N>>,
    heads: Vec<Option<usize>>,
    lens: Vec<usize>,
}

/// Walks one chain from its head
pub struct ChainIter<'a, const N: usize = SMALL_KEY_LEN> {
    nodes: &'a [ChainNode<N>],
    cursor: Option<usize>,
}

impl<'a, const N: usize> Iterator for ChainIter<'a, N> {
    type Item = &'a Entry<N>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = &self.nodes[self.cursor?];
        self.cursor = node.next;
        Some(&node.entry)
    }
}

impl<const N: usize> ChainedBuckets<N> {
    fn chain_indices(&self, bucket: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.heads[bucket], move |&idx| self.nodes[idx].next)
    }

    /// Arena slots in use, equal to the number of entries
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

impl<const N: usize> BucketStorage<N> for ChainedBuckets<N> {
    type Iter<'a> = ChainIter<'a, N>;

    const NAME: &'static str = "chained";

    fn with_buckets(count: usize) -> Result<Self> {
        let mut heads = Vec::new();
        let mut lens = Vec::new();
        let bytes = count.saturating_mul(std::mem::size_of::<Option<usize>>() + std::mem::size_of::<usize>());
        heads
            .try_reserve_exact(count)
            .and_then(|_| lens.try_reserve_exact(count))
            .map_err(|_| TableError::out_of_memory(bytes))?;
        heads.resize(count, None);
        lens.resize(count, 0);
        Ok(Self {
            nodes: Vec::new(),
            heads,
            lens,
        })
    }

    #[inline]
    fn bucket_count(&self) -> usize {
        self.heads.len()
    }

    #[inline]
    fn bucket_len(&self, bucket: usize) -> usize {
        self.lens[bucket]
    }

    #[inline]
    fn iter_bucket(&self, bucket: usize) -> Self::Iter<'_> {
        ChainIter {
            nodes: &self.nodes,
            cursor: self.heads[bucket],
        }
    }

    fn position<F>(&self, bucket: usize, mut pred: F) -> Option<EntryId>
    where
        F: FnMut(&Entry<N>) -> bool,
    {
        self.chain_indices(bucket)
            .find(|&idx| pred(&self.nodes[idx].entry))
            .map(|slot| EntryId { bucket, slot })
    }

    #[inline]
    fn get(&self, id: EntryId) -> &Entry<N> {
        &self.nodes[id.slot].entry
    }

    #[inline]
    fn get_mut(&mut self, id: EntryId) -> &mut Entry<N> {
        &mut self.nodes[id.slot].entry
    }

    fn push(&mut self, bucket: usize, entry: Entry<N>, growth: GrowthPolicy) -> Result<EntryId> {
        growth.reserve_one(&mut self.nodes)?;
        let slot = self.nodes.len();
        self.nodes.push(ChainNode {
            entry,
            next: self.heads[bucket],
        });
        self.heads[bucket] = Some(slot);
        self.lens[bucket] += 1;
        Ok(EntryId { bucket, slot })
    }

    fn total_len(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
impl<const N: usize> ChainedBuckets<N> {
    pub(crate) fn set_bucket_len(&mut self, bucket: usize, len: usize) {
        self.lens[bucket] = len;
    }
}
