//! Key/value entries with inline short keys and small values

use crate::error::{Result, TableError};
use crate::simd::{KeyBlock, KeyComparator, SMALL_KEY_LEN};

/// Values up to this many bytes are stored inside the entry
pub const INLINE_VALUE_LEN: usize = 16;

/// Key storage of one entry; the variant is fixed when the entry is created.
#[derive(Debug, Clone)]
pub enum StoredKey<const N: usize = SMALL_KEY_LEN> {
    /// Keys shorter than the inline width `N`, zero-padded in place
    Inline(KeyBlock<N>),
    /// Keys of `N` bytes or more, in an exact-size heap buffer
    Heap(Box<[u8]>),
}

/// Value storage of one entry
#[derive(Debug, Clone)]
pub enum ValueSlot {
    /// Values of at most [`INLINE_VALUE_LEN`] bytes
    Inline {
        /// Live prefix length of `bytes`
        len: u8,
        /// Backing bytes
        bytes: [u8; INLINE_VALUE_LEN],
    },
    /// Larger values, in an exact-size heap buffer
    Heap(Box<[u8]>),
}

impl ValueSlot {
    /// A zero-filled slot of `size` bytes
    pub fn zeroed(size: usize) -> Result<Self> {
        if size <= INLINE_VALUE_LEN {
            Ok(Self::Inline {
                len: size as u8,
                bytes: [0; INLINE_VALUE_LEN],
            })
        } else {
            let mut buf = Vec::new();
            buf.try_reserve_exact(size)
                .map_err(|_| TableError::out_of_memory(size))?;
            buf.resize(size, 0);
            Ok(Self::Heap(buf.into_boxed_slice()))
        }
    }

    /// Live value bytes
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Self::Inline { len, bytes } => &bytes[..usize::from(*len)],
            Self::Heap(buf) => buf,
        }
    }

    /// Live value bytes, mutable
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        match self {
            Self::Inline { len, bytes } => &mut bytes[..usize::from(*len)],
            Self::Heap(buf) => buf,
        }
    }

    /// Whether the storage choice matches a value of `size` bytes
    pub fn is_populated_for(&self, size: usize) -> bool {
        match self {
            Self::Inline { len, .. } => size <= INLINE_VALUE_LEN && usize::from(*len) == size,
            Self::Heap(buf) => size > INLINE_VALUE_LEN && buf.len() == size,
        }
    }
}

/// One key/value pair stored in a bucket or in the overflow array
#[derive(Debug, Clone)]
pub struct Entry<const N: usize = SMALL_KEY_LEN> {
    key: StoredKey<N>,
    /// Cached key length, compared before any byte comparison
    len: usize,
    value: ValueSlot,
}

impl<const N: usize> Entry<N> {
    /// Creates an entry for a short key with a zeroed value
    pub(crate) fn short(block: KeyBlock<N>, len: usize, value_size: usize) -> Result<Self> {
        debug_assert!(len < N);
        Ok(Self {
            key: StoredKey::Inline(block),
            len,
            value: ValueSlot::zeroed(value_size)?,
        })
    }

    /// Creates an entry for a long key with a zeroed value
    pub(crate) fn long(key: &[u8], value_size: usize) -> Result<Self> {
        debug_assert!(key.len() >= N);
        let mut buf = Vec::new();
        buf.try_reserve_exact(key.len())
            .map_err(|_| TableError::out_of_memory(key.len()))?;
        buf.extend_from_slice(key);
        Ok(Self {
            key: StoredKey::Heap(buf.into_boxed_slice()),
            len: key.len(),
            value: ValueSlot::zeroed(value_size)?,
        })
    }

    /// Key bytes, without padding
    #[inline]
    pub fn key(&self) -> &[u8] {
        match &self.key {
            StoredKey::Inline(block) => block.key(self.len.min(N)),
            StoredKey::Heap(buf) => buf,
        }
    }

    /// Cached key length
    #[inline]
    pub fn key_len(&self) -> usize {
        self.len
    }

    /// Key storage
    #[inline]
    pub fn stored_key(&self) -> &StoredKey<N> {
        &self.key
    }

    /// Value bytes
    #[inline]
    pub fn value(&self) -> &[u8] {
        self.value.as_slice()
    }

    /// Value bytes, mutable
    #[inline]
    pub fn value_mut(&mut self) -> &mut [u8] {
        self.value.as_mut_slice()
    }

    /// Value storage
    #[inline]
    pub fn value_slot(&self) -> &ValueSlot {
        &self.value
    }

    /// Short-key equality: length first, then one vector compare
    #[inline]
    pub(crate) fn matches_short(&self, block: &KeyBlock<N>, len: usize, cmp: &KeyComparator) -> bool {
        match &self.key {
            StoredKey::Inline(stored) => self.len == len && cmp.blocks_equal(stored, block),
            StoredKey::Heap(_) => false,
        }
    }

    /// Long-key equality: length first, then a byte-wise compare
    #[inline]
    pub(crate) fn matches_long(&self, key: &[u8]) -> bool {
        match &self.key {
            StoredKey::Heap(stored) => self.len == key.len() && **stored == *key,
            StoredKey::Inline(_) => false,
        }
    }

    #[cfg(test)]
    pub(crate) fn set_cached_len(&mut self, len: usize) {
        self.len = len;
    }

    #[cfg(test)]
    pub(crate) fn replace_value_slot(&mut self, value: ValueSlot) {
        self.value = value;
    }
}
