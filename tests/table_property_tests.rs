//! Property-based testing for the hash table
//!
//! Every operation sequence is replayed against a `std::collections::HashMap`
//! model, for both bucket layouts and several hash functions.

use proptest::prelude::*;
use std::collections::HashMap;
use wordtable::{
    ArrayBuckets, BucketStorage, ChainedBuckets, HashKind, HashTable, TableConfig,
    WideChainedHashTable, WideHashTable, SMALL_KEY_LEN,
};

// =============================================================================
// PROPERTY TEST GENERATORS
// =============================================================================

/// Keys clustered around the inline threshold, drawn from a small alphabet so
/// that repeats are common
fn key_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        prop::collection::vec(prop::sample::select(b"abc\0".to_vec()), 0..4),
        prop::collection::vec(any::<u8>(), 0..SMALL_KEY_LEN),
        prop::collection::vec(prop::sample::select(b"xy".to_vec()), SMALL_KEY_LEN - 1..=SMALL_KEY_LEN + 1),
        prop::collection::vec(any::<u8>(), SMALL_KEY_LEN..64),
    ]
}

fn hash_strategy() -> impl Strategy<Value = HashKind> {
    prop::sample::select(HashKind::ALL.to_vec())
}

#[derive(Debug, Clone)]
enum TableOp {
    Insert(Vec<u8>, u32),
    Increment(Vec<u8>),
    Find(Vec<u8>),
}

fn table_ops_strategy() -> impl Strategy<Value = Vec<TableOp>> {
    prop::collection::vec(
        prop_oneof![
            (key_strategy(), any::<u32>()).prop_map(|(k, v)| TableOp::Insert(k, v)),
            key_strategy().prop_map(TableOp::Increment),
            key_strategy().prop_map(TableOp::Find),
        ],
        0..300,
    )
}

fn config(hash: HashKind, buckets_count: usize) -> TableConfig {
    TableConfig {
        buckets_count,
        value_size: 4,
        hash,
        ..TableConfig::default()
    }
}

/// Replays `ops` on a table and on a model, checking every observable result
fn check_against_model<S: BucketStorage<N>, const N: usize>(
    ops: &[TableOp],
    hash: HashKind,
    buckets_count: usize,
) -> Result<(), TestCaseError> {
    let mut table = HashTable::<S, N>::with_layout_config(config(hash, buckets_count)).unwrap();
    let mut model: HashMap<Vec<u8>, u32> = HashMap::new();

    for op in ops {
        match op {
            TableOp::Insert(key, value) => {
                table.insert(key, &value.to_ne_bytes()).unwrap();
                model.insert(key.clone(), *value);
            }
            TableOp::Increment(key) => {
                let slot = table.access_or_insert_default(key).unwrap();
                let next = u32::from_ne_bytes((&*slot).try_into().unwrap()).wrapping_add(1);
                slot.copy_from_slice(&next.to_ne_bytes());
                let counter = model.entry(key.clone()).or_insert(0);
                *counter = counter.wrapping_add(1);
            }
            TableOp::Find(key) => {
                let expected = model.get(key).map(|v| v.to_ne_bytes());
                prop_assert_eq!(table.find(key), expected.as_ref().map(|v| &v[..]));
                prop_assert_eq!(table.contains_key(key), expected.is_some());
            }
        }
        prop_assert_eq!(table.len(), model.len());
    }

    for (key, value) in &model {
        prop_assert_eq!(table.find(key), Some(&value.to_ne_bytes()[..]));
    }
    prop_assert_eq!(table.iter().count(), model.len());
    prop_assert!(table.verify().is_ok());
    Ok(())
}

// =============================================================================
// MODEL EQUIVALENCE
// =============================================================================

proptest! {
    #[test]
    fn prop_array_layout_matches_model(
        ops in table_ops_strategy(),
        hash in hash_strategy(),
        buckets in 1usize..64,
    ) {
        check_against_model::<ArrayBuckets, SMALL_KEY_LEN>(&ops, hash, buckets)?;
    }

    #[test]
    fn prop_chained_layout_matches_model(
        ops in table_ops_strategy(),
        hash in hash_strategy(),
        buckets in 1usize..64,
    ) {
        check_against_model::<ChainedBuckets, SMALL_KEY_LEN>(&ops, hash, buckets)?;
    }

    #[test]
    fn prop_wide_layouts_match_model(
        ops in table_ops_strategy(),
        hash in hash_strategy(),
        buckets in 1usize..64,
    ) {
        check_against_model::<ArrayBuckets<32>, 32>(&ops, hash, buckets)?;
        check_against_model::<ChainedBuckets<64>, 64>(&ops, hash, buckets)?;
    }
}

// =============================================================================
// STRUCTURAL PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn prop_size_is_conserved(
        keys in prop::collection::vec(key_strategy(), 0..200),
        buckets in 1usize..32,
    ) {
        let mut table = HashTable::new(4, buckets).unwrap();
        for key in &keys {
            table.access_or_insert_default(key).unwrap();
            let bucketed: usize = table.bucket_sizes().iter().sum();
            prop_assert_eq!(table.len(), bucketed + table.overflow_len());
        }
    }

    #[test]
    fn prop_upsert_keeps_size(
        key in key_strategy(),
        first in any::<u32>(),
        second in any::<u32>(),
    ) {
        let mut table = HashTable::new(4, 5).unwrap();
        table.insert(&key, &first.to_ne_bytes()).unwrap();
        let size = table.len();
        table.insert(&key, &second.to_ne_bytes()).unwrap();
        prop_assert_eq!(table.len(), size);
        prop_assert_eq!(table.find(&key), Some(&second.to_ne_bytes()[..]));
    }

    #[test]
    fn prop_keys_route_by_length(key in key_strategy(), buckets in 1usize..100) {
        let mut table = HashTable::new(0, buckets).unwrap();
        table.insert(&key, &[]).unwrap();
        if key.len() < SMALL_KEY_LEN {
            prop_assert_eq!(table.overflow_len(), 0);
            prop_assert!(!table.locate(&key).is_overflow());
        } else {
            prop_assert_eq!(table.overflow_len(), 1);
            prop_assert!(table.locate(&key).is_overflow());
        }
    }

    #[test]
    fn prop_wide_keys_route_by_width(key in prop::collection::vec(any::<u8>(), 0..100)) {
        let mut narrow = HashTable::new(0, 7).unwrap();
        let mut wide = WideHashTable::<32>::with_layout(0, 7).unwrap();
        let mut widest = WideChainedHashTable::<64>::with_layout(0, 7).unwrap();
        narrow.insert(&key, &[]).unwrap();
        wide.insert(&key, &[]).unwrap();
        widest.insert(&key, &[]).unwrap();
        prop_assert_eq!(narrow.overflow_len(), usize::from(key.len() >= 16));
        prop_assert_eq!(wide.overflow_len(), usize::from(key.len() >= 32));
        prop_assert_eq!(widest.overflow_len(), usize::from(key.len() >= 64));
        prop_assert!(wide.contains_key(&key) && widest.contains_key(&key));
    }

    #[test]
    fn prop_default_access_is_zeroed_and_stable(
        key in key_strategy(),
        byte in any::<u8>(),
    ) {
        let mut table = HashTable::new(24, 9).unwrap();
        prop_assert!(table.access_or_insert_default(&key).unwrap().iter().all(|&b| b == 0));
        table.access_or_insert_default(&key).unwrap()[23] = byte;
        prop_assert_eq!(table.access_or_insert_default(&key).unwrap()[23], byte);
        prop_assert_eq!(table.len(), 1);
    }

    #[test]
    fn prop_distribution_accounts_for_every_bucketed_key(
        keys in prop::collection::vec(key_strategy(), 0..200),
        buckets in 1usize..50,
    ) {
        let mut table = HashTable::new(0, buckets).unwrap();
        for key in &keys {
            table.insert(key, &[]).unwrap();
        }
        let dist = table.distribution();
        prop_assert_eq!(dist.bucket_count, buckets);
        prop_assert_eq!(dist.total as usize, table.len() - table.overflow_len());
        prop_assert_eq!(dist.bars.iter().sum::<u64>(), dist.total);
        prop_assert_eq!(dist.size_frequencies().iter().sum::<usize>(), buckets);
    }
}
