//! Integration tests for the hash table: concrete word-count scenarios, key
//! routing at the inline threshold, distribution export and layout
//! equivalence.

use std::collections::BTreeMap;
use std::thread;
use tempfile::tempdir;
use wordtable::{
    ArrayBuckets, BucketStorage, ChainedHashTable, Config, GrowthPolicy, HashKind, HashTable,
    Location, TableConfig, TableError, WideChainedHashTable, WideHashTable, SMALL_KEY_LEN,
};

fn value(n: u32) -> [u8; 4] {
    n.to_ne_bytes()
}

fn counter(bytes: &[u8]) -> u32 {
    u32::from_ne_bytes(bytes.try_into().unwrap())
}

/// Inserts generated keys until every bucket holds exactly `sizes[b]` short
/// keys, then adds `overflow` long keys.
fn table_with_sizes<S: BucketStorage>(sizes: &[usize], overflow: usize) -> HashTable<S> {
    let mut table = HashTable::<S>::with_layout(4, sizes.len()).unwrap();
    let mut missing = sizes.to_vec();
    for i in 0..100_000u32 {
        if missing.iter().all(|&m| m == 0) {
            break;
        }
        let key = format!("w{}", i);
        if let Location::Bucket(b) = table.locate(key.as_bytes()) {
            if missing[b] > 0 {
                table.insert(key.as_bytes(), &value(i)).unwrap();
                missing[b] -= 1;
            }
        }
    }
    assert!(missing.iter().all(|&m| m == 0), "could not fill buckets");
    for i in 0..overflow {
        let key = format!("overflowing-key-number-{}", i);
        table.insert(key.as_bytes(), &value(0)).unwrap();
    }
    table
}

// =============================================================================
// CONCRETE SCENARIOS
// =============================================================================

#[test]
fn test_scenario_upsert_small_table() {
    let mut table = HashTable::new(4, 3).unwrap();
    table.insert(b"cat", &value(1)).unwrap();
    table.insert(b"dog", &value(2)).unwrap();
    table.insert(b"cat", &value(5)).unwrap();

    assert_eq!(table.len(), 2);
    assert_eq!(table.find(b"cat"), Some(&value(5)[..]));
    assert_eq!(table.find(b"dog"), Some(&value(2)[..]));
    assert_eq!(table.find(b"fox"), None);
    table.verify().unwrap();
}

#[test]
fn test_scenario_long_key() {
    let mut table = HashTable::new(4, 3).unwrap();
    let key = b"twenty-byte-long-key";
    assert_eq!(key.len(), 20);
    table.insert(key, &value(7)).unwrap();

    assert_eq!(table.find(key), Some(&value(7)[..]));
    assert_eq!(table.find(b"another-20-byte-key!"), None);
    assert_eq!(table.overflow_len(), 1);
    table.verify().unwrap();
}

#[test]
fn test_scenario_distribution_file() {
    let table = table_with_sizes::<ArrayBuckets>(&[2, 0, 1, 3], 1);
    let dir = tempdir().unwrap();
    let path = dir.path().join("distribution.txt");
    table.dump_distribution_to_file(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().collect::<Vec<_>>(), vec!["2", "0", "1", "3", "1"]);
    assert_eq!(text, "2\n0\n1\n3\n1\n");
}

#[test]
fn test_scenario_membership_only() {
    let mut table = HashTable::new(0, 1).unwrap();
    let words: [&[u8]; 5] = [b"a", b"b", b"c", b"a longer key past the threshold", b""];
    for word in words {
        table.insert(word, &[]).unwrap();
    }
    for word in words {
        table.insert(word, &[]).unwrap();
    }

    assert_eq!(table.len(), 5);
    for word in words {
        assert_eq!(table.find(word), Some(&[][..]));
    }
    assert_eq!(table.find(b"d"), None);
    assert_eq!(table.bucket_len(0), 4);
    table.verify().unwrap();
}

// =============================================================================
// ROUTING AND ROUND TRIPS
// =============================================================================

#[test]
fn test_length_boundary_routing() {
    let mut table = HashTable::new(4, 16).unwrap();
    let short = vec![b'k'; SMALL_KEY_LEN - 1];
    let long = vec![b'k'; SMALL_KEY_LEN];

    table.insert(&short, &value(1)).unwrap();
    table.insert(&long, &value(2)).unwrap();

    let Location::Bucket(bucket) = table.locate(&short) else {
        panic!("short key routed to overflow");
    };
    assert_eq!(table.bucket_len(bucket), 1);
    assert_eq!(table.locate(&long), Location::Overflow);
    assert_eq!(table.overflow_len(), 1);
    assert_eq!(table.find(&short), Some(&value(1)[..]));
    assert_eq!(table.find(&long), Some(&value(2)[..]));
}

#[test]
fn test_round_trip_edge_keys() {
    let keys: Vec<Vec<u8>> = vec![
        Vec::new(),
        vec![0u8; 1],
        vec![b'x'; SMALL_KEY_LEN - 1],
        vec![b'x'; SMALL_KEY_LEN],
        vec![0xFF; 200],
    ];
    let mut table = HashTable::new(4, 7).unwrap();
    for (i, key) in keys.iter().enumerate() {
        table.insert(key, &value(i as u32 + 10)).unwrap();
    }
    for (i, key) in keys.iter().enumerate() {
        assert_eq!(table.find(key), Some(&value(i as u32 + 10)[..]));
    }
    assert_eq!(table.len(), keys.len());
}

#[test]
fn test_word_count() {
    let text = "the quick brown fox jumps over the lazy dog the end \
                antidisestablishmentarianism antidisestablishmentarianism";
    let mut table = HashTable::new(4, 1500).unwrap();
    for word in text.split_whitespace() {
        let slot = table.access_or_insert_default(word.as_bytes()).unwrap();
        let next = counter(slot) + 1;
        slot.copy_from_slice(&next.to_ne_bytes());
    }

    assert_eq!(counter(table.find(b"the").unwrap()), 3);
    assert_eq!(counter(table.find(b"fox").unwrap()), 1);
    assert_eq!(counter(table.find(b"antidisestablishmentarianism").unwrap()), 2);
    assert_eq!(table.overflow_len(), 1);
    assert_eq!(table.len(), 10);
    table.verify().unwrap();
}

#[test]
fn test_word_count_with_wide_inline_keys() {
    let text = "the quick brown fox jumps over the lazy dog the end \
                antidisestablishmentarianism antidisestablishmentarianism \
                pneumonoultramicroscopicsilicovolcanoconiosis";
    let config = TableConfig {
        buckets_count: 97,
        hash: HashKind::HardwareCrc32,
        ..TableConfig::default()
    };
    let mut wide = WideHashTable::<32>::with_layout_config(config.clone()).unwrap();
    let mut widest = WideChainedHashTable::<64>::with_layout_config(config).unwrap();
    for word in text.split_whitespace() {
        for slot in [
            wide.access_or_insert_default(word.as_bytes()).unwrap(),
            widest.access_or_insert_default(word.as_bytes()).unwrap(),
        ] {
            let next = counter(slot) + 1;
            slot.copy_from_slice(&next.to_ne_bytes());
        }
    }

    // 28 bytes fits a 32-byte block, 45 bytes only a 64-byte one
    assert_eq!(wide.overflow_len(), 1);
    assert_eq!(widest.overflow_len(), 0);
    let long_word = b"antidisestablishmentarianism";
    assert_eq!(counter(wide.find(long_word).unwrap()), 2);
    assert_eq!(counter(widest.find(long_word).unwrap()), 2);
    assert_eq!(counter(wide.find(b"the").unwrap()), 3);
    assert_eq!(wide.len(), 11);
    assert_eq!(widest.len(), 11);
    wide.verify().unwrap();
    widest.verify().unwrap();
}

#[test]
fn test_find_mut_increments_in_place() {
    let mut table = ChainedHashTable::with_layout(4, 8).unwrap();
    table.insert(b"hits", &value(0)).unwrap();
    for _ in 0..5 {
        let slot = table.find_mut(b"hits").unwrap();
        let next = counter(slot) + 1;
        slot.copy_from_slice(&next.to_ne_bytes());
    }
    assert_eq!(counter(table.find(b"hits").unwrap()), 5);
}

#[test]
fn test_zero_buckets_rejected() {
    assert!(matches!(HashTable::new(4, 0), Err(TableError::NoInit)));
    let config = TableConfig {
        buckets_count: 0,
        ..TableConfig::default()
    };
    assert!(matches!(ChainedHashTable::with_layout_config(config), Err(TableError::NoInit)));
}

// =============================================================================
// LAYOUTS AND CONFIGURATION
// =============================================================================

#[test]
fn test_layouts_hold_identical_contents() {
    let mut array = HashTable::new(4, 31).unwrap();
    let mut chained = ChainedHashTable::with_layout(4, 31).unwrap();
    for i in 0..2000u32 {
        let key = if i % 50 == 0 {
            format!("a rather long key to overflow {}", i)
        } else {
            format!("k{}", i % 700)
        };
        array.insert(key.as_bytes(), &value(i)).unwrap();
        chained.insert(key.as_bytes(), &value(i)).unwrap();
    }

    let collect = |pairs: Vec<(&[u8], &[u8])>| -> BTreeMap<Vec<u8>, Vec<u8>> {
        pairs.into_iter().map(|(k, v)| (k.to_vec(), v.to_vec())).collect()
    };
    assert_eq!(collect(array.iter().collect()), collect(chained.iter().collect()));
    assert_eq!(array.bucket_sizes(), chained.bucket_sizes());
    assert_eq!(array.overflow_len(), chained.overflow_len());
    assert_eq!(array.len(), chained.len());
    array.verify().unwrap();
    chained.verify().unwrap();
}

#[test]
fn test_presets_build_working_tables() {
    for config in [
        TableConfig::performance_preset(),
        TableConfig::memory_preset(),
        TableConfig::debug_preset(),
        TableConfig::balanced_preset(),
    ] {
        let mut table = HashTable::with_config(config.clone()).unwrap();
        for i in 0..300u32 {
            table.insert(format!("word{}", i).as_bytes(), &value(i)).unwrap();
        }
        assert_eq!(table.len(), 300);
        assert_eq!(table.growth_policy(), config.growth);
        table.verify().unwrap();
    }
}

#[test]
fn test_hash_kinds_spread_keys() {
    for hash in [HashKind::Djb2, HashKind::Crc32, HashKind::HardwareCrc32, HashKind::AHash] {
        let config = TableConfig::builder()
            .buckets_count(64)
            .hash(hash)
            .growth(GrowthPolicy::Amortized)
            .build()
            .unwrap();
        let mut table = HashTable::with_config(config).unwrap();
        for i in 0..6400u32 {
            table.insert(format!("word{}", i).as_bytes(), &value(i)).unwrap();
        }
        let dist = table.distribution();
        assert_eq!(dist.total, 6400);
        assert_eq!(dist.mean, 100.0);
        assert!(dist.max < 6400, "{} put everything in one bucket", hash);
    }
}

#[test]
fn test_concurrent_readers() {
    let mut table = HashTable::new(4, 97).unwrap();
    for i in 0..1000u32 {
        table.insert(format!("w{}", i).as_bytes(), &value(i)).unwrap();
    }

    let table = &table;
    thread::scope(|scope| {
        for t in 0..4u32 {
            scope.spawn(move || {
                for i in (t..1000).step_by(4) {
                    let found = table.find(format!("w{}", i).as_bytes());
                    assert_eq!(found, Some(&value(i)[..]));
                }
                table.verify().unwrap();
            });
        }
    });
}

#[test]
fn test_dump_and_distribution_reports() {
    let table = table_with_sizes::<ArrayBuckets>(&[1, 2, 0, 1], 2);
    let mut dump = Vec::new();
    table.dump(&mut dump).unwrap();
    let dump = String::from_utf8(dump).unwrap();
    assert!(dump.contains("bucketsCount  4"));
    assert!(dump.contains("longKeysCount 2"));
    assert!(dump.contains("size          6"));
    assert!(dump.contains("\"overflowing-key-number-1\""));

    let mut chart = Vec::new();
    let dist = table.calc_distribution(&mut chart).unwrap();
    assert_eq!(dist.size_frequencies(), &[1, 2, 1]);
    let chart = String::from_utf8(chart).unwrap();
    assert!(chart.starts_with("Average elements in bucket: 1.00\nDispersion: 0.71\n"));
}
