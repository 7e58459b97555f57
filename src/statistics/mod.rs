//! Statistics over table occupancy.
//!
//! [`BucketDistribution`] backs [`HashTable::distribution`](crate::HashTable::distribution)
//! and the bar chart printed by
//! [`HashTable::calc_distribution`](crate::HashTable::calc_distribution).

mod distribution;

pub use self::distribution::{BucketDistribution, BAR_LENGTH, BARS_COUNT};
