//! Structural verification, dumps and distribution reports

use super::entry::{Entry, StoredKey};
use super::storage::BucketStorage;
use super::{HashTable, Location};
use crate::error::{Result, TableError};
use crate::statistics::BucketDistribution;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

/// How much work [`HashTable::verify`] does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyLevel {
    /// Check every invariant
    #[default]
    Full,
    /// Always succeed without looking at the table
    Skip,
}

impl VerifyLevel {
    /// Configuration name of the level
    pub fn name(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Skip => "skip",
        }
    }
}

impl fmt::Display for VerifyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VerifyLevel {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "skip" => Ok(Self::Skip),
            _ => Err(TableError::configuration(format!(
                "Unknown verify level: {}",
                s
            ))),
        }
    }
}

impl<S: BucketStorage<N>, const N: usize> HashTable<S, N> {
    /// Checks every structural invariant and reports the first violation.
    ///
    /// Per bucket entry, in order: key storage is inline, the cached length
    /// fits the inline block and the padding is zero, the recomputed hash
    /// selects this bucket, the value slot holds `value_size` bytes. Overflow
    /// entries must hold heap keys of at least `N` bytes and a
    /// populated value. Finally the entry count must match [`len`](Self::len).
    ///
    /// Never modifies the table. A no-op under [`VerifyLevel::Skip`].
    pub fn verify(&self) -> Result<()> {
        if self.verify_level == VerifyLevel::Skip {
            return Ok(());
        }
        self.check_structure().map_err(|err| {
            error!("Hash table verification failed [{}]: {}", err.category(), err);
            err
        })
    }

    fn check_structure(&self) -> Result<()> {
        if self.bucket_count() == 0 {
            return Err(TableError::NoInit);
        }

        let mut counted = 0usize;
        for bucket in 0..self.bucket_count() {
            let location = Location::Bucket(bucket);
            let mut in_bucket = 0usize;
            for entry in self.buckets.iter_bucket(bucket) {
                self.check_bucket_entry(entry, bucket)?;
                in_bucket += 1;
            }
            let recorded = self.buckets.bucket_len(bucket);
            if recorded != in_bucket {
                return Err(TableError::generic(format!(
                    "{} records {} entries but holds {}",
                    location, recorded, in_bucket
                )));
            }
            counted += in_bucket;
        }

        for entry in &self.overflow {
            self.check_overflow_entry(entry)?;
        }
        counted += self.overflow.len();

        if counted != self.len {
            return Err(TableError::wrong_size(self.len, counted));
        }
        Ok(())
    }

    fn check_bucket_entry(&self, entry: &Entry<N>, bucket: usize) -> Result<()> {
        let location = Location::Bucket(bucket);
        let block = match entry.stored_key() {
            StoredKey::Inline(block) => block,
            StoredKey::Heap(_) => {
                return Err(TableError::no_key(
                    location,
                    "long key found in a bucket of short keys",
                ))
            }
        };

        let len = entry.key_len();
        if len >= N || block.as_bytes()[len..].iter().any(|&b| b != 0) {
            return Err(TableError::no_key(
                location,
                format!("wrong length {} of key \"{}\"", len, entry.key().escape_ascii()),
            ));
        }

        let expected = self.bucket_index(self.hash.hash_block(block, len));
        if expected != bucket {
            return Err(TableError::wrong_hash(
                entry.key().escape_ascii().to_string(),
                expected,
                bucket,
            ));
        }

        if !entry.value_slot().is_populated_for(self.value_size) {
            return Err(TableError::no_value(location));
        }
        Ok(())
    }

    fn check_overflow_entry(&self, entry: &Entry<N>) -> Result<()> {
        let location = Location::Overflow;
        let stored_len = match entry.stored_key() {
            StoredKey::Heap(buf) => buf.len(),
            StoredKey::Inline(_) => {
                return Err(TableError::no_key(
                    location,
                    "short key found in the overflow array",
                ))
            }
        };
        if stored_len < N {
            return Err(TableError::no_key(
                location,
                format!("key of {} bytes is too short for the overflow array", stored_len),
            ));
        }
        if stored_len != entry.key_len() {
            return Err(TableError::no_key(
                location,
                format!(
                    "wrong length {} of key \"{}\"",
                    entry.key_len(),
                    entry.key().escape_ascii()
                ),
            ));
        }
        if !entry.value_slot().is_populated_for(self.value_size) {
            return Err(TableError::no_value(location));
        }
        Ok(())
    }

    /// Writes a human-readable snapshot: header counts, then every non-empty
    /// bucket and the overflow array as `"key" -> [address] value-bytes`.
    pub fn dump<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "HashTable<{}, {}>[{:p}] dump:", S::NAME, N, self)?;
        writeln!(out, "\tbucketsCount  {}", self.bucket_count())?;
        writeln!(out, "\tlongKeysCount {}", self.overflow.len())?;
        writeln!(out, "\tvalSize       {}", self.value_size)?;
        writeln!(out, "\tsize          {}", self.len)?;
        writeln!(out, "\thash          {}", self.hash)?;

        writeln!(out, "Buckets:")?;
        for bucket in 0..self.bucket_count() {
            let mut entries = self.buckets.iter_bucket(bucket).peekable();
            if entries.peek().is_some() {
                writeln!(out, "\t#{}", bucket)?;
            }
            for entry in entries {
                write_entry(out, entry)?;
            }
        }

        writeln!(out, "LongKeys array:")?;
        for entry in &self.overflow {
            write_entry(out, entry)?;
        }
        Ok(())
    }

    /// Occupancy statistics of the buckets (the overflow array is not a bucket)
    pub fn distribution(&self) -> BucketDistribution {
        BucketDistribution::from_sizes(&self.bucket_sizes())
    }

    /// Writes mean, dispersion and the bar chart of bucket occupancy to `out`
    pub fn calc_distribution<W: Write + ?Sized>(&self, out: &mut W) -> Result<BucketDistribution> {
        let distribution = self.distribution();
        distribution.render(out)?;
        Ok(distribution)
    }

    /// Writes each bucket's entry count on its own line, in bucket order,
    /// followed by one line with the overflow array's entry count.
    ///
    /// # Errors
    ///
    /// [`TableError::Io`] when the file cannot be created or written.
    pub fn dump_distribution_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut out = BufWriter::new(File::create(path)?);
        for bucket in 0..self.bucket_count() {
            writeln!(out, "{}", self.buckets.bucket_len(bucket))?;
        }
        writeln!(out, "{}", self.overflow.len())?;
        out.flush()?;
        debug!(
            "Wrote distribution of {} buckets to {}",
            self.bucket_count(),
            path.display()
        );
        Ok(())
    }
}

fn write_entry<W: Write + ?Sized, const N: usize>(out: &mut W, entry: &Entry<N>) -> Result<()> {
    write!(
        out,
        "\t\t\"{}\" -> [{:p}]",
        entry.key().escape_ascii(),
        entry.value().as_ptr()
    )?;
    for byte in entry.value() {
        write!(out, " {:02x}", byte)?;
    }
    writeln!(out)?;
    Ok(())
}
