//! Bucket occupancy statistics
//!
//! Summarizes how evenly a hash function spreads keys over buckets: mean
//! occupancy, dispersion (standard deviation) and a coarse bar chart where each
//! bar aggregates a contiguous range of bucket indices.

use std::fmt;
use std::io::{self, Write};

/// Number of bars in the chart
pub const BARS_COUNT: usize = 20;

/// Scale of one bar; a bar holding everything is `BARS_COUNT * BAR_LENGTH` wide
pub const BAR_LENGTH: usize = 20;

/// Occupancy statistics of a set of buckets
#[derive(Debug, Clone, PartialEq)]
pub struct BucketDistribution {
    /// Number of buckets
    pub bucket_count: usize,
    /// Entries across all buckets
    pub total: u64,
    /// Mean entries per bucket
    pub mean: f64,
    /// Standard deviation of entries per bucket
    pub std_dev: f64,
    /// Largest bucket
    pub max: usize,
    /// Entries per bar; bar `i` covers buckets `b` with `b * BARS_COUNT / bucket_count == i`
    pub bars: [u64; BARS_COUNT],
    frequencies: Vec<usize>,
}

impl BucketDistribution {
    /// Computes statistics from per-bucket entry counts in bucket order
    pub fn from_sizes(sizes: &[usize]) -> Self {
        let bucket_count = sizes.len();
        let mut bars = [0u64; BARS_COUNT];
        let mut total = 0u64;
        let mut sum_of_squares = 0f64;
        let mut max = 0usize;

        for (idx, &size) in sizes.iter().enumerate() {
            total += size as u64;
            sum_of_squares += (size as f64) * (size as f64);
            max = max.max(size);
            bars[idx * BARS_COUNT / bucket_count] += size as u64;
        }

        let mut frequencies = vec![0usize; if bucket_count == 0 { 0 } else { max + 1 }];
        for &size in sizes {
            frequencies[size] += 1;
        }

        let (mean, std_dev) = if bucket_count == 0 {
            (0.0, 0.0)
        } else {
            let n = bucket_count as f64;
            let mean = total as f64 / n;
            // Rounding can push the difference slightly below zero
            let variance = (sum_of_squares / n - mean * mean).max(0.0);
            (mean, variance.sqrt())
        };

        Self {
            bucket_count,
            total,
            mean,
            std_dev,
            max,
            bars,
            frequencies,
        }
    }

    /// `result[s]` is the number of buckets holding exactly `s` entries
    pub fn size_frequencies(&self) -> &[usize] {
        &self.frequencies
    }

    /// Number of empty buckets
    pub fn empty_buckets(&self) -> usize {
        self.frequencies.first().copied().unwrap_or(0)
    }

    /// Width of bar `idx` in `#` characters
    pub fn bar_width(&self, idx: usize) -> usize {
        if self.total == 0 {
            return 0;
        }
        ((BARS_COUNT * BAR_LENGTH) as u64 * self.bars[idx] / self.total) as usize
    }

    /// Writes the summary and the bar chart
    pub fn render<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{}", self)
    }
}

impl fmt::Display for BucketDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Average elements in bucket: {:.2}", self.mean)?;
        writeln!(f, "Dispersion: {:.2}", self.std_dev)?;
        writeln!(f, "=========== Distribution bar chart =========")?;
        for idx in 0..BARS_COUNT {
            writeln!(f, "|{}", "#".repeat(self.bar_width(idx)))?;
        }
        writeln!(f, "============================================")
    }
}
