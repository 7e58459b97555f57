//! Hash table configuration.

use super::{parse_env_bool, parse_env_var, Config, ValidationError};
use crate::error::{Result, TableError};
use crate::hash::HashKind;
use crate::table::{GrowthPolicy, VerifyLevel};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Bucket count used by the word-count benchmark
pub const DEFAULT_BUCKETS_COUNT: usize = 1500;

/// Value size of a 32-bit counter
pub const DEFAULT_VALUE_SIZE: usize = 4;

/// Construction-time settings of a [`HashTable`](crate::HashTable)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Number of buckets, fixed for the table's lifetime
    pub buckets_count: usize,
    /// Size of every value in bytes; may be zero
    pub value_size: usize,
    /// Hash function selecting the bucket of a short key
    pub hash: HashKind,
    /// How buckets and the overflow array grow
    pub growth: GrowthPolicy,
    /// Whether `verify` checks anything
    pub verify: VerifyLevel,
    /// Run `verify` after every insert or access-or-insert
    pub verify_on_mutation: bool,
    /// Use vector instructions for key comparison when available
    pub enable_simd: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            buckets_count: DEFAULT_BUCKETS_COUNT,
            value_size: DEFAULT_VALUE_SIZE,
            hash: HashKind::Djb2,
            growth: GrowthPolicy::Exact,
            verify: VerifyLevel::Full,
            verify_on_mutation: false,
            enable_simd: true,
        }
    }
}

impl Config for TableConfig {
    fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.buckets_count == 0 {
            errors.push(
                ValidationError::new(
                    "buckets_count",
                    &self.buckets_count.to_string(),
                    "a table needs at least one bucket",
                )
                .with_suggestion("roughly the expected number of distinct short keys"),
            );
        }

        if self.verify_on_mutation && self.verify == VerifyLevel::Skip {
            errors.push(ValidationError::new(
                "verify_on_mutation",
                "true",
                "per-mutation verification has no effect when verify is skip",
            ));
        }

        if !errors.is_empty() {
            return Err(TableError::configuration(format!(
                "Configuration validation failed: {}",
                errors
                    .into_iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; ")
            )));
        }

        Ok(())
    }

    fn from_env_with_prefix(prefix: &str) -> Result<Self> {
        let mut config = Self::default();

        config.buckets_count = parse_env_var(&format!("{}BUCKETS", prefix), config.buckets_count);
        config.value_size = parse_env_var(&format!("{}VALUE_SIZE", prefix), config.value_size);
        config.hash = parse_env_var(&format!("{}HASH", prefix), config.hash);
        config.growth = parse_env_var(&format!("{}GROWTH", prefix), config.growth);
        config.verify = parse_env_var(&format!("{}VERIFY", prefix), config.verify);
        config.verify_on_mutation = parse_env_bool(
            &format!("{}VERIFY_ON_MUTATION", prefix),
            config.verify_on_mutation,
        );
        config.enable_simd = parse_env_bool(&format!("{}SIMD", prefix), config.enable_simd);

        config.validate()?;
        Ok(config)
    }

    fn performance_preset() -> Self {
        Self {
            hash: HashKind::HardwareCrc32,
            growth: GrowthPolicy::Amortized,
            ..Self::default()
        }
    }

    fn memory_preset() -> Self {
        Self {
            growth: GrowthPolicy::Exact,
            ..Self::default()
        }
    }

    fn debug_preset() -> Self {
        Self {
            hash: HashKind::Crc32,
            verify_on_mutation: true,
            ..Self::default()
        }
    }

    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self).map_err(|e| {
            TableError::configuration(format!("Failed to serialize table config: {}", e))
        })?;
        std::fs::write(path, serialized).map_err(|e| {
            TableError::configuration(format!("Failed to write table config file: {}", e))
        })?;
        Ok(())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TableError::configuration(format!("Failed to read table config file: {}", e))
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            TableError::configuration(format!("Failed to parse table config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }
}

impl TableConfig {
    /// Create a configuration builder starting from the defaults.
    pub fn builder() -> TableConfigBuilder {
        TableConfigBuilder::new()
    }
}

/// Builder for [`TableConfig`]
#[derive(Debug, Clone)]
pub struct TableConfigBuilder {
    config: TableConfig,
}

impl TableConfigBuilder {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self {
            config: TableConfig::default(),
        }
    }

    /// Set the number of buckets.
    pub fn buckets_count(mut self, count: usize) -> Self {
        self.config.buckets_count = count;
        self
    }

    /// Set the value size in bytes.
    pub fn value_size(mut self, size: usize) -> Self {
        self.config.value_size = size;
        self
    }

    /// Set the hash function.
    pub fn hash(mut self, hash: HashKind) -> Self {
        self.config.hash = hash;
        self
    }

    /// Set the growth policy.
    pub fn growth(mut self, growth: GrowthPolicy) -> Self {
        self.config.growth = growth;
        self
    }

    /// Set the verification level.
    pub fn verify(mut self, level: VerifyLevel) -> Self {
        self.config.verify = level;
        self
    }

    /// Verify the table after every mutation.
    pub fn verify_on_mutation(mut self, enable: bool) -> Self {
        self.config.verify_on_mutation = enable;
        self
    }

    /// Enable or disable vector key comparison.
    pub fn enable_simd(mut self, enable: bool) -> Self {
        self.config.enable_simd = enable;
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<TableConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for TableConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
