//! Configuration APIs for wordtable
//!
//! [`TableConfig`] gathers every construction-time setting of a
//! [`HashTable`](crate::HashTable): bucket count, value size, hash function,
//! growth policy and verification behaviour.
//!
//! # Builder Patterns
//!
//! ```rust
//! use wordtable::config::TableConfig;
//! use wordtable::HashKind;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TableConfig::builder()
//!     .buckets_count(4096)
//!     .value_size(8)
//!     .hash(HashKind::Crc32)
//!     .build()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Preset Configurations
//!
//! ```rust
//! use wordtable::config::{Config, TableConfig};
//!
//! // Hardware hash and amortized growth
//! let config = TableConfig::performance_preset();
//!
//! // Verify after every mutation
//! let config = TableConfig::debug_preset();
//! ```
//!
//! # Environment Initialization
//!
//! ```rust
//! use wordtable::config::{Config, TableConfig};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Reads WORDTABLE_BUCKETS, WORDTABLE_HASH, ...
//! let config = TableConfig::from_env()?;
//!
//! // Same variables under a custom prefix
//! let config = TableConfig::from_env_with_prefix("MYAPP_")?;
//! # Ok(())
//! # }
//! ```

use crate::error::Result;
use std::env;
use std::fmt;
use std::path::Path;

pub mod table;


pub use table::{TableConfig, TableConfigBuilder};

/// Default prefix of configuration environment variables
pub const ENV_PREFIX: &str = "WORDTABLE_";

/// Common configuration trait providing validation, environment initialization,
/// and preset management functionality.
pub trait Config: Clone + fmt::Debug {
    /// Validate the configuration for correctness and consistency.
    fn validate(&self) -> Result<()>;

    /// Initialize configuration from environment variables with the
    /// [`ENV_PREFIX`] prefix, e.g. `WORDTABLE_BUCKETS=4096`.
    fn from_env() -> Result<Self>
    where
        Self: Default,
    {
        Self::from_env_with_prefix(ENV_PREFIX)
    }

    /// Initialize configuration from environment variables with a custom prefix.
    ///
    /// Unset or unparsable variables keep their default value.
    fn from_env_with_prefix(prefix: &str) -> Result<Self>
    where
        Self: Default;

    /// Get a performance-optimized preset configuration.
    fn performance_preset() -> Self;

    /// Get a memory-optimized preset configuration.
    fn memory_preset() -> Self;

    /// Get a preset that favours early detection of corruption over speed.
    fn debug_preset() -> Self;

    /// Get a balanced preset configuration.
    fn balanced_preset() -> Self
    where
        Self: Default,
    {
        Self::default()
    }

    /// Save configuration to a JSON file.
    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()>;

    /// Load and validate configuration from a JSON file.
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self>;
}

/// Configuration validation error details.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The field that failed validation
    pub field: String,
    /// The invalid value
    pub value: String,
    /// Description of why the value is invalid
    pub reason: String,
    /// Suggested valid values or ranges
    pub suggestion: Option<String>,
}

impl ValidationError {
    /// Create a new validation error.
    pub fn new(field: &str, value: &str, reason: &str) -> Self {
        Self {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
            suggestion: None,
        }
    }

    /// Add a suggestion for valid values.
    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.suggestion = Some(suggestion.to_string());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid configuration for field '{}': value '{}' is invalid ({})",
            self.field, self.value, self.reason
        )?;

        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". Suggested values: {}", suggestion)?;
        }

        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Parse an environment variable, falling back to `default` when it is unset
/// or does not parse.
pub fn parse_env_var<T>(var_name: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    env::var(var_name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Parse a boolean environment variable.
///
/// Accepts "true", "1", "yes", "on" (case-insensitive) as true, everything
/// else as false.
pub fn parse_env_bool(var_name: &str, default: bool) -> bool {
    env::var(var_name)
        .ok()
        .map(|s| {
            let s = s.to_lowercase();
            matches!(s.as_str(), "true" | "1" | "yes" | "on")
        })
        .unwrap_or(default)
}
