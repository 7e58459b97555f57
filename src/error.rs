//! Error handling for the wordtable library
//!
//! Every fallible table operation returns [`Result`]. Structural violations found
//! by [`HashTable::verify`](crate::HashTable::verify) carry the location and the
//! values that disagreed, so callers can report them without any global state.

use crate::table::Location;
use thiserror::Error;

/// Main error type for the wordtable library
#[derive(Error, Debug)]
pub enum TableError {
    /// I/O related errors (distribution export, config files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Memory allocation failures
    #[error("Memory allocation failed: requested {size} bytes")]
    OutOfMemory {
        /// Number of bytes requested
        size: usize,
    },

    /// A short key lives in a bucket other than the one its hash selects
    #[error("Wrong hash: key {key:?} must be in bucket {expected}, but lies in bucket {actual}")]
    WrongHash {
        /// Printable rendering of the offending key
        key: String,
        /// Bucket selected by the recomputed hash
        expected: usize,
        /// Bucket actually holding the entry
        actual: usize,
    },

    /// The recorded entry count disagrees with the entries actually stored
    #[error("Wrong size: expected {recorded} entries, but found {counted}")]
    WrongSize {
        /// Entry count recorded by the table
        recorded: usize,
        /// Entries counted across buckets and overflow
        counted: usize,
    },

    /// Operation attempted on a table without buckets
    #[error("Table is not initialized: bucket count is zero")]
    NoInit,

    /// An entry whose key storage does not match its container
    #[error("Bad key in {location}: {message}")]
    NoKey {
        /// Container holding the entry
        location: Location,
        /// What is wrong with the key
        message: String,
    },

    /// An entry whose value storage is missing or has the wrong size
    #[error("Entry without value storage in {location}")]
    NoValue {
        /// Container holding the entry
        location: Location,
    },

    /// Configuration or parameter errors
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },

    /// Invariant violations not covered by a more specific variant
    #[error("Table error: {message}")]
    Generic {
        /// Error message
        message: String,
    },
}

impl TableError {
    /// Create an out of memory error
    pub fn out_of_memory(size: usize) -> Self {
        Self::OutOfMemory { size }
    }

    /// Create a wrong hash error
    pub fn wrong_hash<S: Into<String>>(key: S, expected: usize, actual: usize) -> Self {
        Self::WrongHash {
            key: key.into(),
            expected,
            actual,
        }
    }

    /// Create a wrong size error
    pub fn wrong_size(recorded: usize, counted: usize) -> Self {
        Self::WrongSize { recorded, counted }
    }

    /// Create a bad key error
    pub fn no_key<S: Into<String>>(location: Location, message: S) -> Self {
        Self::NoKey {
            location,
            message: message.into(),
        }
    }

    /// Create a missing value error
    pub fn no_value(location: Location) -> Self {
        Self::NoValue { location }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Check if the failed operation may succeed when retried later.
    ///
    /// Verification failures describe corrupted structure and never heal on
    /// their own.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io(_) => true,
            Self::OutOfMemory { .. } => true,
            Self::WrongHash { .. } => false,
            Self::WrongSize { .. } => false,
            Self::NoInit => false,
            Self::NoKey { .. } => false,
            Self::NoValue { .. } => false,
            Self::Configuration { .. } => false,
            Self::Generic { .. } => false,
        }
    }

    /// Check if this error was produced by structural verification
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            Self::WrongHash { .. }
                | Self::WrongSize { .. }
                | Self::NoInit
                | Self::NoKey { .. }
                | Self::NoValue { .. }
        )
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::OutOfMemory { .. } => "memory",
            Self::WrongHash { .. } => "wrong_hash",
            Self::WrongSize { .. } => "wrong_size",
            Self::NoInit => "no_init",
            Self::NoKey { .. } => "no_key",
            Self::NoValue { .. } => "no_value",
            Self::Configuration { .. } => "config",
            Self::Generic { .. } => "error",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, TableError>;
