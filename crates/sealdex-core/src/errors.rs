//! Unified error system for Sealdex
//!
//! One error type for every layer. Variants follow the failure taxonomy of the
//! search protocol: configuration problems are rejected before any cryptographic
//! work, bounds violations are reported by the share validator without touching
//! the sharing scheme, and integrity failures always fail closed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which dimension of the share table an index referred to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShareDimension {
    /// Index into the list of shared secrets
    Secret,
    /// Index into the access groups of one secret
    Group,
}

impl fmt::Display for ShareDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShareDimension::Secret => write!(f, "secret"),
            ShareDimension::Group => write!(f, "group"),
        }
    }
}

/// Failure raised by a sharing scheme while combining shares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ShareError {
    /// Wrong number of shares for the declared group
    #[error("group {group_index} of secret {secret_index} needs {expected} shares, got {actual}")]
    ShareCount {
        /// Secret being reconstructed
        secret_index: usize,
        /// Group being reconstructed
        group_index: usize,
        /// Group size
        expected: usize,
        /// Shares supplied
        actual: usize,
    },
    /// A share belongs to a participant outside the declared group
    #[error("participant {participant} is not a member of the declared group")]
    ForeignShare {
        /// Offending participant id
        participant: u16,
    },
    /// A share value is not a field element
    #[error("share value is not below the field prime")]
    MalformedShare,
    /// Secret cannot be represented as a field element
    #[error("secret {secret_index} does not fit below the field prime")]
    SecretTooLarge {
        /// Offending secret
        secret_index: usize,
    },
    /// Scheme-specific rejection
    #[error("{0}")]
    Rejected(String),
}

/// Unified error type for all Sealdex operations
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum SealdexError {
    /// Invalid setup parameters, rejected before any cryptographic work
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the invalid setting
        message: String,
    },

    /// Secret or group index outside the share table
    #[error("Out of range: {dimension} index {index} (available: {len})")]
    OutOfRange {
        /// Table dimension the index addressed
        dimension: ShareDimension,
        /// Requested index
        index: usize,
        /// Number of entries in that dimension
        len: usize,
    },

    /// The sharing scheme refused to combine the supplied shares
    #[error("Reconstruction failed: {source}")]
    Reconstruction {
        /// Failure reported by the scheme
        #[source]
        source: ShareError,
    },

    /// Authentication tag mismatch or malformed ciphertext
    #[error("Integrity error: {message}")]
    Integrity {
        /// Description of the failed check
        message: String,
    },

    /// Cryptographic primitive misuse (bad key length and similar)
    #[error("Crypto error: {message}")]
    Crypto {
        /// Description of the failure
        message: String,
    },

    /// Index store unreachable or replied with an error
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the transport failure
        message: String,
    },

    /// Outbound call exceeded its deadline
    #[error("Operation '{operation}' timed out after {timeout_ms}ms")]
    Timeout {
        /// The operation that timed out
        operation: String,
        /// Deadline in milliseconds
        timeout_ms: u64,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Description of the serialization failure
        message: String,
    },

    /// Filesystem operation failed
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage failure
        message: String,
    },

    /// A posting could not be turned into a ranked result
    #[error("Ranking failed: {message}")]
    Ranking {
        /// Description of the bad posting
        message: String,
    },
}

impl SealdexError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an out-of-range error
    pub fn out_of_range(dimension: ShareDimension, index: usize, len: usize) -> Self {
        Self::OutOfRange {
            dimension,
            index,
            len,
        }
    }

    /// Wrap a scheme failure
    pub fn reconstruction(source: ShareError) -> Self {
        Self::Reconstruction { source }
    }

    /// Create an integrity error
    pub fn integrity(message: impl Into<String>) -> Self {
        Self::Integrity {
            message: message.into(),
        }
    }

    /// Create a crypto error
    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto {
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a ranking error
    pub fn ranking(message: impl Into<String>) -> Self {
        Self::Ranking {
            message: message.into(),
        }
    }

    /// True for failures a caller should surface as "search failed" rather than retry locally
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Timeout { .. })
    }
}

/// Standard Result type for Sealdex operations
pub type Result<T> = std::result::Result<T, SealdexError>;

impl From<std::io::Error> for SealdexError {
    fn from(err: std::io::Error) -> Self {
        Self::storage(err.to_string())
    }
}

impl From<bincode::Error> for SealdexError {
    fn from(err: bincode::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<serde_json::Error> for SealdexError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<ShareError> for SealdexError {
    fn from(err: ShareError) -> Self {
        Self::reconstruction(err)
    }
}
