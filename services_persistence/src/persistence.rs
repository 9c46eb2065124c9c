//! Store snapshot format
//!
//! This module handles encoding the whole key-value store to bytes, for
//! hosts that keep it in a file. Decoding is safe against corruption.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// Serializable container for the store contents
/// Uses BTreeMap for stable ordering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Version of the snapshot format
    pub version: u32,
    /// Stored items (stable ordering via BTreeMap)
    pub items: BTreeMap<String, String>,
}

impl StoreSnapshot {
    /// Current version of the snapshot format
    pub const CURRENT_VERSION: u32 = 1;

    /// Creates a new empty snapshot
    pub fn new() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            items: BTreeMap::new(),
        }
    }

    /// Creates a snapshot holding `items`
    pub fn from_items(items: BTreeMap<String, String>) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            items,
        }
    }
}

impl Default for StoreSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Errors that can occur during persistence operations
#[derive(Debug, Clone, PartialEq)]
pub enum PersistenceError {
    /// Failed to serialize the store
    SerializationFailed(String),
    /// Failed to deserialize the store
    DeserializationFailed(String),
    /// Unsupported snapshot version
    UnsupportedVersion(u32),
    /// The backing store rejected a write
    StoreUnavailable(String),
}

impl core::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PersistenceError::SerializationFailed(msg) => {
                write!(f, "Failed to serialize store: {}", msg)
            }
            PersistenceError::DeserializationFailed(msg) => {
                write!(f, "Failed to deserialize store: {}", msg)
            }
            PersistenceError::UnsupportedVersion(version) => {
                write!(f, "Unsupported store version: {}", version)
            }
            PersistenceError::StoreUnavailable(msg) => {
                write!(f, "Store unavailable: {}", msg)
            }
        }
    }
}

/// Serializes a snapshot to JSON bytes
pub fn serialize_store(snapshot: &StoreSnapshot) -> PersistenceResult<Vec<u8>> {
    serde_json::to_vec_pretty(snapshot)
        .map_err(|e| PersistenceError::SerializationFailed(e.to_string()))
}

/// Deserializes a snapshot from JSON bytes
pub fn deserialize_store(bytes: &[u8]) -> PersistenceResult<StoreSnapshot> {
    let snapshot: StoreSnapshot = serde_json::from_slice(bytes)
        .map_err(|e| PersistenceError::DeserializationFailed(e.to_string()))?;

    // Check version compatibility
    if snapshot.version != StoreSnapshot::CURRENT_VERSION {
        return Err(PersistenceError::UnsupportedVersion(snapshot.version));
    }

    Ok(snapshot)
}

/// Attempts to load a snapshot from bytes, falling back to an empty store on error
pub fn load_store_safe(bytes: &[u8]) -> StoreSnapshot {
    deserialize_store(bytes).unwrap_or_else(|_| StoreSnapshot::new())
}
