#![no_std]

//! # Persistence Service
//!
//! Keeps the source buffer and the two display/autosave preferences in the
//! origin-scoped key-value store, so they survive a reload.
//!
//! ## Philosophy
//!
//! - **Stable keys**: The key names are shared with earlier page versions
//! - **Absent is normal**: A key that was never written is a default, not an error
//! - **Last write wins**: No versioning or migration of individual values
//! - **Testable**: The store is a trait; `MemoryStore` backs every test
//!
//! ## Keys
//!
//! - `program`: full source text
//! - `disableAutoSave`: `"true"` / `"false"`
//! - `nostalgic`: `"true"`, absent means false
//!
//! ## Example
//!
//! ```ignore
//! use services_persistence::{MemoryStore, PersistenceManager, Preference};
//!
//! let mut manager = PersistenceManager::new(MemoryStore::new());
//! manager.save_text("long a;")?;
//! assert_eq!(manager.load_text().as_deref(), Some("long a;"));
//!
//! manager.set_preference(Preference::AutosaveDisabled, true)?;
//! assert!(manager.get_preference(Preference::AutosaveDisabled));
//! ```

pub mod autosave;
pub mod persistence;

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use core::fmt;

pub use autosave::{Autosave, AutosaveOutcome, AUTOSAVE_PERIOD_MS};
pub use persistence::{PersistenceError, PersistenceResult, StoreSnapshot};

/// Store keys
pub mod keys {
    pub const PROGRAM: &str = "program";
    pub const DISABLE_AUTO_SAVE: &str = "disableAutoSave";
    pub const NOSTALGIC: &str = "nostalgic";
}

/// Boolean preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preference {
    /// Periodic saving of the source buffer is off
    AutosaveDisabled,
    /// The retro DOS font is on
    NostalgicFontEnabled,
}

impl Preference {
    /// Store key for this preference
    pub fn key(&self) -> &'static str {
        match self {
            Preference::AutosaveDisabled => keys::DISABLE_AUTO_SAVE,
            Preference::NostalgicFontEnabled => keys::NOSTALGIC,
        }
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Persistent string key-value store
pub trait KeyValueStore {
    /// Returns the stored value, `None` if the key was never set
    fn get_item(&self, key: &str) -> Option<String>;

    /// Stores a value
    fn set_item(&mut self, key: &str, value: &str) -> PersistenceResult<()>;

    /// Deletes a key; deleting an absent key succeeds
    fn remove_item(&mut self, key: &str) -> PersistenceResult<()>;
}

/// In-memory store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    items: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            items: BTreeMap::new(),
        }
    }

    /// Builds a store from a decoded snapshot
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            items: snapshot.items,
        }
    }

    /// Captures the current contents
    pub fn to_snapshot(&self) -> StoreSnapshot {
        StoreSnapshot::from_items(self.items.clone())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> PersistenceResult<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> PersistenceResult<()> {
        self.items.remove(key);
        Ok(())
    }
}

/// Typed access to the program text and preferences
pub struct PersistenceManager<S> {
    store: S,
}

impl<S: KeyValueStore> PersistenceManager<S> {
    /// Wraps a store
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Saves the full source text
    pub fn save_text(&mut self, text: &str) -> PersistenceResult<()> {
        self.store.set_item(keys::PROGRAM, text)
    }

    /// Loads the saved source text, `None` if nothing was ever saved
    pub fn load_text(&self) -> Option<String> {
        self.store.get_item(keys::PROGRAM)
    }

    /// Reads a preference; anything but `"true"` is false
    pub fn get_preference(&self, preference: Preference) -> bool {
        self.store.get_item(preference.key()).as_deref() == Some("true")
    }

    /// Writes a preference
    ///
    /// The nostalgic font is stored as a present/absent flag, so turning it
    /// off deletes the key; autosave keeps an explicit `"false"`.
    pub fn set_preference(&mut self, preference: Preference, value: bool) -> PersistenceResult<()> {
        match (preference, value) {
            (Preference::NostalgicFontEnabled, false) => self.store.remove_item(preference.key()),
            (_, true) => self.store.set_item(preference.key(), "true"),
            (_, false) => self.store.set_item(preference.key(), "false"),
        }
    }

    /// Returns the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the underlying store mutably
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Unwraps the manager
    pub fn into_store(self) -> S {
        self.store
    }
}
