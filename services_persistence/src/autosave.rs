//! Periodic, preference-gated saving of the source buffer
//!
//! Autosave is a single recurring timer. It is a one-shot job that the owner
//! re-arms each time it fires, so there is never more than one outstanding
//! autosave job for its key.

use crate::{KeyValueStore, PersistenceManager, PersistenceResult, Preference};
use editor_core::EditorBridge;
use services_job_scheduler::{JobId, JobScheduler};

/// Period between autosaves
pub const AUTOSAVE_PERIOD_MS: u64 = 15_000;

/// What happened when the autosave timer fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosaveOutcome {
    /// Text was written and the timer re-armed
    Saved { bytes: usize },
    /// Autosave is disabled; nothing written, timer not re-armed
    Skipped,
}

/// Autosave timer owner
#[derive(Debug, Clone)]
pub struct Autosave<K> {
    /// Scheduler key reserved for autosave
    key: K,
    period_ms: u64,
    saves: u64,
}

impl<K: Clone + PartialEq> Autosave<K> {
    /// Creates an autosave owner using `key` with the default period
    pub fn new(key: K) -> Self {
        Self::with_period(key, AUTOSAVE_PERIOD_MS)
    }

    pub fn with_period(key: K, period_ms: u64) -> Self {
        Self {
            key,
            period_ms,
            saves: 0,
        }
    }

    /// Arms the timer, replacing any pending one
    pub fn start(&self, scheduler: &mut JobScheduler<K>) -> JobId {
        scheduler.cancel(&self.key);
        scheduler.schedule(self.key.clone(), self.period_ms)
    }

    /// Cancels the pending timer
    pub fn stop(&self, scheduler: &mut JobScheduler<K>) -> bool {
        scheduler.cancel(&self.key)
    }

    pub fn is_running(&self, scheduler: &JobScheduler<K>) -> bool {
        scheduler.is_scheduled(&self.key)
    }

    /// Returns true if `key` belongs to this autosave
    pub fn owns(&self, key: &K) -> bool {
        &self.key == key
    }

    /// Handles the timer firing
    ///
    /// Reads the buffer, writes it, and re-arms. A write failure still
    /// re-arms so a transient store error does not end autosave.
    pub fn on_fire<E, S>(
        &mut self,
        editor: &E,
        manager: &mut PersistenceManager<S>,
        scheduler: &mut JobScheduler<K>,
    ) -> PersistenceResult<AutosaveOutcome>
    where
        E: EditorBridge + ?Sized,
        S: KeyValueStore,
    {
        if manager.get_preference(Preference::AutosaveDisabled) {
            return Ok(AutosaveOutcome::Skipped);
        }

        let text = editor.text();
        let result = manager.save_text(&text);
        self.start(scheduler);
        result?;

        self.saves += 1;
        Ok(AutosaveOutcome::Saved { bytes: text.len() })
    }

    /// Applies the "disable autosave" toggle
    ///
    /// Persists the preference, then cancels or re-arms the timer. A failed
    /// write leaves the timer as it was.
    pub fn set_disabled<S: KeyValueStore>(
        &self,
        disabled: bool,
        manager: &mut PersistenceManager<S>,
        scheduler: &mut JobScheduler<K>,
    ) -> PersistenceResult<()> {
        manager.set_preference(Preference::AutosaveDisabled, disabled)?;
        if disabled {
            self.stop(scheduler);
        } else {
            self.start(scheduler);
        }
        Ok(())
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> u64 {
        self.saves
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }
}
