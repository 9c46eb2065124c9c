#![no_std]

//! # Job Scheduler Service
//!
//! A deterministic, cooperative timer queue for deferred session work.
//!
//! ## Philosophy
//!
//! - **Deterministic**: Time is logical and advanced explicitly, no hidden threads
//! - **Keyed**: Every pending job is identified by the resource it affects
//! - **Single slot per key**: Scheduling an existing key replaces it
//! - **Testable**: All logic runs under `cargo test`
//!
//! ## Example Jobs
//!
//! - "autosave the source buffer" (recurring, rescheduled by its owner)
//! - "remove the error decoration" (one-shot, one key per decoration)
//! - "restore the save button label" (one-shot)
//!
//! ## Example
//!
//! ```ignore
//! use services_job_scheduler::JobScheduler;
//!
//! let mut scheduler = JobScheduler::new();
//! scheduler.schedule("autosave", 15_000);
//!
//! // Nothing is due yet
//! assert!(scheduler.advance_time(10_000).is_empty());
//!
//! // The job fires once its deadline passes
//! let fired = scheduler.advance_time(5_000);
//! assert_eq!(fired[0].key, "autosave");
//! ```

extern crate alloc;

use alloc::vec::Vec;
use core::fmt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of finished jobs kept for inspection
const MAX_JOB_HISTORY: usize = 64;

/// Job identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(Uuid);

impl JobId {
    /// Creates a new job ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job:{}", self.0)
    }
}

/// Job status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Waiting for its deadline
    Pending,
    /// Deadline reached and handed to the caller
    Fired,
    /// Cancelled before firing
    Cancelled,
    /// Replaced by a newer job with the same key
    Replaced,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "Pending"),
            JobStatus::Fired => write!(f, "Fired"),
            JobStatus::Cancelled => write!(f, "Cancelled"),
            JobStatus::Replaced => write!(f, "Replaced"),
        }
    }
}

/// A job whose deadline has passed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredJob<K> {
    /// Job identifier
    pub id: JobId,
    /// Resource key the job was scheduled for
    pub key: K,
    /// Logical time the job was due at
    pub deadline_ms: u64,
}

/// A scheduled job descriptor
#[derive(Debug, Clone)]
struct JobDescriptor<K> {
    id: JobId,
    key: K,
    deadline_ms: u64,
    /// Insertion order, breaks ties between equal deadlines
    sequence: u64,
}

/// Keyed one-shot timer scheduler
pub struct JobScheduler<K> {
    /// Pending jobs, at most one per key
    pending_jobs: Vec<JobDescriptor<K>>,
    /// Finished jobs (kept for history)
    finished_jobs: Vec<(JobId, JobStatus)>,
    /// Current logical time in milliseconds
    now_ms: u64,
    /// Next insertion sequence number
    next_sequence: u64,
}

impl<K: Clone + PartialEq> JobScheduler<K> {
    /// Creates a new job scheduler at time zero
    pub fn new() -> Self {
        Self {
            pending_jobs: Vec::new(),
            finished_jobs: Vec::new(),
            now_ms: 0,
            next_sequence: 0,
        }
    }

    /// Schedules `key` to fire `delay_ms` from now
    ///
    /// A pending job with the same key is replaced, so a key never has more
    /// than one outstanding timer.
    pub fn schedule(&mut self, key: K, delay_ms: u64) -> JobId {
        if let Some(pos) = self.pending_jobs.iter().position(|j| j.key == key) {
            let old = self.pending_jobs.remove(pos);
            self.record(old.id, JobStatus::Replaced);
        }

        let job = JobDescriptor {
            id: JobId::new(),
            key,
            deadline_ms: self.now_ms.saturating_add(delay_ms),
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;

        let id = job.id;
        self.pending_jobs.push(job);
        id
    }

    /// Cancels the pending job for `key`
    pub fn cancel(&mut self, key: &K) -> bool {
        if let Some(pos) = self.pending_jobs.iter().position(|j| &j.key == key) {
            let job = self.pending_jobs.remove(pos);
            self.record(job.id, JobStatus::Cancelled);
            true
        } else {
            false
        }
    }

    /// Advances logical time and returns every job that became due, in
    /// deadline order
    pub fn advance_time(&mut self, delta_ms: u64) -> Vec<FiredJob<K>> {
        let target = self.now_ms.saturating_add(delta_ms);
        self.set_time(target)
    }

    /// Moves logical time forward to `time_ms` and returns due jobs
    ///
    /// Time never runs backwards; an earlier `time_ms` only collects jobs
    /// already due.
    pub fn set_time(&mut self, time_ms: u64) -> Vec<FiredJob<K>> {
        if time_ms > self.now_ms {
            self.now_ms = time_ms;
        }

        let now = self.now_ms;
        let mut due: Vec<JobDescriptor<K>> = Vec::new();
        let mut i = 0;
        while i < self.pending_jobs.len() {
            if self.pending_jobs[i].deadline_ms <= now {
                due.push(self.pending_jobs.remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|j| (j.deadline_ms, j.sequence));

        let mut fired = Vec::with_capacity(due.len());
        for job in due {
            self.record(job.id, JobStatus::Fired);
            fired.push(FiredJob {
                id: job.id,
                key: job.key,
                deadline_ms: job.deadline_ms,
            });
        }
        fired
    }

    /// Returns the current logical time
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Returns true if a job is pending for `key`
    pub fn is_scheduled(&self, key: &K) -> bool {
        self.pending_jobs.iter().any(|j| &j.key == key)
    }

    /// Returns the deadline of the pending job for `key`
    pub fn deadline(&self, key: &K) -> Option<u64> {
        self.pending_jobs
            .iter()
            .find(|j| &j.key == key)
            .map(|j| j.deadline_ms)
    }

    /// Returns the earliest pending deadline
    pub fn next_deadline(&self) -> Option<u64> {
        self.pending_jobs.iter().map(|j| j.deadline_ms).min()
    }

    /// Returns the number of pending jobs
    pub fn pending_count(&self) -> usize {
        self.pending_jobs.len()
    }

    /// Counts pending jobs matching a predicate
    pub fn count_matching(&self, mut pred: impl FnMut(&K) -> bool) -> usize {
        self.pending_jobs.iter().filter(|j| pred(&j.key)).count()
    }

    /// Gets the status of a job by ID
    pub fn get_job_status(&self, id: JobId) -> Option<JobStatus> {
        if self.pending_jobs.iter().any(|j| j.id == id) {
            return Some(JobStatus::Pending);
        }

        self.finished_jobs
            .iter()
            .rev()
            .find(|(job_id, _)| *job_id == id)
            .map(|(_, status)| *status)
    }

    /// Returns all pending keys in deadline order
    pub fn list_pending(&self) -> Vec<(K, u64)> {
        let mut pending: Vec<&JobDescriptor<K>> = self.pending_jobs.iter().collect();
        pending.sort_by_key(|j| (j.deadline_ms, j.sequence));
        pending
            .into_iter()
            .map(|j| (j.key.clone(), j.deadline_ms))
            .collect()
    }

    fn record(&mut self, id: JobId, status: JobStatus) {
        self.finished_jobs.push((id, status));
        if self.finished_jobs.len() > MAX_JOB_HISTORY {
            self.finished_jobs.remove(0);
        }
    }
}

impl<K: Clone + PartialEq> Default for JobScheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}
