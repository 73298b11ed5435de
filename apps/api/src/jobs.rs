//! In-process registry for background roadmap-generation jobs.
//!
//! One record per user id with an explicit lifecycle:
//! queued → running → completed | failed. Enqueueing is rejected while a job
//! for the same user is queued or running, so there is exactly one writer
//! per user id at a time. Callers poll by user id; no completion callback.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "detail")]
pub enum JobState {
    Queued,
    Running,
    Completed,
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct JobRecord {
    pub job_id: Uuid,
    #[serde(flatten)]
    pub state: JobState,
    pub updated_at: DateTime<Utc>,
}

/// Cloneable handle around the shared job table.
#[derive(Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<Mutex<HashMap<i32, JobRecord>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a queued record for `user_id`. Returns `None` when a job for
    /// that user is already queued or running.
    pub fn try_enqueue(&self, user_id: i32) -> Option<Uuid> {
        let mut jobs = self.jobs.lock().expect("job registry poisoned");
        if let Some(existing) = jobs.get(&user_id) {
            if matches!(existing.state, JobState::Queued | JobState::Running) {
                return None;
            }
        }
        let job_id = Uuid::new_v4();
        jobs.insert(
            user_id,
            JobRecord {
                job_id,
                state: JobState::Queued,
                updated_at: Utc::now(),
            },
        );
        Some(job_id)
    }

    pub fn mark_running(&self, user_id: i32) {
        self.transition(user_id, JobState::Running);
    }

    pub fn mark_completed(&self, user_id: i32) {
        self.transition(user_id, JobState::Completed);
    }

    pub fn mark_failed(&self, user_id: i32, reason: impl Into<String>) {
        self.transition(user_id, JobState::Failed(reason.into()));
    }

    pub fn status(&self, user_id: i32) -> Option<JobRecord> {
        self.jobs
            .lock()
            .expect("job registry poisoned")
            .get(&user_id)
            .cloned()
    }

    fn transition(&self, user_id: i32, state: JobState) {
        let mut jobs = self.jobs.lock().expect("job registry poisoned");
        if let Some(record) = jobs.get_mut(&user_id) {
            record.state = state;
            record.updated_at = Utc::now();
        }
    }
}
