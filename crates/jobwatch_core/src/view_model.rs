use serde_json::Value;

use crate::{JobId, JobStatus, PipelineStep};

/// Read-only view handed to renderers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobSnapshot {
    pub job_id: Option<JobId>,
    pub status: JobStatus,
    pub current_step: Option<PipelineStep>,
    pub current_message: String,
    pub completed_steps: Vec<PipelineStep>,
    pub structure: Option<Value>,
    pub error: Option<String>,
    pub is_polling: bool,
    /// Persisted record id, known only when completion came from the poller.
    pub record_id: Option<String>,
}

impl JobSnapshot {
    pub fn is_step_completed(&self, step: PipelineStep) -> bool {
        self.completed_steps.contains(&step)
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
