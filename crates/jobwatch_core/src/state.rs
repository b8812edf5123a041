use serde_json::Value;

use crate::view_model::JobSnapshot;
use crate::{CollapsedCompletion, Epoch, Job, JobStatus, Observation, PipelineStep};

pub const POLLING_MESSAGE: &str = "Checking job status...";
pub const POLL_EXHAUSTED_MESSAGE: &str = "Job status could not be confirmed";
const COLLAPSED_MESSAGE: &str = "Page completed";

/// What a call to [`JobState::merge`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The terminal latch was already set; nothing changed.
    Latched,
    /// No job is in flight; nothing changed.
    Inactive,
    /// The observation carried a status this client does not handle.
    Ignored,
    /// A non-terminal update was applied.
    Progressed,
    /// This observation set the terminal latch.
    Terminal(JobStatus),
}

/// Canonical state of the tracked job.
///
/// Only [`JobState::merge`] and the reset/submit transitions in
/// [`crate::update`] mutate it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobState {
    epoch: Epoch,
    job: Option<Job>,
    status: JobStatus,
    current_step: Option<PipelineStep>,
    current_message: String,
    completed_steps: Vec<PipelineStep>,
    structure: Option<Value>,
    error: Option<String>,
    polling: bool,
    record_id: Option<String>,
    dirty: bool,
}

impl JobState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> JobSnapshot {
        JobSnapshot {
            job_id: self.job.as_ref().map(|job| job.id.clone()),
            status: self.status,
            current_step: self.current_step,
            current_message: self.current_message.clone(),
            completed_steps: self.completed_steps.clone(),
            structure: self.structure.clone(),
            error: self.error.clone(),
            is_polling: self.polling,
            record_id: self.record_id.clone(),
        }
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn job(&self) -> Option<&Job> {
        self.job.as_ref()
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_polling(&self) -> bool {
        self.polling
    }

    pub fn completed_steps(&self) -> &[PipelineStep] {
        &self.completed_steps
    }

    /// Returns true once, after any mutation, so callers can coalesce renders.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn is_current(&self, epoch: Epoch) -> bool {
        self.epoch == epoch
    }

    /// Applies one observation from either channel.
    pub fn merge(&mut self, observation: Observation) -> MergeOutcome {
        if self.status.is_terminal() {
            return MergeOutcome::Latched;
        }
        if self.status != JobStatus::Processing {
            return MergeOutcome::Inactive;
        }

        let outcome = match observation {
            Observation::Progress { step, message } => {
                self.mark_completed(step);
                self.current_step = Some(step);
                self.current_message = message;
                MergeOutcome::Progressed
            }
            Observation::Completed { message, structure } => {
                self.mark_completed(PipelineStep::FINAL);
                self.current_step = Some(PipelineStep::FINAL);
                self.current_message = message;
                self.structure = structure;
                self.latch(JobStatus::Completed)
            }
            Observation::Failed { step, message } => {
                if step.is_some() {
                    self.current_step = step;
                }
                self.current_message = message.clone();
                self.error = Some(message);
                self.latch(JobStatus::Failed)
            }
            Observation::Collapsed(CollapsedCompletion {
                record_id,
                structure,
            }) => {
                for step in PipelineStep::ALL {
                    self.mark_completed(step);
                }
                self.current_step = Some(PipelineStep::FINAL);
                self.current_message = COLLAPSED_MESSAGE.to_string();
                self.structure = Some(structure);
                self.record_id = Some(record_id);
                self.latch(JobStatus::Completed)
            }
            Observation::Unrecognized { .. } => return MergeOutcome::Ignored,
        };
        self.dirty = true;
        outcome
    }

    /// Clears every field and moves to a fresh epoch, so producers started
    /// before the reset can no longer affect this state.
    pub(crate) fn reset(&mut self) {
        let epoch = self.epoch.next();
        *self = Self {
            epoch,
            dirty: true,
            ..Self::default()
        };
    }

    pub(crate) fn begin_submission(&mut self) -> Epoch {
        self.reset();
        self.status = JobStatus::Processing;
        self.epoch
    }

    pub(crate) fn attach_job(&mut self, job: Job) -> bool {
        if self.status != JobStatus::Processing || self.job.is_some() {
            return false;
        }
        self.job = Some(job);
        self.dirty = true;
        true
    }

    /// Terminal failure that did not come from the pipeline itself.
    pub(crate) fn fail(&mut self, message: impl Into<String>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        let message = message.into();
        self.current_message = message.clone();
        self.error = Some(message);
        self.latch(JobStatus::Failed);
        self.dirty = true;
        true
    }

    /// Flags the fallback path. Returns false when polling is already active
    /// or cannot apply.
    pub(crate) fn start_polling(&mut self) -> bool {
        if self.polling || self.status != JobStatus::Processing || self.job.is_none() {
            return false;
        }
        self.polling = true;
        self.current_message = POLLING_MESSAGE.to_string();
        self.dirty = true;
        true
    }

    fn mark_completed(&mut self, step: PipelineStep) {
        if !self.completed_steps.contains(&step) {
            self.completed_steps.push(step);
        }
    }

    fn latch(&mut self, status: JobStatus) -> MergeOutcome {
        self.status = status;
        self.polling = false;
        MergeOutcome::Terminal(status)
    }
}
