use crate::{Epoch, Job, JobForm, JobId};

/// Side effects requested by [`crate::update`]. Release effects are safe to
/// execute when nothing is held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    CreateJob { epoch: Epoch, form: JobForm },
    OpenChannel { epoch: Epoch, job: Job },
    StartPolling { epoch: Epoch, job_id: JobId },
    ReleaseSubmission,
    ReleaseChannel,
    ReleasePoller,
}

impl Effect {
    pub(crate) fn release_all() -> Vec<Effect> {
        vec![
            Effect::ReleaseSubmission,
            Effect::ReleaseChannel,
            Effect::ReleasePoller,
        ]
    }
}
