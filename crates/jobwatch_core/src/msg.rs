use crate::{Epoch, Job, JobForm, Observation};

/// Which producer delivered an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Live,
    Poll,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Consumer asked to start a new job.
    SubmitRequested(JobForm),
    /// The submission gate returned identifiers.
    JobCreated { epoch: Epoch, job: Job },
    /// The submission gate gave up; `message` is user-visible.
    SubmitFailed { epoch: Epoch, message: String },
    /// A producer delivered a normalized observation.
    Observed {
        epoch: Epoch,
        source: Source,
        observation: Observation,
    },
    /// The live channel dropped before a terminal event.
    ChannelFailed { epoch: Epoch },
    /// The fallback poller ran out of attempts without finding a record.
    PollExhausted { epoch: Epoch },
    /// Consumer asked to discard the current job.
    ResetRequested,
}
