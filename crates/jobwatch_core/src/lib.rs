//! Jobwatch core: pure reconciliation state machine and view-model helpers.
mod effect;
mod form;
mod job;
mod msg;
mod observation;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use form::{Direction, FormError, JobForm};
pub use job::{Epoch, Job, JobId, JobStatus, PipelineStep};
pub use msg::{Msg, Source};
pub use observation::{CollapsedCompletion, Observation, StreamEvent};
pub use state::{JobState, MergeOutcome, POLL_EXHAUSTED_MESSAGE, POLLING_MESSAGE};
pub use update::update;
pub use view_model::JobSnapshot;
