//! Jobwatch engine: network producers and the lifecycle manager that feeds
//! them into the core state machine.
mod handle;
mod live;
mod poll;
mod session;
mod settings;
mod sse;
mod store;
mod submit;
mod tracker;
mod types;

pub use live::{LiveChannel, ObservationSink, ReqwestLiveChannel};
pub use poll::{poll_for_record, PollOutcome, PollSchedule};
pub use session::{SessionProvider, StaticSession};
pub use settings::TrackerSettings;
pub use sse::SseDecoder;
pub use store::{RecordStore, RestRecordStore};
pub use submit::{ReqwestSubmissionGate, SubmissionGate};
pub use tracker::{Submission, TrackerDeps, TrackerHandle};
pub use types::{PageRecord, PollQueryError, SetupError, SubmitError, TransportError};
