use std::sync::Arc;

use jobwatch_core::{
    update, CollapsedCompletion, Effect, Epoch, Job, JobForm, JobId, JobSnapshot, JobState, Msg,
    Observation, Source,
};
use jobwatch_logging::{watch_debug, watch_info, watch_warn};
use tokio::sync::{mpsc, oneshot, watch};

use crate::handle::{TaskHandle, TaskSlot};
use crate::{
    poll_for_record, LiveChannel, ObservationSink, PollOutcome, PollSchedule, RecordStore,
    ReqwestLiveChannel, ReqwestSubmissionGate, RestRecordStore, SessionProvider, SetupError,
    SubmissionGate, TrackerSettings,
};

/// Collaborators the tracker drives.
#[derive(Clone)]
pub struct TrackerDeps {
    pub gate: Arc<dyn SubmissionGate>,
    pub channel: Arc<dyn LiveChannel>,
    pub store: Arc<dyn RecordStore>,
}

impl TrackerDeps {
    /// HTTP-backed collaborators built from settings.
    pub fn from_settings(
        settings: &TrackerSettings,
        session: Arc<dyn SessionProvider>,
    ) -> Result<Self, SetupError> {
        Ok(Self {
            gate: Arc::new(ReqwestSubmissionGate::new(settings, session)?),
            channel: Arc::new(ReqwestLiveChannel::new(settings)?),
            store: Arc::new(RestRecordStore::new(settings)?),
        })
    }
}

enum Command {
    Dispatch(Msg),
    /// Acknowledged once the submission has been applied and published.
    Submit {
        form: JobForm,
        accepted: oneshot::Sender<()>,
    },
    Shutdown,
}

/// Consumer-side handle on a running tracker.
///
/// Clones share the same tracker. The tracker tears down (releasing the live
/// channel and poller, leaving state as is) on [`TrackerHandle::shutdown`] or
/// once every handle is dropped.
#[derive(Clone)]
pub struct TrackerHandle {
    cmd_tx: mpsc::UnboundedSender<Command>,
    snapshot_rx: watch::Receiver<JobSnapshot>,
}

impl TrackerHandle {
    /// Spawns the tracker loop on the current tokio runtime.
    pub fn spawn(deps: TrackerDeps, schedule: PollSchedule) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(JobSnapshot::default());

        let tracker = Tracker {
            state: JobState::new(),
            deps,
            schedule,
            event_tx,
            snapshot_tx,
            submission: TaskSlot::default(),
            channel: TaskSlot::default(),
            poller: TaskSlot::default(),
        };
        tokio::spawn(tracker.run(cmd_rx, event_rx));

        Self {
            cmd_tx,
            snapshot_rx,
        }
    }

    pub fn from_settings(
        settings: &TrackerSettings,
        session: Arc<dyn SessionProvider>,
    ) -> Result<Self, SetupError> {
        let deps = TrackerDeps::from_settings(settings, session)?;
        Ok(Self::spawn(deps, settings.poll_schedule()))
    }

    /// Queues a new job. The returned [`Submission`] ignores every snapshot
    /// published before the tracker took this job, so a previous job's
    /// outcome is never mistaken for this one's.
    pub fn submit_job(&self, form: JobForm) -> Submission {
        let (accepted, accepted_rx) = oneshot::channel();
        self.send(Command::Submit { form, accepted });
        Submission {
            accepted: accepted_rx,
            rx: self.subscribe(),
        }
    }

    pub fn reset(&self) {
        self.send(Command::Dispatch(Msg::ResetRequested));
    }

    pub fn shutdown(&self) {
        self.send(Command::Shutdown);
    }

    pub fn snapshot(&self) -> JobSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<JobSnapshot> {
        self.snapshot_rx.clone()
    }

    fn send(&self, command: Command) {
        if self.cmd_tx.send(command).is_err() {
            watch_warn!("Tracker already stopped; command dropped");
        }
    }
}

/// Follows one submitted job.
pub struct Submission {
    accepted: oneshot::Receiver<()>,
    rx: watch::Receiver<JobSnapshot>,
}

impl Submission {
    /// Waits for the job's terminal snapshot. Returns `None` if the tracker
    /// stopped first.
    pub async fn wait_for_terminal(mut self) -> Option<JobSnapshot> {
        self.accepted.await.ok()?;
        let snapshot = self.rx.wait_for(JobSnapshot::is_terminal).await.ok()?;
        Some(snapshot.clone())
    }
}

/// Producer-side sink: tags everything with the epoch the producer was
/// started under and queues it for the tracker loop.
struct EpochSink {
    epoch: Epoch,
    source: Source,
    tx: mpsc::UnboundedSender<Msg>,
}

impl ObservationSink for EpochSink {
    fn observe(&self, observation: Observation) {
        let _ = self.tx.send(Msg::Observed {
            epoch: self.epoch,
            source: self.source,
            observation,
        });
    }
}

struct Tracker {
    state: JobState,
    deps: TrackerDeps,
    schedule: PollSchedule,
    event_tx: mpsc::UnboundedSender<Msg>,
    snapshot_tx: watch::Sender<JobSnapshot>,
    submission: TaskSlot,
    channel: TaskSlot,
    poller: TaskSlot,
}

impl Tracker {
    /// One message per turn: producers only enqueue, so `update` never runs
    /// concurrently with itself.
    async fn run(
        mut self,
        mut cmd_rx: mpsc::UnboundedReceiver<Command>,
        mut event_rx: mpsc::UnboundedReceiver<Msg>,
    ) {
        loop {
            tokio::select! {
                command = cmd_rx.recv() => match command {
                    Some(Command::Dispatch(msg)) => self.dispatch(msg),
                    Some(Command::Submit { form, accepted }) => {
                        self.dispatch(Msg::SubmitRequested(form));
                        let _ = accepted.send(());
                    }
                    Some(Command::Shutdown) | None => break,
                },
                Some(msg) = event_rx.recv() => self.dispatch(msg),
            }
        }
        self.teardown();
    }

    fn dispatch(&mut self, msg: Msg) {
        watch_debug!("Tracker {} handling {}", self.state.epoch(), describe(&msg));
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;

        for effect in effects {
            self.execute(effect);
        }
        if self.state.consume_dirty() {
            self.snapshot_tx.send_replace(self.state.view());
        }
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::CreateJob { epoch, form } => self.spawn_submission(epoch, form),
            Effect::OpenChannel { epoch, job } => self.spawn_channel(epoch, job),
            Effect::StartPolling { epoch, job_id } => self.spawn_poller(epoch, job_id),
            Effect::ReleaseSubmission => {
                self.submission.release();
            }
            Effect::ReleaseChannel => {
                self.channel.release();
            }
            Effect::ReleasePoller => {
                self.poller.release();
            }
        }
    }

    fn spawn_submission(&mut self, epoch: Epoch, form: JobForm) {
        let gate = self.deps.gate.clone();
        let tx = self.event_tx.clone();
        self.submission.fill(TaskHandle::spawn("submission", epoch, async move {
            let msg = match gate.submit(&form).await {
                Ok(job) => Msg::JobCreated { epoch, job },
                Err(err) => {
                    watch_warn!("Job submission failed: {}", err);
                    Msg::SubmitFailed {
                        epoch,
                        message: err.user_message().to_string(),
                    }
                }
            };
            let _ = tx.send(msg);
        }));
    }

    fn spawn_channel(&mut self, epoch: Epoch, job: Job) {
        let channel = self.deps.channel.clone();
        let tx = self.event_tx.clone();
        let sink = EpochSink {
            epoch,
            source: Source::Live,
            tx: tx.clone(),
        };
        self.channel.fill(TaskHandle::spawn("live channel", epoch, async move {
            if let Err(err) = channel.follow(&job, &sink).await {
                watch_info!("Live channel for job {} failed: {}", job.id, err);
                let _ = tx.send(Msg::ChannelFailed { epoch });
            }
        }));
    }

    fn spawn_poller(&mut self, epoch: Epoch, job_id: JobId) {
        let store = self.deps.store.clone();
        let schedule = self.schedule;
        let tx = self.event_tx.clone();
        self.poller.fill(TaskHandle::spawn("poller", epoch, async move {
            let msg = match poll_for_record(store.as_ref(), &job_id, schedule).await {
                PollOutcome::Found(record) => Msg::Observed {
                    epoch,
                    source: Source::Poll,
                    observation: Observation::Collapsed(CollapsedCompletion {
                        record_id: record.id,
                        structure: record.structure,
                    }),
                },
                PollOutcome::Exhausted { .. } => Msg::PollExhausted { epoch },
            };
            let _ = tx.send(msg);
        }));
    }

    /// Releases every producer without touching the state.
    fn teardown(&mut self) {
        self.submission.release();
        self.channel.release();
        self.poller.release();
        watch_debug!("Tracker stopped at {}", self.state.epoch());
    }
}

fn describe(msg: &Msg) -> &'static str {
    match msg {
        Msg::SubmitRequested(_) => "submit",
        Msg::JobCreated { .. } => "job created",
        Msg::SubmitFailed { .. } => "submit failed",
        Msg::Observed {
            source: Source::Live,
            ..
        } => "live observation",
        Msg::Observed {
            source: Source::Poll,
            ..
        } => "poll observation",
        Msg::ChannelFailed { .. } => "channel failure",
        Msg::PollExhausted { .. } => "poll exhaustion",
        Msg::ResetRequested => "reset",
    }
}
