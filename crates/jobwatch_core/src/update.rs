use crate::{Effect, JobState, MergeOutcome, Msg, POLL_EXHAUSTED_MESSAGE};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: JobState, msg: Msg) -> (JobState, Vec<Effect>) {
    let effects = match msg {
        Msg::SubmitRequested(form) => {
            // Submission always starts from a clean slate.
            let epoch = state.begin_submission();
            let mut effects = Effect::release_all();
            match form.validate() {
                Ok(()) => effects.push(Effect::CreateJob { epoch, form }),
                Err(err) => {
                    state.fail(err.to_string());
                }
            }
            effects
        }
        Msg::JobCreated { epoch, job } => {
            if state.is_current(epoch) && state.attach_job(job.clone()) {
                vec![Effect::OpenChannel { epoch, job }]
            } else {
                Vec::new()
            }
        }
        Msg::SubmitFailed { epoch, message } => {
            if state.is_current(epoch) {
                state.fail(message);
            }
            Vec::new()
        }
        Msg::Observed {
            epoch, observation, ..
        } => {
            if !state.is_current(epoch) {
                return (state, Vec::new());
            }
            match state.merge(observation) {
                MergeOutcome::Terminal(_) => vec![Effect::ReleaseChannel, Effect::ReleasePoller],
                MergeOutcome::Latched
                | MergeOutcome::Inactive
                | MergeOutcome::Ignored
                | MergeOutcome::Progressed => Vec::new(),
            }
        }
        Msg::ChannelFailed { epoch } => {
            if !state.is_current(epoch) || !state.start_polling() {
                return (state, Vec::new());
            }
            match state.job() {
                Some(job) => vec![
                    Effect::ReleaseChannel,
                    Effect::StartPolling {
                        epoch,
                        job_id: job.id.clone(),
                    },
                ],
                None => Vec::new(),
            }
        }
        Msg::PollExhausted { epoch } => {
            if state.is_current(epoch) && state.fail(POLL_EXHAUSTED_MESSAGE) {
                vec![Effect::ReleasePoller]
            } else {
                Vec::new()
            }
        }
        Msg::ResetRequested => {
            state.reset();
            Effect::release_all()
        }
    };

    (state, effects)
}
