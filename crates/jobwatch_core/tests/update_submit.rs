use std::sync::Once;

use jobwatch_core::{update, Effect, Job, JobForm, JobState, JobStatus, Msg};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(jobwatch_logging::initialize_for_tests);
}

fn form() -> JobForm {
    JobForm::new("Noor Dental", "dental clinic", "Dammam")
}

fn job() -> Job {
    Job {
        id: "job-1".to_string(),
        stream_token: "tok".to_string(),
    }
}

#[test]
fn submit_resets_then_requests_creation() {
    init_logging();
    let (mut state, effects) = update(JobState::new(), Msg::SubmitRequested(form()));

    let epoch = state.epoch();
    assert_eq!(state.status(), JobStatus::Processing);
    assert!(state.consume_dirty());
    assert_eq!(
        effects,
        vec![
            Effect::ReleaseSubmission,
            Effect::ReleaseChannel,
            Effect::ReleasePoller,
            Effect::CreateJob {
                epoch,
                form: form(),
            },
        ]
    );
}

#[test]
fn job_created_opens_live_channel() {
    init_logging();
    let (state, _) = update(JobState::new(), Msg::SubmitRequested(form()));
    let epoch = state.epoch();

    let (state, effects) = update(state, Msg::JobCreated { epoch, job: job() });

    assert_eq!(state.view().job_id.as_deref(), Some("job-1"));
    assert_eq!(effects, vec![Effect::OpenChannel { epoch, job: job() }]);
}

#[test]
fn invalid_form_fails_without_network_call() {
    init_logging();
    let mut bad = form();
    bad.target_city = " x ".to_string();

    let (state, effects) = update(JobState::new(), Msg::SubmitRequested(bad));

    assert_eq!(state.status(), JobStatus::Failed);
    assert!(state
        .view()
        .error
        .unwrap()
        .starts_with("target_city must be between 2 and 100"));
    assert!(!effects
        .iter()
        .any(|effect| matches!(effect, Effect::CreateJob { .. })));
}

#[test]
fn submit_failure_is_user_visible() {
    init_logging();
    let (state, _) = update(JobState::new(), Msg::SubmitRequested(form()));
    let epoch = state.epoch();

    let (state, effects) = update(
        state,
        Msg::SubmitFailed {
            epoch,
            message: "Failed to create job".to_string(),
        },
    );

    let view = state.view();
    assert_eq!(view.status, JobStatus::Failed);
    assert_eq!(view.error.as_deref(), Some("Failed to create job"));
    assert_eq!(view.job_id, None);
    assert!(effects.is_empty());
}

#[test]
fn creation_result_from_previous_submit_is_ignored() {
    init_logging();
    let (state, _) = update(JobState::new(), Msg::SubmitRequested(form()));
    let stale = state.epoch();
    let (state, _) = update(state, Msg::SubmitRequested(form()));
    assert_ne!(state.epoch(), stale);

    let (state, effects) = update(
        state,
        Msg::JobCreated {
            epoch: stale,
            job: job(),
        },
    );
    assert_eq!(state.view().job_id, None);
    assert!(effects.is_empty());

    let (state, effects) = update(
        state,
        Msg::SubmitFailed {
            epoch: stale,
            message: "late".to_string(),
        },
    );
    assert_eq!(state.status(), JobStatus::Processing);
    assert!(effects.is_empty());
}

#[test]
fn second_job_created_for_same_epoch_is_ignored() {
    init_logging();
    let (state, _) = update(JobState::new(), Msg::SubmitRequested(form()));
    let epoch = state.epoch();
    let (state, _) = update(state, Msg::JobCreated { epoch, job: job() });

    let other = Job {
        id: "job-2".to_string(),
        stream_token: "tok2".to_string(),
    };
    let (state, effects) = update(state, Msg::JobCreated { epoch, job: other });
    assert_eq!(state.view().job_id.as_deref(), Some("job-1"));
    assert!(effects.is_empty());
}
