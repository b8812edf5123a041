use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use jobwatch_core::JobId;
use jobwatch_engine::{
    poll_for_record, PageRecord, PollOutcome, PollQueryError, PollSchedule, RecordStore,
};
use serde_json::json;

/// Replays scripted answers, then keeps answering "not yet".
struct ScriptedStore {
    answers: Mutex<VecDeque<Result<Option<PageRecord>, PollQueryError>>>,
    calls: Mutex<u32>,
}

impl ScriptedStore {
    fn new(answers: Vec<Result<Option<PageRecord>, PollQueryError>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            calls: Mutex::new(0),
        }
    }

    fn calls(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl RecordStore for ScriptedStore {
    async fn find_by_job(&self, _job_id: &JobId) -> Result<Option<PageRecord>, PollQueryError> {
        *self.calls.lock().unwrap() += 1;
        self.answers.lock().unwrap().pop_front().unwrap_or(Ok(None))
    }
}

fn record() -> PageRecord {
    PageRecord {
        id: "page-1".to_string(),
        structure: json!({ "hero": "Y" }),
    }
}

fn schedule(max_attempts: Option<u32>) -> PollSchedule {
    PollSchedule {
        interval: Duration::from_millis(10),
        max_attempts,
    }
}

#[tokio::test]
async fn keeps_polling_through_misses_and_errors() {
    let store = ScriptedStore::new(vec![
        Ok(None),
        Err(PollQueryError::Network("reset by peer".to_string())),
        Ok(Some(record())),
    ]);

    let outcome = poll_for_record(&store, &"job-1".to_string(), schedule(None)).await;

    assert_eq!(outcome, PollOutcome::Found(record()));
    assert_eq!(store.calls(), 3);
}

#[tokio::test]
async fn gives_up_after_attempt_budget() {
    let store = ScriptedStore::new(vec![
        Err(PollQueryError::HttpStatus(500)),
        Ok(None),
    ]);

    let outcome = poll_for_record(&store, &"job-1".to_string(), schedule(Some(4))).await;

    assert_eq!(outcome, PollOutcome::Exhausted { attempts: 4 });
    assert_eq!(store.calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn first_query_waits_one_interval() {
    let store = ScriptedStore::new(vec![Ok(Some(record()))]);
    let slow = PollSchedule {
        interval: Duration::from_secs(5),
        max_attempts: None,
    };

    let job_id = "job-1".to_string();
    let poll = poll_for_record(&store, &job_id, slow);
    tokio::pin!(poll);

    let early = tokio::time::timeout(Duration::from_secs(4), &mut poll).await;
    assert!(early.is_err());
    assert_eq!(store.calls(), 0);

    assert_eq!(poll.await, PollOutcome::Found(record()));
    assert_eq!(store.calls(), 1);
}
