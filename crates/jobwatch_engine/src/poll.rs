use std::time::Duration;

use jobwatch_core::JobId;
use jobwatch_logging::{watch_debug, watch_error, watch_info, watch_warn};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::{PageRecord, RecordStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    pub interval: Duration,
    pub max_attempts: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Found(PageRecord),
    Exhausted { attempts: u32 },
}

/// Queries the store once per interval until the record shows up or the
/// attempt budget runs out. The first query happens one interval in.
///
/// Absent records and query errors both just wait for the next tick.
/// Cancellation is the caller's job: drop the future.
pub async fn poll_for_record(
    store: &dyn RecordStore,
    job_id: &JobId,
    schedule: PollSchedule,
) -> PollOutcome {
    let mut ticker = interval_at(Instant::now() + schedule.interval, schedule.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut attempts = 0u32;
    loop {
        ticker.tick().await;
        attempts = attempts.saturating_add(1);

        match store.find_by_job(job_id).await {
            Ok(Some(record)) => {
                watch_info!(
                    "Record {} found for job {} after {} attempt(s)",
                    record.id,
                    job_id,
                    attempts
                );
                return PollOutcome::Found(record);
            }
            Ok(None) => watch_debug!("No record yet for job {} (attempt {})", job_id, attempts),
            Err(err) => watch_warn!("Record query for job {} failed: {}", job_id, err),
        }

        if schedule.max_attempts.is_some_and(|max| attempts >= max) {
            watch_error!("Giving up on job {} after {} attempt(s)", job_id, attempts);
            return PollOutcome::Exhausted { attempts };
        }
    }
}
