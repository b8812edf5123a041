use std::future::Future;

use jobwatch_core::Epoch;
use jobwatch_logging::watch_debug;
use tokio_util::sync::CancellationToken;

/// Owned handle on a spawned producer task.
///
/// Releasing cancels the task, which drops its future and with it any open
/// connection or timer. Release is idempotent and also runs on drop.
pub(crate) struct TaskHandle {
    label: &'static str,
    epoch: Epoch,
    token: CancellationToken,
}

impl TaskHandle {
    pub(crate) fn spawn<F>(label: &'static str, epoch: Epoch, future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = future => {}
            }
        });
        Self {
            label,
            epoch,
            token,
        }
    }

    /// Returns true only for the call that actually cancelled the task.
    pub(crate) fn release(&self) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        self.token.cancel();
        watch_debug!("Released {} {}", self.label, self.epoch);
        true
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.release();
    }
}

/// Holds at most one task of a given kind.
#[derive(Default)]
pub(crate) struct TaskSlot(Option<TaskHandle>);

impl TaskSlot {
    /// Installs a new task, releasing whatever was there.
    pub(crate) fn fill(&mut self, handle: TaskHandle) {
        self.release();
        self.0 = Some(handle);
    }

    pub(crate) fn release(&mut self) -> bool {
        self.0.take().is_some_and(|handle| handle.release())
    }

    #[cfg(test)]
    pub(crate) fn is_occupied(&self) -> bool {
        self.0.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::{TaskHandle, TaskSlot};
    use jobwatch_core::Epoch;
    use tokio::sync::oneshot;

    /// A task that never finishes on its own; the receiver errors once the
    /// task's future has been dropped.
    fn parked_task() -> (TaskHandle, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel::<()>();
        let handle = TaskHandle::spawn("test", Epoch::default(), async move {
            let _keep = tx;
            std::future::pending::<()>().await;
        });
        (handle, rx)
    }

    #[tokio::test]
    async fn release_cancels_once() {
        let (handle, rx) = parked_task();

        assert!(handle.release());
        assert!(!handle.release());
        assert!(rx.await.is_err());
    }

    #[tokio::test]
    async fn dropping_the_handle_cancels_the_task() {
        let (handle, rx) = parked_task();
        drop(handle);
        assert!(rx.await.is_err());
    }

    #[tokio::test]
    async fn slot_release_is_idempotent() {
        let mut slot = TaskSlot::default();
        assert!(!slot.release());

        let (handle, rx) = parked_task();
        slot.fill(handle);
        assert!(slot.is_occupied());

        assert!(slot.release());
        assert!(!slot.release());
        assert!(!slot.is_occupied());
        assert!(rx.await.is_err());
    }

    #[tokio::test]
    async fn filling_a_slot_releases_the_previous_task() {
        let mut slot = TaskSlot::default();
        let (first, first_rx) = parked_task();
        let (second, _second_rx) = parked_task();

        slot.fill(first);
        slot.fill(second);

        assert!(first_rx.await.is_err());
        assert!(slot.is_occupied());
    }
}
