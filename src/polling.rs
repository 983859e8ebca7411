use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// A repeating background task, aborted when the handle is dropped.
///
/// The first tick fires one full period after spawning. Ticks that would
/// overlap a slow callback are skipped rather than queued. Returning
/// `ControlFlow::Break` from the callback ends the task.
pub struct PollHandle {
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn spawn<F, Fut>(period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tick().await.is_break() {
                    break;
                }
            }
        });
        PollHandle { task }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting(period: Duration, stop_after: usize) -> (PollHandle, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let handle = PollHandle::spawn(period, move || {
            let c = c.clone();
            async move {
                if c.fetch_add(1, Ordering::SeqCst) + 1 >= stop_after {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            }
        });
        (handle, count)
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_every_period_after_first() {
        let (_handle, count) = counting(Duration::from_secs(5), usize::MAX);
        tokio::time::sleep(Duration::from_millis(4_900)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(10_200)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let (handle, count) = counting(Duration::from_secs(5), usize::MAX);
        tokio::time::sleep(Duration::from_millis(5_500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        drop(handle);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_break_stops_task() {
        let (handle, count) = counting(Duration::from_secs(1), 2);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert!(handle.is_finished());
    }
}
