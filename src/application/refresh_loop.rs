// Live refresh loop - Re-run a panel's fetch cycle on a timer and on demand
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;

/// Something that can run one fetch-join-commit cycle.
#[async_trait]
pub trait Refreshable: Send + Sync + 'static {
    fn name(&self) -> &str;

    async fn run_cycle(&self);
}

/// Owns the background loop. Dropping it stops the timer and aborts any
/// cycle still in flight.
pub struct RefreshHandle {
    trigger: Arc<Notify>,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Start a new cycle now, without waiting for outstanding ones.
    pub fn trigger(&self) {
        self.trigger.notify_one();
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn the loop. The first cycle starts immediately, then one every
/// `period` plus one per `trigger()`. Cycles may overlap; ordering of their
/// commits is the target's concern.
pub fn spawn_refresh_loop(target: Arc<dyn Refreshable>, period: Duration) -> RefreshHandle {
    let trigger = Arc::new(Notify::new());
    let notified = trigger.clone();

    let task = tokio::spawn(async move {
        tracing::info!("Starting refresh loop for {} (every {:?})", target.name(), period);

        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut cycles = JoinSet::new();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    tracing::debug!("Timer refresh for {}", target.name());
                }
                _ = notified.notified() => {
                    tracing::debug!("Selection refresh for {}", target.name());
                }
                Some(done) = cycles.join_next() => {
                    if let Err(e) = done {
                        tracing::error!("Refresh cycle for {} panicked: {}", target.name(), e);
                    }
                    continue;
                }
            }

            let target = target.clone();
            cycles.spawn(async move { target.run_cycle().await });
        }
    });

    RefreshHandle { trigger, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter {
        cycles: AtomicUsize,
    }

    #[async_trait]
    impl Refreshable for Counter {
        fn name(&self) -> &str {
            "counter"
        }

        async fn run_cycle(&self) {
            self.cycles.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_on_mount_and_every_period() {
        let counter = Arc::new(Counter::default());
        let handle = spawn_refresh_loop(counter.clone(), Duration::from_secs(30));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(counter.cycles.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(counter.cycles.load(Ordering::SeqCst), 3);

        drop(handle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_starts_extra_cycle() {
        let counter = Arc::new(Counter::default());
        let handle = spawn_refresh_loop(counter.clone(), Duration::from_secs(30));

        tokio::time::sleep(Duration::from_secs(1)).await;
        handle.trigger();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(counter.cycles.load(Ordering::SeqCst), 2);

        drop(handle);
    }

    /// Cycles that never finish on their own.
    #[derive(Default)]
    struct Stuck {
        started: AtomicUsize,
        finished: AtomicUsize,
        release: Notify,
    }

    #[async_trait]
    impl Refreshable for Stuck {
        fn name(&self) -> &str {
            "stuck"
        }

        async fn run_cycle(&self) {
            self.started.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;
            self.finished.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_while_cycles_outstanding() {
        let target = Arc::new(Stuck::default());
        let handle = spawn_refresh_loop(target.clone(), Duration::from_secs(30));

        tokio::time::sleep(Duration::from_secs(1)).await;
        handle.trigger();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(target.started.load(Ordering::SeqCst), 2);

        // the tick at 30s does not wait for either of them
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(target.started.load(Ordering::SeqCst), 3);
        assert_eq!(target.finished.load(Ordering::SeqCst), 0);
        // one clone per in-flight cycle plus the loop's own
        assert_eq!(Arc::strong_count(&target), 5);

        drop(handle);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(target.finished.load(Ordering::SeqCst), 0);
        assert_eq!(Arc::strong_count(&target), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_releases_timer() {
        let counter = Arc::new(Counter::default());
        let handle = spawn_refresh_loop(counter.clone(), Duration::from_secs(30));

        tokio::time::sleep(Duration::from_secs(1)).await;
        drop(handle);
        tokio::time::sleep(Duration::from_secs(300)).await;

        assert_eq!(counter.cycles.load(Ordering::SeqCst), 1);
        // loop task no longer holds the target
        assert_eq!(Arc::strong_count(&counter), 1);
    }
}
