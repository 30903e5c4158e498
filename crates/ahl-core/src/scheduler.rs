//! Debounced task scheduling
//!
//! [`Debouncer`] is the one cancel-and-reschedule primitive: each `submit`
//! replaces the pending invocation, so a burst of triggers collapses into a
//! single run after the last trigger's delay. A body that has started is
//! never cancelled; a `submit` during its run schedules the next one.
//! A closed debouncer drops submissions until it is reopened.
//!
//! [`ChangeScheduler`] owns one debouncer per [`TaskKind`] and dispatches
//! fired tasks to a [`TaskRunner`].

use crate::error::EngineResult;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;

/// The two independently scheduled tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Scan and mark matching elements
    Highlight,
    /// Harvest addresses and merge them into the registry
    Harvest,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Highlight => f.write_str("highlight"),
            Self::Harvest => f.write_str("harvest"),
        }
    }
}

/// Executes a fired task body
#[async_trait]
pub trait TaskRunner: Send + Sync + 'static {
    /// Run `task` to completion
    async fn run(&self, task: TaskKind) -> EngineResult<()>;
}

#[derive(Debug, Default)]
struct DebounceState {
    generation: u64,
    pending: Option<JoinHandle<()>>,
    closed: bool,
}

/// Single-flight, cancel-and-reschedule timer
#[derive(Debug)]
pub struct Debouncer {
    name: &'static str,
    state: Arc<Mutex<DebounceState>>,
}

impl Debouncer {
    /// Create an idle debouncer; `name` labels its log lines
    #[inline]
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: Arc::new(Mutex::new(DebounceState::default())),
        }
    }

    /// Replace any pending invocation with `body` after `delay`
    ///
    /// Must be called from within a tokio runtime. A failing body is
    /// logged; it does not affect later submissions.
    pub fn submit<F, Fut>(&self, delay: Duration, body: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = EngineResult<()>> + Send + 'static,
    {
        let mut state = self.state.lock();
        if state.closed {
            tracing::debug!("{} closed, dropping submission", self.name);
            return;
        }
        state.generation += 1;
        let generation = state.generation;
        if let Some(previous) = state.pending.take() {
            previous.abort();
        }

        let shared = Arc::clone(&self.state);
        let name = self.name;
        state.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut state = shared.lock();
                if state.generation != generation {
                    return;
                }
                // From here on the body runs to completion.
                state.pending = None;
            }

            tracing::debug!("Running {} task", name);
            match body().await {
                Ok(()) => {}
                Err(e) if e.is_store_failure() => {
                    tracing::warn!("{} task hit a store failure: {}", name, e);
                }
                Err(e) => tracing::error!("{} task failed: {}", name, e),
            }
        }));
    }

    /// Drop the pending invocation, if any
    pub fn cancel(&self) {
        let mut state = self.state.lock();
        state.generation += 1;
        if let Some(pending) = state.pending.take() {
            pending.abort();
        }
    }

    /// Drop the pending invocation and refuse submissions until reopened
    ///
    /// A body that is already running still finishes; anything it submits
    /// is dropped.
    pub fn close(&self) {
        self.state.lock().closed = true;
        self.cancel();
    }

    /// Accept submissions again
    pub fn reopen(&self) {
        self.state.lock().closed = false;
    }

    /// Whether an invocation is waiting for its delay
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state.lock().pending.is_some()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Debounced dispatcher for highlight and harvest passes
pub struct ChangeScheduler {
    highlight: Debouncer,
    harvest: Debouncer,
    runner: Weak<dyn TaskRunner>,
}

impl ChangeScheduler {
    /// Scheduler dispatching to `runner`; nothing runs once it is dropped
    #[must_use]
    pub fn new(runner: Weak<dyn TaskRunner>) -> Self {
        Self {
            highlight: Debouncer::new("highlight"),
            harvest: Debouncer::new("harvest"),
            runner,
        }
    }

    fn debouncer(&self, task: TaskKind) -> &Debouncer {
        match task {
            TaskKind::Highlight => &self.highlight,
            TaskKind::Harvest => &self.harvest,
        }
    }

    /// Schedule `task` after `delay`, replacing its pending invocation
    pub fn submit(&self, task: TaskKind, delay: Duration) {
        let runner = self.runner.clone();
        self.debouncer(task).submit(delay, move || async move {
            match runner.upgrade() {
                Some(runner) => runner.run(task).await,
                None => Ok(()),
            }
        });
    }

    /// Whether `task` has a pending invocation
    #[must_use]
    pub fn is_pending(&self, task: TaskKind) -> bool {
        self.debouncer(task).is_pending()
    }

    /// Drop every pending invocation and refuse new ones
    pub fn close(&self) {
        self.highlight.close();
        self.harvest.close();
    }

    /// Accept submissions again after `close`
    pub fn reopen(&self) {
        self.highlight.reopen();
        self.harvest.reopen();
    }
}

impl fmt::Debug for ChangeScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeScheduler")
            .field("highlight", &self.highlight)
            .field("harvest", &self.harvest)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use pretty_assertions::assert_eq;
    use tokio::time::{sleep, Instant};

    #[derive(Default)]
    struct Recorder {
        runs: Mutex<Vec<(TaskKind, Instant)>>,
        fail_first: Mutex<bool>,
    }

    #[async_trait]
    impl TaskRunner for Recorder {
        async fn run(&self, task: TaskKind) -> EngineResult<()> {
            self.runs.lock().push((task, Instant::now()));
            if std::mem::take(&mut *self.fail_first.lock()) {
                return Err(EngineError::AlreadyStarted);
            }
            Ok(())
        }
    }

    fn scheduler() -> (Arc<Recorder>, ChangeScheduler) {
        let recorder = Arc::new(Recorder::default());
        let weak: Weak<dyn TaskRunner> = Arc::downgrade(&recorder) as Weak<dyn TaskRunner>;
        (recorder, ChangeScheduler::new(weak))
    }

    #[tokio::test(start_paused = true)]
    async fn burst_collapses_to_one_run_with_last_delay() {
        let (recorder, scheduler) = scheduler();
        let start = Instant::now();

        for _ in 0..10 {
            scheduler.submit(TaskKind::Highlight, Duration::from_millis(800));
            sleep(Duration::from_millis(100)).await;
        }
        scheduler.submit(TaskKind::Highlight, Duration::from_millis(2000));
        sleep(Duration::from_secs(10)).await;

        let runs = recorder.runs.lock().clone();
        assert_eq!(runs.len(), 1);
        let fired_after = runs[0].1 - start;
        assert!(fired_after >= Duration::from_millis(3000));
        assert!(fired_after < Duration::from_millis(3010));
    }

    #[tokio::test(start_paused = true)]
    async fn tasks_are_independent() {
        let (recorder, scheduler) = scheduler();

        scheduler.submit(TaskKind::Highlight, Duration::from_millis(800));
        scheduler.submit(TaskKind::Harvest, Duration::from_millis(1500));
        sleep(Duration::from_millis(900)).await;
        assert!(!scheduler.is_pending(TaskKind::Highlight));
        assert!(scheduler.is_pending(TaskKind::Harvest));

        sleep(Duration::from_millis(1000)).await;
        let kinds: Vec<TaskKind> = recorder.runs.lock().iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, vec![TaskKind::Highlight, TaskKind::Harvest]);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_does_not_stop_scheduling() {
        let (recorder, scheduler) = scheduler();
        *recorder.fail_first.lock() = true;

        scheduler.submit(TaskKind::Harvest, Duration::from_millis(10));
        sleep(Duration::from_millis(20)).await;
        scheduler.submit(TaskKind::Harvest, Duration::from_millis(10));
        sleep(Duration::from_millis(20)).await;

        assert_eq!(recorder.runs.lock().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn close_drops_pending_until_reopened() {
        let (recorder, scheduler) = scheduler();
        scheduler.submit(TaskKind::Highlight, Duration::from_millis(10));
        scheduler.submit(TaskKind::Harvest, Duration::from_millis(10));
        scheduler.close();
        scheduler.submit(TaskKind::Highlight, Duration::from_millis(10));
        assert!(!scheduler.is_pending(TaskKind::Highlight));
        sleep(Duration::from_millis(50)).await;
        assert!(recorder.runs.lock().is_empty());

        scheduler.reopen();
        scheduler.submit(TaskKind::Highlight, Duration::from_millis(10));
        sleep(Duration::from_millis(50)).await;
        assert_eq!(recorder.runs.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn submit_from_running_body_after_close_is_dropped() {
        let debouncer = Arc::new(Debouncer::new("slow"));
        let finished = Arc::new(Mutex::new(0usize));

        let inner = Arc::clone(&debouncer);
        let counter = Arc::clone(&finished);
        debouncer.submit(Duration::from_millis(10), move || async move {
            sleep(Duration::from_millis(100)).await;
            let counter = Arc::clone(&counter);
            inner.submit(Duration::from_millis(10), move || async move {
                *counter.lock() += 1;
                Ok(())
            });
            Ok(())
        });
        sleep(Duration::from_millis(50)).await;
        debouncer.close();
        sleep(Duration::from_millis(200)).await;

        assert!(!debouncer.is_pending());
        assert_eq!(*finished.lock(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_runner_turns_tasks_into_no_ops() {
        let (recorder, scheduler) = scheduler();
        let weak = Arc::downgrade(&recorder);
        drop(recorder);

        scheduler.submit(TaskKind::Highlight, Duration::from_millis(10));
        sleep(Duration::from_millis(20)).await;
        assert!(weak.upgrade().is_none());
        assert!(!scheduler.is_pending(TaskKind::Highlight));
    }

    #[tokio::test(start_paused = true)]
    async fn submit_during_run_schedules_next_without_cancelling() {
        let debouncer = Debouncer::new("slow");
        let finished = Arc::new(Mutex::new(0usize));

        let counter = Arc::clone(&finished);
        debouncer.submit(Duration::from_millis(10), move || async move {
            sleep(Duration::from_millis(100)).await;
            *counter.lock() += 1;
            Ok(())
        });
        sleep(Duration::from_millis(50)).await;

        let counter = Arc::clone(&finished);
        debouncer.submit(Duration::from_millis(10), move || async move {
            *counter.lock() += 1;
            Ok(())
        });
        sleep(Duration::from_millis(200)).await;

        assert_eq!(*finished.lock(), 2);
    }
}
