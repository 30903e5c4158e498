//! Highlight engine
//!
//! One engine instance is attached per document. It owns every piece of
//! mutable state (registry mirror, timers, event forwarders) and has an
//! explicit lifecycle:
//!
//! ```text
//! new ─▶ start ─┬─ inject style
//!               ├─ load registry (failure: logged, empty mirror)
//!               ├─ forward DomMutation / Navigation / StoreChange ─▶ ChangeScheduler
//!               └─ submit startup highlight + harvest
//!        stop  ─── abort forwarders, close the scheduler
//! ```

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::scheduler::{ChangeScheduler, TaskKind, TaskRunner};
use ahl_host::{
    inject_style, DomMutation, EventSource, Navigation, SharedDocument, StoreChange, SyncStore,
};
use ahl_registry::{MergeOutcome, MergeWriter, RegistryCache};
use ahl_scan::{AttributeScanner, HarvestExtractor, MarkerApplier, MatchEngine, PassStats};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// Counters since construction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Highlight passes executed
    pub highlight_passes: usize,
    /// Harvest passes executed (including those that found nothing)
    pub harvest_passes: usize,
    /// Merge writes performed
    pub merge_writes: usize,
    /// Elements marked across all passes
    pub elements_marked: usize,
}

#[derive(Debug, Default)]
struct Counters {
    highlight_passes: AtomicUsize,
    harvest_passes: AtomicUsize,
    merge_writes: AtomicUsize,
    elements_marked: AtomicUsize,
}

struct EngineInner {
    config: EngineConfig,
    document: SharedDocument,
    store: Arc<dyn SyncStore>,
    cache: RegistryCache,
    matcher: MatchEngine,
    harvester: HarvestExtractor,
    merger: MergeWriter,
    scheduler: ChangeScheduler,
    forwarders: Mutex<Vec<JoinHandle<()>>>,
    running: AtomicBool,
    counters: Counters,
}

impl EngineInner {
    fn highlight_pass(&self) -> PassStats {
        let registry = self.cache.snapshot();
        let stats = {
            let mut doc = self.document.write();
            self.matcher.run_pass(&mut *doc, &registry)
        };
        self.counters.highlight_passes.fetch_add(1, Ordering::SeqCst);
        self.counters
            .elements_marked
            .fetch_add(stats.marked, Ordering::SeqCst);
        stats
    }

    async fn harvest_pass(&self) -> EngineResult<MergeOutcome> {
        self.counters.harvest_passes.fetch_add(1, Ordering::SeqCst);
        let harvested = {
            let doc = self.document.read();
            self.harvester.harvest(&*doc, self.matcher.scanner())
        };
        if harvested.is_empty() {
            return Ok(MergeOutcome::default());
        }

        let outcome = self
            .merger
            .merge(self.store.as_ref(), &self.cache, &harvested)
            .await?;
        if outcome.changed() {
            self.counters.merge_writes.fetch_add(1, Ordering::SeqCst);
            tracing::info!(
                "Merged {} new address(es) into the registry",
                outcome.added.len()
            );
            self.scheduler
                .submit(TaskKind::Highlight, self.config.delays.merge());
        }
        Ok(outcome)
    }

    fn on_mutation(&self, _mutation: DomMutation) {
        let delays = self.config.delays.mutation;
        self.scheduler.submit(TaskKind::Highlight, delays.highlight());
        self.scheduler.submit(TaskKind::Harvest, delays.harvest());
    }

    fn on_navigation(&self, navigation: Navigation) {
        tracing::debug!("Navigation to #{}", navigation.to);
        let delays = self.config.delays.navigation;
        self.scheduler.submit(TaskKind::Highlight, delays.highlight());
        self.scheduler.submit(TaskKind::Harvest, delays.harvest());
    }

    fn on_store_change(&self, change: StoreChange) {
        tracing::debug!(
            "Store change in {} area: {:?}",
            change.area,
            change.changed_keys().collect::<Vec<_>>()
        );
        if self
            .cache
            .apply_change(&change, self.config.storage_area, &self.config.storage_key)
        {
            self.scheduler
                .submit(TaskKind::Highlight, self.config.delays.store_change());
        }
    }
}

#[async_trait]
impl TaskRunner for EngineInner {
    async fn run(&self, task: TaskKind) -> EngineResult<()> {
        match task {
            TaskKind::Highlight => {
                self.highlight_pass();
                Ok(())
            }
            TaskKind::Harvest => self.harvest_pass().await.map(|_| ()),
        }
    }
}

/// Spawn the single forwarding handler for one event class
fn forward<E, S>(
    source: &S,
    label: &'static str,
    engine: Weak<EngineInner>,
    handler: fn(&EngineInner, E),
) -> JoinHandle<()>
where
    E: Clone + Send + 'static,
    S: EventSource<E> + ?Sized,
{
    let mut events = source.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    let Some(engine) = engine.upgrade() else {
                        break;
                    };
                    handler(&engine, event);
                }
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!("{} stream lagged, {} event(s) dropped", label, missed);
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

/// Observation-and-matching engine attached to one document
pub struct HighlightEngine {
    inner: Arc<EngineInner>,
}

impl HighlightEngine {
    /// Build an engine over a document and a store
    ///
    /// # Errors
    /// - `EngineError::Scan` if the scan configuration or harvest pattern is invalid
    pub fn new(
        config: EngineConfig,
        document: SharedDocument,
        store: Arc<dyn SyncStore>,
    ) -> EngineResult<Self> {
        let scanner = AttributeScanner::new(config.scan.clone())?;
        let marker = MarkerApplier::from_style(&config.marker);
        let harvester =
            HarvestExtractor::new(&config.harvest_pattern, config.harvest_prefix.clone())?;
        let merger = MergeWriter::new(config.storage_key.clone());

        let inner = Arc::new_cyclic(|weak: &Weak<EngineInner>| {
            let runner: Weak<dyn TaskRunner> = weak.clone();
            EngineInner {
                config,
                document,
                store,
                cache: RegistryCache::new(),
                matcher: MatchEngine::new(scanner, marker),
                harvester,
                merger,
                scheduler: ChangeScheduler::new(runner),
                forwarders: Mutex::new(Vec::new()),
                running: AtomicBool::new(false),
                counters: Counters::default(),
            }
        });
        Ok(Self { inner })
    }

    /// Attach to the document and begin observing
    ///
    /// A failed registry load is logged and the engine starts with an empty
    /// mirror; a later store change can still populate it.
    ///
    /// # Errors
    /// - `EngineError::AlreadyStarted` if the engine is running
    pub async fn start(&self) -> EngineResult<()> {
        if self.inner.running.swap(true, Ordering::SeqCst) {
            return Err(EngineError::AlreadyStarted);
        }
        let inner = &self.inner;
        inner.scheduler.reopen();

        if inner.store.area() != inner.config.storage_area {
            tracing::warn!(
                "Store writes to the {} area but changes are watched in {}",
                inner.store.area(),
                inner.config.storage_area
            );
        }

        if inject_style(&mut *inner.document.write(), &inner.config.marker) {
            tracing::debug!("Injected marker style '{}'", inner.config.marker.style_id);
        }

        if let Err(e) = inner
            .cache
            .load(inner.store.as_ref(), &inner.config.storage_key)
            .await
        {
            tracing::error!("Failed to load registered addresses: {}", e);
        }

        let weak = Arc::downgrade(inner);
        let handles = vec![
            forward::<DomMutation, _>(
                &inner.document,
                "mutation",
                weak.clone(),
                EngineInner::on_mutation,
            ),
            forward::<Navigation, _>(
                &inner.document,
                "navigation",
                weak.clone(),
                EngineInner::on_navigation,
            ),
            forward::<StoreChange, _>(
                inner.store.as_ref(),
                "store",
                weak,
                EngineInner::on_store_change,
            ),
        ];
        *inner.forwarders.lock() = handles;

        let startup = inner.config.delays.startup;
        inner.scheduler.submit(TaskKind::Highlight, startup.highlight());
        inner.scheduler.submit(TaskKind::Harvest, startup.harvest());

        tracing::info!(
            "Highlight engine started with {} registered address(es)",
            inner.cache.len()
        );
        Ok(())
    }

    /// Detach: stop forwarding events and drop pending passes
    ///
    /// A pass that is already executing finishes normally, but any follow-up
    /// pass it tries to schedule is dropped.
    pub fn stop(&self) {
        for handle in self.inner.forwarders.lock().drain(..) {
            handle.abort();
        }
        self.inner.scheduler.close();
        if self.inner.running.swap(false, Ordering::SeqCst) {
            tracing::info!("Highlight engine stopped");
        }
    }

    /// Whether `start` has run without a matching `stop`
    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    /// Schedule `task` after `delay` as an event handler would
    pub fn submit(&self, task: TaskKind, delay: std::time::Duration) {
        self.inner.scheduler.submit(task, delay);
    }

    /// Whether `task` has a pending invocation
    #[must_use]
    pub fn is_pending(&self, task: TaskKind) -> bool {
        self.inner.scheduler.is_pending(task)
    }

    /// Run a task body immediately, bypassing the debounce
    pub async fn run_task(&self, task: TaskKind) -> EngineResult<()> {
        self.inner.run(task).await
    }

    /// Run a highlight pass now
    pub fn highlight_now(&self) -> PassStats {
        self.inner.highlight_pass()
    }

    /// Run a harvest pass and merge now
    ///
    /// A successful write still schedules the follow-up highlight pass.
    pub async fn harvest_now(&self) -> EngineResult<MergeOutcome> {
        self.inner.harvest_pass().await
    }

    /// Load the registry mirror without starting observation
    pub async fn load_registry(&self) -> EngineResult<usize> {
        Ok(self
            .inner
            .cache
            .load(self.inner.store.as_ref(), &self.inner.config.storage_key)
            .await?)
    }

    /// The registry mirror
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &RegistryCache {
        &self.inner.cache
    }

    /// The observed document
    #[inline]
    #[must_use]
    pub fn document(&self) -> &SharedDocument {
        &self.inner.document
    }

    /// The attribute scanner shared by both passes
    #[inline]
    #[must_use]
    pub fn scanner(&self) -> &AttributeScanner {
        self.inner.matcher.scanner()
    }

    /// The marker applier (for checking marked elements)
    #[inline]
    #[must_use]
    pub fn marker(&self) -> &MarkerApplier {
        self.inner.matcher.marker()
    }

    /// Engine configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Counters since construction
    #[must_use]
    pub fn stats(&self) -> EngineStats {
        let c = &self.inner.counters;
        EngineStats {
            highlight_passes: c.highlight_passes.load(Ordering::SeqCst),
            harvest_passes: c.harvest_passes.load(Ordering::SeqCst),
            merge_writes: c.merge_writes.load(Ordering::SeqCst),
            elements_marked: c.elements_marked.load(Ordering::SeqCst),
        }
    }
}

impl Drop for HighlightEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for HighlightEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HighlightEngine")
            .field("running", &self.is_running())
            .field("registered", &self.inner.cache.len())
            .field("stats", &self.stats())
            .finish()
    }
}
