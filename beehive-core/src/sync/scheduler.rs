use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::sync::{oneshot, watch, Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::error::{BeehiveError, BeehiveResult};
use crate::models::Credential;

use super::traits::{PollControl, Reconcile, ResourceFetcher};
use super::types::{FetchError, PollConfig, PollState, PollStatus, ResourceKey};

type InFlight<T> = BoxFuture<'static, Result<T, FetchError>>;

/// Drives a [`ResourceFetcher`] on a fixed interval and feeds every result through a
/// [`Reconcile`] view.
///
/// One poll session runs per key. Changing the key tears the old session down and bumps
/// a generation counter; results are only applied while their generation is current, so
/// a late response for a previous key can never land in the new key's view.
pub struct PollScheduler<F: ResourceFetcher, V> {
    inner: Arc<SchedulerInner<F, V>>,
}

impl<F: ResourceFetcher, V> Clone for PollScheduler<F, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct SchedulerInner<F: ResourceFetcher, V> {
    fetcher: Arc<F>,
    credential: Credential,
    config: PollConfig,
    control: Mutex<SessionControl>,
    status_tx: watch::Sender<PollStatus>,
    view_tx: watch::Sender<V>,
}

#[derive(Default)]
struct SessionControl {
    generation: u64,
    key: Option<ResourceKey>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    refresh: Option<Arc<Notify>>,
    task: Option<JoinHandle<()>>,
}

impl SessionControl {
    fn teardown(&mut self) -> bool {
        let was_running = self.task.is_some();
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.refresh = None;
        was_running
    }
}

impl<F, V> PollScheduler<F, V>
where
    F: ResourceFetcher,
    V: Reconcile<Snapshot = F::Snapshot>,
{
    pub fn new(fetcher: F, credential: Credential, config: PollConfig, initial: V) -> Self {
        let (status_tx, _) = watch::channel(PollStatus::default());
        let (view_tx, _) = watch::channel(initial);

        Self {
            inner: Arc::new(SchedulerInner {
                fetcher: Arc::new(fetcher),
                credential,
                config,
                control: Mutex::new(SessionControl::default()),
                status_tx,
                view_tx,
            }),
        }
    }

    pub fn resource_name(&self) -> &str {
        self.inner.fetcher.resource_name()
    }

    pub fn config(&self) -> &PollConfig {
        &self.inner.config
    }

    pub fn view(&self) -> V {
        self.inner.view_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<V> {
        self.inner.view_tx.subscribe()
    }

    pub fn status(&self) -> PollStatus {
        self.inner.status_tx.borrow().clone()
    }

    pub fn watch_status(&self) -> watch::Receiver<PollStatus> {
        self.inner.status_tx.subscribe()
    }

    /// Edits local UI state (draft text, open flags) in place.
    pub fn update_view(&self, edit: impl FnOnce(&mut V)) {
        self.inner.view_tx.send_modify(edit);
    }

    pub async fn current_key(&self) -> Option<ResourceKey> {
        self.inner.control.lock().await.key.clone()
    }

    /// Starts polling `key`: the previous session is cancelled, the view's list data is
    /// cleared, one fetch goes out immediately and the interval timer is armed.
    pub async fn start(&self, key: ResourceKey) -> BeehiveResult<()> {
        let mut control = self.inner.control.lock().await;
        control.teardown();
        control.generation += 1;
        let generation = control.generation;
        self.inner.view_tx.send_modify(|view| *view = view.cleared());

        if !key.is_valid() {
            control.key = None;
            self.inner
                .status_tx
                .send_replace(PollStatus::suspended(generation, Some(key)));
            debug!(
                resource = %self.resource_name(),
                generation,
                "Empty resource key, poll session suspended"
            );
            return Err(BeehiveError::InvalidKey(format!(
                "{} poll needs a non-empty key",
                self.resource_name()
            )));
        }

        self.inner
            .status_tx
            .send_replace(PollStatus::started(generation, key.clone()));

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let refresh = Arc::new(Notify::new());
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(inner.run_session(
            generation,
            key.clone(),
            Arc::clone(&refresh),
            shutdown_rx,
        ));

        control.shutdown_tx = Some(shutdown_tx);
        control.refresh = Some(refresh);
        control.task = Some(task);
        control.key = Some(key.clone());

        info!(
            resource = %self.resource_name(),
            key = %key,
            generation,
            interval_ms = self.inner.config.interval.as_millis() as u64,
            "Poll session started"
        );
        Ok(())
    }

    /// Tears the session down. A fetch still in flight is dropped and its result, should
    /// it arrive, is ignored.
    pub async fn stop(&self) {
        let mut control = self.inner.control.lock().await;
        let was_running = control.teardown();
        control.generation += 1;
        let generation = control.generation;
        control.key = None;

        self.inner.status_tx.send_modify(|status| {
            status.generation = generation;
            status.state = PollState::Suspended;
            status.in_flight = false;
        });

        if was_running {
            info!(resource = %self.resource_name(), generation, "Poll session stopped");
        }
    }

    /// Asks the running session for an out-of-band fetch. Single-flight still applies: if a
    /// fetch is already outstanding, its result is discarded and the refresh goes out as
    /// soon as it resolves. Requests made meanwhile collapse into that one fetch.
    pub async fn refresh_now(&self) -> bool {
        let control = self.inner.control.lock().await;
        match &control.refresh {
            Some(refresh) => {
                refresh.notify_one();
                true
            }
            None => false,
        }
    }
}

impl<F, V> SchedulerInner<F, V>
where
    F: ResourceFetcher,
    V: Reconcile<Snapshot = F::Snapshot>,
{
    fn name(&self) -> &str {
        self.fetcher.resource_name()
    }

    async fn run_session(
        self: Arc<Self>,
        generation: u64,
        key: ResourceKey,
        refresh: Arc<Notify>,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) {
        let period = self.config.interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut in_flight = Some(self.issue(generation, &key));
        let mut backoff_until: Option<Instant> = None;
        let mut refresh_pending = false;

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown_rx => {
                    debug!(resource = %self.name(), key = %key, generation, "Poll session shutting down");
                    break;
                }
                result = wait_in_flight(&mut in_flight) => {
                    in_flight = None;
                    if refresh_pending {
                        // The outstanding fetch may predate a confirmed write.
                        refresh_pending = false;
                        debug!(
                            resource = %self.name(),
                            key = %key,
                            generation,
                            failed = result.is_err(),
                            "Discarding fetch overtaken by a refresh request"
                        );
                        in_flight = Some(self.issue(generation, &key));
                        continue;
                    }
                    match self.apply(generation, &key, result).await {
                        Some(failures) => {
                            let delay = self.config.backoff_for(failures);
                            backoff_until = (!delay.is_zero()).then(|| Instant::now() + delay);
                        }
                        None => break,
                    }
                }
                _ = ticker.tick() => {
                    if in_flight.is_some() {
                        self.skip(generation, "tick");
                        continue;
                    }
                    if let Some(until) = backoff_until {
                        if Instant::now() < until {
                            debug!(resource = %self.name(), key = %key, "Backing off after repeated failures");
                            continue;
                        }
                    }
                    in_flight = Some(self.issue(generation, &key));
                }
                _ = refresh.notified() => {
                    if in_flight.is_some() {
                        debug!(resource = %self.name(), key = %key, "Refresh deferred until the current fetch resolves");
                        refresh_pending = true;
                        continue;
                    }
                    debug!(resource = %self.name(), key = %key, "Out-of-band refresh");
                    in_flight = Some(self.issue(generation, &key));
                }
            }
        }
    }

    fn issue(&self, generation: u64, key: &ResourceKey) -> InFlight<F::Snapshot> {
        self.status_tx.send_if_modified(|status| {
            if status.generation != generation {
                return false;
            }
            status.record_issue();
            true
        });

        let fetcher = Arc::clone(&self.fetcher);
        let credential = self.credential.clone();
        let key = key.clone();
        let timeout = self.config.request_timeout;

        Box::pin(async move {
            match tokio::time::timeout(timeout, fetcher.fetch(&key, &credential)).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout(timeout)),
            }
        })
    }

    fn skip(&self, generation: u64, trigger: &str) {
        self.status_tx.send_if_modified(|status| {
            if status.generation != generation {
                return false;
            }
            status.skipped_ticks += 1;
            true
        });
        debug!(
            resource = %self.name(),
            generation,
            trigger,
            "Fetch still in flight, skipping"
        );
    }

    /// Applies a fetch result if its session is still current. Returns the consecutive
    /// failure count, or `None` when the session has been superseded.
    async fn apply(
        &self,
        generation: u64,
        key: &ResourceKey,
        result: Result<F::Snapshot, FetchError>,
    ) -> Option<u32> {
        let control = self.control.lock().await;
        if control.generation != generation {
            debug!(
                resource = %self.name(),
                key = %key,
                generation,
                current = control.generation,
                "Discarding result from superseded poll session"
            );
            return None;
        }

        match result {
            Ok(snapshot) => {
                self.view_tx
                    .send_modify(|view| *view = view.reconcile(&snapshot));
                self.status_tx.send_modify(PollStatus::record_success);
                debug!(resource = %self.name(), key = %key, generation, "Snapshot applied");
                Some(0)
            }
            Err(error) => {
                warn!(
                    resource = %self.name(),
                    key = %key,
                    generation,
                    error = %error,
                    "Poll failed, keeping last snapshot"
                );
                let mut failures = 0;
                self.status_tx.send_modify(|status| {
                    status.record_failure(error);
                    failures = status.consecutive_failures;
                });
                Some(failures)
            }
        }
    }
}

async fn wait_in_flight<T>(slot: &mut Option<InFlight<T>>) -> Result<T, FetchError> {
    match slot.as_mut() {
        Some(fetch) => fetch.await,
        None => std::future::pending().await,
    }
}

#[async_trait]
impl<F, V> PollControl for PollScheduler<F, V>
where
    F: ResourceFetcher,
    V: Reconcile<Snapshot = F::Snapshot>,
{
    fn resource_name(&self) -> &str {
        PollScheduler::resource_name(self)
    }

    async fn start(&self, key: ResourceKey) -> BeehiveResult<()> {
        PollScheduler::start(self, key).await
    }

    async fn stop(&self) {
        PollScheduler::stop(self).await
    }

    async fn refresh_now(&self) -> bool {
        PollScheduler::refresh_now(self).await
    }

    fn status(&self) -> PollStatus {
        PollScheduler::status(self)
    }
}
