#![allow(dead_code, unused_imports, unused_variables, unused_mut)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

use beehive_core::error::BeehiveError;
use beehive_core::models::Credential;
use beehive_core::sync::{
    FetchError, PollConfig, PollControl, PollScheduler, PollState, Reconcile, ResourceFetcher,
    ResourceKey,
};

/// Returns `"<key>#<n>"`, blocking on a gate for keys listed as gated.
struct GatedFetcher {
    calls: Arc<AtomicUsize>,
    gate: Arc<Semaphore>,
    gated_keys: Vec<&'static str>,
}

impl GatedFetcher {
    fn new(gated_keys: Vec<&'static str>) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            gate: Arc::new(Semaphore::new(0)),
            gated_keys,
        }
    }
}

#[async_trait]
impl ResourceFetcher for GatedFetcher {
    type Snapshot = String;

    fn resource_name(&self) -> &str {
        "gated"
    }

    async fn fetch(&self, key: &ResourceKey, _credential: &Credential) -> Result<String, FetchError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.gated_keys.contains(&key.as_str()) {
            let _permit = self
                .gate
                .acquire()
                .await
                .map_err(|e| FetchError::transport(None, e.to_string()))?;
        }
        Ok(format!("{}#{}", key, n))
    }
}

/// Plays back a fixed script of results, then repeats the last one.
struct ScriptedFetcher {
    calls: Arc<AtomicUsize>,
    script: Mutex<VecDeque<Result<String, FetchError>>>,
    last: Result<String, FetchError>,
}

impl ScriptedFetcher {
    fn new(script: Vec<Result<String, FetchError>>) -> Self {
        let last = script
            .last()
            .cloned()
            .unwrap_or_else(|| Ok(String::new()));
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            script: Mutex::new(script.into()),
            last,
        }
    }
}

#[async_trait]
impl ResourceFetcher for ScriptedFetcher {
    type Snapshot = String;

    fn resource_name(&self) -> &str {
        "scripted"
    }

    async fn fetch(&self, _key: &ResourceKey, _credential: &Credential) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.last.clone())
    }
}

struct HangingFetcher {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ResourceFetcher for HangingFetcher {
    type Snapshot = String;

    fn resource_name(&self) -> &str {
        "hanging"
    }

    async fn fetch(&self, _key: &ResourceKey, _credential: &Credential) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
struct Latest {
    value: Option<String>,
    draft: String,
}

impl Reconcile for Latest {
    type Snapshot = String;

    fn reconcile(&self, snapshot: &String) -> Self {
        Self {
            value: Some(snapshot.clone()),
            draft: self.draft.clone(),
        }
    }

    fn cleared(&self) -> Self {
        Self {
            value: None,
            draft: self.draft.clone(),
        }
    }
}

fn schedule<F: ResourceFetcher<Snapshot = String>>(
    fetcher: F,
    config: PollConfig,
) -> PollScheduler<F, Latest> {
    PollScheduler::new(fetcher, Credential::bearer("test-token"), config, Latest::default())
}

async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

mod single_flight_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_ticks_are_skipped() {
        let fetcher = GatedFetcher::new(vec!["user-42"]);
        let calls = Arc::clone(&fetcher.calls);
        let gate = Arc::clone(&fetcher.gate);
        let scheduler = schedule(
            fetcher,
            PollConfig::every(Duration::from_secs(5)).with_request_timeout(Duration::from_secs(60)),
        );

        tokio_test::assert_ok!(scheduler.start(ResourceKey::from("user-42")).await);
        tokio::time::sleep(Duration::from_secs(26)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let status = scheduler.status();
        assert!(status.in_flight);
        assert!(status.skipped_ticks >= 5, "skipped {}", status.skipped_ticks);
        assert_eq!(status.fetch_count, 1);

        gate.add_permits(1);
        settle().await;
        assert_eq!(scheduler.view().value.as_deref(), Some("user-42#1"));
        assert!(!scheduler.status().in_flight);

        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_while_in_flight_runs_after_it() {
        let fetcher = GatedFetcher::new(vec!["user-42"]);
        let calls = Arc::clone(&fetcher.calls);
        let gate = Arc::clone(&fetcher.gate);
        let scheduler = schedule(
            fetcher,
            PollConfig::every(Duration::from_secs(60)).with_request_timeout(Duration::from_secs(600)),
        );

        scheduler.start(ResourceKey::from("user-42")).await.unwrap();
        settle().await;
        assert!(scheduler.refresh_now().await);
        assert!(scheduler.refresh_now().await);
        settle().await;

        // Still one request outstanding.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.view().value, None);

        // The permit goes back to the gate when the first fetch returns, so the follow-up
        // passes straight through.
        gate.add_permits(1);
        settle().await;

        // The first result is dropped and exactly one follow-up fetch goes out.
        assert_eq!(scheduler.view().value.as_deref(), Some("user-42#2"));
        let status = scheduler.status();
        assert!(!status.in_flight);
        assert_eq!(status.fetch_count, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_after_result_issues_fresh_fetch() {
        let fetcher = ScriptedFetcher::new(vec![Ok("before".to_string()), Ok("after".to_string())]);
        let calls = Arc::clone(&fetcher.calls);
        let scheduler = schedule(fetcher, PollConfig::every(Duration::from_secs(60)));

        scheduler.start(ResourceKey::from("user-42")).await.unwrap();
        settle().await;
        assert_eq!(scheduler.view().value.as_deref(), Some("before"));

        assert!(scheduler.refresh_now().await);
        settle().await;
        assert_eq!(scheduler.view().value.as_deref(), Some("after"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        scheduler.stop().await;
    }
}

mod stale_discard_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_late_response_for_old_key_is_ignored() {
        let fetcher = GatedFetcher::new(vec!["user-1"]);
        let gate = Arc::clone(&fetcher.gate);
        let scheduler = schedule(
            fetcher,
            PollConfig::every(Duration::from_secs(60)).with_request_timeout(Duration::from_secs(600)),
        );

        scheduler.start(ResourceKey::from("user-1")).await.unwrap();
        settle().await;
        assert!(scheduler.status().in_flight);

        scheduler.start(ResourceKey::from("user-2")).await.unwrap();
        settle().await;
        assert_eq!(scheduler.view().value.as_deref(), Some("user-2#2"));

        gate.add_permits(10);
        settle().await;

        assert_eq!(scheduler.view().value.as_deref(), Some("user-2#2"));
        let status = scheduler.status();
        assert_eq!(status.key, Some(ResourceKey::from("user-2")));
        assert_eq!(status.generation, 2);
        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_key_change_clears_list_but_keeps_draft() {
        let fetcher = GatedFetcher::new(vec!["user-2"]);
        let scheduler = schedule(
            fetcher,
            PollConfig::every(Duration::from_secs(60)).with_request_timeout(Duration::from_secs(600)),
        );

        scheduler.start(ResourceKey::from("user-1")).await.unwrap();
        settle().await;
        scheduler.update_view(|view| view.draft = "half".to_string());
        assert!(scheduler.view().value.is_some());

        scheduler.start(ResourceKey::from("user-2")).await.unwrap();
        settle().await;

        let view = scheduler.view();
        assert_eq!(view.value, None);
        assert_eq!(view.draft, "half");
        scheduler.stop().await;
    }
}

mod failure_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_timeout_frees_the_slot() {
        let calls = Arc::new(AtomicUsize::new(0));
        let scheduler = schedule(
            HangingFetcher {
                calls: Arc::clone(&calls),
            },
            PollConfig::every(Duration::from_secs(5))
                .with_request_timeout(Duration::from_secs(2))
                .without_backoff(),
        );

        scheduler.start(ResourceKey::from("user-42")).await.unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;

        let status = scheduler.status();
        assert_eq!(
            status.last_error,
            Some(FetchError::Timeout(Duration::from_secs(2)))
        );
        assert!(!status.in_flight);
        assert_eq!(status.last_outcome(), Some(PollState::Failed));

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_last_snapshot() {
        let fetcher = ScriptedFetcher::new(vec![
            Ok("one".to_string()),
            Err(FetchError::transport(Some(500), "Internal Server Error")),
            Ok("three".to_string()),
        ]);
        let calls = Arc::clone(&fetcher.calls);
        let scheduler = schedule(fetcher, PollConfig::every(Duration::from_secs(5)).without_backoff());

        scheduler.start(ResourceKey::from("user-42")).await.unwrap();
        settle().await;
        assert_eq!(scheduler.view().value.as_deref(), Some("one"));

        tokio::time::sleep(Duration::from_millis(5100)).await;
        let status = scheduler.status();
        assert_eq!(scheduler.view().value.as_deref(), Some("one"));
        assert_eq!(status.last_outcome(), Some(PollState::Failed));
        assert_eq!(status.last_error.as_ref().and_then(FetchError::status), Some(500));
        assert!(status.is_stale());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(scheduler.view().value.as_deref(), Some("three"));
        assert_eq!(scheduler.status().consecutive_failures, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_suppresses_ticks() {
        let fetcher = ScriptedFetcher::new(vec![Err(FetchError::transport(Some(503), "down"))]);
        let calls = Arc::clone(&fetcher.calls);
        let scheduler = schedule(
            fetcher,
            PollConfig::every(Duration::from_secs(1))
                .with_backoff(Duration::from_secs(3), Duration::from_secs(5)),
        );

        scheduler.start(ResourceKey::from("user-42")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(9500)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(scheduler.status().consecutive_failures, 3);

        assert!(scheduler.refresh_now().await);
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        scheduler.stop().await;
    }
}

mod lifecycle_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_polling() {
        let fetcher = ScriptedFetcher::new(vec![Ok("data".to_string())]);
        let calls = Arc::clone(&fetcher.calls);
        let scheduler = schedule(fetcher, PollConfig::every(Duration::from_secs(5)));

        scheduler.start(ResourceKey::from("user-42")).await.unwrap();
        settle().await;
        scheduler.stop().await;
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.status().state, PollState::Suspended);
        assert!(!PollControl::is_running(&scheduler));
        assert!(!scheduler.refresh_now().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_key_issues_no_request() {
        let fetcher = ScriptedFetcher::new(vec![Ok("data".to_string())]);
        let calls = Arc::clone(&fetcher.calls);
        let scheduler = schedule(fetcher, PollConfig::every(Duration::from_secs(5)));

        let result = scheduler.start(ResourceKey::from("")).await;
        tokio::time::sleep(Duration::from_secs(12)).await;

        let err = tokio_test::assert_err!(result);
        assert!(matches!(err, BeehiveError::InvalidKey(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.status().state, PollState::Suspended);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_polls_repeatedly() {
        let fetcher = ScriptedFetcher::new(vec![Ok("data".to_string())]);
        let calls = Arc::clone(&fetcher.calls);
        let scheduler = schedule(fetcher, PollConfig::every(Duration::from_secs(5)));

        scheduler.start(ResourceKey::from("user-42")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(15500)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(scheduler.status().fetch_count, 4);
        scheduler.stop().await;
    }
}
