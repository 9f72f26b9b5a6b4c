use crate::api::{Ack, Action, SubmitError};
use crate::models::{Notification, Session};
use crate::sync::{Reconcile, ResourceFetcher, Synchronizer};

use super::{UserAction, ViewBinding};

/// The admin notification bell.
///
/// Passive polls only move the badge while the dropdown is open; the list the admin is
/// reading is whatever the mark-seen call returned when it was opened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationView {
    pub items: Vec<Notification>,
    pub badge: usize,
    pub open: bool,
}

impl NotificationView {
    pub fn unseen(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter().filter(|n| !n.seen)
    }

    pub fn has_badge(&self) -> bool {
        self.badge > 0
    }
}

impl Reconcile for NotificationView {
    type Snapshot = Vec<Notification>;

    fn reconcile(&self, snapshot: &Vec<Notification>) -> Self {
        let badge = snapshot.iter().filter(|n| !n.seen).count();
        let items = if self.open {
            self.items.clone()
        } else {
            snapshot.clone()
        };
        Self {
            items,
            badge,
            open: self.open,
        }
    }

    fn cleared(&self) -> Self {
        Self {
            items: Vec::new(),
            badge: 0,
            open: self.open,
        }
    }

    fn acknowledge(&self, ack: &Ack) -> Self {
        match ack {
            Ack::NotificationsSeen(returned) => Self {
                items: returned
                    .iter()
                    .cloned()
                    .map(|mut n| {
                        n.seen = true;
                        n
                    })
                    .collect(),
                badge: 0,
                open: self.open,
            },
            _ => self.clone(),
        }
    }
}

impl ViewBinding for NotificationView {
    fn available_actions(&self, session: &Session) -> Vec<UserAction> {
        if !session.is_admin() {
            return Vec::new();
        }
        let mut actions = vec![UserAction::Refresh];
        if !self.open {
            actions.push(UserAction::MarkSeen);
        }
        actions
    }
}

impl<F> Synchronizer<F, NotificationView>
where
    F: ResourceFetcher<Snapshot = Vec<Notification>>,
{
    /// Opens the dropdown, marking everything seen on the way.
    pub async fn open_dropdown(&self) -> Result<Ack, SubmitError> {
        self.update_view(|view| view.open = true);
        self.submit(Action::MarkNotificationsSeen).await
    }

    pub fn close_dropdown(&self) {
        self.update_view(|view| view.open = false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ActionSubmitter;
    use crate::models::{Credential, Role};
    use crate::sync::{FetchError, PollConfig, PollScheduler, ResourceKey};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::Semaphore;

    fn notification(id: &str, seen: bool) -> Notification {
        Notification {
            id: id.to_string(),
            username: "mira".to_string(),
            title: format!("upload {}", id),
            timestamp: Utc::now(),
            seen,
            kind: Some("image_upload".to_string()),
            user_id: Some("user-42".to_string()),
            image_filename: None,
        }
    }

    #[test]
    fn test_badge_counts_unseen() {
        let snapshot = vec![
            notification("1", false),
            notification("2", true),
            notification("3", false),
        ];
        let view = NotificationView::default().reconcile(&snapshot);
        assert_eq!(view.badge, 2);
        assert_eq!(view.items.len(), 3);
        assert_eq!(view.unseen().count(), 2);
    }

    #[test]
    fn test_open_dropdown_keeps_list() {
        let opened = NotificationView {
            items: vec![notification("1", true)],
            badge: 0,
            open: true,
        };
        let next = opened.reconcile(&vec![notification("1", true), notification("9", false)]);
        assert_eq!(next.items.len(), 1);
        assert_eq!(next.badge, 1);
        assert!(next.open);
    }

    #[test]
    fn test_mark_seen_ack() {
        let view = NotificationView::default()
            .reconcile(&vec![notification("1", false), notification("2", false)]);
        assert_eq!(view.badge, 2);

        let returned = vec![notification("1", false), notification("2", false)];
        let next = view.acknowledge(&Ack::NotificationsSeen(returned));
        assert_eq!(next.badge, 0);
        assert!(next.items.iter().all(|n| n.seen));
        assert!(!next.has_badge());
    }

    type Server = Arc<Mutex<Vec<Notification>>>;

    /// Reads the server list when the request starts, then optionally waits on a gate.
    struct HeldFetcher {
        server: Server,
        hold: Arc<AtomicBool>,
        gate: Arc<Semaphore>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ResourceFetcher for HeldFetcher {
        type Snapshot = Vec<Notification>;

        fn resource_name(&self) -> &str {
            "notifications"
        }

        async fn fetch(
            &self,
            _key: &ResourceKey,
            _credential: &Credential,
        ) -> Result<Vec<Notification>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let snapshot = self.server.lock().unwrap().clone();
            if self.hold.load(Ordering::SeqCst) {
                let _permit = self
                    .gate
                    .acquire()
                    .await
                    .map_err(|e| FetchError::transport(None, e.to_string()))?;
            }
            Ok(snapshot)
        }
    }

    struct MarkSeen(Server);

    #[async_trait]
    impl ActionSubmitter for MarkSeen {
        async fn submit(&self, _action: &Action, _session: &Session) -> Result<Ack, SubmitError> {
            let mut server = self.0.lock().unwrap();
            for n in server.iter_mut() {
                n.seen = true;
            }
            Ok(Ack::NotificationsSeen(server.clone()))
        }
    }

    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_dropdown_survives_overlapping_poll() {
        let server: Server = Arc::new(Mutex::new(vec![
            notification("1", false),
            notification("2", false),
            notification("3", false),
        ]));
        let hold = Arc::new(AtomicBool::new(false));
        let gate = Arc::new(Semaphore::new(0));
        let calls = Arc::new(AtomicUsize::new(0));
        let session = Session::new(Credential::bearer("t"), "admin-1", Role::Admin);
        let scheduler = PollScheduler::new(
            HeldFetcher {
                server: Arc::clone(&server),
                hold: Arc::clone(&hold),
                gate: Arc::clone(&gate),
                calls: Arc::clone(&calls),
            },
            session.credential().clone(),
            PollConfig::every(Duration::from_secs(10)).with_request_timeout(Duration::from_secs(600)),
            NotificationView::default(),
        );
        let bell = Synchronizer::new(scheduler, Arc::new(MarkSeen(Arc::clone(&server))), session);

        bell.mount("admin-1").await.unwrap();
        settle().await;
        assert_eq!(bell.view().badge, 3);

        // A timed poll reads the unseen list and stalls before answering.
        hold.store(true, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10_001)).await;
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        hold.store(false, Ordering::SeqCst);

        bell.open_dropdown().await.unwrap();
        assert_eq!(bell.view().badge, 0);

        gate.add_permits(1);
        settle().await;

        let view = bell.view();
        assert_eq!(view.badge, 0);
        assert!(view.open);
        assert!(view.items.iter().all(|n| n.seen));
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(bell.view().badge, 0);
        bell.unmount().await;
    }
}
