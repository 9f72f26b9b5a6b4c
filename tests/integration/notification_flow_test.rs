#![allow(dead_code, unused_imports, unused_variables, unused_mut)]

use serde_json::json;
use std::time::Duration;
use tokio::sync::watch;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use beehive_core::{
    BeehiveConfig, Credential, PollState, Role, Session, SubmitError, Wiring, NOTIFICATIONS_KEY,
};

const WAIT: Duration = Duration::from_secs(5);

fn config_for(server: &MockServer) -> BeehiveConfig {
    let mut config = BeehiveConfig::default();
    config.api.base_url = format!("{}/api", server.uri());
    config.polling.notifications_interval_ms = 60_000;
    config.polling.request_timeout_ms = 2_000;
    config
}

fn admin_session() -> Session {
    Session::new(Credential::bearer("admin-token"), "admin-1", Role::Admin)
}

fn unseen(ids: &[&str]) -> serde_json::Value {
    let notifications: Vec<_> = ids
        .iter()
        .map(|id| {
            json!({
                "_id": id,
                "username": "mira",
                "title": format!("upload {}", id),
                "timestamp": "2024-02-01T12:30:00Z",
                "seen": false,
                "type": "image_upload"
            })
        })
        .collect();
    json!({ "notifications": notifications })
}

async fn wait_for<V: Clone>(rx: &mut watch::Receiver<V>, ready: impl FnMut(&V) -> bool) -> V {
    tokio::time::timeout(WAIT, rx.wait_for(ready))
        .await
        .expect("timed out waiting")
        .expect("channel closed")
        .clone()
}

mod bell_tests {
    use super::*;

    #[tokio::test]
    async fn test_open_dropdown_marks_all_seen() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/admin/notifications"))
            .and(query_param("mark_seen", "true"))
            .and(header("authorization", "Bearer admin-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(unseen(&["n1", "n2", "n3"])))
            .expect(1)
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/admin/notifications"))
            .respond_with(ResponseTemplate::new(200).set_body_json(unseen(&["n1", "n2", "n3"])))
            .up_to_n_times(1)
            .with_priority(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/admin/notifications"))
            .respond_with(ResponseTemplate::new(200).set_body_json(unseen(&[])))
            .with_priority(3)
            .mount(&server)
            .await;

        let wiring = Wiring::new(&config_for(&server), admin_session()).unwrap();
        let bell = wiring.notifications();
        let mut views = bell.subscribe();
        let mut statuses = bell.scheduler().watch_status();

        bell.mount(NOTIFICATIONS_KEY).await.unwrap();
        let view = wait_for(&mut views, |view| view.badge == 3).await;
        assert_eq!(view.items.len(), 3);
        assert!(!view.open);

        bell.open_dropdown().await.unwrap();
        let view = bell.view();
        assert!(view.open);
        assert_eq!(view.badge, 0);
        assert_eq!(view.items.len(), 3);
        assert!(view.items.iter().all(|n| n.seen));

        // The refresh after marking brings an empty unseen list; the open list stays put.
        wait_for(&mut statuses, |status| {
            status.fetch_count >= 2
                && !status.in_flight
                && status.last_outcome() == Some(PollState::Success)
        })
        .await;
        let view = bell.view();
        assert_eq!(view.badge, 0);
        assert_eq!(view.items.len(), 3);

        bell.close_dropdown();
        bell.scheduler().refresh_now().await;
        let view = wait_for(&mut views, |view| view.items.is_empty()).await;
        assert!(!view.open);

        bell.unmount().await;
    }

    #[tokio::test]
    async fn test_user_session_cannot_mark_seen() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/notifications"))
            .respond_with(ResponseTemplate::new(200).set_body_json(unseen(&[])))
            .expect(0)
            .mount(&server)
            .await;

        let user = Session::new(Credential::bearer("user-token"), "user-42", Role::User);
        let wiring = Wiring::new(&config_for(&server), user).unwrap();
        let bell = wiring.notifications();

        let err = bell.open_dropdown().await.unwrap_err();
        assert!(matches!(err, SubmitError::Forbidden(_)));
        assert_eq!(bell.view().badge, 0);
    }

    #[tokio::test]
    async fn test_failed_poll_keeps_badge() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/notifications"))
            .respond_with(ResponseTemplate::new(200).set_body_json(unseen(&["n1", "n2"])))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/admin/notifications"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let wiring = Wiring::new(&config_for(&server), admin_session()).unwrap();
        let bell = wiring.notifications();
        let mut views = bell.subscribe();
        let mut statuses = bell.scheduler().watch_status();

        bell.mount(NOTIFICATIONS_KEY).await.unwrap();
        wait_for(&mut views, |view| view.badge == 2).await;

        bell.scheduler().refresh_now().await;
        let status = wait_for(&mut statuses, |status| {
            status.last_outcome() == Some(PollState::Failed)
        }).await;
        assert_eq!(status.last_error.and_then(|e| e.status()), Some(503));
        assert_eq!(bell.view().badge, 2);

        bell.unmount().await;
    }
}
