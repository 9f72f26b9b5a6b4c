#![allow(dead_code, unused_imports, unused_variables, unused_mut)]

use serde_json::json;
use std::time::Duration;
use tokio::sync::watch;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use beehive_core::views::conversation_key;
use beehive_core::{
    BeehiveConfig, ConversationEndpoint, Credential, PollState, Role, Session, SubmitError, Wiring,
};

const WAIT: Duration = Duration::from_secs(5);

fn config_for(server: &MockServer) -> BeehiveConfig {
    let mut config = BeehiveConfig::default();
    config.api.base_url = format!("{}/api", server.uri());
    // Only the initial fetch and explicit refreshes hit the server during a test.
    config.polling.messages_interval_ms = 60_000;
    config.polling.request_timeout_ms = 2_000;
    config
}

fn user_session() -> Session {
    Session::new(Credential::bearer("user-token"), "user-42", Role::User)
}

fn message(id: &str, from: &str, to: &str, content: &str, at: &str) -> serde_json::Value {
    json!({
        "_id": id,
        "from_id": from,
        "from_role": if from == "admin" { "admin" } else { "user" },
        "to_id": to,
        "to_role": if to == "admin" { "admin" } else { "user" },
        "content": content,
        "timestamp": at
    })
}

async fn wait_for<V: Clone>(rx: &mut watch::Receiver<V>, ready: impl FnMut(&V) -> bool) -> V {
    tokio::time::timeout(WAIT, rx.wait_for(ready))
        .await
        .expect("timed out waiting for view")
        .expect("view channel closed")
        .clone()
}

mod send_flow_tests {
    use super::*;

    #[tokio::test]
    async fn test_send_then_refresh_shows_new_message() {
        let server = MockServer::start().await;
        let m1 = message("m1", "admin", "user-42", "Welcome!", "2024-02-01T12:00:00");
        let m2 = message("m2", "user-42", "admin", "hello", "2024-02-01T12:05:00");

        Mock::given(method("GET"))
            .and(path("/api/chat/messages"))
            .and(query_param("user_id", "user-42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "messages": [m1] })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/chat/messages"))
            .and(query_param("user_id", "user-42"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "messages": [m2, m1] })),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/chat/send"))
            .and(header("authorization", "Bearer user-token"))
            .and(body_partial_json(json!({
                "from_id": "user-42",
                "to_id": "admin",
                "to_role": "admin",
                "content": "hello"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
            .expect(1)
            .mount(&server)
            .await;

        let session = user_session();
        let wiring = Wiring::new(&config_for(&server), session.clone()).unwrap();
        let chat = wiring.chat();
        let mut views = chat.subscribe();

        chat.mount(conversation_key(&ConversationEndpoint::AdminChannel, &session))
            .await
            .unwrap();
        let view = wait_for(&mut views, |view| view.messages.len() == 1).await;
        assert_eq!(view.messages[0].id, "m1");

        chat.update_view(|view| view.draft = "hello".to_string());
        let action = chat.view().send_action().expect("draft should be sendable");
        chat.submit(action).await.unwrap();

        assert!(chat.view().draft.is_empty(), "draft clears once the send is confirmed");

        let view = wait_for(&mut views, |view| view.messages.len() == 2).await;
        let ids: Vec<&str> = view.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2"]);

        chat.unmount().await;
    }

    #[tokio::test]
    async fn test_failed_send_keeps_draft() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/chat/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "messages": [] })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/chat/send"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "db down" })))
            .expect(1)
            .mount(&server)
            .await;

        let session = user_session();
        let wiring = Wiring::new(&config_for(&server), session.clone()).unwrap();
        let chat = wiring.chat();
        chat.mount(session.user_id()).await.unwrap();

        chat.update_view(|view| view.draft = "are you there?".to_string());
        let action = chat.view().send_action().unwrap();
        let err = chat.submit(action).await.unwrap_err();

        assert!(matches!(err, SubmitError::Transport { status: Some(500), .. }));
        assert_eq!(chat.view().draft, "are you there?");
        assert!(chat.view().messages.is_empty());

        chat.unmount().await;
    }

    #[tokio::test]
    async fn test_blank_draft_never_reaches_backend() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat/send"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let wiring = Wiring::new(&config_for(&server), user_session()).unwrap();
        let chat = wiring.chat();
        chat.update_view(|view| view.draft = "   \n".to_string());

        let action = chat.view().send_action().unwrap();
        let err = chat.submit(action).await.unwrap_err();
        assert!(err.is_precondition());
        assert_eq!(chat.view().draft, "   \n");
    }
}

mod admin_flow_tests {
    use super::*;

    #[tokio::test]
    async fn test_switching_conversation_discards_old_thread() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/chat/messages"))
            .and(query_param("user_id", "user-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "messages": [message("a1", "user-1", "admin", "from one", "2024-02-01T10:00:00")]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/chat/messages"))
            .and(query_param("user_id", "user-2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({
                        "messages": [message("b1", "user-2", "admin", "from two", "2024-02-01T11:00:00")]
                    }))
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&server)
            .await;

        let admin = Session::new(Credential::bearer("admin-token"), "admin-1", Role::Admin);
        let wiring = Wiring::new(&config_for(&server), admin.clone()).unwrap();
        let chat = wiring.chat();
        let mut views = chat.subscribe();

        let first = ConversationEndpoint::User("user-1".to_string());
        chat.update_view(|view| view.select(first.clone()));
        chat.mount(conversation_key(&first, &admin)).await.unwrap();
        wait_for(&mut views, |view| view.messages.len() == 1).await;

        let second = ConversationEndpoint::User("user-2".to_string());
        chat.update_view(|view| view.select(second.clone()));
        chat.mount(conversation_key(&second, &admin)).await.unwrap();
        assert!(chat.view().messages.is_empty(), "old thread is cleared on switch");

        let view = wait_for(&mut views, |view| !view.messages.is_empty()).await;
        assert_eq!(view.messages[0].id, "b1");

        let mut statuses = chat.scheduler().watch_status();
        let status = wait_for(&mut statuses, |status| {
            status.last_outcome() == Some(PollState::Success)
        }).await;
        assert_eq!(status.fetch_count, 1);

        chat.unmount().await;
    }
}
