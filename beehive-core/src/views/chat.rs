use std::collections::HashSet;

use crate::api::{Ack, Action};
use crate::models::{ConversationEndpoint, Message, Session};
use crate::sync::{Reconcile, ResourceKey};

use super::{retain_id, UserAction, ViewBinding};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatView {
    pub messages: Vec<Message>,
    pub endpoint: Option<ConversationEndpoint>,
    pub draft: String,
    /// Lines scrolled up from the newest message.
    pub scroll: usize,
    pub expanded: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Incoming,
    Outgoing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bubble<'a> {
    pub alignment: Alignment,
    pub message: &'a Message,
}

impl ChatView {
    pub fn for_session(session: &Session) -> Self {
        Self {
            endpoint: ConversationEndpoint::default_for(session),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Whether the input line is live. Admins must pick a user first.
    pub fn can_send(&self) -> bool {
        self.endpoint
            .as_ref()
            .map(ConversationEndpoint::is_resolved)
            .unwrap_or(false)
    }

    pub fn select(&mut self, endpoint: ConversationEndpoint) {
        if self.endpoint.as_ref() != Some(&endpoint) {
            self.endpoint = Some(endpoint);
            self.scroll = 0;
            self.expanded = None;
        }
    }

    /// The send action for the current draft. Content checks happen on submit.
    pub fn send_action(&self) -> Option<Action> {
        if !self.can_send() {
            return None;
        }
        let endpoint = self.endpoint.clone()?;
        Some(Action::send_message(endpoint, self.draft.clone()))
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll = (self.scroll + lines).min(self.messages.len().saturating_sub(1));
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll = self.scroll.saturating_sub(lines);
    }
}

/// The poll key for a conversation: the counterparty for admins, the viewer for users.
pub fn conversation_key(endpoint: &ConversationEndpoint, session: &Session) -> ResourceKey {
    ResourceKey::new(endpoint.thread_owner(session))
}

pub fn bubbles<'a>(view: &'a ChatView, viewer_id: &str) -> Vec<Bubble<'a>> {
    view.messages
        .iter()
        .map(|message| Bubble {
            alignment: if message.is_from(viewer_id) {
                Alignment::Outgoing
            } else {
                Alignment::Incoming
            },
            message,
        })
        .collect()
}

impl Reconcile for ChatView {
    type Snapshot = Vec<Message>;

    fn reconcile(&self, snapshot: &Vec<Message>) -> Self {
        let mut seen = HashSet::new();
        let mut messages: Vec<Message> = snapshot
            .iter()
            .filter(|message| seen.insert(message.id.as_str()))
            .cloned()
            .collect();
        messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

        let expanded = retain_id(&self.expanded, messages.iter().map(|m| m.id.as_str()));
        let scroll = self.scroll.min(messages.len().saturating_sub(1));

        Self {
            messages,
            endpoint: self.endpoint.clone(),
            draft: self.draft.clone(),
            scroll,
            expanded,
        }
    }

    fn cleared(&self) -> Self {
        Self {
            messages: Vec::new(),
            endpoint: self.endpoint.clone(),
            draft: self.draft.clone(),
            scroll: 0,
            expanded: None,
        }
    }

    fn acknowledge(&self, ack: &Ack) -> Self {
        match ack {
            Ack::MessageSent => Self {
                draft: String::new(),
                scroll: 0,
                ..self.clone()
            },
            _ => self.clone(),
        }
    }
}

impl ViewBinding for ChatView {
    fn available_actions(&self, session: &Session) -> Vec<UserAction> {
        let mut actions = Vec::new();
        if session.is_admin() {
            actions.push(UserAction::SelectConversation);
        }
        if self.can_send() {
            actions.push(UserAction::Send);
            actions.push(UserAction::Refresh);
        }
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Credential, Role};
    use chrono::{TimeZone, Utc};

    fn message(id: &str, from: &str, secs: i64) -> Message {
        Message {
            id: id.to_string(),
            from_id: from.to_string(),
            from_role: None,
            to_id: "admin".to_string(),
            to_role: Role::Admin,
            content: format!("msg {}", id),
            timestamp: Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap(),
        }
    }

    #[test]
    fn test_orders_by_timestamp() {
        let snapshot = vec![message("c", "u", 3), message("a", "u", 1), message("b", "u", 2)];
        let view = ChatView::default().reconcile(&snapshot);
        let ids: Vec<_> = view.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_equal_timestamps_keep_server_order() {
        let snapshot = vec![message("x", "u", 5), message("y", "u", 5)];
        let view = ChatView::default().reconcile(&snapshot);
        assert_eq!(view.messages[0].id, "x");
        assert_eq!(view.messages[1].id, "y");
    }

    #[test]
    fn test_duplicate_ids_collapse() {
        let snapshot = vec![message("a", "u", 1), message("a", "u", 1), message("b", "u", 2)];
        let view = ChatView::default().reconcile(&snapshot);
        assert_eq!(view.messages.len(), 2);
    }

    #[test]
    fn test_reconcile_keeps_draft_and_drops_missing_expansion() {
        let view = ChatView {
            draft: "typing".to_string(),
            expanded: Some("gone".to_string()),
            ..ChatView::default()
        };
        let next = view.reconcile(&vec![message("a", "u", 1)]);
        assert_eq!(next.draft, "typing");
        assert_eq!(next.expanded, None);
    }

    #[test]
    fn test_bubble_alignment() {
        let view = ChatView::default()
            .reconcile(&vec![message("a", "user-42", 1), message("b", "admin-1", 2)]);
        let bubbles = bubbles(&view, "user-42");
        assert_eq!(bubbles[0].alignment, Alignment::Outgoing);
        assert_eq!(bubbles[1].alignment, Alignment::Incoming);
    }

    #[test]
    fn test_admin_must_select_before_sending() {
        let admin = Session::new(Credential::bearer("t"), "admin-1", Role::Admin);
        let mut view = ChatView::for_session(&admin);
        assert!(!view.can_send());
        assert!(view.send_action().is_none());
        assert_eq!(
            view.available_actions(&admin),
            vec![UserAction::SelectConversation]
        );

        view.select(ConversationEndpoint::User("user-42".to_string()));
        assert!(view.can_send());
        assert_eq!(
            conversation_key(view.endpoint.as_ref().unwrap(), &admin).as_str(),
            "user-42"
        );
    }

    #[test]
    fn test_user_thread_is_keyed_by_viewer() {
        let user = Session::new(Credential::bearer("t"), "user-42", Role::User);
        let view = ChatView::for_session(&user);
        assert!(view.can_send());
        assert_eq!(
            conversation_key(view.endpoint.as_ref().unwrap(), &user).as_str(),
            "user-42"
        );
    }

    #[test]
    fn test_sent_ack_clears_draft() {
        let view = ChatView {
            draft: "hello".to_string(),
            ..ChatView::default()
        };
        assert_eq!(view.acknowledge(&Ack::MessageSent).draft, "");
        assert_eq!(
            view.acknowledge(&Ack::Deleted { id: "1".to_string() }).draft,
            "hello"
        );
    }
}
