use crate::models::{ChatUser, ConversationEndpoint, Session};
use crate::sync::Reconcile;

use super::{retain_id, UserAction, ViewBinding};

/// Admin-side contact list for the chat drawer. The first user is picked automatically
/// so the conversation pane is never blank when someone is available.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatUsersView {
    pub users: Vec<ChatUser>,
    pub selected: Option<String>,
    pub search: String,
}

impl ChatUsersView {
    pub fn filtered(&self) -> Vec<&ChatUser> {
        let needle = self.search.trim().to_lowercase();
        self.users
            .iter()
            .filter(|user| {
                needle.is_empty()
                    || user.display_name().to_lowercase().contains(&needle)
                    || user.email.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn selected_user(&self) -> Option<&ChatUser> {
        let id = self.selected.as_deref()?;
        self.users.iter().find(|user| user.id == id)
    }

    pub fn endpoint(&self) -> Option<ConversationEndpoint> {
        self.selected.clone().map(ConversationEndpoint::User)
    }

    pub fn select(&mut self, id: &str) {
        if self.users.iter().any(|user| user.id == id) {
            self.selected = Some(id.to_string());
        }
    }

    pub fn select_offset(&mut self, delta: isize) {
        let visible = self.filtered();
        if visible.is_empty() {
            return;
        }
        let current = self
            .selected
            .as_deref()
            .and_then(|id| visible.iter().position(|user| user.id == id))
            .unwrap_or(0) as isize;
        let len = visible.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.selected = Some(visible[next].id.clone());
    }
}

impl Reconcile for ChatUsersView {
    type Snapshot = Vec<ChatUser>;

    fn reconcile(&self, snapshot: &Vec<ChatUser>) -> Self {
        let selected = retain_id(&self.selected, snapshot.iter().map(|u| u.id.as_str()))
            .or_else(|| snapshot.first().map(|user| user.id.clone()));
        Self {
            users: snapshot.clone(),
            selected,
            search: self.search.clone(),
        }
    }

    fn cleared(&self) -> Self {
        Self {
            users: Vec::new(),
            selected: None,
            search: self.search.clone(),
        }
    }
}

impl ViewBinding for ChatUsersView {
    fn available_actions(&self, session: &Session) -> Vec<UserAction> {
        if session.is_admin() && !self.users.is_empty() {
            vec![UserAction::SelectConversation, UserAction::Refresh]
        } else {
            Vec::new()
        }
    }
}
