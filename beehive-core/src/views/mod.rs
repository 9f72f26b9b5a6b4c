//! View state for each polled surface.
//!
//! Every view implements [`Reconcile`](crate::sync::Reconcile): list data comes from the
//! latest snapshot while local UI state (draft text, open flags, selection) survives a
//! refresh untouched.

pub mod chat;
pub mod dashboard;
pub mod gallery;
pub mod notifications;
pub mod users;

pub use chat::{bubbles, conversation_key, Alignment, Bubble, ChatView};
pub use dashboard::DashboardView;
pub use gallery::{GalleryMode, GalleryView};
pub use notifications::NotificationView;
pub use users::ChatUsersView;

use crate::models::Session;

/// Something the user can do from a view right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserAction {
    Send,
    SelectConversation,
    MarkSeen,
    ToggleView,
    FilterBySentiment,
    PlayAudio,
    CreateUpload,
    EditUpload,
    DeleteUpload,
    Refresh,
}

impl UserAction {
    pub fn label(&self) -> &'static str {
        match self {
            UserAction::Send => "send",
            UserAction::SelectConversation => "select conversation",
            UserAction::MarkSeen => "mark seen",
            UserAction::ToggleView => "toggle view",
            UserAction::FilterBySentiment => "filter",
            UserAction::PlayAudio => "play audio",
            UserAction::CreateUpload => "new upload",
            UserAction::EditUpload => "edit",
            UserAction::DeleteUpload => "delete",
            UserAction::Refresh => "refresh",
        }
    }
}

pub trait ViewBinding {
    fn available_actions(&self, session: &Session) -> Vec<UserAction>;
}

/// Keeps `id` only if it is still present among `ids`.
pub(crate) fn retain_id<'a>(
    id: &Option<String>,
    mut ids: impl Iterator<Item = &'a str>,
) -> Option<String> {
    id.as_ref()
        .filter(|wanted| ids.any(|candidate| candidate == wanted.as_str()))
        .cloned()
}
