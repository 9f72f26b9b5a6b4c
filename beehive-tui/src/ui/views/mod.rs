mod analytics;
mod chat;
mod dashboard;
mod gallery;
mod notifications;
mod upload;
mod users;

pub use analytics::AnalyticsView;
pub use chat::ChatPanel;
pub use dashboard::DashboardPanel;
pub use gallery::{ConfirmPrompt, GalleryPanel};
pub use notifications::NotificationsDropdown;
pub use upload::{EditorOverlay, UploadFormPanel};
pub use users::UsersPanel;
