pub mod actions;
pub mod client;
pub mod endpoints;
pub mod fetchers;

pub use actions::{audio_data_url, Ack, Action, ActionSubmitter, ApiSubmitter, SubmitError};
pub use client::{ApiClient, ApiMessage};
pub use endpoints::{Endpoint, Mount};
pub use fetchers::{
    ChatUsersFetcher, DashboardFetcher, MessagesFetcher, NotificationsFetcher, UploadScope,
    UploadsFetcher, UserDirectory, CHAT_USERS_KEY, DASHBOARD_KEY, NOTIFICATIONS_KEY,
};
