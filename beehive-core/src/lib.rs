#![allow(
    clippy::needless_borrows_for_generic_args,
    clippy::derivable_impls,
    clippy::type_complexity,
    clippy::ptr_arg,
    clippy::len_zero,
    dead_code,
    unused_imports,
    unused_variables,
    unused_mut
)]

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod sync;
pub mod views;
pub mod wiring;

pub use api::{
    Ack, Action, ActionSubmitter, ApiClient, ApiSubmitter, ChatUsersFetcher, DashboardFetcher,
    MessagesFetcher, NotificationsFetcher, SubmitError, UploadScope, UploadsFetcher,
    UserDirectory, CHAT_USERS_KEY, DASHBOARD_KEY, NOTIFICATIONS_KEY,
};
pub use config::{
    ensure_data_dir, get_config_dir, get_data_dir, ApiConfig, AuthConfig, BeehiveConfig,
    ConfigLoadError, DisplayConfig, LoggingConfig, PollingConfig, TuiConfig,
};
pub use error::{BeehiveError, BeehiveResult, CliErrorDisplay};
pub use models::{
    Analytics, ChatUser, ConversationEndpoint, Credential, DashboardSnapshot, Message,
    NewUpload, Notification, Role, Sentiment, SentimentFilter, Session, Upload, UploadEdit,
    UserPage, UserQuery, UserRecord,
};
pub use routes::{Capability, Page, Resolution, Route, RouteTable};
pub use sync::{
    FetchError, PollConfig, PollControl, PollScheduler, PollState, PollStatus, Reconcile,
    ResourceFetcher, ResourceKey, Synchronizer,
};
pub use views::{
    ChatUsersView, ChatView, DashboardView, GalleryMode, GalleryView, NotificationView,
    UserAction, ViewBinding,
};
pub use wiring::Wiring;
