mod dashboard;
mod message;
mod notification;
mod session;
pub mod timestamp;
mod upload;
mod user;

pub use dashboard::{
    Analytics, DashboardSnapshot, DashboardStats, RecentUpload, SentimentBreakdown, UploadKind,
};
pub use message::{Message, MessagesResponse, OutgoingMessage};
pub use notification::{Notification, NotificationsResponse};
pub use session::{ConversationEndpoint, Credential, Role, Session};
pub use upload::{
    has_allowed_extension, NewUpload, Sentiment, SentimentFilter, Upload, UploadEdit,
    UploadsResponse, ALLOWED_EXTENSIONS,
};
pub use user::{ChatUser, UserPage, UserQuery, UserRecord};
