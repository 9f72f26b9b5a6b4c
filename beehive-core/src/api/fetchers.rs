use async_trait::async_trait;

use crate::models::{
    ChatUser, Credential, DashboardSnapshot, Message, MessagesResponse, Notification,
    NotificationsResponse, Upload, UploadsResponse, UserPage, UserQuery,
};
use crate::sync::{FetchError, ResourceFetcher, ResourceKey};

use super::client::ApiClient;
use super::endpoints::Endpoint;

/// Key of the admin notification feed, which has no per-user scope.
pub const NOTIFICATIONS_KEY: &str = "admin-notifications";
pub const DASHBOARD_KEY: &str = "admin-dashboard";
pub const CHAT_USERS_KEY: &str = "chat-users";

fn ensure_key(key: &ResourceKey) -> Result<(), FetchError> {
    if key.is_valid() {
        Ok(())
    } else {
        Err(FetchError::InvalidKey)
    }
}

/// Message history of one conversation, keyed by the thread owner's user id.
#[derive(Debug, Clone)]
pub struct MessagesFetcher {
    client: ApiClient,
}

impl MessagesFetcher {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceFetcher for MessagesFetcher {
    type Snapshot = Vec<Message>;

    fn resource_name(&self) -> &str {
        "messages"
    }

    async fn fetch(
        &self,
        key: &ResourceKey,
        credential: &Credential,
    ) -> Result<Vec<Message>, FetchError> {
        ensure_key(key)?;
        let response: MessagesResponse = self
            .client
            .get_json(
                &Endpoint::chat_messages(),
                &[("user_id", key.to_string())],
                credential,
            )
            .await?;
        Ok(response.messages)
    }
}

/// Passive read of unseen notifications. Never marks anything seen.
#[derive(Debug, Clone)]
pub struct NotificationsFetcher {
    client: ApiClient,
}

impl NotificationsFetcher {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceFetcher for NotificationsFetcher {
    type Snapshot = Vec<Notification>;

    fn resource_name(&self) -> &str {
        "notifications"
    }

    async fn fetch(
        &self,
        key: &ResourceKey,
        credential: &Credential,
    ) -> Result<Vec<Notification>, FetchError> {
        ensure_key(key)?;
        let response: NotificationsResponse = self
            .client
            .get_json(&Endpoint::admin_notifications(), &[], credential)
            .await?;
        Ok(response.notifications)
    }
}

#[derive(Debug, Clone)]
pub struct ChatUsersFetcher {
    client: ApiClient,
}

impl ChatUsersFetcher {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceFetcher for ChatUsersFetcher {
    type Snapshot = Vec<ChatUser>;

    fn resource_name(&self) -> &str {
        "chat-users"
    }

    async fn fetch(
        &self,
        key: &ResourceKey,
        credential: &Credential,
    ) -> Result<Vec<ChatUser>, FetchError> {
        ensure_key(key)?;
        let page: UserPage = self
            .client
            .get_json(&Endpoint::admin_chat_users(), &[], credential)
            .await?;
        Ok(page.users)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadScope {
    /// The signed-in user's own gallery.
    Own,
    /// An admin browsing somebody else's uploads.
    Admin,
}

#[derive(Debug, Clone)]
pub struct UploadsFetcher {
    client: ApiClient,
    scope: UploadScope,
}

impl UploadsFetcher {
    pub fn new(client: ApiClient, scope: UploadScope) -> Self {
        Self { client, scope }
    }
}

#[async_trait]
impl ResourceFetcher for UploadsFetcher {
    type Snapshot = Vec<Upload>;

    fn resource_name(&self) -> &str {
        match self.scope {
            UploadScope::Own => "uploads",
            UploadScope::Admin => "user-uploads",
        }
    }

    async fn fetch(
        &self,
        key: &ResourceKey,
        credential: &Credential,
    ) -> Result<Vec<Upload>, FetchError> {
        ensure_key(key)?;
        let endpoint = match self.scope {
            UploadScope::Own => Endpoint::user_uploads(key.as_str()),
            UploadScope::Admin => Endpoint::admin_user_uploads(key.as_str()),
        };
        let response: UploadsResponse = self.client.get_json(&endpoint, &[], credential).await?;
        Ok(response.images)
    }
}

#[derive(Debug, Clone)]
pub struct DashboardFetcher {
    client: ApiClient,
    limit: u32,
}

impl DashboardFetcher {
    pub fn new(client: ApiClient, limit: u32) -> Self {
        Self { client, limit }
    }
}

#[async_trait]
impl ResourceFetcher for DashboardFetcher {
    type Snapshot = DashboardSnapshot;

    fn resource_name(&self) -> &str {
        "dashboard"
    }

    async fn fetch(
        &self,
        key: &ResourceKey,
        credential: &Credential,
    ) -> Result<DashboardSnapshot, FetchError> {
        ensure_key(key)?;
        self.client
            .get_json(
                &Endpoint::admin_dashboard(),
                &[("limit", self.limit.to_string())],
                credential,
            )
            .await
    }
}

/// Paged admin user directory. Read on demand rather than polled.
#[derive(Debug, Clone)]
pub struct UserDirectory {
    client: ApiClient,
}

impl UserDirectory {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn page(
        &self,
        query: &UserQuery,
        credential: &Credential,
    ) -> Result<UserPage, FetchError> {
        self.client
            .get_json(&Endpoint::admin_users(), &query.query_pairs(), credential)
            .await
    }
}
