use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::multipart::{Form, Part};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{
    ConversationEndpoint, Notification, NotificationsResponse, NewUpload, OutgoingMessage, Role,
    Session, UploadEdit,
};
use crate::sync::types::status_suffix;
use crate::sync::FetchError;

use super::client::ApiClient;
use super::endpoints::Endpoint;

/// A write the user explicitly asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SendMessage {
        endpoint: ConversationEndpoint,
        content: String,
    },
    MarkNotificationsSeen,
    EditUpload(UploadEdit),
    DeleteUpload {
        id: String,
    },
    CreateUpload(NewUpload),
}

/// What the backend confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ack {
    MessageSent,
    /// The notifications that were unseen until this call, now marked seen.
    NotificationsSeen(Vec<Notification>),
    UploadCreated {
        message: String,
    },
    UploadUpdated {
        id: String,
    },
    Deleted {
        id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("{0}")]
    Validation(String),

    #[error("not allowed: {0}")]
    Forbidden(String),

    #[error("request failed{}: {message}", status_suffix(.status))]
    Transport {
        status: Option<u16>,
        message: String,
    },

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("could not read file: {0}")]
    Io(String),
}

impl SubmitError {
    /// Errors caught before anything was sent.
    pub fn is_precondition(&self) -> bool {
        matches!(self, SubmitError::Validation(_) | SubmitError::Forbidden(_))
    }
}

impl From<FetchError> for SubmitError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::InvalidKey => SubmitError::Validation("Missing target id".to_string()),
            FetchError::Transport { status, message } => SubmitError::Transport { status, message },
            FetchError::Timeout(after) => SubmitError::Timeout(after),
            FetchError::Decode(message) => SubmitError::Decode(message),
        }
    }
}

impl Action {
    pub fn send_message(endpoint: ConversationEndpoint, content: impl Into<String>) -> Self {
        Action::SendMessage {
            endpoint,
            content: content.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::SendMessage { .. } => "send_message",
            Action::MarkNotificationsSeen => "mark_notifications_seen",
            Action::EditUpload(_) => "edit_upload",
            Action::DeleteUpload { .. } => "delete_upload",
            Action::CreateUpload(_) => "create_upload",
        }
    }

    pub fn required_role(&self) -> Option<Role> {
        match self {
            Action::MarkNotificationsSeen => Some(Role::Admin),
            Action::CreateUpload(_) => Some(Role::User),
            _ => None,
        }
    }

    /// Checks everything that can be checked without the network.
    pub fn validate(&self, session: &Session) -> Result<(), SubmitError> {
        if let Some(role) = self.required_role() {
            if session.role() != role {
                return Err(SubmitError::Forbidden(format!(
                    "{} requires the {} role",
                    self.name(),
                    role
                )));
            }
        }

        match self {
            Action::SendMessage { endpoint, content } => {
                if !endpoint.is_resolved() {
                    return Err(SubmitError::Validation(
                        "Select a conversation before sending".to_string(),
                    ));
                }
                if content.trim().is_empty() {
                    return Err(SubmitError::Validation(
                        "Message content is empty".to_string(),
                    ));
                }
                Ok(())
            }
            Action::MarkNotificationsSeen => Ok(()),
            Action::EditUpload(edit) => edit.validate().map_err(SubmitError::Validation),
            Action::DeleteUpload { id } => {
                if id.trim().is_empty() {
                    Err(SubmitError::Validation("Upload id is required".to_string()))
                } else {
                    Ok(())
                }
            }
            Action::CreateUpload(upload) => upload.validate().map_err(SubmitError::Validation),
        }
    }
}

#[async_trait]
pub trait ActionSubmitter: Send + Sync {
    async fn submit(&self, action: &Action, session: &Session) -> Result<Ack, SubmitError>;
}

/// Submits actions to the REST backend.
#[derive(Debug, Clone)]
pub struct ApiSubmitter {
    client: ApiClient,
}

impl ApiSubmitter {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    async fn send_message(
        &self,
        session: &Session,
        endpoint: &ConversationEndpoint,
        content: &str,
    ) -> Result<Ack, SubmitError> {
        let body = OutgoingMessage::new(session, endpoint, content);
        self.client
            .post_json(&Endpoint::chat_send(), &body, session.credential())
            .await?;
        info!(to = %endpoint, "Message sent");
        Ok(Ack::MessageSent)
    }

    async fn mark_notifications_seen(&self, session: &Session) -> Result<Ack, SubmitError> {
        let response: NotificationsResponse = self
            .client
            .get_json(
                &Endpoint::admin_notifications(),
                &[("mark_seen", "true".to_string())],
                session.credential(),
            )
            .await?;
        debug!(
            count = response.notifications.len(),
            "Notifications marked seen"
        );
        Ok(Ack::NotificationsSeen(response.notifications))
    }

    async fn edit_upload(&self, session: &Session, edit: &UploadEdit) -> Result<Ack, SubmitError> {
        self.client
            .post_form(
                &Endpoint::edit_upload(&edit.id),
                &edit.form_fields(),
                session.credential(),
            )
            .await?;
        info!(upload_id = %edit.id, "Upload updated");
        Ok(Ack::UploadUpdated {
            id: edit.id.clone(),
        })
    }

    async fn delete_upload(&self, session: &Session, id: &str) -> Result<Ack, SubmitError> {
        self.client
            .get_message(&Endpoint::delete_upload(id), session.credential())
            .await?;
        info!(upload_id = %id, "Upload deleted");
        Ok(Ack::Deleted { id: id.to_string() })
    }

    async fn create_upload(
        &self,
        session: &Session,
        upload: &NewUpload,
    ) -> Result<Ack, SubmitError> {
        let mut form = Form::new()
            .text("username", session.display_name().to_string())
            .text("title", upload.title.trim().to_string())
            .text("description", upload.description.trim().to_string())
            .text("sentiment", upload.sentiment.to_string());

        for path in &upload.files {
            form = form.part("files", file_part(path).await?);
        }

        if let Some(audio) = &upload.audio {
            form = form.text("audioData", audio_data_url(audio).await?);
        }

        let reply = self
            .client
            .post_multipart(
                &Endpoint::create_upload(session.user_id()),
                form,
                session.credential(),
            )
            .await?;
        info!(files = upload.files.len(), title = %upload.title, "Upload created");
        Ok(Ack::UploadCreated {
            message: reply
                .text()
                .unwrap_or("Upload successful")
                .to_string(),
        })
    }
}

#[async_trait]
impl ActionSubmitter for ApiSubmitter {
    async fn submit(&self, action: &Action, session: &Session) -> Result<Ack, SubmitError> {
        action.validate(session)?;

        match action {
            Action::SendMessage { endpoint, content } => {
                self.send_message(session, endpoint, content).await
            }
            Action::MarkNotificationsSeen => self.mark_notifications_seen(session).await,
            Action::EditUpload(edit) => self.edit_upload(session, edit).await,
            Action::DeleteUpload { id } => self.delete_upload(session, id).await,
            Action::CreateUpload(upload) => self.create_upload(session, upload).await,
        }
    }
}

fn mime_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heif" => "image/heif",
        "pdf" => "application/pdf",
        "wav" => "audio/wav",
        "webm" => "audio/webm",
        "ogg" => "audio/ogg",
        "mp3" => "audio/mpeg",
        _ => "application/octet-stream",
    }
}

async fn read_file(path: &Path) -> Result<Vec<u8>, SubmitError> {
    tokio::fs::read(path)
        .await
        .map_err(|e| SubmitError::Io(format!("{}: {}", path.display(), e)))
}

async fn file_part(path: &Path) -> Result<Part, SubmitError> {
    let bytes = read_file(path).await?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(mime_for(path))
        .map_err(|e| SubmitError::Io(e.to_string()))
}

/// Voice notes travel as a `data:` URL in a plain form field.
pub async fn audio_data_url(path: &Path) -> Result<String, SubmitError> {
    let bytes = read_file(path).await?;
    Ok(format!(
        "data:{};base64,{}",
        mime_for(path),
        STANDARD.encode(bytes)
    ))
}
