//! Paths of the REST surface. Most live under the configured base URL; the upload
//! edit and delete routes hang off the server root instead.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mount {
    /// Under `api.base_url`.
    Api,
    /// Under the server root (`api.root_url`, or the base URL's origin).
    Root,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    mount: Mount,
    segments: Vec<String>,
}

impl Endpoint {
    fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mount: Mount::Api,
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    fn rooted<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mount: Mount::Root,
            ..Self::new(segments)
        }
    }

    pub fn mount(&self) -> Mount {
        self.mount
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn chat_messages() -> Self {
        Self::new(["chat", "messages"])
    }

    pub fn chat_send() -> Self {
        Self::new(["chat", "send"])
    }

    pub fn admin_notifications() -> Self {
        Self::new(["admin", "notifications"])
    }

    pub fn admin_chat_users() -> Self {
        Self::new(["admin", "users", "only-users"])
    }

    pub fn admin_users() -> Self {
        Self::new(["admin", "users"])
    }

    pub fn admin_dashboard() -> Self {
        Self::new(["admin", "dashboard"])
    }

    pub fn user_uploads(user_id: &str) -> Self {
        Self::new(["user", "user_uploads", user_id])
    }

    pub fn admin_user_uploads(user_id: &str) -> Self {
        Self::new(["admin", "user_uploads", user_id])
    }

    pub fn create_upload(user_id: &str) -> Self {
        Self::new(["user", "upload", user_id])
    }

    pub fn edit_upload(upload_id: &str) -> Self {
        Self::rooted(["edit", upload_id])
    }

    pub fn delete_upload(upload_id: &str) -> Self {
        Self::rooted(["delete", upload_id])
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}
