use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub title: String,
    #[serde(with = "timestamp::flexible")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub seen: bool,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_filename: Option<String>,
}

impl Notification {
    pub fn summary(&self) -> String {
        match self.kind.as_deref() {
            Some("image_upload") | None => format!("{} uploaded \"{}\"", self.username, self.title),
            Some(other) => format!("{} ({}): {}", self.username, other, self.title),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationsResponse {
    #[serde(default)]
    pub notifications: Vec<Notification>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_upload_notification() {
        let raw = r#"{
            "_id": "n1",
            "type": "image_upload",
            "user_id": "user-42",
            "username": "mira",
            "image_filename": "sunset.png",
            "title": "Sunset",
            "timestamp": "2024-02-01T12:00:00",
            "seen": false
        }"#;
        let notification: Notification = serde_json::from_str(raw).unwrap();
        assert_eq!(notification.id, "n1");
        assert!(!notification.seen);
        assert_eq!(notification.summary(), "mira uploaded \"Sunset\"");
    }
}
