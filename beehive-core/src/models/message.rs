use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::session::{ConversationEndpoint, Role, Session};
use super::timestamp;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(alias = "_id")]
    pub id: String,
    pub from_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_role: Option<Role>,
    pub to_id: String,
    pub to_role: Role,
    pub content: String,
    #[serde(with = "timestamp::flexible")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn is_from(&self, user_id: &str) -> bool {
        self.from_id == user_id
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// Body of `POST /chat/send`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub from_id: String,
    pub from_role: Role,
    pub to_id: String,
    pub to_role: Role,
    pub content: String,
}

impl OutgoingMessage {
    pub fn new(session: &Session, endpoint: &ConversationEndpoint, content: &str) -> Self {
        Self {
            from_id: session.user_id().to_string(),
            from_role: session.role(),
            to_id: endpoint.to_id().to_string(),
            to_role: endpoint.to_role(),
            content: content.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Credential;

    #[test]
    fn test_deserialize_backend_message() {
        let raw = r#"{
            "_id": "65bb7c1f",
            "from_id": "user-42",
            "from_role": "user",
            "to_id": "admin",
            "to_role": "admin",
            "content": "hi",
            "timestamp": "2024-02-01T12:00:00.000001"
        }"#;
        let message: Message = serde_json::from_str(raw).unwrap();
        assert_eq!(message.id, "65bb7c1f");
        assert_eq!(message.from_role, Some(Role::User));
        assert_eq!(message.to_role, Role::Admin);
        assert!(message.is_from("user-42"));
    }

    #[test]
    fn test_outgoing_from_admin() {
        let session = Session::new(Credential::bearer("t"), "admin-1", Role::Admin);
        let endpoint = ConversationEndpoint::User("user-42".to_string());
        let outgoing = OutgoingMessage::new(&session, &endpoint, "  hello ");

        assert_eq!(outgoing.to_id, "user-42");
        assert_eq!(outgoing.to_role, Role::User);
        assert_eq!(outgoing.from_role, Role::Admin);
        assert_eq!(outgoing.content, "hello");
    }

    #[test]
    fn test_outgoing_from_user() {
        let session = Session::new(Credential::bearer("t"), "user-42", Role::User);
        let outgoing = OutgoingMessage::new(&session, &ConversationEndpoint::AdminChannel, "hey");

        let json = serde_json::to_value(&outgoing).unwrap();
        assert_eq!(json["to_id"], "admin");
        assert_eq!(json["to_role"], "admin");
        assert_eq!(json["from_id"], "user-42");
    }
}
