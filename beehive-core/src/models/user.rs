use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(rename = "lastActive", default)]
    pub last_active: Option<i64>,
    #[serde(default)]
    pub image: Option<String>,
}

fn default_role() -> String {
    "user".to_string()
}

/// Entry of the admin's chat contact list.
pub type ChatUser = UserRecord;

impl UserRecord {
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            if self.email.is_empty() {
                &self.id
            } else {
                &self.email
            }
        } else {
            &self.name
        }
    }

    /// `lastActive` is epoch milliseconds.
    pub fn last_active_at(&self) -> Option<DateTime<Utc>> {
        self.last_active.and_then(DateTime::from_timestamp_millis)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPage {
    #[serde(default)]
    pub users: Vec<UserRecord>,
    #[serde(rename = "totalCount", default)]
    pub total_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserQuery {
    pub limit: u32,
    pub offset: u32,
    pub query: Option<String>,
}

impl Default for UserQuery {
    fn default() -> Self {
        Self {
            limit: 10,
            offset: 0,
            query: None,
        }
    }
}

impl UserQuery {
    pub fn next_page(&self) -> Self {
        Self {
            offset: self.offset + self.limit,
            ..self.clone()
        }
    }

    pub fn previous_page(&self) -> Self {
        Self {
            offset: self.offset.saturating_sub(self.limit),
            ..self.clone()
        }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("limit", self.limit.to_string()),
            ("offset", self.offset.to_string()),
        ];
        if let Some(query) = self.query.as_deref().filter(|q| !q.trim().is_empty()) {
            pairs.push(("query", query.trim().to_string()));
        }
        pairs
    }
}
