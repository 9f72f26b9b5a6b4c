use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    /// Interprets the identity provider's role claim. An absent claim means a regular user.
    pub fn from_claim(claim: Option<&str>) -> Result<Self, String> {
        match claim.map(str::trim) {
            None | Some("") => Ok(Role::User),
            Some(value) => value.parse(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
}

impl Credential {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"********")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    credential: Credential,
    user_id: String,
    role: Role,
    username: Option<String>,
}

impl Session {
    pub fn new(credential: Credential, user_id: impl Into<String>, role: Role) -> Self {
        Self {
            credential,
            user_id: user_id.into(),
            role,
            username: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.user_id)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// The other side of a chat.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConversationEndpoint {
    /// A specific user, picked by an admin.
    User(String),
    /// The shared admin inbox a user writes to.
    AdminChannel,
}

impl ConversationEndpoint {
    pub const ADMIN_CHANNEL_ID: &'static str = "admin";

    /// The default endpoint for a session: users always talk to the admin channel,
    /// admins have to pick someone first.
    pub fn default_for(session: &Session) -> Option<Self> {
        match session.role() {
            Role::User => Some(ConversationEndpoint::AdminChannel),
            Role::Admin => None,
        }
    }

    pub fn to_id(&self) -> &str {
        match self {
            ConversationEndpoint::User(id) => id,
            ConversationEndpoint::AdminChannel => Self::ADMIN_CHANNEL_ID,
        }
    }

    pub fn to_role(&self) -> Role {
        match self {
            ConversationEndpoint::User(_) => Role::User,
            ConversationEndpoint::AdminChannel => Role::Admin,
        }
    }

    /// Whose message history the backend keys this conversation by.
    pub fn thread_owner<'a>(&'a self, session: &'a Session) -> &'a str {
        match self {
            ConversationEndpoint::User(id) => id,
            ConversationEndpoint::AdminChannel => session.user_id(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        match self {
            ConversationEndpoint::User(id) => !id.trim().is_empty(),
            ConversationEndpoint::AdminChannel => true,
        }
    }
}

impl fmt::Display for ConversationEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversationEndpoint::User(id) => write!(f, "user:{}", id),
            ConversationEndpoint::AdminChannel => write!(f, "admin"),
        }
    }
}
