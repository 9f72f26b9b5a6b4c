use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::models::{Credential, Role, Session};
use crate::sync::PollConfig;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BeehiveConfig {
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub polling: PollingConfig,
    pub logging: LoggingConfig,
    pub display: DisplayConfig,
    pub tui: TuiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Where the non-`/api` routes (upload edit and delete) live. Defaults to the origin
    /// of `base_url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_url: Option<String>,

    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,
}

/// Identity handed to the client by the sign-in provider.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "********"))
            .field("user_id", &self.user_id)
            .field("role", &self.role)
            .field("username", &self.username)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_messages_interval")]
    pub messages_interval_ms: u64,

    #[serde(default = "default_notifications_interval")]
    pub notifications_interval_ms: u64,

    #[serde(default = "default_dashboard_interval")]
    pub dashboard_interval_ms: u64,

    #[serde(default = "default_uploads_interval")]
    pub uploads_interval_ms: u64,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_backoff_step")]
    pub backoff_step_ms: u64,

    #[serde(default = "default_backoff_max")]
    pub backoff_max_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json_format: bool,

    #[serde(default)]
    pub file_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_true")]
    pub color: bool,

    #[serde(default = "default_datetime_format")]
    pub datetime_format: String,

    #[serde(default = "default_gallery_mode")]
    pub gallery_mode: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuiConfig {
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,

    #[serde(default = "default_true")]
    pub unicode_enabled: bool,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000/api".to_string()
}

fn default_api_timeout() -> u64 {
    30
}

fn default_messages_interval() -> u64 {
    5_000
}

fn default_notifications_interval() -> u64 {
    10_000
}

fn default_dashboard_interval() -> u64 {
    30_000
}

fn default_uploads_interval() -> u64 {
    15_000
}

fn default_request_timeout() -> u64 {
    15_000
}

fn default_backoff_step() -> u64 {
    5_000
}

fn default_backoff_max() -> u64 {
    30_000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_datetime_format() -> String {
    "%Y-%m-%d %H:%M".to_string()
}

fn default_gallery_mode() -> String {
    "grid".to_string()
}

fn default_tick_rate() -> u64 {
    250
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            root_url: None,
            timeout_secs: default_api_timeout(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            messages_interval_ms: default_messages_interval(),
            notifications_interval_ms: default_notifications_interval(),
            dashboard_interval_ms: default_dashboard_interval(),
            uploads_interval_ms: default_uploads_interval(),
            request_timeout_ms: default_request_timeout(),
            backoff_step_ms: default_backoff_step(),
            backoff_max_ms: default_backoff_max(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
            file_path: String::new(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: true,
            datetime_format: default_datetime_format(),
            gallery_mode: default_gallery_mode(),
        }
    }
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            unicode_enabled: true,
        }
    }
}

impl PollingConfig {
    fn poll_config(&self, interval_ms: u64) -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(interval_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            backoff_step: Duration::from_millis(self.backoff_step_ms),
            backoff_max: Duration::from_millis(self.backoff_max_ms),
        }
    }

    pub fn messages(&self) -> PollConfig {
        self.poll_config(self.messages_interval_ms)
    }

    pub fn notifications(&self) -> PollConfig {
        self.poll_config(self.notifications_interval_ms)
    }

    pub fn dashboard(&self) -> PollConfig {
        self.poll_config(self.dashboard_interval_ms)
    }

    pub fn uploads(&self) -> PollConfig {
        self.poll_config(self.uploads_interval_ms)
    }
}

impl BeehiveConfig {
    pub fn load() -> Result<Self, ConfigLoadError> {
        Self::load_from_paths(get_config_paths())
    }

    pub fn load_from_paths(paths: Vec<PathBuf>) -> Result<Self, ConfigLoadError> {
        load_dotenv_files();

        let mut builder = ConfigBuilder::builder();

        for path in paths {
            if path.exists() {
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("BEEHIVE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;

        let mut beehive_config: BeehiveConfig = config.try_deserialize()?;

        if let Ok(url) = std::env::var("BEEHIVE_API_URL") {
            beehive_config.api.base_url = url;
        }

        if let Ok(token) = std::env::var("BEEHIVE_TOKEN") {
            beehive_config.auth.token = Some(token);
        }

        if let Ok(user_id) = std::env::var("BEEHIVE_USER_ID") {
            beehive_config.auth.user_id = Some(user_id);
        }

        if let Ok(role) = std::env::var("BEEHIVE_ROLE") {
            beehive_config.auth.role = Some(role);
        }

        if let Ok(username) = std::env::var("BEEHIVE_USERNAME") {
            beehive_config.auth.username = Some(username);
        }

        if let Ok(level) = std::env::var("BEEHIVE_LOG_LEVEL") {
            beehive_config.logging.level = level;
        }

        beehive_config.validate()?;

        Ok(beehive_config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.api.base_url.is_empty() {
            return Err(ConfigLoadError::MissingRequired("api.base_url".to_string()));
        }

        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://")
        {
            return Err(ConfigLoadError::InvalidValue {
                key: "api.base_url".to_string(),
                message: "Must start with http:// or https://".to_string(),
            });
        }

        if let Some(root_url) = self.api.root_url.as_deref() {
            if !root_url.is_empty()
                && !root_url.starts_with("http://")
                && !root_url.starts_with("https://")
            {
                return Err(ConfigLoadError::InvalidValue {
                    key: "api.root_url".to_string(),
                    message: "Must start with http:// or https://".to_string(),
                });
            }
        }

        let intervals = [
            ("polling.messages_interval_ms", self.polling.messages_interval_ms),
            (
                "polling.notifications_interval_ms",
                self.polling.notifications_interval_ms,
            ),
            ("polling.dashboard_interval_ms", self.polling.dashboard_interval_ms),
            ("polling.uploads_interval_ms", self.polling.uploads_interval_ms),
            ("polling.request_timeout_ms", self.polling.request_timeout_ms),
        ];
        for (key, value) in intervals {
            if value == 0 {
                return Err(ConfigLoadError::InvalidValue {
                    key: key.to_string(),
                    message: "Must be greater than 0".to_string(),
                });
            }
        }

        if self.polling.backoff_max_ms < self.polling.backoff_step_ms {
            return Err(ConfigLoadError::InvalidValue {
                key: "polling.backoff_max_ms".to_string(),
                message: "Cannot be smaller than backoff_step_ms".to_string(),
            });
        }

        if let Some(role) = self.auth.role.as_deref() {
            if role.parse::<Role>().is_err() {
                return Err(ConfigLoadError::InvalidValue {
                    key: "auth.role".to_string(),
                    message: format!("Unknown role '{}'. Must be 'admin' or 'user'", role),
                });
            }
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        let level_lower = self.logging.level.to_lowercase();
        if !valid_levels.contains(&level_lower.as_str()) && !level_lower.contains('=') {
            return Err(ConfigLoadError::InvalidValue {
                key: "logging.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Must be one of: {:?}",
                    self.logging.level, valid_levels
                ),
            });
        }

        Ok(())
    }

    /// Builds the session every fetch and submit is made with.
    pub fn session(&self) -> Result<Session, ConfigLoadError> {
        let token = self
            .auth
            .token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ConfigLoadError::MissingRequired("auth.token".to_string()))?;
        let user_id = self
            .auth
            .user_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ConfigLoadError::MissingRequired("auth.user_id".to_string()))?;
        let role = Role::from_claim(self.auth.role.as_deref()).map_err(|message| {
            ConfigLoadError::InvalidValue {
                key: "auth.role".to_string(),
                message,
            }
        })?;

        let mut session = Session::new(Credential::bearer(token), user_id, role);
        if let Some(username) = &self.auth.username {
            session = session.with_username(username);
        }
        Ok(session)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn log_level(&self) -> &str {
        &self.logging.level
    }

    /// Writes the configuration as TOML, leaving out the bearer token.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigLoadError> {
        let mut redacted = self.clone();
        redacted.auth.token = None;
        let rendered = toml::to_string_pretty(&redacted)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, rendered)?;
        Ok(())
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(config_dir) = get_config_dir() {
        paths.push(config_dir.join("config.toml"));
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join("beehive.toml"));
    }

    paths
}

fn load_dotenv_files() {
    let env_paths = get_dotenv_paths();

    for path in env_paths {
        if path.exists() {
            let _ = dotenvy::from_path(&path);
        }
    }
}

fn get_dotenv_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".env"));
        paths.push(cwd.join(".env.local"));
    }

    if let Some(config_dir) = get_config_dir() {
        paths.push(config_dir.join(".env"));
    }

    paths
}

pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("beehive"))
}

pub fn get_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("beehive"))
}

pub fn ensure_data_dir() -> Result<PathBuf, std::io::Error> {
    let data_dir = get_data_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine data directory",
        )
    })?;

    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
    }

    Ok(data_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = BeehiveConfig::default();

        assert_eq!(config.api.base_url, "http://127.0.0.1:5000/api");
        assert_eq!(config.polling.messages_interval_ms, 5_000);
        assert_eq!(config.polling.notifications_interval_ms, 10_000);
        assert_eq!(config.polling.request_timeout_ms, 15_000);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json_format);
        assert_eq!(config.display.gallery_mode, "grid");
        assert_eq!(config.tui.tick_rate_ms, 250);
        assert!(config.auth.token.is_none());
    }

    #[test]
    fn test_validation_valid_config() {
        let config = BeehiveConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_base_url() {
        let mut config = BeehiveConfig::default();
        config.api.root_url = Some("localhost:5000".to_string());
        assert!(config.validate().is_err());
        config.api.root_url = None;

        config.api.base_url = "ftp://localhost".to_string();
        assert!(config.validate().is_err());

        config.api.base_url = String::new();
        assert!(matches!(
            config.validate(),
            Err(ConfigLoadError::MissingRequired(_))
        ));
    }

    #[test]
    fn test_validation_zero_interval() {
        let mut config = BeehiveConfig::default();
        config.polling.messages_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_backoff_bounds() {
        let mut config = BeehiveConfig::default();
        config.polling.backoff_step_ms = 10_000;
        config.polling.backoff_max_ms = 1_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_log_level() {
        let mut config = BeehiveConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        config.logging.level = "beehive_core=debug,reqwest=warn".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_unknown_role() {
        let mut config = BeehiveConfig::default();
        config.auth.role = Some("moderator".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_session_requires_token_and_user() {
        let mut config = BeehiveConfig::default();
        assert!(matches!(
            config.session(),
            Err(ConfigLoadError::MissingRequired(key)) if key == "auth.token"
        ));

        config.auth.token = Some("tok".to_string());
        assert!(config.session().is_err());

        config.auth.user_id = Some("user-42".to_string());
        let session = config.session().unwrap();
        assert_eq!(session.user_id(), "user-42");
        assert_eq!(session.role(), Role::User);
    }

    #[test]
    fn test_session_admin_role() {
        let mut config = BeehiveConfig::default();
        config.auth.token = Some("tok".to_string());
        config.auth.user_id = Some("admin-1".to_string());
        config.auth.role = Some("admin".to_string());
        assert!(config.session().unwrap().is_admin());
    }

    #[test]
    fn test_poll_config_projection() {
        let config = BeehiveConfig::default();
        let messages = config.polling.messages();
        assert_eq!(messages.interval, Duration::from_secs(5));
        assert_eq!(messages.request_timeout, Duration::from_secs(15));
        assert_eq!(config.polling.notifications().interval, Duration::from_secs(10));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("beehive.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[api]\nbase_url = \"https://beehive.example.com/api\"\n\n[polling]\nmessages_interval_ms = 2000"
        )
        .unwrap();

        let config = BeehiveConfig::load_from_paths(vec![path]).unwrap();
        assert_eq!(config.api.base_url, "https://beehive.example.com/api");
        assert_eq!(config.polling.messages_interval_ms, 2_000);
        assert_eq!(config.polling.notifications_interval_ms, 10_000);
    }

    #[test]
    fn test_save_omits_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = BeehiveConfig::default();
        config.auth.token = Some("super-secret".to_string());
        config.auth.user_id = Some("user-42".to_string());

        config.save_to(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("super-secret"));
        assert!(written.contains("user-42"));
    }

    #[test]
    fn test_auth_debug_redacts_token() {
        let auth = AuthConfig {
            token: Some("super-secret".to_string()),
            ..Default::default()
        };
        assert!(!format!("{:?}", auth).contains("super-secret"));
    }

    #[test]
    fn test_directory_helpers() {
        assert!(get_config_dir().is_some());
        assert!(get_data_dir().is_some());
    }
}
