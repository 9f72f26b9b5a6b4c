use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::timestamp;

pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "heif", "pdf"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "neutral" => Ok(Sentiment::Neutral),
            "negative" => Ok(Sentiment::Negative),
            other => Err(format!(
                "unknown sentiment '{}'. Must be positive, neutral or negative",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upload {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub audio_filename: Option<String>,
    #[serde(default)]
    pub sentiment: Option<String>,
    #[serde(default, with = "timestamp::flexible_option")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Upload {
    pub fn audio(&self) -> Option<&str> {
        self.audio_filename.as_deref().filter(|name| !name.is_empty())
    }

    pub fn sentiment(&self) -> Option<Sentiment> {
        self.sentiment.as_deref().and_then(|raw| raw.parse().ok())
    }

    pub fn is_pdf(&self) -> bool {
        self.filename.to_lowercase().ends_with(".pdf")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadsResponse {
    #[serde(default)]
    pub images: Vec<Upload>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Case-insensitive tag match over the free-form sentiment field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentimentFilter {
    pub tags: Vec<String>,
    pub match_all: bool,
}

impl SentimentFilter {
    pub fn any(tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
            match_all: false,
        }
    }

    pub fn all(tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
            match_all: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn matches(&self, upload: &Upload) -> bool {
        if self.tags.is_empty() {
            return true;
        }
        let sentiment = upload.sentiment.as_deref().unwrap_or("").to_lowercase();
        let mut hits = self
            .tags
            .iter()
            .map(|tag| sentiment.contains(&tag.to_lowercase()));
        if self.match_all {
            hits.all(|hit| hit)
        } else {
            hits.any(|hit| hit)
        }
    }
}

pub fn has_allowed_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUpload {
    pub files: Vec<PathBuf>,
    pub title: String,
    pub description: String,
    pub sentiment: Sentiment,
    pub audio: Option<PathBuf>,
}

impl NewUpload {
    pub fn validate(&self) -> Result<(), String> {
        if self.files.is_empty() {
            return Err("No file selected".to_string());
        }
        if self.title.trim().is_empty() || self.description.trim().is_empty() {
            return Err("Title and description are required".to_string());
        }
        if let Some(rejected) = self.files.iter().find(|path| !has_allowed_extension(path)) {
            return Err(format!(
                "File type not allowed: {} (allowed: {})",
                rejected.display(),
                ALLOWED_EXTENSIONS.join(", ")
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadEdit {
    pub id: String,
    pub title: String,
    pub description: String,
    pub sentiment: Option<Sentiment>,
}

impl UploadEdit {
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Upload id is required".to_string());
        }
        if self.title.trim().is_empty() || self.description.trim().is_empty() {
            return Err("Title and description are required".to_string());
        }
        Ok(())
    }

    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("title", self.title.trim().to_string()),
            ("description", self.description.trim().to_string()),
        ];
        if let Some(sentiment) = self.sentiment {
            fields.push(("sentiment", sentiment.to_string()));
        }
        fields
    }
}
