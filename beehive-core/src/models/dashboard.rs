use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;
use super::upload::Sentiment;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub total_images: u64,
    #[serde(default)]
    pub total_voice_notes: u64,
    #[serde(default)]
    pub total_media: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadKind {
    Image,
    Voice,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentUpload {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub user: String,
    #[serde(default, with = "timestamp::flexible_option")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub kind: UploadKind,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub audio_filename: Option<String>,
    #[serde(default)]
    pub sentiment: Option<String>,
}

impl RecentUpload {
    pub fn sentiment(&self) -> Option<Sentiment> {
        self.sentiment.as_deref().and_then(|raw| raw.parse().ok())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    #[serde(default)]
    pub stats: DashboardStats,
    #[serde(default)]
    pub recent_uploads: Vec<RecentUpload>,
}

/// Share of each sentiment among tagged uploads, in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SentimentBreakdown {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
    pub untagged: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Analytics {
    pub images: u64,
    pub voice_notes: u64,
    pub total_media: u64,
    pub recent_images: usize,
    pub recent_voice_notes: usize,
    pub sentiment: SentimentBreakdown,
}

impl Analytics {
    pub fn from_snapshot(snapshot: &DashboardSnapshot) -> Self {
        let recent = &snapshot.recent_uploads;
        let recent_voice_notes = recent
            .iter()
            .filter(|upload| upload.kind == UploadKind::Voice)
            .count();

        let mut counts = [0usize; 3];
        let mut untagged = 0;
        for upload in recent {
            match upload.sentiment() {
                Some(Sentiment::Positive) => counts[0] += 1,
                Some(Sentiment::Neutral) => counts[1] += 1,
                Some(Sentiment::Negative) => counts[2] += 1,
                None => untagged += 1,
            }
        }
        let tagged: usize = counts.iter().sum();
        let percent = |count: usize| {
            if tagged == 0 {
                0.0
            } else {
                count as f64 * 100.0 / tagged as f64
            }
        };

        Self {
            images: snapshot.stats.total_images,
            voice_notes: snapshot.stats.total_voice_notes,
            total_media: snapshot.stats.total_media,
            recent_images: recent.len() - recent_voice_notes,
            recent_voice_notes,
            sentiment: SentimentBreakdown {
                positive: percent(counts[0]),
                neutral: percent(counts[1]),
                negative: percent(counts[2]),
                untagged,
            },
        }
    }
}
