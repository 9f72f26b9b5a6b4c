use std::fmt;
use std::str::FromStr;

use crate::api::Ack;
use crate::models::{Session, SentimentFilter, Upload};
use crate::sync::Reconcile;

use super::{retain_id, UserAction, ViewBinding};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GalleryMode {
    #[default]
    Grid,
    List,
    Rolling,
}

impl GalleryMode {
    pub fn next(self) -> Self {
        match self {
            GalleryMode::Grid => GalleryMode::List,
            GalleryMode::List => GalleryMode::Rolling,
            GalleryMode::Rolling => GalleryMode::Grid,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GalleryMode::Grid => "grid",
            GalleryMode::List => "list",
            GalleryMode::Rolling => "rolling",
        }
    }
}

impl fmt::Display for GalleryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GalleryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "grid" => Ok(GalleryMode::Grid),
            "list" => Ok(GalleryMode::List),
            "rolling" | "carousel" => Ok(GalleryMode::Rolling),
            other => Err(format!("unknown gallery mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GalleryView {
    pub uploads: Vec<Upload>,
    pub mode: GalleryMode,
    pub carousel_index: usize,
    pub expanded_audio: Option<String>,
    pub filter: SentimentFilter,
}

impl GalleryView {
    pub fn with_mode(mode: GalleryMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn visible(&self) -> Vec<&Upload> {
        self.uploads
            .iter()
            .filter(|upload| self.filter.matches(upload))
            .collect()
    }

    pub fn current(&self) -> Option<&Upload> {
        self.visible().get(self.carousel_index).copied()
    }

    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.next();
    }

    pub fn next(&mut self) {
        let len = self.visible().len();
        if len > 0 {
            self.carousel_index = (self.carousel_index + 1) % len;
        }
    }

    pub fn previous(&mut self) {
        let len = self.visible().len();
        if len > 0 {
            self.carousel_index = (self.carousel_index + len - 1) % len;
        }
    }

    pub fn toggle_audio(&mut self, id: &str) {
        if self.expanded_audio.as_deref() == Some(id) {
            self.expanded_audio = None;
        } else {
            self.expanded_audio = Some(id.to_string());
        }
    }

    pub fn set_filter(&mut self, filter: SentimentFilter) {
        let current = self.current().map(|upload| upload.id.clone());
        self.filter = filter;
        self.carousel_index = self.index_following(current.as_deref());
    }

    /// Where the carousel lands once the visible list changes: on the same upload if it is
    /// still visible, otherwise at the old position clamped to the new length.
    fn index_following(&self, id: Option<&str>) -> usize {
        let visible = self.visible();
        id.and_then(|id| visible.iter().position(|upload| upload.id == id))
            .unwrap_or_else(|| clamp_index(self.carousel_index, visible.len()))
    }
}

fn clamp_index(index: usize, len: usize) -> usize {
    index.min(len.saturating_sub(1))
}

impl Reconcile for GalleryView {
    type Snapshot = Vec<Upload>;

    fn reconcile(&self, snapshot: &Vec<Upload>) -> Self {
        let mut next = Self {
            uploads: snapshot.clone(),
            mode: self.mode,
            carousel_index: self.carousel_index,
            expanded_audio: retain_id(
                &self.expanded_audio,
                snapshot.iter().map(|u| u.id.as_str()),
            ),
            filter: self.filter.clone(),
        };
        let current = self.current().map(|upload| upload.id.as_str());
        next.carousel_index = next.index_following(current);
        next
    }

    fn cleared(&self) -> Self {
        Self {
            uploads: Vec::new(),
            carousel_index: 0,
            expanded_audio: None,
            ..self.clone()
        }
    }

    fn acknowledge(&self, ack: &Ack) -> Self {
        match ack {
            Ack::Deleted { id } => {
                let remaining: Vec<Upload> = self
                    .uploads
                    .iter()
                    .filter(|upload| &upload.id != id)
                    .cloned()
                    .collect();
                self.reconcile(&remaining)
            }
            _ => self.clone(),
        }
    }
}

impl ViewBinding for GalleryView {
    fn available_actions(&self, session: &Session) -> Vec<UserAction> {
        let mut actions = vec![UserAction::ToggleView, UserAction::FilterBySentiment];
        if self.uploads.iter().any(|upload| upload.audio().is_some()) {
            actions.push(UserAction::PlayAudio);
        }
        if session.is_user() {
            actions.push(UserAction::CreateUpload);
        }
        if !self.uploads.is_empty() {
            actions.push(UserAction::EditUpload);
            actions.push(UserAction::DeleteUpload);
        }
        actions.push(UserAction::Refresh);
        actions
    }
}
