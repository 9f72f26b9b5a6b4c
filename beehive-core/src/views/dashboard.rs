use crate::models::{Analytics, DashboardSnapshot, RecentUpload, Session};
use crate::sync::Reconcile;

use super::{retain_id, UserAction, ViewBinding};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardView {
    pub snapshot: Option<DashboardSnapshot>,
    pub analytics: Option<Analytics>,
    pub selected: Option<String>,
}

impl DashboardView {
    pub fn recent(&self) -> &[RecentUpload] {
        self.snapshot
            .as_ref()
            .map(|snapshot| snapshot.recent_uploads.as_slice())
            .unwrap_or(&[])
    }

    pub fn selected_upload(&self) -> Option<&RecentUpload> {
        let id = self.selected.as_deref()?;
        self.recent().iter().find(|upload| upload.id == id)
    }

    pub fn select_next(&mut self) {
        let recent = self.recent();
        if recent.is_empty() {
            return;
        }
        let next = match self.selected.as_deref() {
            Some(id) => recent
                .iter()
                .position(|upload| upload.id == id)
                .map(|pos| (pos + 1) % recent.len())
                .unwrap_or(0),
            None => 0,
        };
        self.selected = Some(recent[next].id.clone());
    }
}

impl Reconcile for DashboardView {
    type Snapshot = DashboardSnapshot;

    fn reconcile(&self, snapshot: &DashboardSnapshot) -> Self {
        Self {
            selected: retain_id(
                &self.selected,
                snapshot.recent_uploads.iter().map(|u| u.id.as_str()),
            ),
            analytics: Some(Analytics::from_snapshot(snapshot)),
            snapshot: Some(snapshot.clone()),
        }
    }

    fn cleared(&self) -> Self {
        Self::default()
    }
}

impl ViewBinding for DashboardView {
    fn available_actions(&self, session: &Session) -> Vec<UserAction> {
        if session.is_admin() {
            vec![UserAction::Refresh]
        } else {
            Vec::new()
        }
    }
}
