//! Builds the synchronizers a front-end needs from one configuration and session.

use std::sync::Arc;

use crate::api::{
    ActionSubmitter, ApiClient, ApiSubmitter, ChatUsersFetcher, DashboardFetcher,
    MessagesFetcher, NotificationsFetcher, UploadScope, UploadsFetcher,
};
use crate::config::BeehiveConfig;
use crate::error::BeehiveResult;
use crate::models::Session;
use crate::sync::{PollConfig, PollScheduler, Reconcile, ResourceFetcher, Synchronizer};
use crate::views::{ChatUsersView, ChatView, DashboardView, GalleryView, NotificationView};

pub const DASHBOARD_RECENT_LIMIT: u32 = 10;

pub struct Wiring {
    pub client: ApiClient,
    pub submitter: Arc<dyn ActionSubmitter>,
    pub session: Session,
    config: BeehiveConfig,
}

impl Wiring {
    pub fn new(config: &BeehiveConfig, session: Session) -> BeehiveResult<Self> {
        let client = ApiClient::from_config(config)?;
        let submitter: Arc<dyn ActionSubmitter> = Arc::new(ApiSubmitter::new(client.clone()));
        Ok(Self::with_parts(config, session, client, submitter))
    }

    pub fn with_parts(
        config: &BeehiveConfig,
        session: Session,
        client: ApiClient,
        submitter: Arc<dyn ActionSubmitter>,
    ) -> Self {
        Self {
            client,
            submitter,
            session,
            config: config.clone(),
        }
    }

    fn synchronizer<F, V>(&self, fetcher: F, poll: PollConfig, initial: V) -> Synchronizer<F, V>
    where
        F: ResourceFetcher,
        V: Reconcile<Snapshot = F::Snapshot>,
    {
        let scheduler =
            PollScheduler::new(fetcher, self.session.credential().clone(), poll, initial);
        Synchronizer::new(scheduler, Arc::clone(&self.submitter), self.session.clone())
    }

    pub fn chat(&self) -> Synchronizer<MessagesFetcher, ChatView> {
        self.synchronizer(
            MessagesFetcher::new(self.client.clone()),
            self.config.polling.messages(),
            ChatView::for_session(&self.session),
        )
    }

    pub fn chat_users(&self) -> Synchronizer<ChatUsersFetcher, ChatUsersView> {
        self.synchronizer(
            ChatUsersFetcher::new(self.client.clone()),
            self.config.polling.messages(),
            ChatUsersView::default(),
        )
    }

    pub fn notifications(&self) -> Synchronizer<NotificationsFetcher, NotificationView> {
        self.synchronizer(
            NotificationsFetcher::new(self.client.clone()),
            self.config.polling.notifications(),
            NotificationView::default(),
        )
    }

    pub fn uploads(&self, scope: UploadScope) -> Synchronizer<UploadsFetcher, GalleryView> {
        let mode = self.config.display.gallery_mode.parse().unwrap_or_default();
        self.synchronizer(
            UploadsFetcher::new(self.client.clone(), scope),
            self.config.polling.uploads(),
            GalleryView::with_mode(mode),
        )
    }

    pub fn dashboard(&self) -> Synchronizer<DashboardFetcher, DashboardView> {
        self.synchronizer(
            DashboardFetcher::new(self.client.clone(), DASHBOARD_RECENT_LIMIT),
            self.config.polling.dashboard(),
            DashboardView::default(),
        )
    }
}
