use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::{Ack, Action, ActionSubmitter, SubmitError};
use crate::error::BeehiveResult;
use crate::models::Session;

use super::scheduler::PollScheduler;
use super::traits::{Reconcile, ResourceFetcher};
use super::types::{PollStatus, ResourceKey};

/// Binds one polled resource to one view: the scheduler keeps the view fresh and the
/// submitter performs writes, each confirmed write folding into the view and triggering
/// an immediate out-of-band poll.
pub struct Synchronizer<F: ResourceFetcher, V> {
    scheduler: PollScheduler<F, V>,
    submitter: Arc<dyn ActionSubmitter>,
    session: Session,
}

impl<F: ResourceFetcher, V> Clone for Synchronizer<F, V> {
    fn clone(&self) -> Self {
        Self {
            scheduler: self.scheduler.clone(),
            submitter: Arc::clone(&self.submitter),
            session: self.session.clone(),
        }
    }
}

impl<F, V> Synchronizer<F, V>
where
    F: ResourceFetcher,
    V: Reconcile<Snapshot = F::Snapshot>,
{
    pub fn new(
        scheduler: PollScheduler<F, V>,
        submitter: Arc<dyn ActionSubmitter>,
        session: Session,
    ) -> Self {
        Self {
            scheduler,
            submitter,
            session,
        }
    }

    pub fn scheduler(&self) -> &PollScheduler<F, V> {
        &self.scheduler
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn mount(&self, key: impl Into<ResourceKey>) -> BeehiveResult<()> {
        self.scheduler.start(key.into()).await
    }

    pub async fn unmount(&self) {
        self.scheduler.stop().await
    }

    pub fn view(&self) -> V {
        self.scheduler.view()
    }

    pub fn subscribe(&self) -> watch::Receiver<V> {
        self.scheduler.subscribe()
    }

    pub fn status(&self) -> PollStatus {
        self.scheduler.status()
    }

    pub fn update_view(&self, edit: impl FnOnce(&mut V)) {
        self.scheduler.update_view(edit)
    }

    /// Submits `action`. On failure the view is left exactly as it was, so the user's
    /// input is still there to retry.
    pub async fn submit(&self, action: Action) -> Result<Ack, SubmitError> {
        match self.submitter.submit(&action, &self.session).await {
            Ok(ack) => {
                self.scheduler
                    .update_view(|view| *view = view.acknowledge(&ack));
                let refreshed = self.scheduler.refresh_now().await;
                debug!(
                    resource = %self.scheduler.resource_name(),
                    action = action.name(),
                    refreshed,
                    "Action acknowledged"
                );
                Ok(ack)
            }
            Err(error) => {
                warn!(
                    resource = %self.scheduler.resource_name(),
                    action = action.name(),
                    error = %error,
                    "Action failed"
                );
                Err(error)
            }
        }
    }
}
