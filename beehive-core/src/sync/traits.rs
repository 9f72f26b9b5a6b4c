use async_trait::async_trait;

use crate::api::Ack;
use crate::error::BeehiveResult;
use crate::models::Credential;

use super::types::{FetchError, PollStatus, ResourceKey};

/// One authenticated read of a resource. Implementations never retry and never touch
/// shared state; rescheduling is the poll scheduler's job.
#[async_trait]
pub trait ResourceFetcher: Send + Sync + 'static {
    type Snapshot: Send + Sync + 'static;

    fn resource_name(&self) -> &str;

    async fn fetch(
        &self,
        key: &ResourceKey,
        credential: &Credential,
    ) -> Result<Self::Snapshot, FetchError>;
}

/// View state that can absorb a fresh snapshot.
///
/// `reconcile` must be a pure function of `(self, snapshot)`: list data is replaced
/// wholesale while local UI state (draft input, open flags, expanded item) carries over.
pub trait Reconcile: Clone + Send + Sync + 'static {
    type Snapshot: Send + Sync + 'static;

    fn reconcile(&self, snapshot: &Self::Snapshot) -> Self;

    /// Drops list data when the watched key changes, keeping local UI state.
    fn cleared(&self) -> Self;

    /// Applies the local effect of a successful action.
    fn acknowledge(&self, _ack: &Ack) -> Self {
        self.clone()
    }
}

#[async_trait]
pub trait PollControl: Send + Sync {
    fn resource_name(&self) -> &str;

    async fn start(&self, key: ResourceKey) -> BeehiveResult<()>;

    async fn stop(&self);

    /// Returns false when there is no running session to refresh.
    async fn refresh_now(&self) -> bool;

    fn status(&self) -> PollStatus;

    fn is_running(&self) -> bool {
        self.status().is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;


    struct EchoFetcher;

    #[async_trait]
    impl ResourceFetcher for EchoFetcher {
        type Snapshot = String;

        fn resource_name(&self) -> &str {
            "echo"
        }

        async fn fetch(
            &self,
            key: &ResourceKey,
            _credential: &Credential,
        ) -> Result<String, FetchError> {
            if !key.is_valid() {
                return Err(FetchError::InvalidKey);
            }
            Ok(key.to_string())
        }
    }

    #[derive(Clone, Default, PartialEq, Debug)]
    struct Latest {
        value: Option<String>,
        draft: String,
    }

    impl Reconcile for Latest {
        type Snapshot = String;

        fn reconcile(&self, snapshot: &String) -> Self {
            Self {
                value: Some(snapshot.clone()),
                draft: self.draft.clone(),
            }
        }

        fn cleared(&self) -> Self {
            Self {
                value: None,
                draft: self.draft.clone(),
            }
        }
    }

    #[tokio::test]
    async fn test_fetcher_rejects_invalid_key() {
        let credential = Credential::bearer("t");
        let result = EchoFetcher.fetch(&ResourceKey::from(""), &credential).await;
        assert_eq!(result, Err(FetchError::InvalidKey));
    }

    #[test]
    fn test_default_acknowledge_is_identity() {
        let view = Latest {
            value: Some("a".to_string()),
            draft: "typing".to_string(),
        };
        assert_eq!(view.acknowledge(&Ack::Deleted { id: "x".to_string() }), view);
        assert_eq!(view.cleared().draft, "typing");
    }
}
