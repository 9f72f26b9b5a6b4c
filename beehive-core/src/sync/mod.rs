pub mod scheduler;
pub mod synchronizer;
pub mod traits;
pub mod types;

pub use scheduler::PollScheduler;
pub use synchronizer::Synchronizer;
pub use traits::{PollControl, Reconcile, ResourceFetcher};
pub use types::{FetchError, PollConfig, PollState, PollStatus, ResourceKey};
