//! Retention services: the Plex client and the pieces a cycle is built from

pub mod catalog;
pub mod deletion;
pub mod file_resolver;
pub mod library_content;
pub mod plex;
pub mod progress;
pub mod subscriptions;
pub mod sweeper;
pub mod watch_state;

pub use deletion::{DeletionError, DeletionOutcome};
pub use library_content::{LibraryContentService, ServiceError};
pub use plex::PlexClient;
pub use progress::{LogFileSink, MemorySink, ProgressEvent, ProgressSink};
pub use subscriptions::SubscriptionIndex;
