//! Background job scheduling

pub mod retention;

use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info};

use crate::config::ConfigProvider;
use crate::services::library_content::{LibraryContentService, ServiceError};
use crate::services::progress::ProgressSink;

/// Run retention cycles forever, one per `interval`.
///
/// The first cycle starts immediately. Each cycle takes a fresh config
/// snapshot, so edits picked up by the config watcher apply from the next
/// cycle on. A late cycle delays the schedule rather than bunching up.
///
/// Returns only when a cycle fails with a [ServiceError]; the process is
/// expected to exit and be restarted by its supervisor.
pub async fn run_retention_loop(
    provider: &dyn ConfigProvider,
    service: &dyn LibraryContentService,
    sink: &dyn ProgressSink,
    interval: Duration,
) -> Result<(), ServiceError> {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let config = provider.snapshot();
        match retention::run_cycle(&config, service, sink).await {
            Ok(report) => info!(
                deleted = report.deleted_count(),
                failed = report.failed_count(),
                next_in_secs = interval.as_secs(),
                "Retention cycle complete"
            ),
            Err(e) => {
                error!(error = %e, "Retention cycle aborted");
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::config::RetentionConfig;
    use crate::services::library_content::fake::FakeLibrary;
    use crate::services::progress::{MemorySink, ProgressEvent};

    #[tokio::test]
    async fn test_loop_runs_until_service_fails() {
        let base = tempfile::tempdir().unwrap();
        let config = RetentionConfig::from_yaml(&format!(
            "plexBaseDirectory: {}\nmainUserToken: u1\nusers: []\n",
            base.path().display()
        ))
        .unwrap();
        let library = FakeLibrary {
            section_list_budget: Some(2),
            ..Default::default()
        };
        let sink = MemorySink::default();

        let result =
            run_retention_loop(&config, &library, &sink, Duration::from_millis(5)).await;

        assert_matches!(result, Err(ServiceError::Status { .. }));
        let started = sink
            .events()
            .iter()
            .filter(|e| **e == ProgressEvent::CycleStarted)
            .count();
        let finished = sink
            .events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::CycleFinished { .. }))
            .count();
        assert_eq!(started, 3);
        assert_eq!(finished, 2);
        assert_eq!(sink.events().last(), Some(&ProgressEvent::CycleStarted));
    }
}
