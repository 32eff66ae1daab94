//! Retention cycle
//!
//! One pass: read the catalog, pick the items every subscriber has watched,
//! delete their files, then sweep the storage locations.

use tracing::{debug, info};

use crate::catalog::CatalogItem;
use crate::config::RetentionConfig;
use crate::services::deletion::DeletionOutcome;
use crate::services::file_resolver::resolve_files;
use crate::services::library_content::{LibraryContentService, ServiceError};
use crate::services::progress::{ProgressEvent, ProgressSink};
use crate::services::subscriptions::SubscriptionIndex;
use crate::services::{catalog, sweeper, watch_state};

/// What a cycle deleted
#[derive(Debug, Default)]
pub struct CycleReport {
    /// Files of eligible items, in deletion order
    pub deleted_paths: Vec<DeletionOutcome>,
    /// Junk and empty directories removed by the sweep
    pub sweep_actions: Vec<DeletionOutcome>,
}

impl CycleReport {
    /// Successful deletions across both phases
    pub fn deleted_count(&self) -> usize {
        self.outcomes().filter(|o| o.succeeded()).count()
    }

    /// Failed deletions across both phases
    pub fn failed_count(&self) -> usize {
        self.outcomes().filter(|o| !o.succeeded()).count()
    }

    fn outcomes(&self) -> impl Iterator<Item = &DeletionOutcome> {
        self.deleted_paths.iter().chain(self.sweep_actions.iter())
    }
}

/// Run one full retention cycle against a config snapshot.
///
/// Eligibility and file lists are settled for every item before the first
/// deletion, so a [ServiceError] aborts the cycle with nothing deleted.
/// Failed deletions are only reported.
pub async fn run_cycle(
    config: &RetentionConfig,
    service: &dyn LibraryContentService,
    sink: &dyn ProgressSink,
) -> Result<CycleReport, ServiceError> {
    sink.record(ProgressEvent::CycleStarted);

    let owner_token = config.owner_token.as_str();
    let catalog = catalog::read_catalog(service, owner_token).await?;
    let subscriptions = SubscriptionIndex::from_config(config);

    let mut eligible: Vec<&CatalogItem> = Vec::new();
    for item in &catalog.items {
        if watch_state::is_eligible_for_deletion(service, item, &subscriptions, owner_token).await? {
            eligible.push(item);
        }
    }
    info!(
        items = catalog.items.len(),
        eligible = eligible.len(),
        "Eligibility evaluated"
    );

    // Every file list is resolved before the first deletion
    let mut doomed = Vec::with_capacity(eligible.len());
    for item in eligible {
        let files = resolve_files(service, item, owner_token, config.base_dir()).await?;
        debug!(item = %item.title, files = files.len(), "Files resolved");
        doomed.push((item, files));
    }

    let mut report = CycleReport::default();

    for (item, files) in doomed {
        debug!(item = %item.title, "Deleting item");
        for path in files {
            sink.record(ProgressEvent::Deleting { path: path.clone() });
            let outcome = DeletionOutcome::attempt(path);
            if let Some(error) = &outcome.error {
                sink.record(ProgressEvent::DeleteFailed {
                    path: outcome.path.clone(),
                    reason: error.to_string(),
                });
            }
            report.deleted_paths.push(outcome);
        }
    }

    report.sweep_actions = sweeper::sweep(
        catalog.storage_locations(),
        config.base_dir(),
        &config.unwanted_extensions,
    );
    for outcome in &report.sweep_actions {
        let event = match &outcome.error {
            None => ProgressEvent::Swept {
                path: outcome.path.clone(),
            },
            Some(error) => ProgressEvent::SweepFailed {
                path: outcome.path.clone(),
                reason: error.to_string(),
            },
        };
        sink.record(event);
    }

    sink.record(ProgressEvent::CycleFinished {
        deleted: report.deleted_count(),
        failed: report.failed_count(),
    });

    Ok(report)
}
