//! Catalog reader
//!
//! Flattens show and movie sections into a single list of playable items.
//! Episodes are stamped with their series title so subscriptions can be
//! matched per show rather than per episode.

use tracing::{debug, info};

use crate::catalog::{Catalog, CatalogItem, SectionKind};
use crate::services::library_content::{LibraryContentService, ServiceError};

/// Reads the owner's view of the whole library.
///
/// Errors are not caught here: a section that can't be read aborts the cycle.
pub async fn read_catalog(
    service: &dyn LibraryContentService,
    owner_token: &str,
) -> Result<Catalog, ServiceError> {
    let sections = service.get_sections(owner_token).await?;
    debug!(count = sections.len(), "Library sections listed");

    let mut items = Vec::new();

    for section in &sections {
        match section.kind {
            SectionKind::Show => {
                let contents = service.get_section_items(&section.id, owner_token).await?;
                for series in &contents.directories {
                    let episodes = service
                        .get_series_leaf_items(&series.id, owner_token)
                        .await?;
                    items.extend(episodes.into_iter().map(|mut episode| {
                        episode.series_title = Some(series.title.clone());
                        episode
                    }));
                }
            }
            SectionKind::Movie => {
                let contents = service.get_section_items(&section.id, owner_token).await?;
                items.extend(contents.items.into_iter().map(|mut movie| {
                    movie.series_title = None;
                    movie
                }));
            }
            SectionKind::Other => {
                debug!(section = %section.title, kind = %section.kind, "Skipping section");
            }
        }
    }

    info!(
        sections = sections.len(),
        items = items.len(),
        "Catalog read"
    );

    Ok(Catalog { sections, items })
}

/// Every playable item in show and movie sections
pub async fn list_available_items(
    service: &dyn LibraryContentService,
    owner_token: &str,
) -> Result<Vec<CatalogItem>, ServiceError> {
    Ok(read_catalog(service, owner_token).await?.items)
}
