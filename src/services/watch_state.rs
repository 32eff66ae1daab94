//! Watch-state aggregation
//!
//! An item may only be deleted once every subscriber following it has watched
//! it. The owner's watch count comes with the catalog listing; every other
//! subscriber costs one detail request made with their own token.

use tracing::debug;

use crate::catalog::CatalogItem;
use crate::services::library_content::{LibraryContentService, ServiceError};
use crate::services::subscriptions::SubscriptionIndex;

/// Whether every effective subscriber of `item` has watched it.
///
/// An item nobody follows is eligible: "all of nobody" holds vacuously.
/// Evaluation stops at the first subscriber who hasn't watched the item.
pub async fn is_eligible_for_deletion(
    service: &dyn LibraryContentService,
    item: &CatalogItem,
    subscriptions: &SubscriptionIndex,
    owner_token: &str,
) -> Result<bool, ServiceError> {
    let key = item.subscription_key();
    let subscribers = subscriptions.effective_subscribers(key);

    if subscribers.is_empty() {
        debug!(item = %item.title, key = %key, "No subscribers, eligible");
        return Ok(true);
    }

    for token in &subscribers {
        let watch_count = if token == owner_token {
            item.watch_count()
        } else {
            service
                .get_item_detail(&item.id, token)
                .await?
                .first()
                .map(CatalogItem::watch_count)
                .unwrap_or(0)
        };

        debug!(
            item = %item.title,
            key = %key,
            subscriber = %subscriptions.display_name(token),
            watch_count,
            "Watch state"
        );

        if watch_count == 0 {
            return Ok(false);
        }
    }

    Ok(true)
}
