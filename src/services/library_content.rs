//! Library content service interface
//!
//! The retention engine only talks to the media server through this trait.
//! [PlexClient](crate::services::plex::PlexClient) is the production
//! implementation; tests substitute an in-memory catalog.

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::catalog::{CatalogItem, LibrarySection, SectionContents};
use crate::services::plex::ResponseError;

/// Any failure talking to the library service.
///
/// The engine never inspects the variant: every one of them aborts the cycle.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request to {path} failed")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {path} returned status {status}")]
    Status { path: String, status: StatusCode },

    #[error("malformed response from {path}")]
    Malformed {
        path: String,
        #[source]
        source: ResponseError,
    },
}

/// Read-only access to the remote catalog.
///
/// Every call is authenticated with the token passed in; the token decides
/// whose watch counts come back.
#[async_trait]
pub trait LibraryContentService: Send + Sync {
    /// List every library section.
    async fn get_sections(&self, token: &str) -> Result<Vec<LibrarySection>, ServiceError>;

    /// List a section: series directories for show sections, items for movie sections.
    async fn get_section_items(
        &self,
        section_id: &str,
        token: &str,
    ) -> Result<SectionContents, ServiceError>;

    /// List every episode of a series.
    async fn get_series_leaf_items(
        &self,
        series_id: &str,
        token: &str,
    ) -> Result<Vec<CatalogItem>, ServiceError>;

    /// Full detail of an item, including streams and the caller's watch count.
    async fn get_item_detail(
        &self,
        item_id: &str,
        token: &str,
    ) -> Result<Vec<CatalogItem>, ServiceError>;
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory library used by unit tests

    use std::collections::HashMap;

    use parking_lot::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct FakeLibrary {
        pub sections: Vec<LibrarySection>,
        pub section_items: HashMap<String, SectionContents>,
        pub series_leaves: HashMap<String, Vec<CatalogItem>>,
        /// Detail responses keyed by (item id, token)
        pub details: HashMap<(String, String), Vec<CatalogItem>>,
        /// Section ids whose listing fails
        pub failing_sections: Vec<String>,
        pub fail_section_list: bool,
        /// Item ids whose detail request fails, whatever the token
        pub failing_details: Vec<String>,
        /// Number of section listings that succeed before every further one fails
        pub section_list_budget: Option<usize>,
        pub calls: Mutex<Vec<String>>,
    }

    impl FakeLibrary {
        pub fn with_detail(mut self, item_id: &str, token: &str, detail: Vec<CatalogItem>) -> Self {
            self.details
                .insert((item_id.to_string(), token.to_string()), detail);
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }

        pub fn detail_calls(&self) -> usize {
            self.calls()
                .iter()
                .filter(|call| call.starts_with("detail "))
                .count()
        }

        fn unavailable(path: &str) -> ServiceError {
            ServiceError::Status {
                path: path.to_string(),
                status: StatusCode::SERVICE_UNAVAILABLE,
            }
        }
    }

    #[async_trait]
    impl LibraryContentService for FakeLibrary {
        async fn get_sections(&self, _token: &str) -> Result<Vec<LibrarySection>, ServiceError> {
            let listed = {
                let mut calls = self.calls.lock();
                calls.push("sections".to_string());
                calls.iter().filter(|call| *call == "sections").count()
            };
            let over_budget = self.section_list_budget.is_some_and(|budget| listed > budget);
            if self.fail_section_list || over_budget {
                return Err(Self::unavailable("/library/sections"));
            }
            Ok(self.sections.clone())
        }

        async fn get_section_items(
            &self,
            section_id: &str,
            _token: &str,
        ) -> Result<SectionContents, ServiceError> {
            self.calls.lock().push(format!("section {section_id}"));
            if self.failing_sections.iter().any(|id| id == section_id) {
                return Err(Self::unavailable(section_id));
            }
            Ok(self
                .section_items
                .get(section_id)
                .cloned()
                .unwrap_or_default())
        }

        async fn get_series_leaf_items(
            &self,
            series_id: &str,
            _token: &str,
        ) -> Result<Vec<CatalogItem>, ServiceError> {
            self.calls.lock().push(format!("leaves {series_id}"));
            Ok(self
                .series_leaves
                .get(series_id)
                .cloned()
                .unwrap_or_default())
        }

        async fn get_item_detail(
            &self,
            item_id: &str,
            token: &str,
        ) -> Result<Vec<CatalogItem>, ServiceError> {
            self.calls.lock().push(format!("detail {item_id} {token}"));
            if self.failing_details.iter().any(|id| id == item_id) {
                return Err(Self::unavailable(item_id));
            }
            Ok(self
                .details
                .get(&(item_id.to_string(), token.to_string()))
                .cloned()
                .unwrap_or_default())
        }
    }
}
