//! HTTP transport for the Plex library API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use tracing::debug;

use super::response::parse_media_container;
use crate::catalog::{CatalogItem, LibrarySection, SectionContents};
use crate::services::library_content::{LibraryContentService, ServiceError};

/// Plex Media Server client
#[derive(Debug, Clone)]
pub struct PlexClient {
    client: Client,
    base_url: String,
}

impl PlexClient {
    /// Create a client for the server at `base_url` (e.g. `http://127.0.0.1:32400`)
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("plexsweep/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch and parse one MediaContainer document
    async fn fetch(&self, path: &str, token: &str) -> Result<SectionContents, ServiceError> {
        debug!(path = %path, "Fetching from Plex");

        // Strip the URL from transport errors, it carries the token
        let transport = |source: reqwest::Error| ServiceError::Transport {
            path: path.to_string(),
            source: source.without_url(),
        };

        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .header(ACCEPT, "application/xml")
            .query(&[("X-Plex-Token", token)])
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(ServiceError::Status {
                path: path.to_string(),
                status: response.status(),
            });
        }

        let body = response.text().await.map_err(transport)?;

        let contents = parse_media_container(&body).map_err(|source| ServiceError::Malformed {
            path: path.to_string(),
            source,
        })?;

        debug!(
            path = %path,
            directories = contents.directories.len(),
            items = contents.items.len(),
            "Plex response parsed"
        );
        Ok(contents)
    }
}

/// Path listing every episode of a series, given the series' `children` key
fn leaves_path(series_key: &str) -> String {
    match series_key.strip_suffix("/children") {
        Some(base) => format!("{base}/allLeaves"),
        None => format!("{}/allLeaves", series_key.trim_end_matches('/')),
    }
}

#[async_trait]
impl LibraryContentService for PlexClient {
    async fn get_sections(&self, token: &str) -> Result<Vec<LibrarySection>, ServiceError> {
        Ok(self.fetch("/library/sections", token).await?.directories)
    }

    async fn get_section_items(
        &self,
        section_id: &str,
        token: &str,
    ) -> Result<SectionContents, ServiceError> {
        self.fetch(&format!("/library/sections/{section_id}/all"), token)
            .await
    }

    async fn get_series_leaf_items(
        &self,
        series_id: &str,
        token: &str,
    ) -> Result<Vec<CatalogItem>, ServiceError> {
        Ok(self.fetch(&leaves_path(series_id), token).await?.items)
    }

    async fn get_item_detail(
        &self,
        item_id: &str,
        token: &str,
    ) -> Result<Vec<CatalogItem>, ServiceError> {
        Ok(self.fetch(item_id, token).await?.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaves_path() {
        assert_eq!(
            leaves_path("/library/metadata/10/children"),
            "/library/metadata/10/allLeaves"
        );
        assert_eq!(leaves_path("/library/metadata/10/"), "/library/metadata/10/allLeaves");
    }

    #[test]
    fn test_base_url_trailing_slash_is_dropped() {
        let client = PlexClient::new("http://127.0.0.1:32400/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url, "http://127.0.0.1:32400");
    }
}
