//! Plex Media Server client
//!
//! Implements [LibraryContentService](crate::services::LibraryContentService)
//! over the Plex HTTP API.
//!
//! # Endpoints
//!
//! - `GET /library/sections` - List library sections
//! - `GET /library/sections/{id}/all` - List a section
//! - `GET /library/metadata/{id}/allLeaves` - List every episode of a series
//! - `GET /library/metadata/{id}` - Item detail
//!
//! All requests carry the `X-Plex-Token` query parameter. Responses are XML
//! `MediaContainer` documents.

pub mod client;
pub mod response;

pub use client::PlexClient;
pub use response::{ResponseError, parse_media_container};
