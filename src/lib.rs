//! plexsweep - watched-media retention for a Plex server
//!
//! Periodically reads the Plex catalog, deletes the files of items every
//! subscribed user has watched, then sweeps junk files and empty folders out
//! of the library's storage locations.

pub mod catalog;
pub mod config;
pub mod jobs;
pub mod services;
