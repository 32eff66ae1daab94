//! Catalog model
//!
//! Cycle-scoped views of the remote library: sections, playable items and the
//! files behind them. Everything here is rebuilt from the service on every
//! retention cycle and dropped once its deletions have been issued.

pub mod types;

pub use types::*;
