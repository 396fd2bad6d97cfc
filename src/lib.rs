//! VOD Relay
//!
//! Browse a third-party course video catalog and stream or download its
//! videos. Segment counts are discovered by probing the content host, then
//! either described in a generated HLS playlist or concatenated into one file.

pub mod api;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod progress;
pub mod segments;

// Re-export main types for easy access
pub use crate::api::{ApiServer, AppState};
pub use crate::catalog::{CatalogClient, Game};
pub use crate::config::{Config, ConfigBuilder};
pub use crate::error::{RelayError, Result};
pub use crate::progress::{ProgressGuard, ProgressStore};
pub use crate::segments::{
    ContentHost, PlaylistSynthesizer, SegmentCount, SegmentLocator, SegmentReassembler, SegmentRequest,
};
