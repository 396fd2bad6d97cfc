//! Segment discovery, playlist synthesis and reassembly
//!
//! The content host never publishes a manifest. Segments live at a
//! predictable URL per (video, quality, sequence number) and a 403 marks the
//! first index past the end.

pub mod locator;
pub mod playlist;
pub mod reassembler;
pub mod source;

pub use locator::SegmentLocator;
pub use playlist::{PlaylistSynthesizer, PLAYLIST_CONTENT_TYPE};
pub use reassembler::{ReassemblyHandle, SegmentReassembler, SEGMENT_CONTENT_TYPE};
pub use source::{HttpSegmentSource, MockResponse, MockSegmentSource, ProbeStatus, SegmentSource};

use crate::config::ContentHostConfig;
use crate::error::{RelayError, Result};
use std::fmt;
use std::num::NonZeroU32;

/// The (video identifier, quality tier) pair a transfer works on.
///
/// Neither field is checked beyond being non-empty; both are substituted
/// verbatim into outbound URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentRequest {
    pub video_id: String,
    pub quality: String,
}

impl SegmentRequest {
    pub fn new(video_id: impl Into<String>, quality: impl Into<String>) -> Result<Self> {
        let video_id = video_id.into();
        let quality = quality.into();

        if video_id.is_empty() || quality.is_empty() {
            return Err(RelayError::MissingParameter("Missing videoId or quality".to_string()));
        }

        Ok(Self { video_id, quality })
    }

    /// Suggested file name for the reassembled download
    pub fn download_filename(&self) -> String {
        format!("{}-{}.ts", self.video_id, self.quality)
    }
}

impl fmt::Display for SegmentRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.video_id, self.quality)
    }
}

/// Number of segments discovered for a request; always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SegmentCount(NonZeroU32);

impl SegmentCount {
    /// Returns `None` for zero
    pub fn new(count: u32) -> Option<Self> {
        NonZeroU32::new(count).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// Sequence numbers in playback order, starting at 1
    pub fn indices(self) -> impl Iterator<Item = u32> {
        1..=self.get()
    }
}

impl fmt::Display for SegmentCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Builds segment URLs of the form
/// `{base}/{video}/{prefix}{quality}-{index:0width}.{ext}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentHost {
    base_url: String,
    segment_prefix: String,
    sequence_width: usize,
    segment_extension: String,
}

impl ContentHost {
    /// Host with the default file naming scheme
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::from_config(&ContentHostConfig {
            base_url: base_url.into(),
            ..ContentHostConfig::default()
        })
    }

    pub fn from_config(config: &ContentHostConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            segment_prefix: config.segment_prefix.clone(),
            sequence_width: config.sequence_width,
            segment_extension: config.segment_extension.clone(),
        }
    }

    pub fn segment_url(&self, request: &SegmentRequest, index: u32) -> String {
        format!(
            "{}/{}/{}{}-{:0width$}.{}",
            self.base_url,
            request.video_id,
            self.segment_prefix,
            request.quality,
            index,
            self.segment_extension,
            width = self.sequence_width
        )
    }
}
