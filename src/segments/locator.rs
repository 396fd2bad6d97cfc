//! Segment count discovery by linear probing

use super::{ContentHost, ProbeStatus, SegmentCount, SegmentRequest, SegmentSource};
use crate::error::{RelayError, Result};
use crate::progress::ProgressGuard;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Discovers how many segments exist for a request.
///
/// Probes indices 1, 2, ... up to the ceiling and stops at the first 403.
/// Other failures are logged and skipped, so a gap in the sequence does not
/// end discovery. While probing, progress is reported as the ceiling-relative
/// estimate `min(i / ceiling * 100, 100)`. That figure says how far the probe
/// loop is from its ceiling, not how much of the video has been found.
#[derive(Clone)]
pub struct SegmentLocator {
    source: Arc<dyn SegmentSource>,
    host: ContentHost,
    ceiling: u32,
}

impl SegmentLocator {
    pub fn new(source: Arc<dyn SegmentSource>, host: ContentHost, ceiling: u32) -> Self {
        Self { source, host, ceiling }
    }

    pub async fn locate(&self, request: &SegmentRequest, progress: &ProgressGuard) -> Result<SegmentCount> {
        info!("🔍 Probing segments for {} (ceiling {})", request, self.ceiling);
        let mut last_found = 0u32;

        for index in 1..=self.ceiling {
            progress.set(probe_progress(index, self.ceiling));

            let url = self.host.segment_url(request, index);
            match self.source.probe(&url).await {
                Ok(ProbeStatus::EndOfSequence) => {
                    debug!("Segment {} answered 403, end of sequence", index);
                    break;
                }
                Ok(ProbeStatus::Present) => last_found = index,
                Ok(ProbeStatus::Other(status)) => {
                    let error = RelayError::TransientProbe { index, reason: format!("status {}", status) };
                    warn!("⚠️ {}", error);
                }
                Err(e) => {
                    let error = RelayError::TransientProbe { index, reason: e.to_string() };
                    warn!("⚠️ {}", error);
                }
            }
        }

        match SegmentCount::new(last_found) {
            Some(count) => {
                info!("✅ Found {} segments for {}", count, request);
                Ok(count)
            }
            None => Err(RelayError::NoSegmentsFound {
                video_id: request.video_id.clone(),
                quality: request.quality.clone(),
            }),
        }
    }
}

fn probe_progress(index: u32, ceiling: u32) -> f64 {
    (index as f64 / ceiling as f64 * 100.0).min(100.0)
}
