//! Sequential segment fetch and concatenation

use super::{ContentHost, SegmentCount, SegmentRequest, SegmentSource};
use crate::error::{RelayError, Result};
use crate::progress::ProgressGuard;
use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, info, warn};

/// Content type of a reassembled transport stream
pub const SEGMENT_CONTENT_TYPE: &str = "video/MP2T";

/// Segments buffered between the fetch loop and the consumer
const CHANNEL_CAPACITY: usize = 4;

/// Fetches segments 1..=N in order and delivers each one as soon as it
/// arrives. There is no retry: the first failed fetch ends the transfer.
#[derive(Clone)]
pub struct SegmentReassembler {
    source: Arc<dyn SegmentSource>,
    host: ContentHost,
}

/// A reassembly running in the background
pub struct ReassemblyHandle {
    /// Segment bytes in order. A fetch failure shows up as a final `Err` item.
    pub stream: ReceiverStream<Result<Bytes>>,
    /// Resolves to the number of bytes delivered
    pub task: JoinHandle<Result<u64>>,
}

impl SegmentReassembler {
    pub fn new(source: Arc<dyn SegmentSource>, host: ContentHost) -> Self {
        Self { source, host }
    }

    /// Start reassembly on its own task. The guard moves into the task so the
    /// progress entry lives exactly as long as the transfer.
    pub fn spawn(&self, request: SegmentRequest, count: SegmentCount, progress: ProgressGuard) -> ReassemblyHandle {
        let (tx, rx) = mpsc::channel::<Result<Bytes>>(CHANNEL_CAPACITY);
        let reassembler = self.clone();

        let task = tokio::spawn(async move {
            let result = reassembler.run(&request, count, &progress, tx).await;
            match &result {
                Ok(bytes) => info!("✅ Reassembled {} ({} segments, {} bytes)", request, count, bytes),
                Err(RelayError::Cancelled { .. }) => warn!("🔌 Consumer went away, stopped reassembling {}", request),
                Err(e) => error!("❌ Download error for {}: {}", request, e),
            }
            result
        });

        ReassemblyHandle {
            stream: ReceiverStream::new(rx),
            task,
        }
    }

    /// Fetch everything into memory
    pub async fn collect(&self, request: &SegmentRequest, count: SegmentCount, progress: &ProgressGuard) -> Result<Vec<u8>> {
        let (tx, mut rx) = mpsc::channel::<Result<Bytes>>(CHANNEL_CAPACITY);
        let mut buffer = Vec::new();

        let drain = async {
            while let Some(item) = rx.recv().await {
                if let Ok(chunk) = item {
                    buffer.extend_from_slice(&chunk);
                }
            }
        };

        let (result, ()) = tokio::join!(self.run(request, count, progress, tx), drain);
        result?;
        Ok(buffer)
    }

    /// Fetch loop. Returns the number of bytes handed to `tx`.
    pub async fn run(
        &self,
        request: &SegmentRequest,
        count: SegmentCount,
        progress: &ProgressGuard,
        tx: mpsc::Sender<Result<Bytes>>,
    ) -> Result<u64> {
        let total = count.get();
        let mut delivered = 0u64;

        for index in count.indices() {
            let url = self.host.segment_url(request, index);

            let fetched = tokio::select! {
                _ = tx.closed() => return Err(self.cancelled(request)),
                fetched = self.source.fetch(&url) => fetched,
            };

            let chunk = match fetched {
                Ok(chunk) => chunk,
                Err(e) => {
                    let reason = e.to_string();
                    // Best effort: the consumer may already be gone
                    let _ = tx
                        .send(Err(RelayError::SegmentFetchFailed { index, reason: reason.clone() }))
                        .await;
                    return Err(RelayError::SegmentFetchFailed { index, reason });
                }
            };

            let len = chunk.len() as u64;
            if tx.send(Ok(chunk)).await.is_err() {
                return Err(self.cancelled(request));
            }
            delivered += len;

            progress.set(fetch_progress(index, total));
            debug!("Segment {}/{} of {} delivered ({} bytes)", index, total, request, len);
        }

        Ok(delivered)
    }

    fn cancelled(&self, request: &SegmentRequest) -> RelayError {
        RelayError::Cancelled {
            video_id: request.video_id.clone(),
        }
    }
}

fn fetch_progress(index: u32, total: u32) -> f64 {
    (index as f64 / total as f64 * 100.0).round()
}
