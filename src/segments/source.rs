//! Segment source implementations

use crate::error::{RelayError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::sync::Mutex;

/// Outcome of an existence check against one segment URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    /// The host has this segment
    Present,
    /// 403: the index is past the last segment
    EndOfSequence,
    /// Any other status; not authoritative
    Other(u16),
}

impl ProbeStatus {
    pub fn from_status(status: StatusCode) -> Self {
        if status == StatusCode::FORBIDDEN {
            ProbeStatus::EndOfSequence
        } else if status.is_success() {
            ProbeStatus::Present
        } else {
            ProbeStatus::Other(status.as_u16())
        }
    }
}

/// Where segment bytes come from
#[async_trait]
pub trait SegmentSource: Send + Sync {
    /// Metadata-only existence check (HEAD)
    async fn probe(&self, url: &str) -> Result<ProbeStatus>;

    /// Full body of one segment (GET). Non-success statuses are errors.
    async fn fetch(&self, url: &str) -> Result<Bytes>;
}

/// Segment source backed by the real content host
#[derive(Debug, Clone)]
pub struct HttpSegmentSource {
    client: Client,
}

impl HttpSegmentSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SegmentSource for HttpSegmentSource {
    async fn probe(&self, url: &str) -> Result<ProbeStatus> {
        let response = self.client.head(url).send().await?;
        Ok(ProbeStatus::from_status(response.status()))
    }

    async fn fetch(&self, url: &str) -> Result<Bytes> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::Upstream(format!("status {} for {}", status, url)));
        }
        Ok(response.bytes().await?)
    }
}

/// Canned behaviour for one URL in [`MockSegmentSource`]
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// 200 with this body
    Segment(Bytes),
    /// 403
    Forbidden,
    /// Any other status
    Status(u16),
    /// Connection-level failure
    NetworkError(String),
}

/// In-memory segment source for testing.
///
/// URLs without a registered response answer 403, like the real host does
/// past the last segment. Every probed and fetched URL is recorded.
#[derive(Debug, Default)]
pub struct MockSegmentSource {
    responses: Mutex<HashMap<String, MockResponse>>,
    fetch_overrides: Mutex<HashMap<String, MockResponse>>,
    probed: Mutex<Vec<String>>,
    fetched: Mutex<Vec<String>>,
}

impl MockSegmentSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a response used by both probe and fetch
    pub fn respond(&self, url: impl Into<String>, response: MockResponse) {
        lock(&self.responses).insert(url.into(), response);
    }

    /// Register a response used by fetch only; probes still see the
    /// response from [`respond`](Self::respond)
    pub fn respond_to_fetch(&self, url: impl Into<String>, response: MockResponse) {
        lock(&self.fetch_overrides).insert(url.into(), response);
    }

    pub fn probed_urls(&self) -> Vec<String> {
        lock(&self.probed).clone()
    }

    pub fn fetched_urls(&self) -> Vec<String> {
        lock(&self.fetched).clone()
    }

    fn lookup(&self, url: &str) -> MockResponse {
        lock(&self.responses)
            .get(url)
            .cloned()
            .unwrap_or(MockResponse::Forbidden)
    }
}

#[async_trait]
impl SegmentSource for MockSegmentSource {
    async fn probe(&self, url: &str) -> Result<ProbeStatus> {
        lock(&self.probed).push(url.to_string());
        match self.lookup(url) {
            MockResponse::Segment(_) => Ok(ProbeStatus::Present),
            MockResponse::Forbidden => Ok(ProbeStatus::EndOfSequence),
            MockResponse::Status(code) => Ok(ProbeStatus::Other(code)),
            MockResponse::NetworkError(reason) => Err(RelayError::Upstream(reason)),
        }
    }

    async fn fetch(&self, url: &str) -> Result<Bytes> {
        lock(&self.fetched).push(url.to_string());
        let response = lock(&self.fetch_overrides)
            .get(url)
            .cloned()
            .unwrap_or_else(|| self.lookup(url));

        match response {
            MockResponse::Segment(bytes) => Ok(bytes),
            MockResponse::Forbidden => Err(RelayError::Upstream(format!("status 403 for {}", url))),
            MockResponse::Status(code) => Err(RelayError::Upstream(format!("status {} for {}", code, url))),
            MockResponse::NetworkError(reason) => Err(RelayError::Upstream(reason)),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_status_mapping() {
        assert_eq!(ProbeStatus::from_status(StatusCode::OK), ProbeStatus::Present);
        assert_eq!(ProbeStatus::from_status(StatusCode::FORBIDDEN), ProbeStatus::EndOfSequence);
        assert_eq!(ProbeStatus::from_status(StatusCode::NOT_FOUND), ProbeStatus::Other(404));
        assert_eq!(ProbeStatus::from_status(StatusCode::BAD_GATEWAY), ProbeStatus::Other(502));
    }

    #[tokio::test]
    async fn test_mock_defaults_to_forbidden() {
        let source = MockSegmentSource::new();
        assert_eq!(source.probe("https://x/unknown").await.unwrap(), ProbeStatus::EndOfSequence);
        assert!(source.fetch("https://x/unknown").await.is_err());
        assert_eq!(source.probed_urls(), vec!["https://x/unknown".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_fetch_override() {
        let source = MockSegmentSource::new();
        source.respond("u", MockResponse::Segment(Bytes::from_static(b"abc")));
        source.respond_to_fetch("u", MockResponse::Status(500));

        assert_eq!(source.probe("u").await.unwrap(), ProbeStatus::Present);
        assert!(source.fetch("u").await.is_err());
    }
}
