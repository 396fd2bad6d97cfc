//! API data models

use crate::error::{RelayError, Result};
use crate::segments::SegmentRequest;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error payload returned by every endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// `GET /progress` response
#[derive(Debug, Serialize, Deserialize)]
pub struct ProgressResponse {
    pub progress: f64,
}

#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CoursesQuery {
    pub game: Option<String>,
}

/// Body of `POST /stream` and `POST /download`.
///
/// Fields are read loosely: a numeric quality such as `1500` is accepted
/// alongside `"1500"`, and empty strings count as missing.
#[derive(Debug, Default, Deserialize)]
pub struct TransferRequest {
    #[serde(rename = "videoId", default)]
    pub video_id: Option<Value>,
    #[serde(default)]
    pub quality: Option<Value>,
}

impl TransferRequest {
    /// Parse a raw request body into a segment request
    pub fn parse(body: &[u8]) -> Result<SegmentRequest> {
        let request: TransferRequest = serde_json::from_slice(body)
            .map_err(|_| RelayError::MissingParameter("Missing videoId or quality".to_string()))?;

        match (
            request.video_id.as_ref().and_then(param_text),
            request.quality.as_ref().and_then(param_text),
        ) {
            (Some(video_id), Some(quality)) => SegmentRequest::new(video_id, quality),
            _ => Err(RelayError::MissingParameter("Missing videoId or quality".to_string())),
        }
    }
}

fn param_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_string_fields() {
        let request = TransferRequest::parse(br#"{"videoId":"abc","quality":"1500"}"#).unwrap();
        assert_eq!(request.video_id, "abc");
        assert_eq!(request.quality, "1500");
    }

    #[test]
    fn test_parse_numeric_quality() {
        let request = TransferRequest::parse(br#"{"videoId":"abc","quality":4500}"#).unwrap();
        assert_eq!(request.quality, "4500");
    }

    #[test]
    fn test_missing_or_empty_fields() {
        let bodies: [&[u8]; 7] = [
            br#"{"videoId":"abc"}"#,
            br#"{"quality":"1500"}"#,
            br#"{"videoId":"","quality":"1500"}"#,
            br#"{"videoId":null,"quality":"1500"}"#,
            br#"{}"#,
            b"not json",
            b"",
        ];
        for body in bodies {
            assert!(matches!(TransferRequest::parse(body), Err(RelayError::MissingParameter(_))));
        }
    }

    #[test]
    fn test_error_body_omits_empty_details() {
        let value = serde_json::to_value(ErrorBody::new("Missing id")).unwrap();
        assert_eq!(value, serde_json::json!({ "error": "Missing id" }));
    }
}
