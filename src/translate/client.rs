//! HTTP client for the translate service.
//!
//! # Wire Format
//!
//! ```text
//! POST {endpoint}
//! Authorization: Bearer {api_key}        (optional)
//! Content-Type: application/json
//!
//! {"image": "<base64 PNG>", "image_size": "2K", "aspect_ratio": "1:1"}
//!
//! 200 OK
//! {"image": "<base64 PNG>"}
//! ```
//!
//! The response image may also be a `data:image/png;base64,...` URL.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use bytes::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ServiceError;

use super::{AspectRatio, ImageSize, Translator};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Longest error body carried into a [`ServiceError::Status`].
const MAX_ERROR_MESSAGE: usize = 512;

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    image: String,
    image_size: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    aspect_ratio: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(default)]
    image: Option<String>,
}

/// Translator talking JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTranslator {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpTranslator {
    /// Create a client for `endpoint` with the given request timeout.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Request(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(
        &self,
        image: Bytes,
        size: ImageSize,
        aspect_ratio: Option<AspectRatio>,
    ) -> Result<Bytes, ServiceError> {
        let body = TranslateRequest {
            image: BASE64_STANDARD.encode(&image),
            image_size: size.as_str(),
            aspect_ratio: aspect_ratio.map(|r| r.to_string()),
        };

        debug!(
            endpoint = %self.endpoint,
            bytes = image.len(),
            size = %size,
            "Sending translate request"
        );

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ServiceError::Request(format!("request timed out: {e}"))
            } else {
                ServiceError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        let payload = response
            .bytes()
            .await
            .map_err(|e| ServiceError::Request(e.to_string()))?;

        if !status.is_success() {
            let message = truncate(String::from_utf8_lossy(&payload).trim());
            warn!(status = status.as_u16(), %message, "Translate service rejected request");
            return Err(ServiceError::Status {
                status: status.as_u16(),
                message,
            });
        }

        decode_response(&payload)
    }
}

/// Extract the PNG bytes from a successful response body.
///
/// # Errors
///
/// - [`ServiceError::InvalidResponse`] if the body is not JSON or the image
///   is not valid base64
/// - [`ServiceError::MissingImage`] if there is no non-empty `image` field
pub fn decode_response(body: &[u8]) -> Result<Bytes, ServiceError> {
    let parsed: TranslateResponse = serde_json::from_slice(body)
        .map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;

    let encoded = parsed
        .image
        .filter(|image| !image.trim().is_empty())
        .ok_or(ServiceError::MissingImage)?;

    // Accept data URLs as well as bare base64
    let encoded = match encoded.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => encoded.as_str(),
    };

    let decoded = BASE64_STANDARD
        .decode(encoded.trim())
        .map_err(|e| ServiceError::InvalidResponse(format!("image is not base64: {e}")))?;

    if decoded.is_empty() {
        return Err(ServiceError::MissingImage);
    }

    Ok(Bytes::from(decoded))
}

fn truncate(message: &str) -> String {
    if message.len() <= MAX_ERROR_MESSAGE {
        return message.to_string();
    }
    let mut end = MAX_ERROR_MESSAGE;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &message[..end])
}
