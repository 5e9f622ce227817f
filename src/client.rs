//! HTTP client for the Gemini generative-language API.
//!
//! [`Gemini`] owns the credential and the `reqwest` client and knows how to
//! issue `generateContent` (non-streaming) and `streamGenerateContent`
//! (SSE streaming) requests. Everything above it depends only on the
//! [`GenerationClient`] trait, so sessions and tests never touch the network.

use std::env;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures::Stream;
use futures::stream::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::Deserialize;

use crate::client_logger::ClientLogger;
use crate::error::{Error, Result};
use crate::sse::process_sse;
use crate::types::{GenerateContentRequest, GenerateContentResponse};

const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";
const API_KEY_ENV: &str = "GEMINI_API_KEY";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// A lazy, finite, non-restartable sequence of response chunks.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<GenerateContentResponse>> + Send>>;

/// The capability every conversation front-end needs from a model provider:
/// send the conversation-so-far and get back either a complete response or a
/// stream of chunks.
#[async_trait::async_trait]
pub trait GenerationClient: Send + Sync {
    /// Issue a non-streaming request and return the complete response.
    async fn generate(&self, request: GenerateContentRequest) -> Result<GenerateContentResponse>;

    /// Issue a streaming request and return the chunk stream.
    ///
    /// The caller must fully consume the stream; the concatenation of the
    /// chunk texts is the model's complete reply.
    async fn stream_generate(&self, request: GenerateContentRequest) -> Result<ChunkStream>;
}

/// Client for the Gemini API.
#[derive(Clone)]
pub struct Gemini {
    api_key: String,
    client: ReqwestClient,
    base_url: String,
    timeout: Duration,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl Gemini {
    /// Create a new Gemini client.
    ///
    /// The API key can be provided directly or read from the GEMINI_API_KEY
    /// environment variable. A missing key is an authentication error here,
    /// before any request is made.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_options(api_key, None, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(
        api_key: Option<String>,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = match api_key {
            Some(key) => key,
            None => env::var(API_KEY_ENV).map_err(|_| {
                Error::authentication(
                    "API key not provided and GEMINI_API_KEY environment variable not set",
                )
            })?,
        };

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            api_key,
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            timeout,
            logger: None,
        })
    }

    /// Attach a logger that observes every API interaction.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Compose the request URL for a model and method.
    fn request_url(&self, request: &GenerateContentRequest, stream: bool) -> String {
        let method = if stream {
            "streamGenerateContent?alt=sse"
        } else {
            "generateContent"
        };
        format!("{}models/{}:{}", self.base_url, request.model, method)
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(&self.api_key).expect("API key should be valid"),
        );
        headers
    }

    /// Map a reqwest transport error to our error type.
    fn transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {}", e),
                Some(self.timeout.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
        }
    }

    /// Process API response errors and convert to our Error type.
    async fn process_error_response(response: Response, model: &str) -> Error {
        let status = response.status();
        let status_code = status.as_u16();

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<u64>().ok());

        // Error bodies look like {"error": {"code": 400, "message": "...",
        // "status": "INVALID_ARGUMENT"}}.
        #[derive(Deserialize)]
        struct ErrorResponse {
            error: Option<ErrorDetail>,
        }

        #[derive(Deserialize)]
        struct ErrorDetail {
            message: Option<String>,
            status: Option<String>,
        }

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {}", e),
                    Some(Box::new(e)),
                );
            }
        };

        let parsed_error = serde_json::from_str::<ErrorResponse>(&error_body).ok();
        let error_status = parsed_error
            .as_ref()
            .and_then(|e| e.error.as_ref())
            .and_then(|e| e.status.clone());
        let error_message = parsed_error
            .as_ref()
            .and_then(|e| e.error.as_ref())
            .and_then(|e| e.message.clone())
            .unwrap_or_else(|| error_body.clone());

        // An invalid key comes back as 400 INVALID_ARGUMENT rather than 401.
        let invalid_key = error_message.contains("API key");

        match status_code {
            400 if invalid_key => Error::authentication(error_message),
            400 => Error::bad_request(error_message, None),
            401 => Error::authentication(error_message),
            403 => Error::permission(error_message),
            404 => Error::not_found(error_message, Some(model.to_string())),
            408 => Error::timeout(error_message, None),
            429 => Error::rate_limit(error_message, retry_after),
            500 => Error::internal_server(error_message),
            502..=504 => Error::service_unavailable(error_message, retry_after),
            _ => Error::api(status_code, error_status, error_message),
        }
    }
}

#[async_trait::async_trait]
impl GenerationClient for Gemini {
    /// Send a request to the API and get a complete, non-streaming response.
    async fn generate(&self, request: GenerateContentRequest) -> Result<GenerateContentResponse> {
        let url = self.request_url(&request, false);
        let model = request.model.to_string();

        if let Some(logger) = &self.logger {
            logger.log_request(&request);
        }

        let response = self
            .client
            .post(&url)
            .headers(self.default_headers())
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response, &model).await);
        }

        let response = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| {
                Error::serialization(
                    format!("Failed to parse response: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        if let Some(logger) = &self.logger {
            logger.log_response(&response);
        }

        Ok(response)
    }

    /// Send a request to the API and get a streaming response.
    ///
    /// Returns a stream of response chunks that can be processed
    /// incrementally.
    async fn stream_generate(&self, request: GenerateContentRequest) -> Result<ChunkStream> {
        let url = self.request_url(&request, true);
        let model = request.model.to_string();

        if let Some(logger) = &self.logger {
            logger.log_request(&request);
        }

        let mut headers = self.default_headers();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/event-stream"),
        );

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response, &model).await);
        }

        let chunk_stream = process_sse(response.bytes_stream());

        let logger = self.logger.clone();
        let chunk_stream = chunk_stream.map(move |chunk| {
            if let (Some(logger), Ok(chunk)) = (&logger, &chunk) {
                logger.log_stream_chunk(chunk);
            }
            chunk
        });

        Ok(Box::pin(chunk_stream))
    }
}

impl fmt::Debug for Gemini {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gemini")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Content, KnownModel, Model, Role};

    #[test]
    fn client_creation() {
        // Test with explicit API key
        let client = Gemini::new(Some("test-key".to_string())).unwrap();
        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.base_url, DEFAULT_API_URL);
        assert_eq!(client.timeout, DEFAULT_TIMEOUT);

        // Test with custom options
        let client = Gemini::with_options(
            Some("test-key".to_string()),
            Some("https://custom-api.example.com/".to_string()),
            Some(Duration::from_secs(30)),
        )
        .unwrap();
        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.base_url, "https://custom-api.example.com/");
        assert_eq!(client.timeout, Duration::from_secs(30));
    }

    #[test]
    fn request_urls() {
        let client = Gemini::new(Some("test-key".to_string())).unwrap();
        let request = GenerateContentRequest::new(
            vec![Content::with_role(Role::User, "ping")],
            Model::Known(KnownModel::Gemini25Flash),
        );
        assert_eq!(
            client.request_url(&request, false),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(
            client.request_url(&request, true),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:streamGenerateContent?alt=sse"
        );
    }

    #[test]
    fn debug_does_not_leak_key() {
        let client = Gemini::new(Some("secret".to_string())).unwrap();
        let rendered = format!("{:?}", client);
        assert!(!rendered.contains("secret"));
    }
}
