//! Logging trait for Gemini client operations.
//!
//! This module provides the [`ClientLogger`] trait that allows users to
//! capture and log all API interactions passing through the
//! [`Gemini`](crate::Gemini) client. There is no global logger: a logger is
//! attached per client via `Gemini::with_logger`.

use crate::types::{GenerateContentRequest, GenerateContentResponse};

/// A trait for logging Gemini client operations.
///
/// Implement this trait to capture and record all API interactions,
/// including both non-streaming responses and individual streaming chunks.
///
/// # Example
///
/// ```rust,ignore
/// use std::io::Write;
/// use std::sync::Mutex;
///
/// use castor::{ClientLogger, GenerateContentRequest, GenerateContentResponse};
///
/// struct FileLogger {
///     file: Mutex<std::fs::File>,
/// }
///
/// impl ClientLogger for FileLogger {
///     fn log_request(&self, request: &GenerateContentRequest) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Request: {}", serde_json::to_string(request).unwrap()).unwrap();
///     }
///
///     fn log_response(&self, response: &GenerateContentResponse) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Response: {}", serde_json::to_string(response).unwrap()).unwrap();
///     }
///
///     fn log_stream_chunk(&self, chunk: &GenerateContentResponse) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Chunk: {}", serde_json::to_string(chunk).unwrap()).unwrap();
///     }
/// }
/// ```
pub trait ClientLogger: Send + Sync {
    /// Log a request about to be sent, streaming or not.
    fn log_request(&self, request: &GenerateContentRequest);

    /// Log a complete response from a non-streaming `generate` call.
    fn log_response(&self, response: &GenerateContentResponse);

    /// Log an individual streaming chunk.
    ///
    /// This method is called for each chunk received during a streaming
    /// request, including chunks that carry no text.
    fn log_stream_chunk(&self, chunk: &GenerateContentResponse);
}
