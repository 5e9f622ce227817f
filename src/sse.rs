//! Server-Sent Events (SSE) processing for streaming responses.
//!
//! `streamGenerateContent?alt=sse` delivers the reply as a sequence of SSE
//! events, each carrying one [`GenerateContentResponse`] chunk on a `data:`
//! line. This module converts the raw byte stream into a stream of parsed
//! chunks.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};

use crate::error::{Error, Result};
use crate::types::GenerateContentResponse;

/// Process a stream of bytes into a stream of response chunks.
///
/// This function takes a byte stream from an HTTP response and converts it
/// into a stream of parsed [`GenerateContentResponse`] chunks, handling SSE
/// framing, buffering across reads, and error conditions.
pub fn process_sse<S>(byte_stream: S) -> impl Stream<Item = Result<GenerateContentResponse>>
where
    S: Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Unpin + 'static,
{
    // Convert reqwest errors to our error type
    let stream = byte_stream.map(|result| {
        result
            .map_err(|e| Error::streaming(format!("Error in HTTP stream: {e}"), Some(Box::new(e))))
    });

    // Use a state machine to process the SSE stream
    let buffer = String::new();

    stream::unfold(
        (stream, buffer),
        move |(mut stream, mut buffer)| async move {
            loop {
                // First check if we have a complete event in the buffer
                if let Some((event, remaining)) = extract_event(&buffer) {
                    buffer = remaining;
                    match event {
                        Some(event) => return Some((event, (stream, buffer))),
                        // Keep-alive or comment-only event; skip it.
                        None => continue,
                    }
                }

                // Read more data
                match stream.next().await {
                    Some(Ok(bytes)) => match String::from_utf8(bytes.to_vec()) {
                        Ok(text) => buffer.push_str(&text),
                        Err(e) => {
                            return Some((
                                Err(Error::encoding(
                                    format!("Invalid UTF-8 in stream: {e}"),
                                    Some(Box::new(e)),
                                )),
                                (stream, buffer),
                            ));
                        }
                    },
                    Some(Err(e)) => {
                        return Some((Err(e), (stream, buffer)));
                    }
                    None => {
                        // End of stream; the buffer may still hold a final
                        // event without a trailing blank line.
                        if !buffer.trim().is_empty() {
                            if let Some(event) = parse_event(&buffer) {
                                buffer.clear();
                                return Some((event, (stream, buffer)));
                            }
                        }
                        return None;
                    }
                }
            }
        },
    )
}

/// Extract a complete SSE event from a buffer string.
///
/// Events are delimited by a blank line. Returns the parsed chunk (or `None`
/// for events with no `data:` field) together with the unconsumed remainder.
fn extract_event(buffer: &str) -> Option<(Option<Result<GenerateContentResponse>>, String)> {
    let (event_text, rest) = split_on_blank_line(buffer)?;
    Some((parse_event(&event_text), rest))
}

/// Split the buffer at the first blank line, tolerating CRLF framing.
fn split_on_blank_line(buffer: &str) -> Option<(String, String)> {
    let lf = buffer.find("\n\n");
    let crlf = buffer.find("\r\n\r\n");
    match (lf, crlf) {
        (Some(lf), Some(crlf)) if crlf < lf => {
            Some((buffer[..crlf].to_string(), buffer[crlf + 4..].to_string()))
        }
        (Some(lf), _) => Some((buffer[..lf].to_string(), buffer[lf + 2..].to_string())),
        (None, Some(crlf)) => Some((buffer[..crlf].to_string(), buffer[crlf + 4..].to_string())),
        (None, None) => None,
    }
}

/// Parse one SSE event's text into a response chunk.
///
/// The Gemini stream only uses `data:` lines; comments and other fields are
/// ignored. Returns `None` when the event carries no data at all.
fn parse_event(event_text: &str) -> Option<Result<GenerateContentResponse>> {
    let mut data = String::new();
    for line in event_text.lines() {
        let line = line.trim_end_matches('\r');
        if let Some(payload) = line.strip_prefix("data:") {
            if !data.is_empty() {
                data.push('\n');
            }
            data.push_str(payload.trim_start());
        }
    }

    if data.is_empty() {
        return None;
    }

    match serde_json::from_str::<GenerateContentResponse>(&data) {
        Ok(chunk) => Some(Ok(chunk)),
        Err(e) => Some(Err(Error::serialization(
            format!("Failed to parse stream chunk: {e}"),
            Some(Box::new(e)),
        ))),
    }
}
