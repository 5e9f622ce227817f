use serde::{Deserialize, Serialize};

use crate::types::Content;

/// One generated reply candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// The generated content, absent when the candidate was filtered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,

    /// Why generation stopped (e.g. "STOP", "MAX_TOKENS", "SAFETY").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Token accounting reported by the endpoint.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Tokens consumed by the prompt (transcript + system instruction).
    #[serde(default)]
    pub prompt_token_count: u64,

    /// Tokens in the generated candidates.
    #[serde(default)]
    pub candidates_token_count: u64,

    /// Total tokens for the request.
    #[serde(default)]
    pub total_token_count: u64,
}

/// Feedback about the prompt itself, present when the prompt was blocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// The block reason, when the prompt was rejected outright.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
}

/// A response from `generateContent`, or one chunk of a streamed response.
///
/// Streaming returns a sequence of these; the concatenation of their text is
/// the complete reply. Non-streaming returns exactly one carrying the whole
/// reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// The reply candidates; this front-end only ever reads the first.
    #[serde(default)]
    pub candidates: Vec<Candidate>,

    /// Token accounting, typically present on the final streamed chunk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<UsageMetadata>,

    /// Present when the prompt itself was blocked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// The text of the first candidate, empty when there is none.
    ///
    /// Empty text is normal for chunks that only carry metadata; callers
    /// skip such fragments rather than treating them as errors.
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(Content::joined_text)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> GenerateContentResponse {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn parses_typical_response() {
        let response = parse(
            r#"{
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "Hello!"}]},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {
                    "promptTokenCount": 4,
                    "candidatesTokenCount": 2,
                    "totalTokenCount": 6
                }
            }"#,
        );
        assert_eq!(response.text(), "Hello!");
        assert_eq!(
            response.candidates[0].finish_reason.as_deref(),
            Some("STOP")
        );
        assert_eq!(response.usage_metadata.unwrap().total_token_count, 6);
    }

    #[test]
    fn text_of_empty_response_is_empty() {
        let response = parse(r#"{"candidates": []}"#);
        assert_eq!(response.text(), "");

        let response = parse("{}");
        assert_eq!(response.text(), "");
    }

    #[test]
    fn parses_blocked_prompt_feedback() {
        let response = parse(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#);
        assert_eq!(
            response.prompt_feedback.unwrap().block_reason.as_deref(),
            Some("SAFETY")
        );
    }

    #[test]
    fn multiple_parts_join() {
        let response = parse(
            r#"{
                "candidates": [{
                    "content": {"parts": [{"text": "Hel"}, {"text": "lo!"}]}
                }]
            }"#,
        );
        assert_eq!(response.text(), "Hello!");
    }
}
