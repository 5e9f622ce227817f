//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns the conversation
//! transcript and drives one request/response cycle per user input. The
//! session is an explicit, caller-owned object; there is no process-wide
//! session store.

use std::path::Path;

use futures::StreamExt;

use crate::accumulating::AccumulatingStream;
use crate::chat::config::ChatConfig;
use crate::chat::render::Renderer;
use crate::client::GenerationClient;
use crate::error::{Error, Result};
use crate::types::{GenerateContentRequest, Model, Transcript, Turn, UsageMetadata};

/// A chat session that manages conversation state and API interactions.
///
/// The session maintains the transcript and handles streaming responses from
/// the generation client. Exactly one request is in flight at a time: the
/// caller awaits `send_streaming` to completion before issuing another, and
/// there is no mechanism to abort a request once issued.
pub struct ChatSession<C: GenerationClient> {
    client: C,
    config: ChatConfig,
    transcript: Transcript,
    total_prompt_tokens: u64,
    total_candidates_tokens: u64,
    last_turn_usage: Option<UsageMetadata>,
    request_count: u64,
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// The model used for the session.
    pub model: Model,
    /// The number of turns in the transcript.
    pub turn_count: usize,
    /// The system prompt, if any.
    pub system_prompt: Option<String>,
    /// The sampling temperature.
    pub temperature: f32,
    /// The maximum output tokens per response.
    pub max_output_tokens: u32,
    /// Total prompt tokens across all requests.
    pub total_prompt_tokens: u64,
    /// Total generated tokens across all requests.
    pub total_candidates_tokens: u64,
    /// Total number of API requests made.
    pub total_requests: u64,
    /// Token usage for the last turn, if reported.
    pub last_turn_usage: Option<UsageMetadata>,
}

impl<C: GenerationClient> ChatSession<C> {
    /// Creates a new chat session with the given client and configuration.
    ///
    /// The transcript starts empty.
    pub fn new(client: C, config: ChatConfig) -> Self {
        Self {
            client,
            config,
            transcript: Transcript::new(),
            total_prompt_tokens: 0,
            total_candidates_tokens: 0,
            last_turn_usage: None,
            request_count: 0,
        }
    }

    /// Sends a user message and streams the response.
    ///
    /// This method:
    /// 1. Appends the user turn to the transcript
    /// 2. Sends a streaming request carrying the full transcript
    /// 3. Renders fragments as they arrive
    /// 4. Appends the complete model turn to the transcript
    ///
    /// # Errors
    ///
    /// Returns a validation error for empty input, leaving the transcript
    /// untouched. Any remote failure is returned as-is and leaves the
    /// transcript exactly as it was after the user turn was appended: a
    /// failed attempt never adds a model turn, and there is no retry.
    pub async fn send_streaming(
        &mut self,
        user_input: &str,
        renderer: &mut dyn Renderer,
    ) -> Result<()> {
        if user_input.trim().is_empty() {
            return Err(Error::validation(
                "message must not be empty",
                Some("user_input".to_string()),
            ));
        }

        self.transcript.push(Turn::user(user_input));

        let request = self.build_request();
        let stream = self.client.stream_generate(request).await?;

        let (mut fragments, reply_rx) = AccumulatingStream::new(stream);
        while let Some(fragment) = fragments.next().await {
            renderer.print_text(&fragment?);
        }
        drop(fragments);

        let reply = reply_rx
            .await
            .map_err(|_| Error::streaming("stream ended without completing a reply", None))?;

        self.record_usage(reply.usage);
        self.transcript.push(Turn::model(reply.text));
        renderer.finish_response();
        Ok(())
    }

    /// Clears the conversation history. Irreversible; the next request
    /// starts from an empty transcript.
    pub fn clear(&mut self) {
        self.transcript.clear();
    }

    /// Returns the transcript.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Returns the number of turns in the transcript.
    pub fn turn_count(&self) -> usize {
        self.transcript.len()
    }

    /// Renders the transcript as plain text for export.
    pub fn export(&self) -> String {
        self.transcript.export()
    }

    /// Writes the exported transcript to the given path as UTF-8 plain text.
    pub fn export_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path.as_ref(), self.export())
            .map_err(|err| Error::io("failed to write exported conversation", err))
    }

    /// Changes the model used for responses.
    pub fn set_model(&mut self, model: Model) {
        self.config.model = model;
    }

    /// Returns the current model.
    pub fn model(&self) -> &Model {
        &self.config.model
    }

    /// Sets or clears the system prompt.
    pub fn set_system_prompt(&mut self, prompt: Option<String>) {
        self.config.system_prompt = prompt;
    }

    /// Returns the current system prompt, if any.
    pub fn system_prompt(&self) -> Option<&str> {
        self.config.system_prompt.as_deref()
    }

    /// Sets the sampling temperature.
    pub fn set_temperature(&mut self, temperature: f32) {
        self.config.temperature = temperature;
    }

    /// Sets the maximum output tokens per response.
    pub fn set_max_output_tokens(&mut self, max_output_tokens: u32) {
        self.config.max_output_tokens = max_output_tokens;
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            model: self.config.model.clone(),
            turn_count: self.turn_count(),
            system_prompt: self.config.system_prompt.clone(),
            temperature: self.config.temperature,
            max_output_tokens: self.config.max_output_tokens,
            total_prompt_tokens: self.total_prompt_tokens,
            total_candidates_tokens: self.total_candidates_tokens,
            total_requests: self.request_count,
            last_turn_usage: self.last_turn_usage,
        }
    }

    fn build_request(&self) -> GenerateContentRequest {
        GenerateContentRequest::from_transcript(
            &self.transcript,
            self.config.system_prompt.as_deref(),
            self.config.generation_config(),
            self.config.model.clone(),
        )
    }

    fn record_usage(&mut self, usage: Option<UsageMetadata>) {
        self.request_count = self.request_count.saturating_add(1);
        self.last_turn_usage = usage;
        if let Some(usage) = usage {
            self.total_prompt_tokens = self
                .total_prompt_tokens
                .saturating_add(usage.prompt_token_count);
            self.total_candidates_tokens = self
                .total_candidates_tokens
                .saturating_add(usage.candidates_token_count);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use futures::stream;

    use super::*;
    use crate::client::ChunkStream;
    use crate::types::{Candidate, Content, GenerateContentResponse, KnownModel, Role};

    fn chunk(text: &str) -> GenerateContentResponse {
        GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(Content::with_role(Role::Model, text)),
                finish_reason: None,
            }],
            usage_metadata: None,
            prompt_feedback: None,
        }
    }

    fn usage_chunk(prompt: u64, candidates: u64) -> GenerateContentResponse {
        GenerateContentResponse {
            candidates: Vec::new(),
            usage_metadata: Some(UsageMetadata {
                prompt_token_count: prompt,
                candidates_token_count: candidates,
                total_token_count: prompt + candidates,
            }),
            prompt_feedback: None,
        }
    }

    /// One scripted exchange: either a stream of chunk results, or a failure
    /// of the request itself.
    enum Script {
        Chunks(Vec<Result<GenerateContentResponse>>),
        RequestFailure(Error),
    }

    /// A stub generation client that replays scripted exchanges.
    struct StubClient {
        scripts: Mutex<VecDeque<Script>>,
        last_request: Mutex<Option<GenerateContentRequest>>,
    }

    impl StubClient {
        fn new(scripts: Vec<Script>) -> Self {
            Self {
                scripts: Mutex::new(scripts.into_iter().collect()),
                last_request: Mutex::new(None),
            }
        }

        fn replying(fragments: &[&str]) -> Self {
            Self::new(vec![Script::Chunks(
                fragments.iter().map(|f| Ok(chunk(f))).collect(),
            )])
        }

        fn next_script(&self, request: &GenerateContentRequest) -> Script {
            *self.last_request.lock().unwrap() = Some(request.clone());
            self.scripts
                .lock()
                .unwrap()
                .pop_front()
                .expect("stub client ran out of scripted exchanges")
        }
    }

    #[async_trait::async_trait]
    impl GenerationClient for StubClient {
        async fn generate(
            &self,
            request: GenerateContentRequest,
        ) -> Result<GenerateContentResponse> {
            match self.next_script(&request) {
                Script::RequestFailure(err) => Err(err),
                Script::Chunks(chunks) => {
                    let mut text = String::new();
                    let mut usage = None;
                    for chunk in chunks {
                        let chunk = chunk?;
                        text.push_str(&chunk.text());
                        if chunk.usage_metadata.is_some() {
                            usage = chunk.usage_metadata;
                        }
                    }
                    Ok(GenerateContentResponse {
                        candidates: vec![Candidate {
                            content: Some(Content::with_role(Role::Model, text)),
                            finish_reason: Some("STOP".to_string()),
                        }],
                        usage_metadata: usage,
                        prompt_feedback: None,
                    })
                }
            }
        }

        async fn stream_generate(&self, request: GenerateContentRequest) -> Result<ChunkStream> {
            match self.next_script(&request) {
                Script::RequestFailure(err) => Err(err),
                Script::Chunks(chunks) => Ok(Box::pin(stream::iter(chunks))),
            }
        }
    }

    /// Captures rendered output for assertions.
    #[derive(Default)]
    struct RecordingRenderer {
        fragments: Vec<String>,
        errors: Vec<String>,
        finished: usize,
    }

    impl Renderer for RecordingRenderer {
        fn print_text(&mut self, text: &str) {
            self.fragments.push(text.to_string());
        }

        fn print_role_label(&mut self, _label: &str) {}

        fn print_error(&mut self, error: &str) {
            self.errors.push(error.to_string());
        }

        fn print_info(&mut self, _info: &str) {}

        fn finish_response(&mut self) {
            self.finished += 1;
        }
    }

    #[tokio::test]
    async fn round_trips_grow_transcript_by_two() {
        let client = StubClient::new(vec![
            Script::Chunks(vec![Ok(chunk("first reply"))]),
            Script::Chunks(vec![Ok(chunk("second reply"))]),
            Script::Chunks(vec![Ok(chunk("third reply"))]),
        ]);
        let mut session = ChatSession::new(client, ChatConfig::default());
        let mut renderer = RecordingRenderer::default();

        for (i, input) in ["one", "two", "three"].iter().enumerate() {
            session.send_streaming(input, &mut renderer).await.unwrap();
            assert_eq!(session.turn_count(), 2 * (i + 1));
        }

        let roles: Vec<Role> = session.transcript().turns().iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::Model, Role::User, Role::Model, Role::User, Role::Model]
        );
        let contents: Vec<&str> = session
            .transcript()
            .turns()
            .iter()
            .map(|t| t.content.as_str())
            .collect();
        assert_eq!(
            contents,
            vec!["one", "first reply", "two", "second reply", "three", "third reply"]
        );
    }

    #[tokio::test]
    async fn example_conversation_and_export() {
        let client = StubClient::replying(&["Hel", "lo!"]);
        let mut session = ChatSession::new(client, ChatConfig::default());
        let mut renderer = RecordingRenderer::default();

        session.send_streaming("Hi", &mut renderer).await.unwrap();

        assert_eq!(renderer.fragments, vec!["Hel".to_string(), "lo!".to_string()]);
        assert_eq!(renderer.finished, 1);

        let turns = session.transcript().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0], Turn::user("Hi"));
        assert_eq!(turns[1], Turn::model("Hello!"));

        assert_eq!(session.export(), "You:\nHi\n\nBot:\nHello!");
        // export is pure: calling it twice yields byte-identical output.
        assert_eq!(session.export(), session.export());
    }

    #[tokio::test]
    async fn empty_input_is_rejected_without_touching_transcript() {
        let client = StubClient::new(vec![]);
        let mut session = ChatSession::new(client, ChatConfig::default());
        let mut renderer = RecordingRenderer::default();

        let err = session.send_streaming("   ", &mut renderer).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(session.turn_count(), 0);
    }

    #[tokio::test]
    async fn request_failure_keeps_user_turn_only() {
        let client = StubClient::new(vec![
            Script::RequestFailure(Error::rate_limit("quota exceeded", Some(10))),
            Script::Chunks(vec![Ok(chunk("recovered"))]),
        ]);
        let mut session = ChatSession::new(client, ChatConfig::default());
        let mut renderer = RecordingRenderer::default();

        let err = session.send_streaming("Hi", &mut renderer).await.unwrap_err();
        assert!(err.is_rate_limit());
        // The failed attempt added the user turn and nothing else.
        assert_eq!(session.turn_count(), 1);
        assert_eq!(session.transcript().last().unwrap().role, Role::User);

        // The session remains usable for the next action.
        session.send_streaming("again", &mut renderer).await.unwrap();
        assert_eq!(session.turn_count(), 3);
        assert_eq!(session.transcript().last().unwrap().content, "recovered");
    }

    #[tokio::test]
    async fn mid_stream_failure_keeps_user_turn_only() {
        let client = StubClient::new(vec![Script::Chunks(vec![
            Ok(chunk("partial")),
            Err(Error::streaming("connection reset", None)),
        ])]);
        let mut session = ChatSession::new(client, ChatConfig::default());
        let mut renderer = RecordingRenderer::default();

        let err = session.send_streaming("Hi", &mut renderer).await.unwrap_err();
        assert!(matches!(err, Error::Streaming { .. }));
        assert_eq!(session.turn_count(), 1);
    }

    #[tokio::test]
    async fn clear_empties_transcript() {
        let client = StubClient::replying(&["reply"]);
        let mut session = ChatSession::new(client, ChatConfig::default());
        let mut renderer = RecordingRenderer::default();

        session.send_streaming("Hi", &mut renderer).await.unwrap();
        assert_eq!(session.turn_count(), 2);

        session.clear();
        assert_eq!(session.turn_count(), 0);
        assert_eq!(session.export(), "");
    }

    #[tokio::test]
    async fn streaming_matches_non_streaming_content() {
        let script = || {
            Script::Chunks(vec![
                Ok(chunk("Str")),
                Ok(chunk("eam")),
                Ok(chunk("ing!")),
            ])
        };

        // Streamed through a session.
        let mut session =
            ChatSession::new(StubClient::new(vec![script()]), ChatConfig::default());
        let mut renderer = RecordingRenderer::default();
        session.send_streaming("go", &mut renderer).await.unwrap();
        let streamed = session.transcript().last().unwrap().content.clone();

        // The equivalent non-streamed request.
        let client = StubClient::new(vec![script()]);
        let request = GenerateContentRequest::new(
            vec![Content::with_role(Role::User, "go")],
            Model::Known(KnownModel::Gemini25Flash),
        );
        let response = client.generate(request).await.unwrap();

        assert_eq!(streamed, response.text());
        assert_eq!(streamed, renderer.fragments.concat());
    }

    #[tokio::test]
    async fn request_carries_transcript_and_settings() {
        let client = StubClient::replying(&["ok"]);
        let config = ChatConfig::default()
            .with_system_prompt("You are terse.")
            .with_temperature(0.25)
            .with_max_output_tokens(256);
        let mut session = ChatSession::new(client, config);
        let mut renderer = RecordingRenderer::default();

        session.send_streaming("Hi", &mut renderer).await.unwrap();

        let request = session
            .client
            .last_request
            .lock()
            .unwrap()
            .clone()
            .unwrap();
        assert_eq!(request.contents.len(), 1);
        assert_eq!(request.contents[0].role, Some(Role::User));
        assert_eq!(
            request.system_instruction.as_ref().unwrap().joined_text(),
            "You are terse."
        );
        let generation = request.generation_config.unwrap();
        assert_eq!(generation.temperature, Some(0.25));
        assert_eq!(generation.max_output_tokens, Some(256));
    }

    #[tokio::test]
    async fn usage_totals_accumulate() {
        let client = StubClient::new(vec![
            Script::Chunks(vec![Ok(chunk("a")), Ok(usage_chunk(10, 2))]),
            Script::Chunks(vec![Ok(chunk("b")), Ok(usage_chunk(14, 3))]),
        ]);
        let mut session = ChatSession::new(client, ChatConfig::default());
        let mut renderer = RecordingRenderer::default();

        session.send_streaming("one", &mut renderer).await.unwrap();
        session.send_streaming("two", &mut renderer).await.unwrap();

        let stats = session.stats();
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.total_prompt_tokens, 24);
        assert_eq!(stats.total_candidates_tokens, 5);
        assert_eq!(stats.last_turn_usage.unwrap().prompt_token_count, 14);
    }

    #[tokio::test]
    async fn settings_mutate_between_requests() {
        let client = StubClient::new(vec![]);
        let mut session = ChatSession::new(client, ChatConfig::default());

        session.set_model(Model::Known(KnownModel::Gemini15Pro));
        assert_eq!(session.model(), &Model::Known(KnownModel::Gemini15Pro));

        session.set_system_prompt(Some("Be brief.".to_string()));
        assert_eq!(session.system_prompt(), Some("Be brief."));
        session.set_system_prompt(None);
        assert!(session.system_prompt().is_none());

        session.set_temperature(0.1);
        session.set_max_output_tokens(64);
        let stats = session.stats();
        assert_eq!(stats.temperature, 0.1);
        assert_eq!(stats.max_output_tokens, 64);
    }
}
