use serde::{Deserialize, Serialize};

use crate::types::{Content, GenerationConfig, Model, Transcript};

/// Parameters for one generation request.
///
/// The model travels in the request path rather than the body, so it lives
/// beside the serialized fields here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// The conversation so far, in wire shape.
    pub contents: Vec<Content>,

    /// Persona/rules prepended to every request; not part of the transcript.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,

    /// Sampling parameters; omitted entirely when empty so the endpoint
    /// defaults apply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,

    /// The model that should serve this request.
    #[serde(skip)]
    pub model: Model,
}

impl GenerateContentRequest {
    /// Create a request with bare contents and endpoint defaults.
    ///
    /// This is the shape the one-shot inference check sends: no system
    /// instruction, no sampling overrides.
    pub fn new(contents: Vec<Content>, model: Model) -> Self {
        Self {
            contents,
            system_instruction: None,
            generation_config: None,
            model,
        }
    }

    /// Create a request carrying the full transcript plus session settings.
    pub fn from_transcript(
        transcript: &Transcript,
        system_instruction: Option<&str>,
        generation_config: GenerationConfig,
        model: Model,
    ) -> Self {
        Self {
            contents: transcript.to_contents(),
            system_instruction: system_instruction
                .filter(|text| !text.is_empty())
                .map(Content::text),
            generation_config: if generation_config.is_empty() {
                None
            } else {
                Some(generation_config)
            },
            model,
        }
    }

    /// Sets the system instruction.
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(Content::text(instruction));
        self
    }

    /// Sets the generation config.
    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = Some(config);
        self
    }
}
