//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use std::fmt;

use arrrg_derive::CommandLine;

use crate::types::{
    GenerationConfig, KnownModel, MAX_OUTPUT_TOKENS, MIN_OUTPUT_TOKENS, Model,
    output_tokens_in_range, temperature_in_range,
};

/// Default persona when none is supplied.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a friendly and helpful assistant.";

/// Default sampling temperature.
const DEFAULT_TEMPERATURE: f32 = 0.75;

/// Default maximum output tokens per response.
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 512;

/// Command-line arguments for the castor-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq)]
pub struct ChatArgs {
    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: gemini-2.5-flash)", "MODEL")]
    pub model: Option<String>,

    /// System prompt defining the bot's persona and rules.
    #[arrrg(optional, "System prompt for the conversation", "PROMPT")]
    pub system: Option<String>,

    /// Sampling temperature.
    #[arrrg(optional, "Sampling temperature 0.0-1.0 (default: 0.75)", "TEMP")]
    pub temperature: Option<f32>,

    /// Maximum output tokens per response.
    #[arrrg(optional, "Max tokens per response (default: 512)", "TOKENS")]
    pub max_tokens: Option<u32>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Rejected command-line argument values.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatArgsError {
    /// Temperature outside [0.0, 1.0].
    InvalidTemperature(f32),
    /// Max output tokens outside the accepted range.
    InvalidMaxTokens(u32),
}

impl fmt::Display for ChatArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatArgsError::InvalidTemperature(value) => {
                write!(f, "temperature must be between 0.0 and 1.0 (got {value})")
            }
            ChatArgsError::InvalidMaxTokens(value) => {
                write!(
                    f,
                    "max tokens must be between {MIN_OUTPUT_TOKENS} and {MAX_OUTPUT_TOKENS} (got {value})"
                )
            }
        }
    }
}

impl std::error::Error for ChatArgsError {}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults. It may change between
/// requests without affecting past turns.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// The model to use for generating responses.
    pub model: Model,

    /// System instruction prepended to every request; never stored as a turn.
    pub system_prompt: Option<String>,

    /// Sampling temperature, between 0.0 and 1.0.
    pub temperature: f32,

    /// Maximum output tokens per response.
    pub max_output_tokens: u32,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: gemini-2.5-flash
    /// - System prompt: a friendly-assistant persona
    /// - Temperature: 0.75
    /// - Max output tokens: 512
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            model: Model::Known(KnownModel::Gemini25Flash),
            system_prompt: Some(DEFAULT_SYSTEM_PROMPT.to_string()),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            use_color: true,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    /// Sets the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Clears the system prompt.
    pub fn without_system_prompt(mut self) -> Self {
        self.system_prompt = None;
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the maximum output tokens per response.
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// The wire-shape sampling parameters for one request.
    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig::new(self.temperature, self.max_output_tokens)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<ChatArgs> for ChatConfig {
    type Error = ChatArgsError;

    fn try_from(args: ChatArgs) -> Result<Self, Self::Error> {
        let mut config = ChatConfig::new();

        if let Some(model) = args.model {
            config.model = Model::from(model);
        }
        if let Some(system) = args.system {
            config.system_prompt = Some(system);
        }
        if let Some(temperature) = args.temperature {
            if !temperature_in_range(temperature) {
                return Err(ChatArgsError::InvalidTemperature(temperature));
            }
            config.temperature = temperature;
        }
        if let Some(max_tokens) = args.max_tokens {
            if !output_tokens_in_range(max_tokens) {
                return Err(ChatArgsError::InvalidMaxTokens(max_tokens));
            }
            config.max_output_tokens = max_tokens;
        }
        config.use_color = !args.no_color;

        Ok(config)
    }
}
