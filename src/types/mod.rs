// Public modules
pub mod content;
pub mod generation_config;
pub mod model;
pub mod request;
pub mod response;
pub mod transcript;
pub mod turn;

// Re-exports
pub use content::{Content, Part};
pub use generation_config::{
    GenerationConfig, MAX_OUTPUT_TOKENS, MIN_OUTPUT_TOKENS, output_tokens_in_range,
    temperature_in_range,
};
pub use model::{KnownModel, Model};
pub use request::GenerateContentRequest;
pub use response::{Candidate, GenerateContentResponse, PromptFeedback, UsageMetadata};
pub use transcript::{Transcript, export_file_name};
pub use turn::{Role, Turn};
