// Public modules
pub mod accumulating;
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod error;
pub mod sse;
pub mod types;

// Re-exports
pub use accumulating::{AccumulatingStream, Reply, collect_reply};
pub use client::{ChunkStream, Gemini, GenerationClient};
pub use client_logger::ClientLogger;
pub use error::{Error, Result};
pub use types::*;
