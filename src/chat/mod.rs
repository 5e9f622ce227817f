//! Chat application module for interactive conversations with Gemini.
//!
//! This module provides a streaming REPL chat interface built on top of the
//! castor client library. It supports:
//!
//! - Streaming responses with real-time fragment display
//! - Slash commands for session control
//! - Configurable model, system prompt, and sampling parameters
//! - Plain-text conversation export
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: Core chat session management and API interaction
//! - [`commands`]: Slash command parsing and handling
//! - [`render`]: Output rendering abstraction

mod commands;
mod config;
mod render;
mod session;

pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatArgsError, ChatConfig, DEFAULT_SYSTEM_PROMPT};
pub use render::{PlainTextRenderer, Renderer};
pub use session::{ChatSession, SessionStats};
