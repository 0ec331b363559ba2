//! Streaming chat client core for a local Foundry chat-completions endpoint.
//!
//! The interesting part lives in [`decoder`]: an incremental decoder that
//! turns streamed JSON chunks into a progressively revealed final answer,
//! tolerating partial lines, malformed fragments, and abnormal stream ends.
//! [`core`] holds the conversation log and per-turn orchestration; [`client`]
//! is the HTTP transport behind the [`core::ChatTransport`] seam.

pub mod client;
pub mod config;
pub mod core;
pub mod decoder;
pub mod logging;

pub use client::{FoundryClient, MockTransport, TransportError};
pub use config::AppConfig;
pub use core::{ChatError, ChatSession, ChatTransport, Conversation, GenerationParams, Result};
pub use decoder::{Decoder, RecordingSink, RevealSink};
