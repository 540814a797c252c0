//! LLM: multi-provider completion client for diagram generation.
//!
//! DESIGN
//! ======
//! Four services are supported behind one [`DiagramGenerator`] seam. The
//! per-service differences (endpoint path, auth placement, body and response
//! shapes, streaming) live in small adapters selected by [`ProviderId`]; the
//! [`CompletionClient`] owns the HTTP path and output cleanup.
//!
//! Credentials never come from the environment. The caller passes the saved
//! credential with every request.

pub mod anthropic;
pub mod client;
pub mod config;
pub mod deepseek;
pub mod gemini;
pub mod openai;
pub mod prompt;
pub mod provider;
pub mod stream;
pub mod types;

pub use client::CompletionClient;
pub use config::GeneratorConfig;
pub use types::{DiagramGenerator, GenerationError, GenerationRequest, ProgressSender, ProviderId};
