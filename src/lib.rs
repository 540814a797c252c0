//! Diagram Studio: orchestration core for a text-to-diagram editor.
//!
//! The editor keeps one diagram source, renders it through a debounced
//! scheduler, generates or repairs it with an AI provider, and exports the
//! last good render. Everything is exposed over HTTP and a websocket event
//! stream.

pub mod config;
pub mod db;
pub mod export;
pub mod frame;
pub mod llm;
pub mod render;
pub mod routes;
pub mod services;
pub mod state;
pub mod viewport;
