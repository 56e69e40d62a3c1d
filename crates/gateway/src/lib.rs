//! `chat-gateway` — HTTP surface, Turn Orchestrator, and process bootstrap
//! for the chat orchestrator (spec §4.8, §6).

pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod runtime;
pub mod state;
pub mod telemetry;
