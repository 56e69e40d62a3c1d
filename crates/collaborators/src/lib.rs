//! `chat-collaborators` — the Fee and Location Clients (spec §4.4, §4.5):
//! authoritative, deterministic answer sources the Turn Orchestrator
//! dispatches to before ever considering retrieval or generation.

pub mod fee;
pub mod location;

pub use fee::{FeeClient, FeeOutcome};
pub use location::LocationClient;
