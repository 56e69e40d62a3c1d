//! `chat-disambiguation` — the Disambiguation State Machine (spec §4.7).

pub mod local;
pub mod machine;
pub mod rest;
pub mod store;
mod vocab;

pub use local::LocalFallbackStore;
pub use machine::{resolve, DisambiguationMachine, ResolveOutcome};
pub use rest::RestDisambiguationStore;
pub use store::DisambiguationStore;
