//! `chat-promptctx` — prompt and context-block assembly shared by the
//! Turn Orchestrator's prompt composition step (spec §4.8).

pub mod composer;
pub mod report;
pub mod system_prompt;
pub mod truncation;

pub use composer::PromptComposer;
pub use report::{ContextSource, PromptReport};
pub use system_prompt::system_prompt;
