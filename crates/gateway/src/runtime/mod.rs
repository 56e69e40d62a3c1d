pub mod cancel;
pub mod conversation_lock;
pub mod render;
pub mod turn;

pub use cancel::CancelMap;
pub use conversation_lock::ConversationLockMap;
pub use turn::{run_turn, ChatInput};
