pub mod conversation;
pub mod decode;
pub mod era;
pub mod history;
pub mod modes;
pub mod platform;
pub mod reply;
pub mod request;
pub mod simulator;
#[cfg(test)]
pub(crate) mod testing;

pub use conversation::{CommentId, Conversation, ConversationSession, PendingReply};
pub use era::{EraBracket, EraContext};
pub use history::{HistoryEntry, SimulationHistory};
pub use modes::{compose, Mode, ModeInstruction, ModeSet};
pub use platform::{classify, PlatformFamily, PlatformFilter};
pub use request::{RequestBuilder, SimulationContext};
pub use simulator::Simulator;
