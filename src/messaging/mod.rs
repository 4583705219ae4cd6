//! Messaging Module - Delivery engine and read/typing state manager
//!
//! Orchestrates the message store and the presence registry. Persistence is
//! the only step that can fail an operation; every push to a live connection
//! is best-effort.

pub mod delivery;
pub mod read_state;

pub use delivery::send_message;
pub use read_state::{OpenedConversation, open_conversation, stop_typing, typing};
