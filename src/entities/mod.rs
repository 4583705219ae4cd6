//! Entities module - Domain entities
//!
//! Types persisted by the message store plus the enumerations shared with the
//! identity provider. Conversations are not an entity: they are computed from
//! the messages exchanged by two participants.

pub mod enums;
pub mod message;
pub mod user;

pub use enums::UserRole;
pub use message::ChatMessage;
pub use user::CurrentUser;
