//! Core Module - Infrastructure components of the service
//!
//! - Identity provider boundary (JWT verification)
//! - Configuration
//! - Error handling
//! - Database bootstrap
//! - Application state

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod state;

// Re-exports
pub use auth::{Claims, authentication_middleware, decode_jwt, encode_jwt};
pub use config::Config;
pub use error::{AppError, ChatError};
pub use state::{AppState, ChatSettings};
