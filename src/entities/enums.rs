//! Enumerations - Enumerated types used by the entities

use serde::{Deserialize, Serialize};

/// Marketplace role carried in the identity provider's token.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Buyer,
    Farmer,
}
