//! User entity - Authenticated caller as delivered by the identity provider

use super::enums::UserRole;
use serde::{Deserialize, Serialize};

/// The caller of a request or the owner of a live connection.
///
/// Built from verified token claims and trusted as-is; accounts live in the
/// external identity provider, never in this service.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: String,
    pub role: UserRole,
}
