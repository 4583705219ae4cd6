//! Common repository traits
//!
//! Generic interfaces for storage operations. Errors are already translated
//! into the domain taxonomy ([`ChatError`]).

use crate::core::ChatError;

/// Trait for creating new entities
///
/// # Type Parameters
/// * `Entity` - Type of the returned entity (with server-assigned fields filled in)
/// * `CreateDTO` - DTO for creation (without server-assigned fields)
pub trait Create<Entity, CreateDTO> {
    /// Validates and persists a new entity
    ///
    /// # Returns
    /// * `Ok(Entity)` - The stored record
    /// * `Err(ChatError::Validation)` - The input was rejected, nothing was written
    /// * `Err(ChatError::TransientStore | ChatError::Timeout)` - Storage failure
    async fn create(&self, data: &CreateDTO) -> Result<Entity, ChatError>;
}

/// Trait for reading a single entity by primary key
///
/// # Type Parameters
/// * `Entity` - Type of the entity to read
/// * `Id` - Type of the primary key
pub trait Read<Entity, Id> {
    /// # Returns
    /// * `Ok(Some(Entity))` - Entity found
    /// * `Ok(None)` - No entity with that ID
    /// * `Err(ChatError)` - Storage failure
    async fn read(&self, id: &Id) -> Result<Option<Entity>, ChatError>;
}
