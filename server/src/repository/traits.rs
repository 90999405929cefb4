//! Repository Layer - Shared Trait
//!
//! Issues and boards are both read and deleted through this seam; the
//! SQLite repositories implement it over the shared connection.

use async_trait::async_trait;
use crate::domain::{Entity, DomainResult};

/// Lookup, listing and deletion by id. Creation and moves take
/// issue- or board-specific payloads and live on the concrete types.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// `None` when the id is unknown
    async fn find_by_id(&self, id: &T::Id) -> DomainResult<Option<T>>;

    async fn list(&self) -> DomainResult<Vec<T>>;

    /// Deleting an unknown id is `NotFound`
    async fn delete(&self, id: &T::Id) -> DomainResult<()>;
}
