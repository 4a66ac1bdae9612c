//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::application::filter::ItemPredicate;
use crate::application::pagination::{ItemPage, PageRequest, PaginationError};
use crate::domain::items::ItemRecord;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("stale write rejected: expected version {expected}")]
    Conflict { expected: i32 },
    #[error(transparent)]
    Pagination(#[from] PaginationError),
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct CreateItemParams {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
}

/// Full replacement of an item's mutable fields, guarded by the version the
/// caller read. A mismatch means a concurrent replace won; the store reports
/// it instead of applying the stale write.
#[derive(Debug, Clone)]
pub struct ReplaceItemParams {
    pub id: Uuid,
    pub expected_version: i32,
    pub name: String,
    pub description: String,
    pub price: Decimal,
}

#[async_trait]
pub trait ItemsRepo: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ItemRecord>, RepoError>;

    /// List items matching `predicate`, ordered by `(created_at, id)`
    /// ascending so that repeated paging without intervening writes is
    /// consistent. Returns the page plus the total match count.
    async fn list_items(
        &self,
        predicate: &ItemPredicate,
        page: PageRequest,
    ) -> Result<ItemPage<ItemRecord>, RepoError>;

    async fn insert_item(&self, params: CreateItemParams) -> Result<ItemRecord, RepoError>;

    /// Insert a batch atomically: either every row is durably visible
    /// afterwards or none is.
    async fn insert_items(
        &self,
        params: Vec<CreateItemParams>,
    ) -> Result<Vec<ItemRecord>, RepoError>;

    async fn replace_item(&self, params: ReplaceItemParams) -> Result<ItemRecord, RepoError>;

    /// Idempotent: deleting an absent id is not an error.
    async fn delete_item(&self, id: Uuid) -> Result<(), RepoError>;
}
