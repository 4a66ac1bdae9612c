//! Catalog use cases: create, read, filter, replace, delete.

use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::application::cache::ResponseCache;
use crate::application::filter::ItemFilter;
use crate::application::pagination::{ItemPage, PageRequest};
use crate::application::repos::{CreateItemParams, ItemsRepo, RepoError, ReplaceItemParams};
use crate::domain::items::ItemRecord;

/// Most create requests accepted in one batch call.
pub const MAX_BATCH_ITEMS: usize = 50;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid `{field}`: {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },
    #[error("batch of {len} items exceeds the ceiling of {max}", max = MAX_BATCH_ITEMS)]
    BatchTooLarge { len: usize },
    #[error("item not found")]
    ItemNotFound,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct CreateItemCommand {
    pub name: String,
    pub description: String,
    pub price: Decimal,
}

/// Replaces every mutable field of an existing item. There is no partial
/// patch: callers supply the complete new state.
#[derive(Debug, Clone)]
pub struct UpdateItemCommand {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
}

#[derive(Clone)]
pub struct CatalogService {
    repo: Arc<dyn ItemsRepo>,
    cache: Option<Arc<ResponseCache>>,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn ItemsRepo>) -> Self {
        Self { repo, cache: None }
    }

    pub fn with_response_cache(mut self, cache: Arc<ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_response_cache_opt(mut self, cache: Option<Arc<ResponseCache>>) -> Self {
        self.cache = cache;
        self
    }

    pub async fn create_item(
        &self,
        actor: &str,
        command: CreateItemCommand,
    ) -> Result<ItemRecord, CatalogError> {
        validate_fields(&command.name, command.price)?;

        let id = Uuid::new_v4();
        let record = self
            .repo
            .insert_item(CreateItemParams {
                id,
                name: command.name,
                description: command.description,
                price: command.price,
            })
            .await?;

        self.invalidate_cache();
        info!(
            target = "listino::catalog",
            actor,
            id = %record.id,
            "item created"
        );

        Ok(record)
    }

    /// Create a batch atomically. The whole batch is validated and the size
    /// ceiling enforced before the store sees anything; the store then
    /// commits all rows or none.
    pub async fn create_items(
        &self,
        actor: &str,
        commands: Vec<CreateItemCommand>,
    ) -> Result<Vec<ItemRecord>, CatalogError> {
        if commands.len() > MAX_BATCH_ITEMS {
            return Err(CatalogError::BatchTooLarge {
                len: commands.len(),
            });
        }
        for command in &commands {
            validate_fields(&command.name, command.price)?;
        }

        let params = commands
            .into_iter()
            .map(|command| CreateItemParams {
                id: Uuid::new_v4(),
                name: command.name,
                description: command.description,
                price: command.price,
            })
            .collect::<Vec<_>>();

        let records = self.repo.insert_items(params).await?;

        self.invalidate_cache();
        info!(
            target = "listino::catalog",
            actor,
            count = records.len(),
            "item batch created"
        );

        Ok(records)
    }

    /// Point read. Absence is a normal outcome, not an error.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ItemRecord>, CatalogError> {
        if let Some(cache) = self.cache.as_ref()
            && let Some(record) = cache.get_item(id)
        {
            return Ok(Some(record));
        }

        let record = self.repo.find_by_id(id).await?;

        if let Some(cache) = self.cache.as_ref()
            && let Some(record) = record.as_ref()
        {
            cache.put_item(record);
        }

        Ok(record)
    }

    pub async fn list(
        &self,
        filter: &ItemFilter,
        page: PageRequest,
    ) -> Result<ItemPage<ItemRecord>, CatalogError> {
        let predicate = filter.compile();
        let fingerprint = predicate.fingerprint();

        if let Some(cache) = self.cache.as_ref()
            && let Some(cached) = cache.get_list(fingerprint, page)
        {
            return Ok(cached);
        }

        let result = self.repo.list_items(&predicate, page).await?;

        if let Some(cache) = self.cache.as_ref() {
            cache.put_list(fingerprint, page, &result);
        }

        Ok(result)
    }

    /// Full replace of an existing item. The replace is guarded by the
    /// version read here, so a concurrent winner turns this into a conflict
    /// error rather than a silent lost update.
    pub async fn update_item(
        &self,
        actor: &str,
        command: UpdateItemCommand,
    ) -> Result<ItemRecord, CatalogError> {
        validate_fields(&command.name, command.price)?;

        let existing = self
            .repo
            .find_by_id(command.id)
            .await?
            .ok_or(CatalogError::ItemNotFound)?;

        let record = self
            .repo
            .replace_item(ReplaceItemParams {
                id: command.id,
                expected_version: existing.version,
                name: command.name,
                description: command.description,
                price: command.price,
            })
            .await
            .map_err(|err| match err {
                RepoError::NotFound => CatalogError::ItemNotFound,
                other => CatalogError::Repo(other),
            })?;

        self.invalidate_cache();
        info!(
            target = "listino::catalog",
            actor,
            id = %record.id,
            version = record.version,
            "item replaced"
        );

        Ok(record)
    }

    /// Delete unconditionally. Missing ids are a no-op by design; callers
    /// only ever observe success.
    pub async fn delete_item(&self, actor: &str, id: Uuid) -> Result<(), CatalogError> {
        self.repo.delete_item(id).await?;

        self.invalidate_cache();
        info!(
            target = "listino::catalog",
            actor,
            id = %id,
            "item deleted"
        );

        Ok(())
    }

    fn invalidate_cache(&self) {
        if let Some(cache) = self.cache.as_ref() {
            cache.invalidate_all();
        }
    }
}

fn validate_fields(name: &str, price: Decimal) -> Result<(), CatalogError> {
    if name.trim().is_empty() {
        return Err(CatalogError::Validation {
            field: "name",
            message: "must not be blank",
        });
    }
    if price < Decimal::ZERO {
        return Err(CatalogError::Validation {
            field: "price",
            message: "must not be negative",
        });
    }
    Ok(())
}
