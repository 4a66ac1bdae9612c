//! Shared test fixtures: an in-memory `ItemsRepo` with call counters and an
//! injectable store fault, plus helpers to assemble handler state.

#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use listino::application::auth::{ApiKeyGuard, ApiPrincipal};
use listino::application::cache::ResponseCache;
use listino::application::catalog::CatalogService;
use listino::application::filter::ItemPredicate;
use listino::application::pagination::{ItemPage, PageRequest};
use listino::application::repos::{CreateItemParams, ItemsRepo, RepoError, ReplaceItemParams};
use listino::domain::items::ItemRecord;
use listino::infra::http::api::state::ApiState;

pub const TEST_API_KEY: &str = "it-is-a-test-key";

#[derive(Default)]
pub struct InMemoryItems {
    items: Mutex<Vec<ItemRecord>>,
    /// When set, any insert carrying this name fails before anything is
    /// committed, imitating a store fault inside the batch transaction.
    pub fail_on_name: Option<String>,
    pub find_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
}

impl InMemoryItems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(name: &str) -> Self {
        Self {
            fail_on_name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub async fn stored(&self) -> Vec<ItemRecord> {
        self.items.lock().await.clone()
    }

    fn fault_for<'a, I>(&self, mut names: I) -> Option<RepoError>
    where
        I: Iterator<Item = &'a str>,
    {
        let trigger = self.fail_on_name.as_deref()?;
        names
            .any(|name| name == trigger)
            .then(|| RepoError::from_persistence("injected store fault"))
    }

    fn build_record(params: CreateItemParams, now: OffsetDateTime) -> ItemRecord {
        ItemRecord {
            id: params.id,
            name: params.name,
            description: params.description,
            price: params.price,
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }
}

#[async_trait]
impl ItemsRepo for InMemoryItems {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ItemRecord>, RepoError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        let items = self.items.lock().await;
        Ok(items.iter().find(|item| item.id == id).cloned())
    }

    async fn list_items(
        &self,
        predicate: &ItemPredicate,
        page: PageRequest,
    ) -> Result<ItemPage<ItemRecord>, RepoError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let items = self.items.lock().await;

        let mut matched: Vec<ItemRecord> = items
            .iter()
            .filter(|item| predicate.matches(item))
            .cloned()
            .collect();
        matched.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));

        let total = matched.len() as u64;
        let start = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let paged = matched
            .into_iter()
            .skip(start)
            .take(page.per_page() as usize)
            .collect();

        Ok(ItemPage::new(paged, total, page))
    }

    async fn insert_item(&self, params: CreateItemParams) -> Result<ItemRecord, RepoError> {
        if let Some(fault) = self.fault_for(std::iter::once(params.name.as_str())) {
            return Err(fault);
        }

        let mut items = self.items.lock().await;
        if items.iter().any(|item| item.id == params.id) {
            return Err(RepoError::Duplicate {
                constraint: "items_pkey".to_string(),
            });
        }

        let record = Self::build_record(params, OffsetDateTime::now_utc());
        items.push(record.clone());
        Ok(record)
    }

    async fn insert_items(
        &self,
        params: Vec<CreateItemParams>,
    ) -> Result<Vec<ItemRecord>, RepoError> {
        if let Some(fault) = self.fault_for(params.iter().map(|p| p.name.as_str())) {
            return Err(fault);
        }

        let mut items = self.items.lock().await;
        if params
            .iter()
            .any(|p| items.iter().any(|item| item.id == p.id))
        {
            return Err(RepoError::Duplicate {
                constraint: "items_pkey".to_string(),
            });
        }

        // Single lock plus validate-then-extend keeps the batch all-or-nothing.
        let now = OffsetDateTime::now_utc();
        let records: Vec<ItemRecord> = params
            .into_iter()
            .map(|p| Self::build_record(p, now))
            .collect();
        items.extend(records.iter().cloned());
        Ok(records)
    }

    async fn replace_item(&self, params: ReplaceItemParams) -> Result<ItemRecord, RepoError> {
        let mut items = self.items.lock().await;
        let item = items
            .iter_mut()
            .find(|item| item.id == params.id)
            .ok_or(RepoError::NotFound)?;

        if item.version != params.expected_version {
            return Err(RepoError::Conflict {
                expected: params.expected_version,
            });
        }

        item.name = params.name;
        item.description = params.description;
        item.price = params.price;
        item.updated_at = OffsetDateTime::now_utc();
        item.version += 1;
        Ok(item.clone())
    }

    async fn delete_item(&self, id: Uuid) -> Result<(), RepoError> {
        let mut items = self.items.lock().await;
        items.retain(|item| item.id != id);
        Ok(())
    }
}

pub fn principal() -> ApiPrincipal {
    ApiPrincipal {
        label: "api_key".to_string(),
    }
}

pub fn catalog_with_cache(repo: Arc<InMemoryItems>) -> (CatalogService, Arc<ResponseCache>) {
    let cache = Arc::new(ResponseCache::new());
    let service = CatalogService::new(repo).with_response_cache(cache.clone());
    (service, cache)
}

pub fn api_state(repo: Arc<InMemoryItems>) -> ApiState {
    let (service, _) = catalog_with_cache(repo);
    ApiState {
        catalog: Arc::new(service),
        auth: Arc::new(ApiKeyGuard::new(TEST_API_KEY)),
    }
}

pub async fn response_json<T: DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body is readable");
    serde_json::from_slice(&bytes).expect("response body is valid json")
}
