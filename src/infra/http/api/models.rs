use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::items::ItemRecord;

#[derive(Debug, Deserialize, Serialize)]
pub struct ItemCreateRequest {
    pub name: String,
    pub description: String,
    pub price: Decimal,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ItemsBulkCreateRequest {
    pub items: Vec<ItemCreateRequest>,
}

/// Full replacement payload: every mutable field must be supplied.
#[derive(Debug, Deserialize, Serialize)]
pub struct ItemUpdateRequest {
    pub name: String,
    pub description: String,
    pub price: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ItemResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<ItemRecord> for ItemResponse {
    fn from(record: ItemRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            description: record.description,
            price: record.price,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ItemPageResponse {
    pub items: Vec<ItemResponse>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}
