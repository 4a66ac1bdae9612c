//! API handlers for the catalog resource.
//!
//! Shared query structs and error conversions live here; the handlers
//! themselves are in `items`.

mod items;

pub use items::*;

use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::application::catalog::CatalogError;
use crate::application::repos::RepoError;

use super::error::{ApiError, codes};

#[derive(Debug, Deserialize)]
pub struct ItemListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub price_less_than: Option<Decimal>,
    pub price_greater_than: Option<Decimal>,
}

pub(crate) fn catalog_to_api(err: CatalogError) -> ApiError {
    match err {
        CatalogError::Validation { field, message } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            message,
            Some(field),
        ),
        CatalogError::BatchTooLarge { .. } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::BATCH_TOO_LARGE,
            err.to_string(),
            Some("items"),
        ),
        CatalogError::ItemNotFound => ApiError::not_found("item not found"),
        CatalogError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn repo_to_api(err: RepoError) -> ApiError {
    match err {
        RepoError::NotFound => ApiError::not_found("item not found"),
        RepoError::Duplicate { constraint } => ApiError::new(
            StatusCode::CONFLICT,
            codes::DUPLICATE,
            format!("duplicate record violates `{constraint}`"),
            None,
        ),
        RepoError::Conflict { .. } => ApiError::new(
            StatusCode::CONFLICT,
            codes::CONFLICT,
            "item was modified concurrently",
            None,
        ),
        RepoError::Pagination(err) => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_PAGE_REQUEST,
            err.to_string(),
            None,
        ),
        RepoError::Persistence(_) => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::UNAVAILABLE,
            "service temporarily unavailable",
            None,
        ),
    }
}
