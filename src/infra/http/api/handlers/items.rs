//! Item handlers

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::auth::ApiPrincipal;
use crate::application::catalog::{CreateItemCommand, UpdateItemCommand};
use crate::application::filter::ItemFilter;
use crate::application::pagination::{DEFAULT_PAGE_SIZE, PageRequest};
use crate::application::repos::RepoError;

use super::{ItemListQuery, catalog_to_api, repo_to_api};
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

pub async fn create_item(
    State(state): State<ApiState>,
    Extension(principal): Extension<ApiPrincipal>,
    Json(payload): Json<ItemCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = ApiState::actor_label(&principal);

    let command = CreateItemCommand {
        name: payload.name,
        description: payload.description,
        price: payload.price,
    };

    let item = state
        .catalog
        .create_item(&actor, command)
        .await
        .map_err(catalog_to_api)?;

    Ok((StatusCode::CREATED, Json(ItemResponse::from(item))))
}

pub async fn create_items_bulk(
    State(state): State<ApiState>,
    Extension(principal): Extension<ApiPrincipal>,
    Json(payload): Json<ItemsBulkCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = ApiState::actor_label(&principal);

    let commands = payload
        .items
        .into_iter()
        .map(|item| CreateItemCommand {
            name: item.name,
            description: item.description,
            price: item.price,
        })
        .collect::<Vec<_>>();

    let items = state
        .catalog
        .create_items(&actor, commands)
        .await
        .map_err(catalog_to_api)?;

    let body = items
        .into_iter()
        .map(ItemResponse::from)
        .collect::<Vec<_>>();

    Ok((StatusCode::CREATED, Json(body)))
}

pub async fn get_item(
    State(state): State<ApiState>,
    Extension(_principal): Extension<ApiPrincipal>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state.catalog.find_by_id(id).await.map_err(catalog_to_api)?;

    match item {
        Some(item) => Ok(Json(ItemResponse::from(item))),
        None => Err(ApiError::not_found("item not found")),
    }
}

pub async fn list_items(
    State(state): State<ApiState>,
    Extension(_principal): Extension<ApiPrincipal>,
    Query(query): Query<ItemListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = PageRequest::new(
        query.page.unwrap_or(0),
        query.per_page.unwrap_or(DEFAULT_PAGE_SIZE),
    )
    .map_err(|err| repo_to_api(RepoError::Pagination(err)))?;

    let filter = ItemFilter {
        name: query.name,
        description: query.description,
        price: query.price,
        price_less_than: query.price_less_than,
        price_greater_than: query.price_greater_than,
    };

    let result = state
        .catalog
        .list(&filter, page)
        .await
        .map_err(catalog_to_api)?;

    let body = ItemPageResponse {
        items: result
            .items
            .into_iter()
            .map(ItemResponse::from)
            .collect::<Vec<_>>(),
        total: result.total,
        page: result.page,
        per_page: result.per_page,
    };

    Ok(Json(body))
}

pub async fn update_item(
    State(state): State<ApiState>,
    Extension(principal): Extension<ApiPrincipal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ItemUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = ApiState::actor_label(&principal);

    let command = UpdateItemCommand {
        id,
        name: payload.name,
        description: payload.description,
        price: payload.price,
    };

    let item = state
        .catalog
        .update_item(&actor, command)
        .await
        .map_err(catalog_to_api)?;

    Ok(Json(ItemResponse::from(item)))
}

pub async fn delete_item(
    State(state): State<ApiState>,
    Extension(principal): Extension<ApiPrincipal>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = ApiState::actor_label(&principal);

    state
        .catalog
        .delete_item(&actor, id)
        .await
        .map_err(catalog_to_api)?;

    Ok(StatusCode::NO_CONTENT)
}
