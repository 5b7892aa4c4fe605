//! Inventory CRUD handlers.

use crate::{
    errors::{ErrorResponse, ServiceError},
    models::{
        AddItemRequest, AddItemResponse, ClearListResponse, CountResponse, DeleteItemParams,
        GenerateIdResponse, ItemListResponse, MessageResponse, SearchItemParams,
        SearchResultsResponse,
    },
    AppState,
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};

/// Mint an identifier for a new item
#[utoipa::path(
    get,
    path = "/generate-id",
    responses(
        (status = 200, description = "Fresh item identifier", body = GenerateIdResponse)
    ),
    tag = "items"
)]
pub async fn generate_id(State(state): State<AppState>) -> Json<GenerateIdResponse> {
    Json(GenerateIdResponse {
        unique_id: state.items.generate_id(),
    })
}

/// Store a new item under a pre-minted id
#[utoipa::path(
    post,
    path = "/add-item",
    request_body = AddItemRequest,
    responses(
        (status = 201, description = "Item stored", body = AddItemResponse,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Invalid item", body = ErrorResponse),
        (status = 409, description = "Item id already exists", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "items"
)]
pub async fn add_item(
    State(state): State<AppState>,
    payload: Result<Json<AddItemRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let Json(request) = payload?;
    let item = state.items.add_item(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(AddItemResponse {
            message: "Item added successfully".to_string(),
            item_id: item.id,
        }),
    ))
}

/// Case-insensitive name search
#[utoipa::path(
    get,
    path = "/search-item",
    params(SearchItemParams),
    responses(
        (status = 200, description = "Matching items; empty for a blank keyword", body = SearchResultsResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "items"
)]
pub async fn search_item(
    State(state): State<AppState>,
    params: Result<Query<SearchItemParams>, QueryRejection>,
) -> Result<Json<SearchResultsResponse>, ServiceError> {
    let Query(params) = params?;
    let keyword = params.keyword.unwrap_or_default();
    let results = state.items.search_items(&keyword).await?;
    Ok(Json(SearchResultsResponse { results }))
}

#[utoipa::path(
    get,
    path = "/view-list",
    responses(
        (status = 200, description = "Every stored item", body = ItemListResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "items"
)]
pub async fn view_list(
    State(state): State<AppState>,
) -> Result<Json<ItemListResponse>, ServiceError> {
    let items = state.items.list_items().await?;
    Ok(Json(ItemListResponse { items }))
}

#[utoipa::path(
    get,
    path = "/count-items",
    responses(
        (status = 200, description = "Number of stored items", body = CountResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "items"
)]
pub async fn count_items(
    State(state): State<AppState>,
) -> Result<Json<CountResponse>, ServiceError> {
    let count = state.items.count_items().await?;
    Ok(Json(CountResponse { count }))
}

#[utoipa::path(
    delete,
    path = "/delete-item",
    params(DeleteItemParams),
    responses(
        (status = 200, description = "Item deleted", body = MessageResponse),
        (status = 400, description = "Missing id", body = ErrorResponse),
        (status = 404, description = "No item with that id", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "items"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    params: Result<Query<DeleteItemParams>, QueryRejection>,
) -> Result<Json<MessageResponse>, ServiceError> {
    let Query(params) = params?;
    let id = params
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ServiceError::ValidationError("Item ID is required".to_string()))?;

    state.items.delete_item(&id).await?;
    Ok(Json(MessageResponse {
        message: format!("Item with ID {} deleted successfully", id.trim()),
    }))
}

#[utoipa::path(
    delete,
    path = "/clear-list",
    responses(
        (status = 200, description = "All items removed", body = ClearListResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "items"
)]
pub async fn clear_list(
    State(state): State<AppState>,
) -> Result<Json<ClearListResponse>, ServiceError> {
    let deleted_count = state.items.clear_items().await?;
    Ok(Json(ClearListResponse {
        message: format!("{} items cleared from the list.", deleted_count),
        deleted_count,
    }))
}
