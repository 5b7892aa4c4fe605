use crate::{
    errors::{ErrorResponse, ServiceError},
    models::{PriceLookupResponse, SearchOnlineParams},
    AppState,
};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};

/// Search an external shopping catalogue for current prices
#[utoipa::path(
    get,
    path = "/search-online",
    params(SearchOnlineParams),
    responses(
        (status = 200, description = "Products matching the query", body = PriceLookupResponse),
        (status = 400, description = "Missing query", body = ErrorResponse),
        (status = 404, description = "No products found", body = ErrorResponse),
        (status = 502, description = "Shopping API failed", body = ErrorResponse),
        (status = 503, description = "Price lookup not configured", body = ErrorResponse)
    ),
    tag = "price-lookup"
)]
pub async fn search_online(
    State(state): State<AppState>,
    params: Result<Query<SearchOnlineParams>, QueryRejection>,
) -> Result<Json<PriceLookupResponse>, ServiceError> {
    let Query(params) = params?;
    let query = params.query.unwrap_or_default();
    let results = state.price_lookup.search(&query).await?;
    Ok(Json(PriceLookupResponse { results }))
}
