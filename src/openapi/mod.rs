use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Inventory API",
        version = "0.1.0",
        description = r#"
# Inventory API

Stores inventory items and proxies online price searches.

A fallback instance of the same service answers only `/count-items`,
`/clear-list` and the health endpoints.

## Error Handling

Every failure returns the same envelope:

```json
{
  "error": "Not Found",
  "message": "Not found: Item with ID 42 not found",
  "request_id": "req-abc123xyz",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#
    ),
    tags(
        (name = "items", description = "Inventory item endpoints"),
        (name = "price-lookup", description = "Online price search"),
        (name = "health", description = "Liveness and readiness checks")
    ),
    paths(
        crate::handlers::items::generate_id,
        crate::handlers::items::add_item,
        crate::handlers::items::search_item,
        crate::handlers::items::view_list,
        crate::handlers::items::count_items,
        crate::handlers::items::delete_item,
        crate::handlers::items::clear_list,
        crate::handlers::price_lookup::search_online,
        crate::health::health_check,
        crate::health::readiness_check,
    ),
    components(
        schemas(
            crate::entities::item::Model,
            crate::models::NewItem,
            crate::models::AddItemRequest,
            crate::models::AddItemResponse,
            crate::models::GenerateIdResponse,
            crate::models::SearchResultsResponse,
            crate::models::ItemListResponse,
            crate::models::CountResponse,
            crate::models::MessageResponse,
            crate::models::ClearListResponse,
            crate::models::PriceResult,
            crate::models::PriceLookupResponse,
            crate::health::HealthInfo,
            crate::health::ReadinessInfo,
            crate::errors::ErrorResponse,
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
