use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// One product from an online price search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PriceResult {
    #[schema(example = "Acme Widget, 3-pack")]
    pub title: String,
    #[schema(example = "$19.99")]
    pub price: String,
    pub link: String,
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PriceLookupResponse {
    pub results: Vec<PriceResult>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchOnlineParams {
    /// Free-text product query forwarded to the shopping API
    pub query: Option<String>,
}
