use crate::{config::AppConfig, errors::ServiceError, models::PriceResult};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info, instrument, warn};
use url::Url;

const NOT_AVAILABLE: &str = "N/A";

/// Credentials and endpoint of the external shopping API.
#[derive(Debug, Clone)]
pub struct PriceLookupSettings {
    pub api_key: String,
    pub api_host: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl PriceLookupSettings {
    /// `None` when the key or host is not configured.
    pub fn from_config(cfg: &AppConfig) -> Option<Self> {
        let api_key = cfg
            .price_lookup_api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())?;
        let api_host = cfg
            .price_lookup_api_host
            .as_deref()
            .filter(|h| !h.trim().is_empty())?;
        let base_url = cfg
            .price_lookup_base_url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| format!("https://{}", api_host));

        Some(Self {
            api_key: api_key.to_string(),
            api_host: api_host.to_string(),
            base_url,
            timeout: Duration::from_secs(cfg.price_lookup_timeout_secs),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    data: Option<SearchData>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchData {
    #[serde(default)]
    products: Vec<Product>,
}

#[derive(Debug, Default, Deserialize)]
struct Product {
    product_title: Option<String>,
    product_price: Option<Value>,
    product_url: Option<String>,
    product_photo: Option<String>,
}

impl From<Product> for PriceResult {
    fn from(product: Product) -> Self {
        let price = match product.product_price {
            Some(Value::String(s)) if !s.is_empty() => s,
            Some(Value::Number(n)) => n.to_string(),
            _ => NOT_AVAILABLE.to_string(),
        };
        PriceResult {
            title: product
                .product_title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            price,
            link: product.product_url.unwrap_or_default(),
            image: product.product_photo.unwrap_or_default(),
        }
    }
}

/// Proxy for online price searches.
/// Longest upstream body echoed back in an error envelope.
const MAX_DETAILS_CHARS: usize = 512;

fn upstream_details(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    Some(body.chars().take(MAX_DETAILS_CHARS).collect())
}

#[derive(Debug, Clone)]
pub struct PriceLookupService {
    client: reqwest::Client,
    settings: Option<PriceLookupSettings>,
}

impl PriceLookupService {
    pub fn new(settings: Option<PriceLookupSettings>) -> Result<Self, ServiceError> {
        let timeout = settings
            .as_ref()
            .map(|s| s.timeout)
            .unwrap_or(Duration::from_secs(10));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::InternalError(format!("HTTP client: {}", e)))?;

        if settings.is_none() {
            warn!("Price lookup API key or host not configured; search-online is unavailable");
        }

        Ok(Self { client, settings })
    }

    pub fn from_config(cfg: &AppConfig) -> Result<Self, ServiceError> {
        Self::new(PriceLookupSettings::from_config(cfg))
    }

    fn search_url(settings: &PriceLookupSettings, query: &str) -> Result<Url, ServiceError> {
        let base = settings.base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{}/search", base)).map_err(|e| {
            ServiceError::InternalError(format!("Invalid price lookup base URL: {}", e))
        })?;
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("country", "US")
            .append_pair("sort_by", "RELEVANCE")
            .append_pair("page", "1")
            .append_pair("product_condition", "ALL")
            .append_pair("is_prime", "false")
            .append_pair("deals_and_discounts", "NONE");
        Ok(url)
    }

    /// Searches the external catalogue and reshapes each product.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<PriceResult>, ServiceError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ServiceError::ValidationError(
                "Query parameter is required".to_string(),
            ));
        }

        let settings = self.settings.as_ref().ok_or_else(|| {
            ServiceError::ServiceUnavailable("Price lookup is not configured".to_string())
        })?;

        let url = Self::search_url(settings, query)?;
        let response = self
            .client
            .get(url)
            .header("X-RapidAPI-Key", &settings.api_key)
            .header("X-RapidAPI-Host", &settings.api_host)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Price lookup request failed");
                ServiceError::ExternalServiceError(format!("Price lookup request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Price lookup API returned an error status");
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::ExternalApiError {
                message: format!("Price lookup API returned status {}", status.as_u16()),
                details: upstream_details(&body),
            });
        }

        let envelope: SearchEnvelope = response.json().await.map_err(|e| {
            error!(error = %e, "Price lookup response could not be decoded");
            ServiceError::external_api(format!("Invalid price lookup response: {}", e))
        })?;

        let results: Vec<PriceResult> = envelope
            .data
            .map(|d| d.products)
            .unwrap_or_default()
            .into_iter()
            .map(PriceResult::from)
            .collect();

        if results.is_empty() {
            return Err(ServiceError::NotFound("No products found.".to_string()));
        }

        info!(count = results.len(), "Price lookup returned products");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn settings(base_url: &str) -> PriceLookupSettings {
        PriceLookupSettings {
            api_key: "key".into(),
            api_host: "shop.example".into(),
            base_url: base_url.into(),
            timeout: Duration::from_secs(2),
        }
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let result = PriceResult::from(Product::default());
        assert_eq!(result.title, "N/A");
        assert_eq!(result.price, "N/A");
        assert_eq!(result.link, "");
        assert_eq!(result.image, "");
    }

    #[test]
    fn numeric_prices_are_rendered() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "product_title": "Widget",
            "product_price": 12.5,
        }))
        .unwrap();
        assert_eq!(PriceResult::from(product).price, "12.5");
    }

    #[test]
    fn search_url_carries_fixed_parameters() {
        let url = PriceLookupService::search_url(&settings("https://shop.example/"), "blue widget")
            .unwrap();
        assert_eq!(url.path(), "/search");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("query".into(), "blue widget".into())));
        assert!(pairs.contains(&("country".into(), "US".into())));
        assert!(pairs.contains(&("is_prime".into(), "false".into())));
        assert!(pairs.contains(&("deals_and_discounts".into(), "NONE".into())));
    }

    #[test]
    fn settings_require_key_and_host() {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".into(),
            "127.0.0.1".into(),
            8080,
            "development".into(),
        );
        assert!(PriceLookupSettings::from_config(&cfg).is_none());

        cfg.price_lookup_api_key = Some("key".into());
        cfg.price_lookup_api_host = Some("shop.example".into());
        let settings = PriceLookupSettings::from_config(&cfg).unwrap();
        assert_eq!(settings.base_url, "https://shop.example");
    }

    #[test]
    fn upstream_details_are_trimmed_and_capped() {
        assert_eq!(upstream_details("  \n"), None);
        assert_eq!(upstream_details(" quota exceeded \n").as_deref(), Some("quota exceeded"));
        let long = "é".repeat(MAX_DETAILS_CHARS + 10);
        assert_eq!(
            upstream_details(&long).map(|d| d.chars().count()),
            Some(MAX_DETAILS_CHARS)
        );
    }

    #[tokio::test]
    async fn unconfigured_lookup_is_unavailable() {
        let service = PriceLookupService::new(None).unwrap();
        assert_matches!(
            service.search("widget").await,
            Err(ServiceError::ServiceUnavailable(_))
        );
    }

    #[tokio::test]
    async fn blank_query_is_rejected_first() {
        let service = PriceLookupService::new(None).unwrap();
        assert_matches!(
            service.search("  ").await,
            Err(ServiceError::ValidationError(_))
        );
    }
}
