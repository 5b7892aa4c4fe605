//! Outbound request layer used by every user-facing surface.
//!
//! All calls go to the primary service. Only count-items and clear-list may
//! be retried once against the fallback service, and only after a transport
//! failure or a non-success status. Every other operation surfaces the
//! primary's error unchanged.

pub mod dashboard;

pub use dashboard::{filter_items, InventoryStats, LOW_STOCK_THRESHOLD, RECENT_LIMIT};

use crate::{
    entities::item::Model as ItemModel,
    errors::ErrorResponse,
    models::{
        AddItemRequest, AddItemResponse, ClearListResponse, CountResponse, GenerateIdResponse,
        ItemListResponse, MessageResponse, NewItem, PriceLookupResponse, PriceResult,
        SearchResultsResponse,
    },
};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{fmt, time::Duration};
use tracing::{debug, instrument, warn};
use url::Url;
use validator::Validate;

pub const DEFAULT_PRIMARY_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Operations exposed by the inventory service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    GenerateId,
    AddItem,
    SearchItem,
    ViewList,
    CountItems,
    DeleteItem,
    ClearList,
    SearchOnline,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::GenerateId => "generate-id",
            Endpoint::AddItem => "add-item",
            Endpoint::SearchItem => "search-item",
            Endpoint::ViewList => "view-list",
            Endpoint::CountItems => "count-items",
            Endpoint::DeleteItem => "delete-item",
            Endpoint::ClearList => "clear-list",
            Endpoint::SearchOnline => "search-online",
        }
    }

    pub fn method(self) -> Method {
        match self {
            Endpoint::AddItem => Method::POST,
            Endpoint::DeleteItem | Endpoint::ClearList => Method::DELETE,
            _ => Method::GET,
        }
    }

    /// The fixed fallback allow-list.
    pub fn allows_fallback(self) -> bool {
        matches!(self, Endpoint::CountItems | Endpoint::ClearList)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Rejected locally; no request was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Request to {endpoint} failed: {message}")]
    Transport { endpoint: Endpoint, message: String },

    #[error("{endpoint} returned {status}: {message}")]
    Http {
        endpoint: Endpoint,
        status: u16,
        message: String,
    },

    #[error("Unexpected response from {endpoint}: {message}")]
    Decode { endpoint: Endpoint, message: String },

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Failures after which an allow-listed call is sent to the fallback.
    fn triggers_fallback(&self) -> bool {
        matches!(self, ClientError::Transport { .. } | ClientError::Http { .. })
    }

    /// HTTP status of an `Http` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(err: validator::ValidationErrors) -> Self {
        ClientError::Validation(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub primary_url: String,
    pub fallback_url: Option<String>,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            primary_url: DEFAULT_PRIMARY_URL.to_string(),
            fallback_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ClientError::Config(format!("invalid service URL {:?}: {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(ClientError::Config(format!(
            "service URL {:?} cannot be used as a base",
            raw
        )));
    }
    Ok(url)
}

/// Typed client for the inventory service and its fallback.
#[derive(Debug, Clone)]
pub struct InventoryClient {
    http: reqwest::Client,
    primary: Url,
    fallback: Option<Url>,
}

impl InventoryClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let primary = parse_base_url(&config.primary_url)?;
        let fallback = config
            .fallback_url
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(parse_base_url)
            .transpose()?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            primary,
            fallback,
        })
    }

    fn endpoint_url(base: &Url, endpoint: Endpoint, query: &[(&str, &str)]) -> Url {
        let mut url = base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(endpoint.path());
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }

    async fn send_to<T: DeserializeOwned>(
        &self,
        base: &Url,
        endpoint: Endpoint,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<T, ClientError> {
        let url = Self::endpoint_url(base, endpoint, query);
        debug!(%url, method = %endpoint.method(), "Sending inventory request");

        let mut request = self.http.request(endpoint.method(), url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| ClientError::Transport {
            endpoint,
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(status, response.text().await.unwrap_or_default());
            return Err(ClientError::Http {
                endpoint,
                status: status.as_u16(),
                message,
            });
        }

        response.json::<T>().await.map_err(|e| ClientError::Decode {
            endpoint,
            message: e.to_string(),
        })
    }

    /// Calls the primary, then the fallback once for allow-listed endpoints.
    async fn call<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<T, ClientError> {
        let err = match self.send_to(&self.primary, endpoint, query, body).await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        match &self.fallback {
            Some(fallback) if endpoint.allows_fallback() && err.triggers_fallback() => {
                warn!(
                    %endpoint,
                    error = %err,
                    fallback = %fallback,
                    "Primary service failed; retrying against fallback"
                );
                self.send_to(fallback, endpoint, query, body).await
            }
            _ => Err(err),
        }
    }

    #[instrument(skip(self))]
    pub async fn generate_id(&self) -> Result<String, ClientError> {
        let response: GenerateIdResponse = self.call(Endpoint::GenerateId, &[], None).await?;
        Ok(response.unique_id)
    }

    /// Validates `item`, mints an id, then stores the item under it.
    #[instrument(skip(self, item), fields(name = %item.name))]
    pub async fn add_item(&self, item: NewItem) -> Result<AddItemResponse, ClientError> {
        item.validate()?;

        let id = self.generate_id().await?;
        let body = serde_json::to_value(AddItemRequest::new(id, item)).map_err(|e| {
            ClientError::Validation(format!("item could not be encoded: {}", e))
        })?;
        self.call(Endpoint::AddItem, &[], Some(&body)).await
    }

    #[instrument(skip(self))]
    pub async fn search_items(&self, keyword: &str) -> Result<Vec<ItemModel>, ClientError> {
        let response: SearchResultsResponse = self
            .call(Endpoint::SearchItem, &[("keyword", keyword)], None)
            .await?;
        Ok(response.results)
    }

    #[instrument(skip(self))]
    pub async fn view_list(&self) -> Result<Vec<ItemModel>, ClientError> {
        let response: ItemListResponse = self.call(Endpoint::ViewList, &[], None).await?;
        Ok(response.items)
    }

    #[instrument(skip(self))]
    pub async fn count_items(&self) -> Result<u64, ClientError> {
        let response: CountResponse = self.call(Endpoint::CountItems, &[], None).await?;
        Ok(response.count)
    }

    /// Summary of the inventory. The total comes from count-items, so it can
    /// still be served by the fallback; the item list needs the primary.
    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<InventoryStats, ClientError> {
        let total = self.count_items().await?;
        let items = self.view_list().await?;
        Ok(InventoryStats::summarize(total, &items))
    }

    #[instrument(skip(self))]
    pub async fn delete_item(&self, id: &str) -> Result<String, ClientError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ClientError::Validation("Item ID is required".to_string()));
        }
        let response: MessageResponse = self
            .call(Endpoint::DeleteItem, &[("id", id)], None)
            .await?;
        Ok(response.message)
    }

    #[instrument(skip(self))]
    pub async fn clear_list(&self) -> Result<ClearListResponse, ClientError> {
        self.call(Endpoint::ClearList, &[], None).await
    }

    #[instrument(skip(self))]
    pub async fn search_online(&self, query: &str) -> Result<Vec<PriceResult>, ClientError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ClientError::Validation(
                "Search query is required".to_string(),
            ));
        }
        let response: PriceLookupResponse = self
            .call(Endpoint::SearchOnline, &[("query", query)], None)
            .await?;
        Ok(response.results)
    }
}

/// Message from the error envelope when present, else the raw body or reason phrase.
fn error_message(status: StatusCode, body: String) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorResponse>(&body) {
        return envelope.message;
    }
    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    } else {
        body.to_string()
    }
}
