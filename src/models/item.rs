use crate::entities::item;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError, ValidationErrors};

pub const DEFAULT_CATEGORY: &str = "Uncategorized";

fn message_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

fn validate_item_name(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(message_error("name_required", "Item name is required"));
    }
    Ok(())
}

/// Largest price the `NUMERIC(12, 2)` column holds.
fn max_price() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

fn validate_price(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(message_error("price_min_zero", "Price cannot be negative"));
    }
    if *value > max_price() {
        return Err(message_error(
            "price_max",
            "Price cannot exceed 9999999999.99",
        ));
    }
    if value.normalize().scale() > 2 {
        return Err(message_error(
            "price_scale",
            "Price cannot have more than 2 decimal places",
        ));
    }
    Ok(())
}

/// Item fields a user supplies. The id and timestamp are server controlled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewItem {
    #[serde(default)]
    #[validate(custom = "validate_item_name")]
    #[schema(example = "Widget")]
    pub name: String,
    #[validate(
        required(message = "Quantity is required"),
        range(min = 1, message = "Quantity must be at least 1")
    )]
    #[schema(example = 3)]
    pub quantity: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom = "validate_price")]
    #[schema(value_type = Option<String>, example = "19.99")]
    pub price: Option<Decimal>,
}

impl NewItem {
    pub fn new(name: impl Into<String>, quantity: i32) -> Self {
        Self {
            name: name.into(),
            quantity: Some(quantity),
            ..Default::default()
        }
    }

    /// Category to store: the trimmed input, or the default when absent or blank.
    pub fn effective_category(&self) -> String {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY)
            .to_string()
    }

    fn effective_description(&self) -> Option<String> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
    }

    /// Builds the stored row. Call only after `validate` has passed.
    pub fn into_model(self, id: String, created_at: DateTime<Utc>) -> item::Model {
        let category = self.effective_category();
        let description = self.effective_description();
        item::Model {
            id,
            name: self.name.trim().to_string(),
            quantity: self.quantity.unwrap_or_default(),
            category,
            description,
            price: self.price,
            created_at,
        }
    }
}

/// Body of `POST /add-item`: a pre-minted id plus the item fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AddItemRequest {
    #[serde(default, alias = "_id")]
    #[schema(example = "0b9f3c7e-5d0a-4b8e-9a43-6f1f0e0c2a11")]
    pub id: String,
    #[serde(flatten)]
    pub item: NewItem,
}

impl AddItemRequest {
    pub fn new(id: impl Into<String>, item: NewItem) -> Self {
        Self {
            id: id.into(),
            item,
        }
    }
}

impl Validate for AddItemRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = match self.item.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        if self.id.trim().is_empty() {
            errors.add("id", message_error("id_required", "Item ID is required"));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GenerateIdResponse {
    pub unique_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddItemResponse {
    #[schema(example = "Item added successfully")]
    pub message: String,
    pub item_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchResultsResponse {
    pub results: Vec<item::Model>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ItemListResponse {
    pub items: Vec<item::Model>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClearListResponse {
    #[schema(example = "3 items cleared from the list.")]
    pub message: String,
    #[serde(default)]
    pub deleted_count: u64,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchItemParams {
    /// Case-insensitive substring of the item name
    pub keyword: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteItemParams {
    /// Identifier of the item to delete
    pub id: Option<String>,
}
