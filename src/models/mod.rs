//! Request and response bodies shared by the HTTP handlers and the client.

pub mod item;
pub mod price;

pub use item::{
    AddItemRequest, AddItemResponse, ClearListResponse, CountResponse, DeleteItemParams,
    GenerateIdResponse, ItemListResponse, MessageResponse, NewItem, SearchItemParams,
    SearchResultsResponse, DEFAULT_CATEGORY,
};
pub use price::{PriceLookupResponse, PriceResult, SearchOnlineParams};
