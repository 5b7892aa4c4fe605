pub mod items;
pub mod price_lookup;

pub use items::ItemService;
pub use price_lookup::{PriceLookupService, PriceLookupSettings};
