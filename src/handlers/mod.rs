pub mod items;
pub mod price_lookup;
