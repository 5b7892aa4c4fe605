pub mod item;

pub use item::{Entity as Item, Model as ItemModel};
