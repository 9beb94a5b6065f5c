//! Engines that combine aggregates with the backend store
pub mod addresses;
pub mod favorites;
pub mod product_filter;

pub use addresses::{AddressBook, NewAddress};
pub use favorites::Favorites;
pub use product_filter::{filter_products, FilterCriteria, InventoryStats, SortField, SortOrder};
