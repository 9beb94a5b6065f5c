//! Aggregates module
pub mod cart;
pub mod category;
pub mod product;

pub use cart::{Cart, CartLine, CartSessions};
pub use category::{CategoryDraft, CategoryNode, CategoryTree, NewCategory};
pub use product::ProductDraft;
