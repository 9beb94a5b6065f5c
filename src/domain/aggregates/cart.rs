//! Cart Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::value_objects::Quantity;
use crate::ProductView;

/// One session's cart. At most one line per product id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cart {
    session_id: String,
    lines: Vec<CartLine>,
    total: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: Uuid,
    pub name: String,
    pub name_tr: String,
    pub price: Decimal,
    pub image_url: String,
    pub quantity: Quantity,
}

impl CartLine {
    pub fn from_product(product: &ProductView) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            name_tr: product.name_tr.clone(),
            price: product.price,
            image_url: product.image_url.clone(),
            quantity: Quantity::one(),
        }
    }

    pub fn line_total(&self) -> Decimal { self.price * Decimal::from(self.quantity.value()) }
}

impl Cart {
    pub fn new(session_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(), lines: vec![], total: Decimal::ZERO,
            created_at: now, updated_at: now,
        }
    }

    pub fn session_id(&self) -> &str { &self.session_id }
    pub fn lines(&self) -> &[CartLine] { &self.lines }
    pub fn line(&self, id: Uuid) -> Option<&CartLine> { self.lines.iter().find(|l| l.id == id) }
    pub fn line_count(&self) -> usize { self.lines.len() }
    pub fn item_count(&self) -> u32 { self.lines.iter().map(|l| l.quantity.value()).sum() }
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }
    pub fn total(&self) -> Decimal { self.total }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    /// Adds one unit of `product`, merging into an existing line (capped at the max quantity).
    pub fn add(&mut self, product: &ProductView) -> Quantity {
        let quantity = match self.lines.iter_mut().find(|l| l.id == product.id) {
            Some(existing) => {
                existing.quantity = existing.quantity.increment();
                existing.quantity
            }
            None => {
                let line = CartLine::from_product(product);
                let quantity = line.quantity;
                self.lines.push(line);
                quantity
            }
        };
        self.recalculate();
        quantity
    }

    /// Sets a line's quantity, clamped to `1..=10`. Returns `None` when no line exists.
    pub fn update_quantity(&mut self, id: Uuid, quantity: i64) -> Option<Quantity> {
        let line = self.lines.iter_mut().find(|l| l.id == id)?;
        line.quantity = Quantity::clamped(quantity);
        let quantity = line.quantity;
        self.recalculate();
        Some(quantity)
    }

    /// Removes the line for `id`. Absent ids are a no-op.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.id != id);
        let removed = self.lines.len() < before;
        if removed { self.recalculate(); }
        removed
    }

    pub fn clear(&mut self) { self.lines.clear(); self.recalculate(); }

    fn recalculate(&mut self) {
        self.total = self.lines.iter().map(CartLine::line_total).sum();
        self.updated_at = Utc::now();
    }
}

/// Carts keyed by session. A cart is opened on first use and dropped when the session ends.
#[derive(Debug, Default)]
pub struct CartSessions {
    carts: HashMap<String, Cart>,
}

impl CartSessions {
    pub fn new() -> Self { Self::default() }

    pub fn open(&mut self, session_id: &str) -> &mut Cart {
        self.carts
            .entry(session_id.to_string())
            .or_insert_with(|| {
                tracing::debug!(session_id, "opening cart");
                Cart::new(session_id)
            })
    }

    pub fn get(&self, session_id: &str) -> Option<&Cart> { self.carts.get(session_id) }

    /// Existing cart only; never opens one.
    pub fn get_mut(&mut self, session_id: &str) -> Option<&mut Cart> { self.carts.get_mut(session_id) }

    pub fn close(&mut self, session_id: &str) -> Option<Cart> { self.carts.remove(session_id) }

    pub fn len(&self) -> usize { self.carts.len() }
    pub fn is_empty(&self) -> bool { self.carts.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: i64) -> ProductView {
        let now = Utc::now();
        ProductView {
            id: Uuid::new_v4(), name: "Cat Food".into(), name_tr: "Kedi Maması".into(),
            description: String::new(), description_tr: String::new(), price: Decimal::new(price, 0),
            stock_quantity: 20, image_url: "https://cdn.example/cat.jpg".into(), image_urls: None,
            category_id: Uuid::new_v4(), discount_rate: None, created_at: now, updated_at: now,
        }
    }

    #[test]
    fn test_add_merges_lines() {
        let mut cart = Cart::new("s1");
        let p = product(100);
        for _ in 0..4 { cart.add(&p); }
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.line(p.id).unwrap().quantity.value(), 4);
    }

    #[test]
    fn test_add_caps_at_ten() {
        let mut cart = Cart::new("s1");
        let p = product(5);
        for _ in 0..15 { cart.add(&p); }
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.line(p.id).unwrap().quantity.value(), 10);
        assert_eq!(cart.total(), Decimal::new(50, 0));
    }

    #[test]
    fn test_total_scenario() {
        let mut cart = Cart::new("s1");
        let a = product(100);
        let b = product(50);
        cart.add(&a);
        cart.add(&a);
        cart.add(&b);
        assert_eq!(cart.total(), Decimal::new(250, 0));
        assert_eq!(cart.item_count(), 3);

        let free = product(0);
        cart.add(&free);
        assert_eq!(cart.total(), Decimal::new(250, 0));
    }

    #[test]
    fn test_update_quantity_clamps() {
        let mut cart = Cart::new("s1");
        let p = product(10);
        cart.add(&p);
        assert_eq!(cart.update_quantity(p.id, 7).map(Quantity::value), Some(7));
        assert_eq!(cart.total(), Decimal::new(70, 0));
        assert_eq!(cart.update_quantity(p.id, 0).map(Quantity::value), Some(1));
        assert_eq!(cart.update_quantity(p.id, 99).map(Quantity::value), Some(10));
        assert_eq!(cart.update_quantity(Uuid::new_v4(), 3), None);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut cart = Cart::new("s1");
        let a = product(10);
        let b = product(20);
        cart.add(&a);
        cart.add(&b);
        assert!(cart.remove(a.id));
        let after_first = cart.lines().to_vec();
        assert!(!cart.remove(a.id));
        assert_eq!(cart.lines(), after_first.as_slice());
        assert_eq!(cart.total(), Decimal::new(20, 0));
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new("s1");
        cart.add(&product(10));
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn test_sessions_lifecycle() {
        let mut sessions = CartSessions::new();
        let p = product(30);
        sessions.open("a").add(&p);
        sessions.open("a").add(&p);
        sessions.open("b");
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions.get("a").unwrap().item_count(), 2);
        assert!(sessions.get("b").unwrap().is_empty());
        let closed = sessions.close("a").unwrap();
        assert_eq!(closed.total(), Decimal::new(60, 0));
        assert!(sessions.get("a").is_none());
    }

    #[test]
    fn test_get_mut_does_not_open() {
        let mut sessions = CartSessions::new();
        assert!(sessions.get_mut("ghost").is_none());
        assert!(sessions.is_empty());

        sessions.open("a");
        let p = product(30);
        sessions.get_mut("a").unwrap().add(&p);
        assert_eq!(sessions.get("a").unwrap().line_count(), 1);
        assert_eq!(sessions.len(), 1);
    }
}
