//! Product filter/sort pipeline.
//!
//! Stages run in a fixed order: search, category, stock, discount, sort. Each
//! stage is a pure function of the previous stage's output. Unknown criteria
//! values disable their stage instead of failing, so a stale query string
//! still renders a list.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::value_objects::{fold_case_tr, fold_search};
use crate::ProductView;

/// Stock strictly above this counts as "in stock". 1..=10 is neither in nor out.
pub const IN_STOCK_THRESHOLD: i32 = 10;
/// Upper bound of the admin dashboard's "low stock" bucket.
pub const LOW_STOCK_THRESHOLD: i32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockFilter { InStock, OutOfStock }

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountFilter { Discounted, NotDiscounted }

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField { NameTr, Price, StockQuantity, DiscountRate, CreatedAt }

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for StockFilter {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_stock" => Ok(Self::InStock),
            "out_of_stock" => Ok(Self::OutOfStock),
            _ => Err(()),
        }
    }
}

impl FromStr for DiscountFilter {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "discounted" => Ok(Self::Discounted),
            "not_discounted" => Ok(Self::NotDiscounted),
            _ => Err(()),
        }
    }
}

impl FromStr for SortField {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name_tr" => Ok(Self::NameTr),
            "price" => Ok(Self::Price),
            "stock_quantity" => Ok(Self::StockQuantity),
            "discount_rate" => Ok(Self::DiscountRate),
            "created_at" => Ok(Self::CreatedAt),
            _ => Err(()),
        }
    }
}

impl FromStr for SortOrder {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    pub search_term: String,
    #[serde(deserialize_with = "lenient")]
    pub category_id: Option<Uuid>,
    #[serde(deserialize_with = "lenient")]
    pub stock_filter: Option<StockFilter>,
    #[serde(deserialize_with = "lenient")]
    pub discount_filter: Option<DiscountFilter>,
    #[serde(deserialize_with = "lenient")]
    pub sort_field: Option<SortField>,
    #[serde(deserialize_with = "lenient_order")]
    pub sort_order: SortOrder,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.trim().parse().ok()))
}

fn lenient_order<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SortOrder, D::Error> {
    Ok(lenient(deserializer)?.unwrap_or_default())
}

/// Runs every stage and returns the derived, ordered view.
pub fn filter_products(products: &[ProductView], criteria: &FilterCriteria) -> Vec<ProductView> {
    let term = fold_search(&criteria.search_term);
    let mut out: Vec<ProductView> = products
        .iter()
        .filter(|p| matches_search(p, &term))
        .filter(|p| criteria.category_id.map_or(true, |id| p.category_id == id))
        .filter(|p| criteria.stock_filter.map_or(true, |f| matches_stock(p, f)))
        .filter(|p| criteria.discount_filter.map_or(true, |f| matches_discount(p, f)))
        .cloned()
        .collect();
    if let Some(field) = criteria.sort_field {
        sort_products(&mut out, field, criteria.sort_order);
    }
    out
}

fn matches_search(product: &ProductView, folded_term: &str) -> bool {
    if folded_term.is_empty() {
        return true;
    }
    [&product.name, &product.name_tr, &product.description, &product.description_tr]
        .iter()
        .any(|field| fold_search(field).contains(folded_term))
}

pub fn matches_stock(product: &ProductView, filter: StockFilter) -> bool {
    match filter {
        StockFilter::InStock => product.stock_quantity > IN_STOCK_THRESHOLD,
        StockFilter::OutOfStock => product.stock_quantity == 0,
    }
}

pub fn matches_discount(product: &ProductView, filter: DiscountFilter) -> bool {
    let discounted = product.discount_rate.map_or(false, |r| r > Decimal::ZERO);
    match filter {
        DiscountFilter::Discounted => discounted,
        DiscountFilter::NotDiscounted => !discounted,
    }
}

/// Stable sort; ties keep their incoming order.
pub fn sort_products(products: &mut [ProductView], field: SortField, order: SortOrder) {
    products.sort_by(|a, b| {
        let ord = compare(a, b, field);
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

fn compare(a: &ProductView, b: &ProductView, field: SortField) -> Ordering {
    match field {
        SortField::NameTr => collation_key(&a.name_tr).cmp(&collation_key(&b.name_tr)),
        SortField::Price => a.price.cmp(&b.price),
        SortField::StockQuantity => a.stock_quantity.cmp(&b.stock_quantity),
        SortField::DiscountRate => {
            a.discount_rate.unwrap_or(Decimal::ZERO).cmp(&b.discount_rate.unwrap_or(Decimal::ZERO))
        }
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
    }
}

const TR_ALPHABET: &str = "abcçdefgğhıijklmnoöpqrsştuüvwxyz";

/// Case-insensitive Turkish collation: ASCII punctuation and digits first, then
/// letters in Turkish alphabet order, then anything else by code point.
fn collation_key(text: &str) -> Vec<u32> {
    fold_case_tr(text)
        .chars()
        .map(|c| match TR_ALPHABET.chars().position(|l| l == c) {
            Some(rank) => 0x1_0000 + rank as u32,
            None if c.is_ascii() => c as u32,
            None => 0x2_0000 + c as u32,
        })
        .collect()
}

/// Counts shown on the admin dashboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct InventoryStats {
    pub total: usize,
    pub low_stock: usize,
    pub out_of_stock: usize,
}

impl InventoryStats {
    pub fn from_products(products: &[ProductView]) -> Self {
        Self {
            total: products.len(),
            low_stock: products
                .iter()
                .filter(|p| p.stock_quantity > 0 && p.stock_quantity <= LOW_STOCK_THRESHOLD)
                .count(),
            out_of_stock: products.iter().filter(|p| p.stock_quantity == 0).count(),
        }
    }
}
