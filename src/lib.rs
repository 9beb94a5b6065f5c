//! Pati storefront core
//!
//! Client-side state engines for a bilingual (Turkish/English) pet-products
//! storefront. Persistence, authentication and row-level authorization live in
//! a hosted backend; this crate holds the rule-governed parts.
//!
//! ## Features
//! - Session cart with merge and quantity invariants
//! - Product filter/sort pipeline for catalog and admin views
//! - Favorite toggling with revert on failed writes
//! - Single-default address enforcement with a repair routine
//! - Two-level category tree, slugs and discount pricing

pub mod config;
pub mod domain;
pub mod store;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::value_objects::SlugError;
use crate::store::StoreError;

// =============================================================================
// Read Models
// =============================================================================

/// Product record as exposed by the backend. Treated as immutable input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductView {
    pub id: Uuid,
    pub name: String,
    pub name_tr: String,
    pub description: String,
    pub description_tr: String,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub image_url: String,
    pub image_urls: Option<Vec<String>>,
    pub category_id: Uuid,
    pub discount_rate: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Catalog category. `parent_id` is `None` for roots; children point at a root.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub name_tr: String,
    pub slug: String,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Address {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Sign-in required")]
    AuthRequired,

    #[error("Address not found: {0}")]
    AddressNotFound(Uuid),

    #[error("Category not found: {0}")]
    CategoryNotFound(Uuid),

    #[error("Category {0} is a subcategory; only two levels are supported")]
    CategoryTooDeep(Uuid),

    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid slug: {0}")]
    Slug(#[from] SlugError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
