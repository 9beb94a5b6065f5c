//! Boundary to the hosted backend.
//!
//! The engines only see these traits. [`MemoryStore`] backs tests and local
//! runs without a database; [`PgStore`] talks to the backend's Postgres.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::aggregates::{NewCategory, ProductDraft};
use crate::domain::services::addresses::NewAddress;
use crate::domain::services::product_filter::{SortField, SortOrder};
use crate::{Address, Category, ProductView, Profile};

pub use memory::{FailPoint, MemoryStore};
pub use postgres::PgStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Record not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Product read request. An empty `category_ids` means every category.
#[derive(Clone, Debug, Default)]
pub struct ProductQuery {
    pub category_ids: Vec<Uuid>,
    pub sort: Option<(SortField, SortOrder)>,
}

impl ProductQuery {
    pub fn in_categories(category_ids: Vec<Uuid>) -> Self { Self { category_ids, sort: None } }
    pub fn sorted(mut self, field: SortField, order: SortOrder) -> Self {
        self.sort = Some((field, order));
        self
    }
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn list_products(&self, query: &ProductQuery) -> StoreResult<Vec<ProductView>>;
    async fn get_product(&self, id: Uuid) -> StoreResult<Option<ProductView>>;
    async fn insert_product(&self, draft: &ProductDraft) -> StoreResult<ProductView>;
    async fn update_product(&self, id: Uuid, draft: &ProductDraft) -> StoreResult<ProductView>;
    async fn delete_product(&self, id: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn list_categories(&self) -> StoreResult<Vec<Category>>;
    async fn insert_category(&self, category: &NewCategory) -> StoreResult<Category>;
    async fn delete_category(&self, id: Uuid) -> StoreResult<()>;
}

/// `(user_id, product_id)` membership relation. Pair uniqueness is the backend's job.
#[async_trait]
pub trait FavoriteStore: Send + Sync {
    async fn favorite_exists(&self, user_id: Uuid, product_id: Uuid) -> StoreResult<bool>;
    async fn insert_favorite(&self, user_id: Uuid, product_id: Uuid) -> StoreResult<()>;
    async fn delete_favorite(&self, user_id: Uuid, product_id: Uuid) -> StoreResult<()>;
    async fn list_favorites(&self, user_id: Uuid) -> StoreResult<Vec<Uuid>>;
}

#[async_trait]
pub trait AddressStore: Send + Sync {
    async fn list_addresses(&self, user_id: Uuid) -> StoreResult<Vec<Address>>;
    async fn insert_address(&self, user_id: Uuid, address: &NewAddress, is_default: bool) -> StoreResult<Address>;
    async fn clear_default(&self, user_id: Uuid) -> StoreResult<()>;
    /// Flags one address as default. `false` when it does not exist for the user.
    async fn mark_default(&self, user_id: Uuid, address_id: Uuid) -> StoreResult<bool>;
    async fn delete_address(&self, user_id: Uuid, address_id: Uuid) -> StoreResult<bool>;

    /// Makes `address_id` the only default.
    ///
    /// This body is two separate writes: a failure or a concurrent read between
    /// them observes no default at all. Backends with transactions override it.
    async fn replace_default(&self, user_id: Uuid, address_id: Uuid) -> StoreResult<()> {
        self.clear_default(user_id).await?;
        if !self.mark_default(user_id, address_id).await? {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    /// Inserts `address` as the user's only default. Same two-step caveat as [`replace_default`](Self::replace_default).
    async fn insert_default_address(&self, user_id: Uuid, address: &NewAddress) -> StoreResult<Address> {
        self.clear_default(user_id).await?;
        self.insert_address(user_id, address, true).await
    }
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn is_admin(&self, user_id: Uuid) -> StoreResult<bool>;
    async fn get_profile(&self, user_id: Uuid) -> StoreResult<Option<Profile>>;
}

/// Everything the storefront needs from the backend.
pub trait Store: ProductStore + CategoryStore + FavoriteStore + AddressStore + ProfileStore {}

impl<T> Store for T where T: ProductStore + CategoryStore + FavoriteStore + AddressStore + ProfileStore {}
