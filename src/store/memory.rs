//! In-memory backend for tests and database-less local runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    AddressStore, CategoryStore, FavoriteStore, ProductQuery, ProductStore, ProfileStore, StoreError,
    StoreResult,
};
use crate::domain::aggregates::{NewCategory, ProductDraft};
use crate::domain::services::addresses::NewAddress;
use crate::domain::services::product_filter::{sort_products, SortField, SortOrder};
use crate::{Address, Category, ProductView, Profile};

/// Operations that can be made to fail once, to exercise error paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailPoint {
    FavoriteExists,
    InsertFavorite,
    DeleteFavorite,
    InsertAddress,
    ClearDefault,
    MarkDefault,
}

#[derive(Debug, Default)]
struct Tables {
    products: Vec<ProductView>,
    categories: Vec<Category>,
    favorites: Vec<(Uuid, Uuid, DateTime<Utc>)>,
    addresses: Vec<Address>,
    admins: HashSet<Uuid>,
    profiles: Vec<Profile>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_points: Mutex<HashSet<FailPoint>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    /// The next call through `point` returns a backend error.
    pub async fn fail_once(&self, point: FailPoint) { self.fail_points.lock().await.insert(point); }

    pub async fn seed_products(&self, products: impl IntoIterator<Item = ProductView>) {
        self.tables.lock().await.products.extend(products);
    }

    pub async fn seed_categories(&self, categories: impl IntoIterator<Item = Category>) {
        self.tables.lock().await.categories.extend(categories);
    }

    pub async fn seed_profiles(&self, profiles: impl IntoIterator<Item = Profile>) {
        self.tables.lock().await.profiles.extend(profiles);
    }

    pub async fn grant_admin(&self, user_id: Uuid) { self.tables.lock().await.admins.insert(user_id); }

    async fn check(&self, point: FailPoint) -> StoreResult<()> {
        if self.fail_points.lock().await.remove(&point) {
            return Err(StoreError::Backend(format!("injected failure at {point:?}")));
        }
        Ok(())
    }
}

fn product_from_draft(id: Uuid, draft: &ProductDraft, created_at: DateTime<Utc>) -> ProductView {
    ProductView {
        id,
        name: draft.name.clone(),
        name_tr: draft.name_tr.clone(),
        description: draft.description.clone(),
        description_tr: draft.description_tr.clone(),
        price: draft.price,
        stock_quantity: draft.stock_quantity,
        image_url: draft.image_url.clone(),
        image_urls: draft.image_urls.clone(),
        category_id: draft.category_id,
        discount_rate: draft.discount_rate,
        created_at,
        updated_at: Utc::now(),
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn list_products(&self, query: &ProductQuery) -> StoreResult<Vec<ProductView>> {
        let tables = self.tables.lock().await;
        let mut products: Vec<ProductView> = tables
            .products
            .iter()
            .filter(|p| query.category_ids.is_empty() || query.category_ids.contains(&p.category_id))
            .cloned()
            .collect();
        let (field, order) = query.sort.unwrap_or((SortField::CreatedAt, SortOrder::Desc));
        sort_products(&mut products, field, order);
        Ok(products)
    }

    async fn get_product(&self, id: Uuid) -> StoreResult<Option<ProductView>> {
        Ok(self.tables.lock().await.products.iter().find(|p| p.id == id).cloned())
    }

    async fn insert_product(&self, draft: &ProductDraft) -> StoreResult<ProductView> {
        let product = product_from_draft(Uuid::now_v7(), draft, Utc::now());
        self.tables.lock().await.products.push(product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: Uuid, draft: &ProductDraft) -> StoreResult<ProductView> {
        let mut tables = self.tables.lock().await;
        let slot = tables.products.iter_mut().find(|p| p.id == id).ok_or(StoreError::NotFound)?;
        *slot = product_from_draft(id, draft, slot.created_at);
        Ok(slot.clone())
    }

    async fn delete_product(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        let before = tables.products.len();
        tables.products.retain(|p| p.id != id);
        if tables.products.len() == before { return Err(StoreError::NotFound); }
        tables.favorites.retain(|(_, product_id, _)| *product_id != id);
        Ok(())
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        Ok(self.tables.lock().await.categories.clone())
    }

    async fn insert_category(&self, category: &NewCategory) -> StoreResult<Category> {
        let mut tables = self.tables.lock().await;
        if tables.categories.iter().any(|c| c.slug == category.slug.as_str()) {
            return Err(StoreError::Conflict(format!("slug {} already exists", category.slug)));
        }
        let now = Utc::now();
        let created = Category {
            id: Uuid::now_v7(),
            name: category.name.clone(),
            name_tr: category.name_tr.clone(),
            slug: category.slug.as_str().to_string(),
            parent_id: category.parent_id,
            created_at: now,
            updated_at: now,
        };
        tables.categories.push(created.clone());
        Ok(created)
    }

    async fn delete_category(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        if tables.categories.iter().any(|c| c.parent_id == Some(id)) {
            return Err(StoreError::Conflict("category has subcategories".to_string()));
        }
        let before = tables.categories.len();
        tables.categories.retain(|c| c.id != id);
        if tables.categories.len() == before { return Err(StoreError::NotFound); }
        Ok(())
    }
}

#[async_trait]
impl FavoriteStore for MemoryStore {
    async fn favorite_exists(&self, user_id: Uuid, product_id: Uuid) -> StoreResult<bool> {
        self.check(FailPoint::FavoriteExists).await?;
        let tables = self.tables.lock().await;
        Ok(tables.favorites.iter().any(|(u, p, _)| *u == user_id && *p == product_id))
    }

    async fn insert_favorite(&self, user_id: Uuid, product_id: Uuid) -> StoreResult<()> {
        self.check(FailPoint::InsertFavorite).await?;
        let mut tables = self.tables.lock().await;
        if tables.favorites.iter().any(|(u, p, _)| *u == user_id && *p == product_id) {
            return Err(StoreError::Conflict("favorite already exists".to_string()));
        }
        tables.favorites.push((user_id, product_id, Utc::now()));
        Ok(())
    }

    async fn delete_favorite(&self, user_id: Uuid, product_id: Uuid) -> StoreResult<()> {
        self.check(FailPoint::DeleteFavorite).await?;
        self.tables.lock().await.favorites.retain(|(u, p, _)| !(*u == user_id && *p == product_id));
        Ok(())
    }

    async fn list_favorites(&self, user_id: Uuid) -> StoreResult<Vec<Uuid>> {
        let tables = self.tables.lock().await;
        Ok(tables.favorites.iter().rev().filter(|(u, _, _)| *u == user_id).map(|(_, p, _)| *p).collect())
    }
}

#[async_trait]
impl AddressStore for MemoryStore {
    async fn list_addresses(&self, user_id: Uuid) -> StoreResult<Vec<Address>> {
        let tables = self.tables.lock().await;
        Ok(tables.addresses.iter().filter(|a| a.user_id == user_id).cloned().collect())
    }

    async fn insert_address(&self, user_id: Uuid, address: &NewAddress, is_default: bool) -> StoreResult<Address> {
        self.check(FailPoint::InsertAddress).await?;
        let created = Address {
            id: Uuid::now_v7(),
            user_id,
            title: address.title.clone(),
            address_line1: address.address_line1.clone(),
            address_line2: address.address_line2.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            country: address.country.clone(),
            postal_code: address.postal_code.clone(),
            is_default,
            created_at: Utc::now(),
        };
        self.tables.lock().await.addresses.push(created.clone());
        Ok(created)
    }

    async fn clear_default(&self, user_id: Uuid) -> StoreResult<()> {
        self.check(FailPoint::ClearDefault).await?;
        let mut tables = self.tables.lock().await;
        for address in tables.addresses.iter_mut().filter(|a| a.user_id == user_id) {
            address.is_default = false;
        }
        Ok(())
    }

    async fn mark_default(&self, user_id: Uuid, address_id: Uuid) -> StoreResult<bool> {
        self.check(FailPoint::MarkDefault).await?;
        let mut tables = self.tables.lock().await;
        match tables.addresses.iter_mut().find(|a| a.id == address_id && a.user_id == user_id) {
            Some(address) => {
                address.is_default = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_address(&self, user_id: Uuid, address_id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.addresses.len();
        tables.addresses.retain(|a| !(a.id == address_id && a.user_id == user_id));
        Ok(tables.addresses.len() < before)
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn is_admin(&self, user_id: Uuid) -> StoreResult<bool> {
        let tables = self.tables.lock().await;
        Ok(tables.admins.contains(&user_id) || tables.profiles.iter().any(|p| p.id == user_id && p.is_admin))
    }

    async fn get_profile(&self, user_id: Uuid) -> StoreResult<Option<Profile>> {
        Ok(self.tables.lock().await.profiles.iter().find(|p| p.id == user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn draft(name_tr: &str, category_id: Uuid) -> ProductDraft {
        ProductDraft {
            name: name_tr.into(), name_tr: name_tr.into(), description: String::new(),
            description_tr: String::new(), price: Decimal::new(10, 0), stock_quantity: 1,
            image_url: "x".into(), image_urls: None, category_id, discount_rate: None,
        }
    }

    #[tokio::test]
    async fn test_product_crud_and_category_listing() {
        let store = MemoryStore::new();
        let (cat_a, cat_b) = (Uuid::new_v4(), Uuid::new_v4());
        let a = store.insert_product(&draft("Tasma", cat_a)).await.unwrap();
        store.insert_product(&draft("Mama", cat_b)).await.unwrap();

        let only_a = store.list_products(&ProductQuery::in_categories(vec![cat_a])).await.unwrap();
        assert_eq!(only_a.len(), 1);
        let by_name = store
            .list_products(&ProductQuery::default().sorted(SortField::NameTr, SortOrder::Asc))
            .await
            .unwrap();
        assert_eq!(by_name[0].name_tr, "Mama");

        let updated = store.update_product(a.id, &draft("Uzun Tasma", cat_a)).await.unwrap();
        assert_eq!(updated.created_at, a.created_at);
        store.delete_product(a.id).await.unwrap();
        assert!(matches!(store.delete_product(a.id).await, Err(StoreError::NotFound)));
        assert!(store.get_product(a.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fail_point_fires_once() {
        let store = MemoryStore::new();
        let (user, product) = (Uuid::new_v4(), Uuid::new_v4());
        store.fail_once(FailPoint::InsertFavorite).await;
        assert!(store.insert_favorite(user, product).await.is_err());
        store.insert_favorite(user, product).await.unwrap();
        assert!(matches!(store.insert_favorite(user, product).await, Err(StoreError::Conflict(_))));
    }
}
