//! Postgres adapter for the hosted backend's tables.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

use super::{
    AddressStore, CategoryStore, FavoriteStore, ProductQuery, ProductStore, ProfileStore, StoreError,
    StoreResult,
};
use crate::domain::aggregates::{NewCategory, ProductDraft};
use crate::domain::services::addresses::NewAddress;
use crate::domain::services::product_filter::{SortField, SortOrder};
use crate::{Address, Category, ProductView, Profile};

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new().max_connections(max_connections).connect(url).await?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

fn order_clause(sort: Option<(SortField, SortOrder)>) -> String {
    let (field, order) = sort.unwrap_or((SortField::CreatedAt, SortOrder::Desc));
    let column = match field {
        SortField::NameTr => "name_tr",
        SortField::Price => "price",
        SortField::StockQuantity => "stock_quantity",
        SortField::DiscountRate => "COALESCE(discount_rate, 0)",
        SortField::CreatedAt => "created_at",
    };
    let direction = match order { SortOrder::Asc => "ASC", SortOrder::Desc => "DESC" };
    format!(" ORDER BY {column} {direction}, id")
}

fn unique_to_conflict(e: sqlx::Error, what: &str) -> StoreError {
    match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => StoreError::Conflict(format!("{what} already exists")),
        e => e.into(),
    }
}

#[async_trait]
impl ProductStore for PgStore {
    async fn list_products(&self, query: &ProductQuery) -> StoreResult<Vec<ProductView>> {
        let mut sql = String::from("SELECT * FROM products");
        if !query.category_ids.is_empty() {
            sql.push_str(" WHERE category_id = ANY($1)");
        }
        sql.push_str(&order_clause(query.sort));
        let mut q = sqlx::query_as::<_, ProductView>(&sql);
        if !query.category_ids.is_empty() {
            q = q.bind(query.category_ids.clone());
        }
        Ok(q.fetch_all(&self.pool).await?)
    }

    async fn get_product(&self, id: Uuid) -> StoreResult<Option<ProductView>> {
        Ok(sqlx::query_as::<_, ProductView>("SELECT * FROM products WHERE id = $1").bind(id).fetch_optional(&self.pool).await?)
    }

    async fn insert_product(&self, d: &ProductDraft) -> StoreResult<ProductView> {
        Ok(sqlx::query_as::<_, ProductView>("INSERT INTO products (id, name, name_tr, description, description_tr, price, stock_quantity, image_url, image_urls, category_id, discount_rate, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW(), NOW()) RETURNING *")
            .bind(Uuid::now_v7()).bind(&d.name).bind(&d.name_tr).bind(&d.description).bind(&d.description_tr)
            .bind(d.price).bind(d.stock_quantity).bind(&d.image_url).bind(&d.image_urls).bind(d.category_id).bind(d.discount_rate)
            .fetch_one(&self.pool).await?)
    }

    async fn update_product(&self, id: Uuid, d: &ProductDraft) -> StoreResult<ProductView> {
        sqlx::query_as::<_, ProductView>("UPDATE products SET name = $2, name_tr = $3, description = $4, description_tr = $5, price = $6, stock_quantity = $7, image_url = $8, image_urls = $9, category_id = $10, discount_rate = $11, updated_at = NOW() WHERE id = $1 RETURNING *")
            .bind(id).bind(&d.name).bind(&d.name_tr).bind(&d.description).bind(&d.description_tr)
            .bind(d.price).bind(d.stock_quantity).bind(&d.image_url).bind(&d.image_urls).bind(d.category_id).bind(d.discount_rate)
            .fetch_optional(&self.pool).await?.ok_or(StoreError::NotFound)
    }

    async fn delete_product(&self, id: Uuid) -> StoreResult<()> {
        let done = sqlx::query("DELETE FROM products WHERE id = $1").bind(id).execute(&self.pool).await?;
        if done.rows_affected() == 0 { return Err(StoreError::NotFound); }
        Ok(())
    }
}

#[async_trait]
impl CategoryStore for PgStore {
    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        Ok(sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name_tr").fetch_all(&self.pool).await?)
    }

    async fn insert_category(&self, c: &NewCategory) -> StoreResult<Category> {
        sqlx::query_as::<_, Category>("INSERT INTO categories (id, name, name_tr, slug, parent_id, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, NOW(), NOW()) RETURNING *")
            .bind(Uuid::now_v7()).bind(&c.name).bind(&c.name_tr).bind(c.slug.as_str()).bind(c.parent_id)
            .fetch_one(&self.pool).await.map_err(|e| unique_to_conflict(e, "category slug"))
    }

    async fn delete_category(&self, id: Uuid) -> StoreResult<()> {
        let done = sqlx::query("DELETE FROM categories WHERE id = $1").bind(id).execute(&self.pool).await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => StoreError::Conflict("category still referenced".to_string()),
                e => e.into(),
            })?;
        if done.rows_affected() == 0 { return Err(StoreError::NotFound); }
        Ok(())
    }
}

#[async_trait]
impl FavoriteStore for PgStore {
    async fn favorite_exists(&self, user_id: Uuid, product_id: Uuid) -> StoreResult<bool> {
        Ok(sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM favorites WHERE user_id = $1 AND product_id = $2)")
            .bind(user_id).bind(product_id).fetch_one(&self.pool).await?)
    }

    async fn insert_favorite(&self, user_id: Uuid, product_id: Uuid) -> StoreResult<()> {
        sqlx::query("INSERT INTO favorites (id, user_id, product_id, created_at) VALUES ($1, $2, $3, NOW())")
            .bind(Uuid::now_v7()).bind(user_id).bind(product_id)
            .execute(&self.pool).await.map_err(|e| unique_to_conflict(e, "favorite"))?;
        Ok(())
    }

    async fn delete_favorite(&self, user_id: Uuid, product_id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND product_id = $2").bind(user_id).bind(product_id).execute(&self.pool).await?;
        Ok(())
    }

    async fn list_favorites(&self, user_id: Uuid) -> StoreResult<Vec<Uuid>> {
        Ok(sqlx::query_scalar::<_, Uuid>("SELECT product_id FROM favorites WHERE user_id = $1 ORDER BY created_at DESC")
            .bind(user_id).fetch_all(&self.pool).await?)
    }
}

const INSERT_ADDRESS: &str = "INSERT INTO addresses (id, user_id, title, address_line1, address_line2, city, state, country, postal_code, is_default, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW()) RETURNING *";
const CLEAR_DEFAULT: &str = "UPDATE addresses SET is_default = FALSE WHERE user_id = $1 AND is_default";
const MARK_DEFAULT: &str = "UPDATE addresses SET is_default = TRUE WHERE id = $1 AND user_id = $2";

fn insert_address_query<'q>(user_id: Uuid, a: &'q NewAddress, is_default: bool) -> sqlx::query::QueryAs<'q, sqlx::Postgres, Address, sqlx::postgres::PgArguments> {
    sqlx::query_as::<_, Address>(INSERT_ADDRESS)
        .bind(Uuid::now_v7()).bind(user_id).bind(&a.title).bind(&a.address_line1).bind(&a.address_line2)
        .bind(&a.city).bind(&a.state).bind(&a.country).bind(&a.postal_code).bind(is_default)
}

#[async_trait]
impl AddressStore for PgStore {
    async fn list_addresses(&self, user_id: Uuid) -> StoreResult<Vec<Address>> {
        Ok(sqlx::query_as::<_, Address>("SELECT * FROM addresses WHERE user_id = $1 ORDER BY is_default DESC, created_at DESC")
            .bind(user_id).fetch_all(&self.pool).await?)
    }

    async fn insert_address(&self, user_id: Uuid, address: &NewAddress, is_default: bool) -> StoreResult<Address> {
        Ok(insert_address_query(user_id, address, is_default).fetch_one(&self.pool).await?)
    }

    async fn clear_default(&self, user_id: Uuid) -> StoreResult<()> {
        sqlx::query(CLEAR_DEFAULT).bind(user_id).execute(&self.pool).await?;
        Ok(())
    }

    async fn mark_default(&self, user_id: Uuid, address_id: Uuid) -> StoreResult<bool> {
        let done = sqlx::query(MARK_DEFAULT).bind(address_id).bind(user_id).execute(&self.pool).await?;
        Ok(done.rows_affected() > 0)
    }

    async fn delete_address(&self, user_id: Uuid, address_id: Uuid) -> StoreResult<bool> {
        let done = sqlx::query("DELETE FROM addresses WHERE id = $1 AND user_id = $2").bind(address_id).bind(user_id).execute(&self.pool).await?;
        Ok(done.rows_affected() > 0)
    }

    async fn replace_default(&self, user_id: Uuid, address_id: Uuid) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(CLEAR_DEFAULT).bind(user_id).execute(&mut *tx).await?;
        let marked = sqlx::query(MARK_DEFAULT).bind(address_id).bind(user_id).execute(&mut *tx).await?;
        if marked.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(StoreError::NotFound);
        }
        tx.commit().await?;
        Ok(())
    }

    async fn insert_default_address(&self, user_id: Uuid, address: &NewAddress) -> StoreResult<Address> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(CLEAR_DEFAULT).bind(user_id).execute(&mut *tx).await?;
        let created = insert_address_query(user_id, address, true).fetch_one(&mut *tx).await?;
        tx.commit().await?;
        Ok(created)
    }
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn is_admin(&self, user_id: Uuid) -> StoreResult<bool> {
        let flag = sqlx::query_scalar::<_, bool>("SELECT is_admin FROM profiles WHERE id = $1")
            .bind(user_id).fetch_optional(&self.pool).await?;
        Ok(flag.unwrap_or(false))
    }

    async fn get_profile(&self, user_id: Uuid) -> StoreResult<Option<Profile>> {
        Ok(sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1").bind(user_id).fetch_optional(&self.pool).await?)
    }
}
