//! Pati storefront - HTTP service over the storefront engines

use anyhow::Result;
use axum::{
    extract::{FromRequestParts, Path, Query, Request, State},
    http::{request::Parts, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;
use validator::Validate;

use pati_storefront::config::AppConfig;
use pati_storefront::domain::aggregates::{Cart, CartSessions, CategoryDraft, CategoryTree, ProductDraft};
use pati_storefront::domain::events::DomainEvent;
use pati_storefront::domain::services::{filter_products, AddressBook, Favorites, FilterCriteria, InventoryStats, NewAddress};
use pati_storefront::store::{CategoryStore, MemoryStore, PgStore, ProductQuery, ProductStore, ProfileStore, Store, StoreError};
use pati_storefront::{Address, Category, ProductView, Profile, StorefrontError};

const USER_HEADER: &str = "x-user-id";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub carts: Arc<RwLock<CartSessions>>,
    pub nats: Option<async_nats::Client>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();
    let config = AppConfig::from_env()?;

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            let pg = PgStore::connect(url, config.max_db_connections).await?;
            pg.migrate().await?;
            Arc::new(pg)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };
    let nats = match &config.nats_url {
        Some(url) => async_nats::connect(url.as_str()).await.map_err(|e| tracing::warn!(error = %e, "NATS unavailable, events disabled")).ok(),
        None => None,
    };
    let state = AppState { store, carts: Arc::new(RwLock::new(CartSessions::new())), nats };

    let app = router(state);

    let addr = config.bind_addr();
    tracing::info!("Pati storefront listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}

fn router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/products", post(create_product))
        .route("/products/:id", put(update_product).delete(delete_product))
        .route("/categories", post(create_category))
        .route("/categories/:id", axum::routing::delete(delete_category))
        .route("/stats", get(inventory_stats))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "pati-storefront"})) }))
        .route("/api/v1/products", get(list_products))
        .route("/api/v1/products/:id", get(get_product))
        .route("/api/v1/categories", get(list_categories))
        .route("/api/v1/categories/tree", get(category_tree))
        .route("/api/v1/categories/:slug/products", get(category_products))
        .route("/api/v1/categories/:slug/:subslug/products", get(subcategory_products))
        .route("/api/v1/cart/:session", get(get_cart).post(add_to_cart).delete(clear_cart))
        .route("/api/v1/cart/:session/items/:id", put(update_cart_item).delete(remove_cart_item))
        .route("/api/v1/profile", get(get_profile))
        .route("/api/v1/favorites", get(list_favorites))
        .route("/api/v1/favorites/:product_id", get(is_favorite).post(toggle_favorite))
        .route("/api/v1/addresses", get(list_addresses).post(create_address))
        .route("/api/v1/addresses/repair", post(repair_addresses))
        .route("/api/v1/addresses/:id", axum::routing::delete(delete_address))
        .route("/api/v1/addresses/:id/default", put(set_default_address))
        .nest("/api/v1/admin", admin)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()))
        .with_state(state)
}

type ApiResult<T> = std::result::Result<T, (StatusCode, String)>;

fn reject(e: StorefrontError) -> (StatusCode, String) {
    let status = match &e {
        StorefrontError::AuthRequired => StatusCode::UNAUTHORIZED,
        StorefrontError::AddressNotFound(_) | StorefrontError::CategoryNotFound(_) | StorefrontError::ProductNotFound(_) => StatusCode::NOT_FOUND,
        StorefrontError::CategoryTooDeep(_) | StorefrontError::Validation(_) | StorefrontError::Slug(_) => StatusCode::UNPROCESSABLE_ENTITY,
        StorefrontError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
        StorefrontError::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
        StorefrontError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!(error = %e, "request failed");
    }
    (status, e.to_string())
}

fn store_err(e: StoreError) -> (StatusCode, String) { reject(e.into()) }

async fn publish(nats: &Option<async_nats::Client>, events: Vec<DomainEvent>) {
    let Some(client) = nats else { return };
    for event in events {
        let payload = match serde_json::to_vec(&event) {
            Ok(payload) => payload,
            Err(e) => { tracing::warn!(error = %e, "event not serializable"); continue; }
        };
        if let Err(e) = client.publish(event.subject().to_string(), payload.into()).await {
            tracing::warn!(subject = event.subject(), error = %e, "event publish failed");
        }
    }
}

/// Caller identity from the session layer. Absent header means anonymous.
pub struct CurrentUser(Option<Uuid>);

impl CurrentUser {
    fn require(&self) -> ApiResult<Uuid> { self.0.ok_or_else(|| reject(StorefrontError::AuthRequired)) }
}

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> ApiResult<Self> {
        let Some(value) = parts.headers.get(USER_HEADER) else { return Ok(Self(None)) };
        value.to_str().ok().and_then(|v| Uuid::parse_str(v.trim()).ok()).map(|id| Self(Some(id)))
            .ok_or((StatusCode::BAD_REQUEST, format!("Malformed {USER_HEADER} header")))
    }
}

async fn require_admin(State(s): State<AppState>, user: CurrentUser, req: Request, next: Next) -> ApiResult<Response> {
    let user_id = user.require()?;
    if !s.store.is_admin(user_id).await.map_err(store_err)? {
        return Err((StatusCode::FORBIDDEN, "Admin only".to_string()));
    }
    Ok(next.run(req).await)
}

async fn load_tree(s: &AppState) -> ApiResult<CategoryTree> {
    let categories = s.store.list_categories().await.map_err(store_err)?;
    CategoryTree::build(categories).map_err(reject)
}

// Catalog

async fn list_products(State(s): State<AppState>, Query(criteria): Query<FilterCriteria>) -> ApiResult<Json<Vec<ProductView>>> {
    let products = s.store.list_products(&ProductQuery::default()).await.map_err(store_err)?;
    Ok(Json(filter_products(&products, &criteria)))
}

async fn get_product(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<ProductView>> {
    s.store.get_product(id).await.map_err(store_err)?.map(Json).ok_or_else(|| reject(StorefrontError::ProductNotFound(id)))
}

async fn list_categories(State(s): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(s.store.list_categories().await.map_err(store_err)?))
}

async fn category_tree(State(s): State<AppState>) -> ApiResult<Json<CategoryTree>> {
    Ok(Json(load_tree(&s).await?))
}

async fn branch_products(s: &AppState, ids: Vec<Uuid>, criteria: &FilterCriteria) -> ApiResult<Json<Vec<ProductView>>> {
    let products = s.store.list_products(&ProductQuery::in_categories(ids)).await.map_err(store_err)?;
    Ok(Json(filter_products(&products, criteria)))
}

async fn category_products(State(s): State<AppState>, Path(slug): Path<String>, Query(criteria): Query<FilterCriteria>) -> ApiResult<Json<Vec<ProductView>>> {
    let tree = load_tree(&s).await?;
    let node = tree.find_by_slug(&slug).ok_or((StatusCode::NOT_FOUND, format!("Category not found: {slug}")))?;
    let ids = tree.branch_ids(node.category.id).unwrap_or_else(|| vec![node.category.id]);
    branch_products(&s, ids, &criteria).await
}

async fn subcategory_products(State(s): State<AppState>, Path((slug, subslug)): Path<(String, String)>, Query(criteria): Query<FilterCriteria>) -> ApiResult<Json<Vec<ProductView>>> {
    let tree = load_tree(&s).await?;
    let child = tree.child_by_slug(&slug, &subslug).ok_or((StatusCode::NOT_FOUND, format!("Category not found: {slug}/{subslug}")))?;
    branch_products(&s, vec![child.id], &criteria).await
}

// Cart

#[derive(Debug, Deserialize)] pub struct AddToCartRequest { pub product_id: Uuid }
#[derive(Debug, Deserialize)] pub struct UpdateQuantityRequest { pub quantity: i64 }

async fn get_cart(State(s): State<AppState>, Path(session): Path<String>) -> Json<Cart> {
    let carts = s.carts.read().await;
    Json(carts.get(&session).cloned().unwrap_or_else(|| Cart::new(session)))
}

async fn add_to_cart(State(s): State<AppState>, Path(session): Path<String>, Json(r): Json<AddToCartRequest>) -> ApiResult<(StatusCode, Json<Cart>)> {
    let product = s.store.get_product(r.product_id).await.map_err(store_err)?.ok_or_else(|| reject(StorefrontError::ProductNotFound(r.product_id)))?;
    let mut carts = s.carts.write().await;
    let cart = carts.open(&session);
    cart.add(&product);
    Ok((StatusCode::CREATED, Json(cart.clone())))
}

async fn update_cart_item(State(s): State<AppState>, Path((session, id)): Path<(String, Uuid)>, Json(r): Json<UpdateQuantityRequest>) -> ApiResult<Json<Cart>> {
    let mut carts = s.carts.write().await;
    let cart = carts.get_mut(&session).ok_or_else(|| reject(StorefrontError::ProductNotFound(id)))?;
    cart.update_quantity(id, r.quantity).ok_or_else(|| reject(StorefrontError::ProductNotFound(id)))?;
    Ok(Json(cart.clone()))
}

async fn remove_cart_item(State(s): State<AppState>, Path((session, id)): Path<(String, Uuid)>) -> Json<Cart> {
    let mut carts = s.carts.write().await;
    match carts.get_mut(&session) {
        Some(cart) => {
            cart.remove(id);
            Json(cart.clone())
        }
        None => Json(Cart::new(session)),
    }
}

async fn clear_cart(State(s): State<AppState>, Path(session): Path<String>) -> StatusCode {
    s.carts.write().await.close(&session);
    StatusCode::NO_CONTENT
}

// Profile

async fn get_profile(State(s): State<AppState>, user: CurrentUser) -> ApiResult<Json<Profile>> {
    let user_id = user.require()?;
    s.store.get_profile(user_id).await.map_err(store_err)?.map(Json).ok_or((StatusCode::NOT_FOUND, "Profile not found".to_string()))
}

// Favorites

async fn list_favorites(State(s): State<AppState>, user: CurrentUser) -> ApiResult<Json<Vec<Uuid>>> {
    let favorites = Favorites::new(s.store.clone(), user.0);
    Ok(Json(favorites.list().await.map_err(reject)?))
}

async fn is_favorite(State(s): State<AppState>, user: CurrentUser, Path(product_id): Path<Uuid>) -> ApiResult<Json<serde_json::Value>> {
    let mut favorites = Favorites::new(s.store.clone(), user.0);
    let favorite = favorites.is_favorite(product_id).await.map_err(reject)?;
    Ok(Json(serde_json::json!({"product_id": product_id, "favorite": favorite})))
}

async fn toggle_favorite(State(s): State<AppState>, user: CurrentUser, Path(product_id): Path<Uuid>) -> ApiResult<Json<serde_json::Value>> {
    let mut favorites = Favorites::new(s.store.clone(), user.0);
    let favorite = favorites.toggle(product_id).await.map_err(reject)?;
    publish(&s.nats, favorites.take_events()).await;
    Ok(Json(serde_json::json!({"product_id": product_id, "favorite": favorite})))
}

// Addresses

async fn list_addresses(State(s): State<AppState>, user: CurrentUser) -> ApiResult<Json<Vec<Address>>> {
    let user_id = user.require()?;
    Ok(Json(AddressBook::new(s.store.clone()).list(user_id).await.map_err(reject)?))
}

async fn create_address(State(s): State<AppState>, user: CurrentUser, Json(r): Json<NewAddress>) -> ApiResult<(StatusCode, Json<Address>)> {
    let user_id = user.require()?;
    let mut book = AddressBook::new(s.store.clone());
    let created = book.create(user_id, r).await.map_err(reject)?;
    publish(&s.nats, book.take_events()).await;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn delete_address(State(s): State<AppState>, user: CurrentUser, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    let user_id = user.require()?;
    let mut book = AddressBook::new(s.store.clone());
    book.delete(user_id, id).await.map_err(reject)?;
    publish(&s.nats, book.take_events()).await;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_default_address(State(s): State<AppState>, user: CurrentUser, Path(id): Path<Uuid>) -> ApiResult<Json<Vec<Address>>> {
    let user_id = user.require()?;
    let mut book = AddressBook::new(s.store.clone());
    book.set_default(user_id, id).await.map_err(reject)?;
    publish(&s.nats, book.take_events()).await;
    Ok(Json(book.list(user_id).await.map_err(reject)?))
}

async fn repair_addresses(State(s): State<AppState>, user: CurrentUser) -> ApiResult<Json<serde_json::Value>> {
    let user_id = user.require()?;
    let mut book = AddressBook::new(s.store.clone());
    let repaired = book.repair_default(user_id).await.map_err(reject)?;
    publish(&s.nats, book.take_events()).await;
    Ok(Json(serde_json::json!({"repaired": repaired})))
}

// Admin

async fn checked_draft(s: &AppState, draft: &ProductDraft) -> ApiResult<()> {
    draft.validate().map_err(|e| reject(e.into()))?;
    let tree = load_tree(s).await?;
    if tree.get(draft.category_id).is_none() {
        return Err(reject(StorefrontError::CategoryNotFound(draft.category_id)));
    }
    Ok(())
}

async fn create_product(State(s): State<AppState>, Json(draft): Json<ProductDraft>) -> ApiResult<(StatusCode, Json<ProductView>)> {
    checked_draft(&s, &draft).await?;
    let p = s.store.insert_product(&draft).await.map_err(store_err)?;
    tracing::info!(product_id = %p.id, "product created");
    Ok((StatusCode::CREATED, Json(p)))
}

async fn update_product(State(s): State<AppState>, Path(id): Path<Uuid>, Json(draft): Json<ProductDraft>) -> ApiResult<Json<ProductView>> {
    checked_draft(&s, &draft).await?;
    let p = s.store.update_product(id, &draft).await.map_err(|e| match e {
        StoreError::NotFound => reject(StorefrontError::ProductNotFound(id)),
        e => store_err(e),
    })?;
    Ok(Json(p))
}

async fn delete_product(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    s.store.delete_product(id).await.map_err(|e| match e {
        StoreError::NotFound => reject(StorefrontError::ProductNotFound(id)),
        e => store_err(e),
    })?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_category(State(s): State<AppState>, Json(draft): Json<CategoryDraft>) -> ApiResult<(StatusCode, Json<Category>)> {
    let tree = load_tree(&s).await?;
    let category = draft.prepare(&tree).map_err(reject)?;
    let c = s.store.insert_category(&category).await.map_err(store_err)?;
    Ok((StatusCode::CREATED, Json(c)))
}

async fn delete_category(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    s.store.delete_category(id).await.map_err(|e| match e {
        StoreError::NotFound => reject(StorefrontError::CategoryNotFound(id)),
        e => store_err(e),
    })?;
    Ok(StatusCode::NO_CONTENT)
}

async fn inventory_stats(State(s): State<AppState>) -> ApiResult<Json<InventoryStats>> {
    let products = s.store.list_products(&ProductQuery::default()).await.map_err(store_err)?;
    Ok(Json(InventoryStats::from_products(&products)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use tower::ServiceExt;

    fn product(name_tr: &str, stock_quantity: i32) -> ProductView {
        ProductView {
            id: Uuid::new_v4(), name: name_tr.into(), name_tr: name_tr.into(), description: String::new(),
            description_tr: String::new(), price: Decimal::new(250, 0), stock_quantity, image_url: "img".into(),
            image_urls: None, category_id: Uuid::new_v4(), discount_rate: None, created_at: Utc::now(), updated_at: Utc::now(),
        }
    }

    fn state_with(store: Arc<MemoryStore>) -> AppState {
        AppState { store, carts: Arc::new(RwLock::new(CartSessions::new())), nats: None }
    }

    fn app_with(store: Arc<MemoryStore>) -> Router { router(state_with(store)) }

    fn get_req(uri: &str, user: Option<Uuid>) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().uri(uri);
        if let Some(user) = user {
            builder = builder.header(USER_HEADER, user.to_string());
        }
        builder.body(Body::empty()).unwrap()
    }

    fn category(name_tr: &str, slug: &str, parent_id: Option<Uuid>) -> Category {
        Category {
            id: Uuid::new_v4(), name: name_tr.into(), name_tr: name_tr.into(), slug: slug.into(),
            parent_id, created_at: Utc::now(), updated_at: Utc::now(),
        }
    }

    async fn send(app: &Router, req: HttpRequest<Body>) -> (StatusCode, serde_json::Value) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
    }

    fn json_req(method: &str, uri: &str, user: Option<Uuid>, body: serde_json::Value) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().method(method).uri(uri).header("content-type", "application/json");
        if let Some(user) = user {
            builder = builder.header(USER_HEADER, user.to_string());
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_cart_add_merges_lines() {
        let store = Arc::new(MemoryStore::new());
        let mama = product("Mama", 20);
        store.seed_products([mama.clone()]).await;
        let app = app_with(store);

        let body = serde_json::json!({"product_id": mama.id});
        send(&app, json_req("POST", "/api/v1/cart/s1", None, body.clone())).await;
        let (status, cart) = send(&app, json_req("POST", "/api/v1/cart/s1", None, body)).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(cart["lines"].as_array().unwrap().len(), 1);
        assert_eq!(cart["lines"][0]["quantity"], 2);
    }

    #[tokio::test]
    async fn test_unknown_product_rejected() {
        let app = app_with(Arc::new(MemoryStore::new()));
        let body = serde_json::json!({"product_id": Uuid::new_v4()});
        let (status, _) = send(&app, json_req("POST", "/api/v1/cart/s1", None, body)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_product_list_applies_criteria() {
        let store = Arc::new(MemoryStore::new());
        store.seed_products([product("Kedi Maması", 0), product("Köpek Tasması", 12)]).await;
        let app = app_with(store);

        let req = HttpRequest::builder().uri("/api/v1/products?stockFilter=in_stock&sortField=bogus").body(Body::empty()).unwrap();
        let (status, products) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(products.as_array().unwrap().len(), 1);
        assert_eq!(products[0]["name_tr"], "Köpek Tasması");
    }

    #[tokio::test]
    async fn test_admin_guard() {
        let store = Arc::new(MemoryStore::new());
        let admin = Uuid::new_v4();
        store.grant_admin(admin).await;
        let app = app_with(store);

        let stats = |user: Option<Uuid>| {
            let mut builder = HttpRequest::builder().uri("/api/v1/admin/stats");
            if let Some(user) = user {
                builder = builder.header(USER_HEADER, user.to_string());
            }
            builder.body(Body::empty()).unwrap()
        };
        assert_eq!(send(&app, stats(None)).await.0, StatusCode::UNAUTHORIZED);
        assert_eq!(send(&app, stats(Some(Uuid::new_v4()))).await.0, StatusCode::FORBIDDEN);
        let (status, body) = send(&app, stats(Some(admin))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 0);
    }

    #[tokio::test]
    async fn test_favorite_toggle_requires_user() {
        let app = app_with(Arc::new(MemoryStore::new()));
        let product_id = Uuid::new_v4();
        let uri = format!("/api/v1/favorites/{product_id}");

        let (status, _) = send(&app, json_req("POST", &uri, None, serde_json::Value::Null)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let user = Some(Uuid::new_v4());
        let (status, body) = send(&app, json_req("POST", &uri, user, serde_json::Value::Null)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["favorite"], true);
    }

    #[tokio::test]
    async fn test_unknown_session_cart_edits_do_not_open_carts() {
        let state = state_with(Arc::new(MemoryStore::new()));
        let carts = state.carts.clone();
        let app = router(state);
        let item = Uuid::new_v4();
        let uri = format!("/api/v1/cart/ghost/items/{item}");

        let (status, _) = send(&app, json_req("PUT", &uri, None, serde_json::json!({"quantity": 3}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, cart) = send(&app, json_req("DELETE", &uri, None, serde_json::Value::Null)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cart["lines"].as_array().unwrap().len(), 0);
        let (status, _) = send(&app, get_req("/api/v1/cart/ghost", None)).await;
        assert_eq!(status, StatusCode::OK);

        assert_eq!(carts.read().await.len(), 0);
    }

    #[tokio::test]
    async fn test_category_branch_listing() {
        let store = Arc::new(MemoryStore::new());
        let kedi = category("Kedi", "kedi", None);
        let mama = category("Kedi Maması", "kedi-mamasi", Some(kedi.id));
        let kopek = category("Köpek", "kopek", None);
        store.seed_categories([kedi.clone(), mama.clone(), kopek.clone()]).await;

        let mut on_root = product("Kedi Tırmalama", 20);
        on_root.category_id = kedi.id;
        let mut on_child = product("Somonlu Mama", 20);
        on_child.category_id = mama.id;
        let mut elsewhere = product("Köpek Tasması", 20);
        elsewhere.category_id = kopek.id;
        store.seed_products([on_root, on_child, elsewhere]).await;
        let app = app_with(store);

        let (status, products) = send(&app, get_req("/api/v1/categories/kedi/products?sortField=name_tr", None)).await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = products.as_array().unwrap().iter().filter_map(|p| p["name_tr"].as_str()).collect();
        assert_eq!(names, vec!["Kedi Tırmalama", "Somonlu Mama"]);

        let (_, products) = send(&app, get_req("/api/v1/categories/kedi/kedi-mamasi/products", None)).await;
        assert_eq!(products.as_array().unwrap().len(), 1);
        assert_eq!(products[0]["name_tr"], "Somonlu Mama");

        let (status, _) = send(&app, get_req("/api/v1/categories/kus/products", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_profile_and_admin_flag() {
        let store = Arc::new(MemoryStore::new());
        let user = Uuid::new_v4();
        store.seed_profiles([Profile {
            id: user, email: "ayse@pati.test".into(), full_name: Some("Ayşe Yılmaz".into()), phone: None,
            is_admin: true, created_at: Utc::now(),
        }]).await;
        let app = app_with(store);

        let (status, profile) = send(&app, get_req("/api/v1/profile", Some(user))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(profile["email"], "ayse@pati.test");
        assert_eq!(send(&app, get_req("/api/v1/profile", None)).await.0, StatusCode::UNAUTHORIZED);
        assert_eq!(send(&app, get_req("/api/v1/profile", Some(Uuid::new_v4()))).await.0, StatusCode::NOT_FOUND);

        assert_eq!(send(&app, get_req("/api/v1/admin/stats", Some(user))).await.0, StatusCode::OK);
    }
}
