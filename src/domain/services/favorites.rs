//! Favorite toggling for one signed-in (or anonymous) session.

use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::events::{DomainEvent, FavoriteEvent};
use crate::store::{FavoriteStore, StoreError};
use crate::{Result, StorefrontError};

/// Session-scoped favorite state over a [`FavoriteStore`].
///
/// A toggle is applied to the local state first, then written. If the write
/// fails the local state is put back and the error is returned, so the cached
/// answer never drifts from the last confirmed one.
pub struct Favorites<S: ?Sized> {
    store: Arc<S>,
    user_id: Option<Uuid>,
    known: HashMap<Uuid, bool>,
    events: Vec<DomainEvent>,
}

impl<S: FavoriteStore + ?Sized> Favorites<S> {
    pub fn new(store: Arc<S>, user_id: Option<Uuid>) -> Self {
        Self { store, user_id, known: HashMap::new(), events: vec![] }
    }

    pub fn user_id(&self) -> Option<Uuid> { self.user_id }

    /// Last confirmed state for `product_id`, if it has been looked up.
    pub fn cached(&self, product_id: Uuid) -> Option<bool> { self.known.get(&product_id).copied() }

    /// Anonymous sessions have no favorites.
    #[tracing::instrument(skip(self), fields(user_id = ?self.user_id))]
    pub async fn is_favorite(&mut self, product_id: Uuid) -> Result<bool> {
        let Some(user_id) = self.user_id else { return Ok(false) };
        let exists = self.store.favorite_exists(user_id, product_id).await?;
        self.known.insert(product_id, exists);
        Ok(exists)
    }

    /// Flips membership and returns the new state.
    #[tracing::instrument(skip(self), fields(user_id = ?self.user_id))]
    pub async fn toggle(&mut self, product_id: Uuid) -> Result<bool> {
        let user_id = self.user_id.ok_or(StorefrontError::AuthRequired)?;
        let current = match self.cached(product_id) {
            Some(state) => state,
            None => self.is_favorite(product_id).await?,
        };

        let tentative = !current;
        self.known.insert(product_id, tentative);
        let written = if current {
            self.store.delete_favorite(user_id, product_id).await
        } else {
            self.store.insert_favorite(user_id, product_id).await
        };

        if let Err(e) = written {
            tracing::warn!(%product_id, error = %e, "favorite write failed, reverting");
            self.known.insert(product_id, current);
            if matches!(e, StoreError::Conflict(_)) {
                // Cached state was stale; resync with the row.
                if let Ok(exists) = self.store.favorite_exists(user_id, product_id).await {
                    self.known.insert(product_id, exists);
                }
            }
            return Err(e.into());
        }

        tracing::debug!(%product_id, favorite = tentative, "favorite toggled");
        let event = if tentative {
            FavoriteEvent::Added { user_id, product_id }
        } else {
            FavoriteEvent::Removed { user_id, product_id }
        };
        self.events.push(DomainEvent::Favorite(event));
        Ok(tentative)
    }

    /// Product ids the user saved, newest first.
    pub async fn list(&self) -> Result<Vec<Uuid>> {
        let user_id = self.user_id.ok_or(StorefrontError::AuthRequired)?;
        Ok(self.store.list_favorites(user_id).await?)
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
}
