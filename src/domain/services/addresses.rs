//! Address book with the single-default invariant.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::domain::events::{AddressEvent, DomainEvent};
use crate::store::{AddressStore, StoreError};
use crate::{Address, Result, StorefrontError};

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
pub struct NewAddress {
    #[validate(length(min = 1, max = 80))]
    pub title: String,
    #[validate(length(min = 1))]
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: Option<String>,
    #[validate(length(min = 1))]
    pub city: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[validate(length(min = 1, max = 16))]
    pub postal_code: String,
    #[serde(default)]
    pub is_default: bool,
}

/// Keeps at most one default address per user.
///
/// Whether a default switch is atomic depends on the store: the Postgres
/// adapter wraps it in a transaction, other stores run two writes and may
/// briefly expose zero defaults. [`AddressBook::repair_default`] restores the
/// invariant after such a gap.
pub struct AddressBook<S: ?Sized> {
    store: Arc<S>,
    events: Vec<DomainEvent>,
}

impl<S: AddressStore + ?Sized> AddressBook<S> {
    pub fn new(store: Arc<S>) -> Self { Self { store, events: vec![] } }

    /// Default first, then newest first.
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Address>> {
        let mut addresses = self.store.list_addresses(user_id).await?;
        addresses.sort_by(|a, b| b.is_default.cmp(&a.is_default).then(b.created_at.cmp(&a.created_at)));
        Ok(addresses)
    }

    #[tracing::instrument(skip(self, address), fields(is_default = address.is_default))]
    pub async fn create(&mut self, user_id: Uuid, address: NewAddress) -> Result<Address> {
        address.validate()?;
        let created = if address.is_default {
            self.store.insert_default_address(user_id, &address).await?
        } else {
            self.store.insert_address(user_id, &address, false).await?
        };
        self.events.push(DomainEvent::Address(AddressEvent::Created {
            user_id, address_id: created.id, is_default: created.is_default,
        }));
        Ok(created)
    }

    /// Makes `address_id` the user's only default.
    #[tracing::instrument(skip(self))]
    pub async fn set_default(&mut self, user_id: Uuid, address_id: Uuid) -> Result<()> {
        let addresses = self.store.list_addresses(user_id).await?;
        if !addresses.iter().any(|a| a.id == address_id) {
            return Err(StorefrontError::AddressNotFound(address_id));
        }
        self.store.replace_default(user_id, address_id).await.map_err(|e| match e {
            StoreError::NotFound => StorefrontError::AddressNotFound(address_id),
            e => e.into(),
        })?;
        tracing::debug!(%address_id, "default address changed");
        self.events.push(DomainEvent::Address(AddressEvent::DefaultChanged { user_id, address_id }));
        Ok(())
    }

    pub async fn delete(&mut self, user_id: Uuid, address_id: Uuid) -> Result<()> {
        if !self.store.delete_address(user_id, address_id).await? {
            return Err(StorefrontError::AddressNotFound(address_id));
        }
        self.events.push(DomainEvent::Address(AddressEvent::Deleted { user_id, address_id }));
        Ok(())
    }

    /// Restores "exactly one default" for a user with addresses.
    ///
    /// Several defaults: the newest default wins. No default: the newest
    /// address is promoted. Returns whether anything was written.
    #[tracing::instrument(skip(self))]
    pub async fn repair_default(&mut self, user_id: Uuid) -> Result<bool> {
        let addresses = self.store.list_addresses(user_id).await?;
        let defaults: Vec<&Address> = addresses.iter().filter(|a| a.is_default).collect();
        if defaults.len() == 1 || addresses.is_empty() {
            return Ok(false);
        }

        let winner = if defaults.is_empty() {
            addresses.iter().max_by_key(|a| a.created_at)
        } else {
            defaults.into_iter().max_by_key(|a| a.created_at)
        };
        let Some(winner) = winner.map(|a| a.id) else { return Ok(false) };

        tracing::warn!(%winner, "repairing default address");
        self.store.replace_default(user_id, winner).await?;
        self.events.push(DomainEvent::Address(AddressEvent::Repaired { user_id, default_id: Some(winner) }));
        Ok(true)
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
}
