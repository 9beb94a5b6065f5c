//! Domain events
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum DomainEvent {
    Favorite(FavoriteEvent),
    Address(AddressEvent),
}

impl DomainEvent {
    pub fn subject(&self) -> &'static str {
        match self {
            Self::Favorite(_) => "storefront.favorites",
            Self::Address(_) => "storefront.addresses",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum FavoriteEvent {
    Added { user_id: Uuid, product_id: Uuid },
    Removed { user_id: Uuid, product_id: Uuid },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum AddressEvent {
    Created { user_id: Uuid, address_id: Uuid, is_default: bool },
    DefaultChanged { user_id: Uuid, address_id: Uuid },
    Deleted { user_id: Uuid, address_id: Uuid },
    Repaired { user_id: Uuid, default_id: Option<Uuid> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subjects_and_payload() {
        let user_id = Uuid::new_v4();
        let event = DomainEvent::Address(AddressEvent::Repaired { user_id, default_id: None });
        assert_eq!(event.subject(), "storefront.addresses");

        let json = serde_json::to_value(&event).unwrap();
        assert!(json["Address"]["Repaired"]["default_id"].is_null());

        let favorite = DomainEvent::Favorite(FavoriteEvent::Added { user_id, product_id: Uuid::new_v4() });
        assert_eq!(favorite.subject(), "storefront.favorites");
    }
}
