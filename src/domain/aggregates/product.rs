//! Product display pricing and the admin write model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::domain::value_objects::{DiscountRate, Locale};
use crate::ProductView;

impl ProductView {
    pub fn display_name(&self, locale: Locale) -> &str { locale.pick(&self.name, &self.name_tr) }

    pub fn display_description(&self, locale: Locale) -> &str {
        locale.pick(&self.description, &self.description_tr)
    }

    pub fn discount(&self) -> DiscountRate { DiscountRate::from_stored(self.discount_rate) }

    pub fn has_discount(&self) -> bool { !self.discount().is_zero() }

    /// Price after the product's discount. Equals `price` when there is none.
    pub fn discounted_price(&self) -> Decimal { self.discount().apply(self.price) }

    pub fn is_out_of_stock(&self) -> bool { self.stock_quantity <= 0 }
}

/// Admin product form.
#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
pub struct ProductDraft {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 200))]
    pub name_tr: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub description_tr: String,
    #[validate(custom = "non_negative_price")]
    pub price: Decimal,
    #[validate(range(min = 0))]
    pub stock_quantity: i32,
    #[validate(length(min = 1))]
    pub image_url: String,
    #[serde(default)]
    pub image_urls: Option<Vec<String>>,
    pub category_id: Uuid,
    #[validate(custom = "percentage")]
    #[serde(default)]
    pub discount_rate: Option<Decimal>,
}

fn non_negative_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price < Decimal::ZERO {
        return Err(ValidationError::new("negative_price"));
    }
    Ok(())
}

fn percentage(rate: &Decimal) -> Result<(), ValidationError> {
    DiscountRate::new(*rate).map(|_| ()).map_err(|_| ValidationError::new("discount_out_of_range"))
}
