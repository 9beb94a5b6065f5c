//! Value Objects for the storefront

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MIN_QUANTITY: u32 = 1;
pub const MAX_QUANTITY: u32 = 10;

/// Lower-cases with Turkish rules: `I` folds to `ı` and `İ` to `i`.
pub fn fold_case_tr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            'I' => out.push('ı'),
            'İ' => out.push('i'),
            c => out.extend(c.to_lowercase()),
        }
    }
    out
}

/// Search key: case-insensitive in both Turkish and English, so `I`, `ı`,
/// `İ` and `i` all compare equal.
pub fn fold_search(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            'I' | 'İ' | 'ı' => out.push('i'),
            '\u{0307}' => {}
            c => out.extend(c.to_lowercase().filter(|l| *l != '\u{0307}')),
        }
    }
    out
}

/// Cart line quantity, always within `MIN_QUANTITY..=MAX_QUANTITY`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    pub fn one() -> Self { Self(MIN_QUANTITY) }
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(i64::from(MIN_QUANTITY), i64::from(MAX_QUANTITY)) as u32)
    }
    pub fn value(self) -> u32 { self.0 }
    pub fn increment(self) -> Self { Self((self.0 + 1).min(MAX_QUANTITY)) }
}

impl Default for Quantity { fn default() -> Self { Self::one() } }
impl From<i64> for Quantity { fn from(value: i64) -> Self { Self::clamped(value) } }
impl From<Quantity> for u32 { fn from(q: Quantity) -> Self { q.0 } }

/// Percentage discount in `0..=100`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct DiscountRate(Decimal);

impl DiscountRate {
    pub fn new(percent: Decimal) -> Result<Self, DiscountRateError> {
        if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
            return Err(DiscountRateError::OutOfRange(percent));
        }
        Ok(Self(percent))
    }

    pub fn zero() -> Self { Self(Decimal::ZERO) }

    /// Lenient constructor for backend rows: absent means zero, stray values are clamped.
    pub fn from_stored(percent: Option<Decimal>) -> Self {
        Self(percent.unwrap_or(Decimal::ZERO).clamp(Decimal::ZERO, Decimal::ONE_HUNDRED))
    }

    pub fn percent(self) -> Decimal { self.0 }
    pub fn is_zero(self) -> bool { self.0.is_zero() }

    /// Reduced price, rounded to kuruş.
    pub fn apply(self, price: Decimal) -> Decimal {
        let off = price * self.0 / Decimal::ONE_HUNDRED;
        (price - off).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

impl TryFrom<Decimal> for DiscountRate {
    type Error = DiscountRateError;
    fn try_from(value: Decimal) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<DiscountRate> for Decimal { fn from(rate: DiscountRate) -> Self { rate.0 } }

#[derive(Debug, Clone, PartialEq)] pub enum DiscountRateError { OutOfRange(Decimal) }
impl std::error::Error for DiscountRateError {}
impl fmt::Display for DiscountRateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::OutOfRange(v) => write!(f, "Discount rate {v} outside 0-100") }
    }
}

/// URL slug derived from (usually Turkish) display text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slug(String);

impl Slug {
    pub fn from_text(text: &str) -> Result<Self, SlugError> {
        let mut out = String::with_capacity(text.len());
        for c in fold_case_tr(text).chars() {
            let c = match c {
                'ğ' => 'g',
                'ü' => 'u',
                'ş' => 's',
                'ı' => 'i',
                'ö' => 'o',
                'ç' => 'c',
                c => c,
            };
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                out.push(c);
            } else if !out.ends_with('-') {
                out.push('-');
            }
        }
        let trimmed = out.trim_matches('-');
        if trimmed.is_empty() { return Err(SlugError::Empty); }
        Ok(Self(trimmed.to_string()))
    }
    pub fn as_str(&self) -> &str { &self.0 }
    pub fn into_inner(self) -> String { self.0 }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, PartialEq)] pub enum SlugError { Empty }
impl std::error::Error for SlugError {}
impl fmt::Display for SlugError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Slug has no usable characters") }
}

/// Display language. Turkish is the storefront default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Tr,
    En,
}

impl Locale {
    /// Picks the text for this locale, falling back to the other language when empty.
    pub fn pick<'a>(self, en: &'a str, tr: &'a str) -> &'a str {
        let (preferred, fallback) = match self { Self::Tr => (tr, en), Self::En => (en, tr) };
        if preferred.trim().is_empty() { fallback } else { preferred }
    }
}

impl FromStr for Locale {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tr" | "tr-tr" => Ok(Self::Tr),
            "en" | "en-us" | "en-gb" => Ok(Self::En),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_clamps() {
        assert_eq!(Quantity::clamped(0).value(), 1);
        assert_eq!(Quantity::clamped(-3).value(), 1);
        assert_eq!(Quantity::clamped(42).value(), 10);
        assert_eq!(Quantity::clamped(10).increment().value(), 10);
    }

    #[test]
    fn test_discount_apply() {
        let rate = DiscountRate::new(Decimal::new(25, 0)).unwrap();
        assert_eq!(rate.apply(Decimal::new(200, 0)), Decimal::new(150, 0));
        assert_eq!(DiscountRate::zero().apply(Decimal::new(9999, 2)), Decimal::new(9999, 2));
        // 33% of 19.99 = 6.5967, 19.99 - 6.5967 = 13.3933
        let third = DiscountRate::new(Decimal::new(33, 0)).unwrap();
        assert_eq!(third.apply(Decimal::new(1999, 2)), Decimal::new(1339, 2));
    }

    #[test]
    fn test_discount_range() {
        assert!(DiscountRate::new(Decimal::new(101, 0)).is_err());
        assert!(DiscountRate::new(Decimal::new(-1, 0)).is_err());
        assert_eq!(DiscountRate::from_stored(None), DiscountRate::zero());
        assert_eq!(DiscountRate::from_stored(Some(Decimal::new(150, 0))).percent(), Decimal::ONE_HUNDRED);
    }

    #[test]
    fn test_slug_turkish() {
        assert_eq!(Slug::from_text("Kedi Maması").unwrap().as_str(), "kedi-mamasi");
        assert_eq!(Slug::from_text("Köpek Ödülleri & Çiğneme").unwrap().as_str(), "kopek-odulleri-cigneme");
        assert_eq!(Slug::from_text("  IŞIKLI Tasma!! ").unwrap().as_str(), "isikli-tasma");
        assert_eq!(Slug::from_text("İzmir 2024").unwrap().as_str(), "izmir-2024");
        assert_eq!(Slug::from_text("--").unwrap_err(), SlugError::Empty);
    }

    #[test]
    fn test_fold_case_tr() {
        assert_eq!(fold_case_tr("IĞDIR"), "ığdır");
        assert_eq!(fold_case_tr("İstanbul"), "istanbul");
    }

    #[test]
    fn test_fold_search_merges_dotted_and_dotless_i() {
        assert_eq!(fold_search("Interactive"), "interactive");
        assert_eq!(fold_search("IŞIKLI"), "isikli");
        assert_eq!(fold_search("ışık"), "isik");
        assert_eq!(fold_search("İZMİR"), "izmir");
        assert_eq!(fold_search("CATNIP"), "catnip");
    }

    #[test]
    fn test_locale_pick() {
        assert_eq!(Locale::Tr.pick("Cat food", "Kedi maması"), "Kedi maması");
        assert_eq!(Locale::En.pick("Cat food", "Kedi maması"), "Cat food");
        assert_eq!(Locale::En.pick("", "Kedi maması"), "Kedi maması");
        assert_eq!("EN".parse::<Locale>(), Ok(Locale::En));
    }
}
