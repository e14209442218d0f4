//! Cart line and per-line modifier types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Sugar Level
// ============================================================================

/// Sweetness modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SugarLevel {
    #[default]
    #[serde(rename = "100%")]
    Full,
    #[serde(rename = "75%")]
    ThreeQuarters,
    #[serde(rename = "50%")]
    Half,
    #[serde(rename = "25%")]
    Quarter,
    #[serde(rename = "0%")]
    None,
}

impl SugarLevel {
    /// All levels, sweetest first (wizard display order)
    pub const ALL: [SugarLevel; 5] = [
        SugarLevel::Full,
        SugarLevel::ThreeQuarters,
        SugarLevel::Half,
        SugarLevel::Quarter,
        SugarLevel::None,
    ];

    pub const fn percent(&self) -> u8 {
        match self {
            SugarLevel::Full => 100,
            SugarLevel::ThreeQuarters => 75,
            SugarLevel::Half => 50,
            SugarLevel::Quarter => 25,
            SugarLevel::None => 0,
        }
    }

    pub fn from_percent(percent: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.percent() == percent)
    }

    pub const fn label(&self) -> &'static str {
        match self {
            SugarLevel::Full => "100%",
            SugarLevel::ThreeQuarters => "75%",
            SugarLevel::Half => "50%",
            SugarLevel::Quarter => "25%",
            SugarLevel::None => "0%",
        }
    }
}

impl fmt::Display for SugarLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Discount
// ============================================================================

/// Error when a discount is not in the fixed table
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("discount {0}% is not offered (allowed: 0, 5, 10, 15, 20, 25)")]
pub struct InvalidDiscount(pub u8);

/// Operator-selected order discount, restricted to the fixed table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub struct DiscountPercent(u8);

impl DiscountPercent {
    /// Offered discounts, in percent
    pub const TABLE: [u8; 6] = [0, 5, 10, 15, 20, 25];

    pub const NONE: DiscountPercent = DiscountPercent(0);

    pub fn new(percent: u8) -> Result<Self, InvalidDiscount> {
        if Self::TABLE.contains(&percent) {
            Ok(Self(percent))
        } else {
            Err(InvalidDiscount(percent))
        }
    }

    #[inline]
    pub const fn value(&self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_none(&self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<u8> for DiscountPercent {
    type Error = InvalidDiscount;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DiscountPercent> for u8 {
    fn from(d: DiscountPercent) -> Self {
        d.0
    }
}

impl fmt::Display for DiscountPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

// ============================================================================
// Cart Line
// ============================================================================

/// A product instance inside the cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Menu item ID; the merge identity of the line
    pub product_id: i64,
    /// Display name snapshot
    pub name: String,
    /// Unit price, already resolved for the chosen size
    pub unit_price: Decimal,
    /// Always >= 1 while the line exists
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_size_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sugar_level: Option<SugarLevel>,
}

impl CartLine {
    /// Line for a single-price product (no wizard)
    pub fn plain(product_id: i64, name: impl Into<String>, unit_price: Decimal) -> Self {
        Self {
            product_id,
            name: name.into(),
            unit_price,
            quantity: 1,
            selected_size: None,
            selected_size_id: None,
            sugar_level: None,
        }
    }

    /// Line carrying size and sweetness modifiers
    pub fn with_modifiers(
        product_id: i64,
        name: impl Into<String>,
        size_label: impl Into<String>,
        size_id: i64,
        unit_price: Decimal,
        sugar_level: SugarLevel,
    ) -> Self {
        Self {
            product_id,
            name: name.into(),
            unit_price,
            quantity: 1,
            selected_size: Some(size_label.into()),
            selected_size_id: Some(size_id),
            sugar_level: Some(sugar_level),
        }
    }

    /// unit_price * quantity, unrounded
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_table() {
        for p in DiscountPercent::TABLE {
            assert_eq!(DiscountPercent::new(p).unwrap().value(), p);
        }
        assert_eq!(DiscountPercent::new(7), Err(InvalidDiscount(7)));
        assert_eq!(DiscountPercent::new(30), Err(InvalidDiscount(30)));
        assert!(DiscountPercent::default().is_none());
    }

    #[test]
    fn test_discount_wire_format() {
        let d = DiscountPercent::new(15).unwrap();
        assert_eq!(serde_json::to_string(&d).unwrap(), "15");
        assert!(serde_json::from_str::<DiscountPercent>("12").is_err());
    }

    #[test]
    fn test_sugar_level_wire_format() {
        assert_eq!(serde_json::to_string(&SugarLevel::Half).unwrap(), "\"50%\"");
        let parsed: SugarLevel = serde_json::from_str("\"0%\"").unwrap();
        assert_eq!(parsed, SugarLevel::None);
        assert_eq!(SugarLevel::from_percent(75), Some(SugarLevel::ThreeQuarters));
        assert_eq!(SugarLevel::from_percent(60), None);
        assert_eq!(SugarLevel::default(), SugarLevel::Full);
    }

    #[test]
    fn test_line_total() {
        let mut line = CartLine::plain(1, "Espresso", Decimal::new(8550, 2));
        line.quantity = 3;
        assert_eq!(line.line_total(), Decimal::new(25650, 2));
    }
}
