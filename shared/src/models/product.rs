//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Availability text the catalog uses for items that cannot be sold
pub const OUT_OF_STOCK: &str = "out of stock";

/// Catalog entry, immutable once fetched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    /// Base price, used when the product has no sizes
    pub price: Decimal,
    /// Free-text availability flag ("available", "out of stock", ...)
    pub availability: String,
    /// Ordered size options; empty for single-price products
    #[serde(default)]
    pub sizes: Vec<SizeOption>,
}

impl Product {
    /// Whether the availability flag reads "out of stock"
    pub fn is_out_of_stock(&self) -> bool {
        self.availability.trim().eq_ignore_ascii_case(OUT_OF_STOCK)
    }

    /// Whether selecting this product goes through the size/sweetness wizard
    pub fn has_sizes(&self) -> bool {
        !self.sizes.is_empty()
    }

    /// First size that can currently be sold, in catalog order
    pub fn first_available_size(&self) -> Option<&SizeOption> {
        self.sizes.iter().find(|s| s.available)
    }

    /// Look up a size option by id
    pub fn size(&self, size_id: i64) -> Option<&SizeOption> {
        self.sizes.iter().find(|s| s.id == size_id)
    }
}

/// Size option of a product (e.g. "12oz", "16oz")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeOption {
    pub id: i64,
    pub label: String,
    pub price: Decimal,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}
