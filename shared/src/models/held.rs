//! Held (suspended) transaction model

use super::cart::DiscountPercent;
use crate::payment::PaymentMethod;
use serde::{Deserialize, Serialize};

/// One persisted hold record; a held cart is stored as one record per line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeldTransaction {
    pub id: i64,
    pub menu_item_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu_item_size_id: Option<i64>,
    pub quantity: u32,
    pub discount_percent: DiscountPercent,
    /// Tax rate in percent (e.g. 12)
    pub tax: u32,
    pub payment_method: PaymentMethod,
    /// Creation time (RFC 3339)
    pub created_at: String,
}

