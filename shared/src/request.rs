//! Request types for the sales backend
//!
//! One request is sent per cart line; the backend has no notion of a
//! multi-line cart.

use crate::models::{CartLine, DiscountPercent, SugarLevel};
use crate::payment::PaymentMethod;
use serde::{Deserialize, Serialize};

/// Completed-sale submission for one cart line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLineRequest {
    pub menu_item_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu_item_size_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sugar_level: Option<SugarLevel>,
    pub quantity: u32,
    pub discount_percent: DiscountPercent,
    /// Tax rate in percent
    pub tax: u32,
    pub payment_method: PaymentMethod,
    /// GCash reference, lets the backend dedupe against the webhook
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
}

impl PurchaseLineRequest {
    pub fn from_line(
        line: &CartLine,
        discount: DiscountPercent,
        tax_percent: u32,
        method: PaymentMethod,
    ) -> Self {
        Self {
            menu_item_id: line.product_id,
            menu_item_size_id: line.selected_size_id,
            size: line.selected_size.clone(),
            sugar_level: line.sugar_level,
            quantity: line.quantity,
            discount_percent: discount,
            tax: tax_percent,
            payment_method: method,
            payment_reference: None,
        }
    }

    pub fn with_reference(mut self, reference_id: impl Into<String>) -> Self {
        self.payment_reference = Some(reference_id.into());
        self
    }
}

/// Hold submission for one cart line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldLineRequest {
    pub menu_item_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu_item_size_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    pub quantity: u32,
    pub discount_percent: DiscountPercent,
    pub tax: u32,
    pub payment_method: PaymentMethod,
}

impl HoldLineRequest {
    /// Holds are always tagged as cash; the real method is chosen on resume
    pub fn from_line(line: &CartLine, discount: DiscountPercent, tax_percent: u32) -> Self {
        Self {
            menu_item_id: line.product_id,
            menu_item_size_id: line.selected_size_id,
            size: line.selected_size.clone(),
            quantity: line.quantity,
            discount_percent: discount,
            tax: tax_percent,
            payment_method: PaymentMethod::Cash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_purchase_request_wire_shape() {
        let line = CartLine::with_modifiers(3, "Latte", "16oz", 31, Decimal::new(140, 0), SugarLevel::Half);
        let req = PurchaseLineRequest::from_line(
            &line,
            DiscountPercent::new(10).unwrap(),
            12,
            PaymentMethod::GCash,
        )
        .with_reference("ref-1");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["menuItemId"], 3);
        assert_eq!(json["menuItemSizeId"], 31);
        assert_eq!(json["size"], "16oz");
        assert_eq!(json["sugarLevel"], "50%");
        assert_eq!(json["discountPercent"], 10);
        assert_eq!(json["tax"], 12);
        assert_eq!(json["paymentMethod"], "GCash");
        assert_eq!(json["paymentReference"], "ref-1");
    }

    #[test]
    fn test_hold_request_is_tagged_cash() {
        let line = CartLine::plain(5, "Croissant", Decimal::new(85, 0));
        let req = HoldLineRequest::from_line(&line, DiscountPercent::NONE, 12);
        assert_eq!(req.payment_method, PaymentMethod::Cash);
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("menuItemSizeId").is_none());
    }
}
