//! Cart pricing
//!
//! One pure function shared by every checkout path so the total the
//! operator sees is the total that gets charged:
//!
//! ```text
//! subtotal       = Σ(unit_price × quantity)
//! discount       = subtotal × discount% / 100
//! tax            = subtotal × tax% / 100        (pre-discount subtotal)
//! grand_total    = max(0, subtotal + tax − discount)
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::{CartLine, DiscountPercent};

use crate::money::{percent_of, round_money};

/// Fixed VAT rate applied to every sale (12%)
pub const DEFAULT_TAX_PERCENT: u32 = 12;

/// Derived totals for a cart; never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingSnapshot {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub discount_amount: Decimal,
    pub grand_total: Decimal,
}

impl PricingSnapshot {
    pub const ZERO: PricingSnapshot = PricingSnapshot {
        subtotal: Decimal::ZERO,
        tax_amount: Decimal::ZERO,
        discount_amount: Decimal::ZERO,
        grand_total: Decimal::ZERO,
    };
}

/// Pricing rules for a terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingEngine {
    tax_percent: u32,
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::new(DEFAULT_TAX_PERCENT)
    }
}

impl PricingEngine {
    pub const fn new(tax_percent: u32) -> Self {
        Self { tax_percent }
    }

    #[inline]
    pub const fn tax_percent(&self) -> u32 {
        self.tax_percent
    }

    /// Price a cart. Components are rounded to centavos first and the grand
    /// total is built from the rounded components, so the displayed lines
    /// always add up.
    pub fn price(&self, lines: &[CartLine], discount: DiscountPercent) -> PricingSnapshot {
        let subtotal: Decimal = lines.iter().map(CartLine::line_total).sum();
        let subtotal = round_money(subtotal);

        // Both percentages apply to the pre-discount subtotal
        let discount_amount = round_money(percent_of(subtotal, u32::from(discount.value())));
        let tax_amount = round_money(percent_of(subtotal, self.tax_percent));

        let grand_total = (subtotal + tax_amount - discount_amount).max(Decimal::ZERO);

        PricingSnapshot {
            subtotal,
            tax_amount,
            discount_amount,
            grand_total,
        }
    }
}
