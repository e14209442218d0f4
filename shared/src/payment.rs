//! Payment types shared with the backend and the GCash provider bridge

use crate::models::{CartLine, DiscountPercent};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Payment Method
// ============================================================================

/// Payment method tag attached to every submitted line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[default]
    Cash,
    #[serde(rename = "GCash")]
    GCash,
}

impl PaymentMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::GCash => "GCash",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Payment Status
// ============================================================================

/// Provider-side status of a payment intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Authorized,
    Chargeable,
    Completed,
    Cancelled,
    Expired,
    Failed,
    /// Status string the client does not recognise; treated like pending
    #[serde(other)]
    Unknown,
}

impl PaymentStatus {
    /// Authorized on the provider side but not yet materialized as a sale
    pub const fn is_authorized(&self) -> bool {
        matches!(self, PaymentStatus::Authorized | PaymentStatus::Chargeable)
    }

    /// Provider gave up on the intent; advisory only, the session stays open
    pub const fn is_terminal_failure(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Cancelled | PaymentStatus::Expired | PaymentStatus::Failed
        )
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Authorized => "authorized",
            PaymentStatus::Chargeable => "chargeable",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Expired => "expired",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Provider DTOs
// ============================================================================

/// Request a QR/checkout-link payment intent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentRequest {
    pub amount: Decimal,
    pub description: String,
}

/// Created payment intent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub checkout_url: String,
    pub reference_id: String,
}

/// Render a scannable code for a checkout URL
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCodeRequest {
    pub url: String,
}

/// Rendered code; `qr_image` is a `data:image/png;base64,...` URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCode {
    pub qr_image: String,
}

/// Status query result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusReport {
    /// True once the backend has materialized the sale (webhook or manual)
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub status: PaymentStatus,
}

/// Force-complete result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualCompletion {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Pending-payment record the webhook later turns into a sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingPaymentRecord {
    pub reference_id: String,
    pub cart_lines: Vec<CartLine>,
    pub discount_percent: DiscountPercent,
    pub tax_percent: u32,
    pub grand_total: Decimal,
    /// Unix millis
    pub timestamp: i64,
}
