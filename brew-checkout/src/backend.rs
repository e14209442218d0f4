//! Collaborator seams
//!
//! The checkout core never talks HTTP itself. Everything that crosses the
//! network goes through these two traits; `brew-client` implements them
//! over REST and the integration tests implement them in memory.
//!
//! Contract the core relies on: `force_complete` and a purchase tagged
//! with a payment reference are idempotent per reference id, because the
//! provider webhook may materialize the same sale concurrently.

use async_trait::async_trait;
use shared::models::{HeldTransaction, Product};
use shared::payment::{
    ManualCompletion, PaymentIntent, PaymentIntentRequest, PaymentStatusReport,
    PendingPaymentRecord, QrCode,
};
use shared::request::{HoldLineRequest, PurchaseLineRequest};
use shared::response::{PurchaseReceipt, ResumeReceipt};
use thiserror::Error;

/// Failure reported by a collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Request never produced a response (connect, timeout, TLS)
    #[error("Cannot reach server: {0}")]
    Transport(String),

    /// Bearer credential rejected
    #[error("Authentication required")]
    Unauthorized,

    /// Server answered with an error; `message` is safe to show
    #[error("{message}")]
    Rejected { code: Option<u16>, message: String },

    /// Response body did not match the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl BackendError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            code: None,
            message: message.into(),
        }
    }

    /// Short text suitable for the operator
    pub fn user_message(&self) -> String {
        match self {
            BackendError::Transport(_) => "Cannot reach the server, try again".to_string(),
            BackendError::Unauthorized => "Session expired, sign in again".to_string(),
            BackendError::Rejected { message, .. } => message.clone(),
            BackendError::InvalidResponse(_) => "Unexpected response from the server".to_string(),
        }
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Sales backend (catalog, holds, purchases, pending payments)
#[async_trait]
pub trait SalesBackend: Send + Sync {
    /// Catalog items with sizes for the operator's branch
    async fn fetch_catalog(&self) -> BackendResult<Vec<Product>>;

    /// Persist one held line
    async fn create_hold(&self, request: &HoldLineRequest) -> BackendResult<HeldTransaction>;

    /// Held transactions of the branch, newest first
    async fn list_holds(&self) -> BackendResult<Vec<HeldTransaction>>;

    /// Finalize a held transaction as a sale (stock is deducted server-side)
    async fn resume_hold(&self, held_id: i64) -> BackendResult<ResumeReceipt>;

    /// Record one completed sale line
    async fn submit_purchase(&self, request: &PurchaseLineRequest)
    -> BackendResult<PurchaseReceipt>;

    /// Store the pending-payment snapshot the webhook completes later
    async fn save_pending_payment(&self, record: &PendingPaymentRecord) -> BackendResult<()>;
}

/// GCash provider bridge
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_intent(&self, request: &PaymentIntentRequest) -> BackendResult<PaymentIntent>;

    /// Render a scannable image for the checkout URL
    async fn render_qr(&self, checkout_url: &str) -> BackendResult<QrCode>;

    async fn payment_status(&self, reference_id: &str) -> BackendResult<PaymentStatusReport>;

    /// Force-complete an authorized payment; safe to call repeatedly
    async fn force_complete(&self, reference_id: &str) -> BackendResult<ManualCompletion>;
}
