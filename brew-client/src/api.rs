//! REST implementation of the checkout collaborators

use crate::{ClientConfig, ClientResult, NetworkHttpClient, OperatorClaims};
use async_trait::async_trait;
use brew_checkout::{BackendError, BackendResult, PaymentGateway, SalesBackend};
use shared::models::{HeldTransaction, Product};
use shared::payment::{
    ManualCompletion, PaymentIntent, PaymentIntentRequest, PaymentStatusReport,
    PendingPaymentRecord, QrCode, QrCodeRequest,
};
use shared::request::{HoldLineRequest, PurchaseLineRequest};
use shared::response::{PurchaseReceipt, ResumeReceipt};

/// Sales backend and GCash bridge over HTTP
#[derive(Debug, Clone)]
pub struct BrewApi {
    http: NetworkHttpClient,
    claims: Option<OperatorClaims>,
    branch_id: Option<i64>,
}

impl BrewApi {
    /// Build the client; the branch comes from the config, else the token
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let http = NetworkHttpClient::new(config)?;
        let claims = match config.token.as_deref() {
            Some(token) => match OperatorClaims::decode(token) {
                Ok(claims) => Some(claims),
                Err(e) => {
                    tracing::warn!(error = %e, "Bearer token carries no readable claims");
                    None
                }
            },
            None => None,
        };
        let branch_id = config
            .branch_id
            .or_else(|| claims.as_ref().and_then(|c| c.branch_id));
        Ok(Self {
            http,
            claims,
            branch_id,
        })
    }

    pub fn claims(&self) -> Option<&OperatorClaims> {
        self.claims.as_ref()
    }

    pub fn branch_id(&self) -> Option<i64> {
        self.branch_id
    }
}

#[async_trait]
impl SalesBackend for BrewApi {
    async fn fetch_catalog(&self) -> BackendResult<Vec<Product>> {
        let branch = self
            .branch_id
            .ok_or_else(|| BackendError::rejected("No branch is assigned to this operator"))?;
        let products: Vec<Product> = self
            .http
            .get(&format!("api/pos/branches/{}/menu", branch))
            .await?;
        tracing::debug!(branch_id = branch, count = products.len(), "Catalog fetched");
        Ok(products)
    }

    async fn create_hold(&self, request: &HoldLineRequest) -> BackendResult<HeldTransaction> {
        Ok(self.http.post("api/pos/holds", request).await?)
    }

    async fn list_holds(&self) -> BackendResult<Vec<HeldTransaction>> {
        Ok(self.http.get("api/pos/holds").await?)
    }

    async fn resume_hold(&self, held_id: i64) -> BackendResult<ResumeReceipt> {
        let mut receipt: ResumeReceipt = self
            .http
            .post_empty(&format!("api/pos/holds/{}/resume", held_id))
            .await?;
        if receipt.held_id == 0 {
            receipt.held_id = held_id;
        }
        Ok(receipt)
    }

    async fn submit_purchase(
        &self,
        request: &PurchaseLineRequest,
    ) -> BackendResult<PurchaseReceipt> {
        Ok(self.http.post("api/pos/purchases", request).await?)
    }

    async fn save_pending_payment(&self, record: &PendingPaymentRecord) -> BackendResult<()> {
        Ok(self.http.post_ack("api/payments/pending", record).await?)
    }
}

#[async_trait]
impl PaymentGateway for BrewApi {
    async fn create_intent(&self, request: &PaymentIntentRequest) -> BackendResult<PaymentIntent> {
        Ok(self.http.post("api/payments/gcash/intents", request).await?)
    }

    async fn render_qr(&self, checkout_url: &str) -> BackendResult<QrCode> {
        let request = QrCodeRequest {
            url: checkout_url.to_string(),
        };
        Ok(self.http.post("api/payments/qr", &request).await?)
    }

    async fn payment_status(&self, reference_id: &str) -> BackendResult<PaymentStatusReport> {
        let path = self
            .http
            .path(&["api", "payments", "gcash", reference_id, "status"])?;
        Ok(self.http.get(&path).await?)
    }

    async fn force_complete(&self, reference_id: &str) -> BackendResult<ManualCompletion> {
        let path = self
            .http
            .path(&["api", "payments", "gcash", reference_id, "complete"])?;
        Ok(self.http.post_empty(&path).await?)
    }
}
