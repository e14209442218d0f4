//! Per-line fan-out to the sales backend
//!
//! The backend has no multi-line cart: every line becomes its own request.
//! All requests of a batch are issued at once and the batch settles when
//! every line has answered. Any rejection fails the batch with the first
//! failing line in cart order; lines the backend already accepted stay
//! accepted and are reported back so callers never send them twice.

use futures::future::join_all;
use shared::models::{CartLine, DiscountPercent, HeldTransaction};
use shared::payment::PaymentMethod;
use shared::request::{HoldLineRequest, PurchaseLineRequest};
use shared::response::{PurchaseReceipt, ResumeReceipt};
use std::future::Future;

use crate::backend::{BackendResult, SalesBackend};
use crate::error::{CheckoutError, CheckoutResult};

/// One line the backend accepted
#[derive(Debug, Clone, PartialEq)]
pub struct Accepted<T> {
    /// Product id, or the held id for resume batches
    pub product_id: i64,
    pub name: String,
    pub value: T,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport<T> {
    pub accepted: Vec<Accepted<T>>,
}

impl<T> BatchReport<T> {
    pub fn names(&self) -> Vec<String> {
        self.accepted.iter().map(|a| a.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.accepted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }
}

/// Which batch is being sent, for logs
#[derive(Debug, Clone, Copy)]
enum BatchKind {
    Purchase,
    Hold,
    Resume,
}

impl BatchKind {
    fn as_str(self) -> &'static str {
        match self {
            BatchKind::Purchase => "purchase",
            BatchKind::Hold => "hold",
            BatchKind::Resume => "resume",
        }
    }
}

/// Submit every line as a completed sale
///
/// `reference` tags GCash sales with the provider reference so the
/// backend can dedupe against the webhook.
pub async fn submit_purchase_lines(
    backend: &dyn SalesBackend,
    lines: &[CartLine],
    discount: DiscountPercent,
    tax_percent: u32,
    method: PaymentMethod,
    reference: Option<&str>,
) -> CheckoutResult<BatchReport<PurchaseReceipt>> {
    let requests = lines.iter().map(|line| {
        let mut request = PurchaseLineRequest::from_line(line, discount, tax_percent, method);
        if let Some(reference_id) = reference {
            request = request.with_reference(reference_id);
        }
        let send = async move { backend.submit_purchase(&request).await };
        (line.product_id, line.name.clone(), send)
    });
    let report = fan_out(BatchKind::Purchase, requests.collect()).await?;

    for accepted in &report.accepted {
        if let Some(receipt) = &accepted.value.receipt {
            tracing::debug!(line = %accepted.name, receipt = %receipt, "Purchase receipt");
        }
    }
    Ok(report)
}

/// Submit every line as a held transaction (always tagged Cash)
pub async fn submit_hold_lines(
    backend: &dyn SalesBackend,
    lines: &[CartLine],
    discount: DiscountPercent,
    tax_percent: u32,
) -> CheckoutResult<BatchReport<HeldTransaction>> {
    let requests = lines.iter().map(|line| {
        let request = HoldLineRequest::from_line(line, discount, tax_percent);
        let send = async move { backend.create_hold(&request).await };
        (line.product_id, line.name.clone(), send)
    });
    fan_out(BatchKind::Hold, requests.collect()).await
}

/// Finalize reopened held transactions instead of submitting purchases
pub async fn resume_held(
    backend: &dyn SalesBackend,
    held_ids: &[i64],
) -> CheckoutResult<BatchReport<ResumeReceipt>> {
    let requests = held_ids.iter().map(|&held_id| {
        let send = async move { backend.resume_hold(held_id).await };
        (held_id, format!("held #{}", held_id), send)
    });
    fan_out(BatchKind::Resume, requests.collect()).await
}

async fn fan_out<T, Fut>(
    kind: BatchKind,
    requests: Vec<(i64, String, Fut)>,
) -> CheckoutResult<BatchReport<T>>
where
    Fut: Future<Output = BackendResult<T>>,
{
    if requests.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    tracing::debug!(batch = kind.as_str(), lines = requests.len(), "Submitting batch");
    let (labels, sends): (Vec<_>, Vec<_>) = requests
        .into_iter()
        .map(|(id, name, send)| ((id, name), send))
        .unzip();
    let results = join_all(sends).await;

    let mut accepted = Vec::with_capacity(labels.len());
    let mut first_failure = None;
    for ((id, name), result) in labels.into_iter().zip(results) {
        match result {
            Ok(value) => accepted.push(Accepted {
                product_id: id,
                name,
                value,
            }),
            Err(e) => {
                tracing::warn!(
                    batch = kind.as_str(),
                    line = %name,
                    id,
                    error = %e,
                    "Line rejected"
                );
                if first_failure.is_none() {
                    first_failure = Some((name, e));
                }
            }
        }
    }

    match first_failure {
        None => {
            tracing::info!(batch = kind.as_str(), lines = accepted.len(), "Batch accepted");
            Ok(BatchReport { accepted })
        }
        Some((line, e)) => {
            let accepted: Vec<(i64, String)> =
                accepted.into_iter().map(|a| (a.product_id, a.name)).collect();
            if !accepted.is_empty() {
                tracing::warn!(batch = kind.as_str(), accepted = ?accepted, "Partial batch left on server");
            }
            Err(CheckoutError::line_rejected(line, &e, accepted))
        }
    }
}
