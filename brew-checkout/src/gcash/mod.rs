//! GCash checkout
//!
//! ```text
//! Idle ──start──▶ CreatingIntent ──▶ AwaitingAuthorization ──▶ Completing ──▶ Completed
//!                      │                     │
//!                      ▼                     ├──close──▶ Cancelled
//!                 (error, Idle)              └─timeout─▶ Expired
//! ```
//!
//! `start` covers intent creation, snapshot persistence and QR rendering;
//! any failure there returns the error with the cart untouched and the
//! register unlocked. Once a [`GcashSession`] exists its poll task drives
//! the rest. Provider `cancelled`/`expired`/`failed` statuses are only
//! published; the operator decides when to close.

mod outcome;
mod poller;

pub use outcome::{CompletionSource, OutcomeSlot, SessionOutcome};

use parking_lot::Mutex;
use rust_decimal::Decimal;
use shared::payment::{PaymentIntentRequest, PaymentStatus, PendingPaymentRecord, QrCode};
use std::sync::Arc;
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::backend::{PaymentGateway, SalesBackend};
use crate::cart::CartStore;
use crate::config::GcashConfig;
use crate::error::{CheckoutError, CheckoutResult};
use crate::guard::{CheckoutKind, CheckoutLease};
use crate::pricing::PricingEngine;
use crate::register::{CartSnapshot, Register};
use crate::session::SessionContext;
use crate::storage::LocalStore;
use poller::SessionCore;

/// Observable state of an open session
#[derive(Debug, Clone, PartialEq)]
pub enum GcashState {
    /// Last provider status seen; `cancelled`/`expired`/`failed` are advisory
    AwaitingAuthorization { provider_status: PaymentStatus },
    /// Provider authorized; manual completion in flight
    Completing,
    Completed(CompletionSource),
    Cancelled,
    Expired,
}

impl GcashState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GcashState::Completed(_) | GcashState::Cancelled | GcashState::Expired
        )
    }
}

impl From<SessionOutcome> for GcashState {
    fn from(outcome: SessionOutcome) -> Self {
        match outcome {
            SessionOutcome::Completed(source) => GcashState::Completed(source),
            SessionOutcome::Cancelled => GcashState::Cancelled,
            SessionOutcome::Expired => GcashState::Expired,
        }
    }
}

/// Starts and recovers GCash sessions for a register
#[derive(Clone)]
pub struct GcashCheckout {
    sales: Arc<dyn SalesBackend>,
    gateway: Arc<dyn PaymentGateway>,
    store: LocalStore,
    register: Register,
    config: GcashConfig,
}

impl GcashCheckout {
    pub fn new(
        sales: Arc<dyn SalesBackend>,
        gateway: Arc<dyn PaymentGateway>,
        store: LocalStore,
        register: Register,
        config: GcashConfig,
    ) -> Self {
        Self {
            sales,
            gateway,
            store,
            register,
            config,
        }
    }

    /// Create the payment intent for the current cart and start polling
    pub async fn start(&self, session: &SessionContext) -> CheckoutResult<GcashSession> {
        if self.register.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        if session.is_resuming() {
            return Err(CheckoutError::InvalidState(
                "reopened hold must be settled in cash".into(),
            ));
        }

        let lease = self.register.guard().try_begin(CheckoutKind::GCash)?;
        let snapshot = self.register.snapshot();
        let amount = snapshot.pricing.grand_total;

        let request = PaymentIntentRequest {
            amount,
            description: format!(
                "{} item(s)",
                snapshot.lines.iter().map(|l| u64::from(l.quantity)).sum::<u64>()
            ),
        };
        let intent = self
            .gateway
            .create_intent(&request)
            .await
            .map_err(CheckoutError::PaymentIntent)?;
        tracing::info!(reference_id = %intent.reference_id, amount = %amount, "GCash payment intent created");

        let record = PendingPaymentRecord {
            reference_id: intent.reference_id.clone(),
            cart_lines: snapshot.lines.clone(),
            discount_percent: snapshot.discount,
            tax_percent: snapshot.tax_percent,
            grand_total: amount,
            timestamp: chrono::Utc::now().timestamp_millis(),
        };
        self.store.store_pending_payment(&record)?;
        if let Err(e) = self.sales.save_pending_payment(&record).await {
            self.drop_snapshot(&record.reference_id);
            return Err(e.into());
        }

        let qr = match self.gateway.render_qr(&intent.checkout_url).await {
            Ok(qr) => qr,
            Err(e) => {
                self.drop_snapshot(&record.reference_id);
                return Err(CheckoutError::QrRender(e));
            }
        };

        Ok(self.spawn(lease, snapshot, intent.reference_id, Some(intent.checkout_url), Some(qr)))
    }

    /// Snapshots of sessions that never reached a terminal state
    pub fn pending_sessions(&self) -> CheckoutResult<Vec<PendingPaymentRecord>> {
        Ok(self.store.get_pending_payments()?)
    }

    /// Restore the cart of a surviving snapshot and resume polling it.
    /// The QR is not re-rendered.
    pub fn reattach(&self, record: PendingPaymentRecord) -> CheckoutResult<GcashSession> {
        let lease = self.register.guard().try_begin(CheckoutKind::GCash)?;

        let cart = CartStore::from_lines(record.cart_lines);
        let pricing = PricingEngine::new(record.tax_percent).price(cart.lines(), record.discount_percent);
        if pricing.grand_total != record.grand_total {
            tracing::warn!(
                reference_id = %record.reference_id,
                stored = %record.grand_total,
                computed = %pricing.grand_total,
                "Snapshot total differs from recomputed total"
            );
        }
        let snapshot = CartSnapshot {
            lines: cart.lines().to_vec(),
            discount: record.discount_percent,
            tax_percent: record.tax_percent,
            pricing,
        };
        self.register.load_owned(&lease, cart, record.discount_percent);

        tracing::info!(reference_id = %record.reference_id, "GCash session reattached");
        Ok(self.spawn(lease, snapshot, record.reference_id, None, None))
    }

    /// Forget a surviving snapshot without polling it
    pub fn discard_pending(&self, reference_id: &str) -> CheckoutResult<bool> {
        Ok(self.store.remove_pending_payment(reference_id)?)
    }

    /// Undo the snapshot of a session that never started; the caller
    /// reports its own error
    fn drop_snapshot(&self, reference_id: &str) {
        if let Err(e) = self.store.remove_pending_payment(reference_id) {
            tracing::warn!(reference_id = %reference_id, error = %e, "Failed to drop payment snapshot");
        }
    }

    fn spawn(
        &self,
        lease: CheckoutLease,
        snapshot: CartSnapshot,
        reference_id: String,
        checkout_url: Option<String>,
        qr: Option<QrCode>,
    ) -> GcashSession {
        let (state_tx, state_rx) = watch::channel(GcashState::AwaitingAuthorization {
            provider_status: PaymentStatus::Pending,
        });
        let core = Arc::new(SessionCore {
            reference_id,
            snapshot,
            sales: Arc::clone(&self.sales),
            gateway: Arc::clone(&self.gateway),
            store: self.store.clone(),
            register: self.register.clone(),
            lease: Mutex::new(Some(lease)),
            qr: Mutex::new(qr),
            settled: Mutex::default(),
            slot: OutcomeSlot::new(),
            stop: CancellationToken::new(),
            wake: Notify::new(),
            state: state_tx,
        });

        let task = tokio::spawn(poller::run(
            Arc::clone(&core),
            self.config.poll_interval,
            self.config.session_timeout,
        ));

        GcashSession {
            core,
            checkout_url,
            state_rx,
            task,
        }
    }
}

/// Handle to an open GCash session
///
/// Dropping the handle without closing stops polling but keeps the local
/// snapshot, so the session can be reattached later.
pub struct GcashSession {
    core: Arc<SessionCore>,
    checkout_url: Option<String>,
    state_rx: watch::Receiver<GcashState>,
    task: JoinHandle<()>,
}

impl GcashSession {
    pub fn reference_id(&self) -> &str {
        &self.core.reference_id
    }

    pub fn checkout_url(&self) -> Option<&str> {
        self.checkout_url.as_deref()
    }

    /// Rendered QR image; released once the session settles
    pub fn qr_image(&self) -> Option<String> {
        self.core.qr.lock().as_ref().map(|qr| qr.qr_image.clone())
    }

    pub fn grand_total(&self) -> Decimal {
        self.core.snapshot.pricing.grand_total
    }

    pub fn state(&self) -> GcashState {
        self.state_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<GcashState> {
        self.state_rx.clone()
    }

    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.core.slot.get()
    }

    pub async fn wait(&self) -> SessionOutcome {
        self.core.slot.wait().await
    }

    /// Poll now instead of waiting for the next interval
    pub fn check_now(&self) {
        self.core.wake.notify_one();
    }

    pub fn is_polling(&self) -> bool {
        !self.task.is_finished()
    }

    /// Operator closes the session. The provider intent is left alone.
    /// Returns false when the session had already settled.
    pub fn close(&self) -> bool {
        self.core.finish(SessionOutcome::Cancelled)
    }
}

impl std::fmt::Debug for GcashSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcashSession")
            .field("reference_id", &self.core.reference_id)
            .field("checkout_url", &self.checkout_url)
            .finish_non_exhaustive()
    }
}

impl Drop for GcashSession {
    fn drop(&mut self) {
        if !self.core.slot.is_settled() {
            tracing::debug!(reference_id = %self.core.reference_id, "GCash session detached");
            self.core.stop.cancel();
        }
    }
}
