//! Cash checkout
//!
//! ```text
//! Idle ──begin──▶ AmountEntry ──confirm──▶ Submitting ──▶ Completed
//!                     ▲                        │
//!                     └──────── Failed ◀───────┘
//! ```
//!
//! Confirm is only possible once the tendered amount covers the grand
//! total. A failed submission keeps the register locked so the operator
//! can retry or cancel. A retry sends only what the backend has not
//! recorded yet; cancelling takes the recorded lines off the cart.

use rust_decimal::Decimal;
use shared::payment::PaymentMethod;
use std::sync::Arc;

use crate::backend::SalesBackend;
use crate::error::{CheckoutError, CheckoutResult};
use crate::guard::{CheckoutKind, CheckoutLease};
use crate::money::{change_due, is_tender_sufficient, validate_tender};
use crate::register::{CartSnapshot, Register};
use crate::session::SessionContext;
use crate::storage::LocalStore;
use crate::submit::{resume_held, submit_purchase_lines};

#[derive(Debug, Clone, PartialEq)]
pub enum CashState {
    Idle,
    AmountEntry,
    Submitting,
    Completed(CashReceipt),
    Failed(String),
}

/// What the operator hands back to the customer
#[derive(Debug, Clone, PartialEq)]
pub struct CashReceipt {
    pub grand_total: Decimal,
    pub tendered: Decimal,
    pub change: Decimal,
    pub lines: usize,
    /// Held transactions finalized instead of new purchases
    pub resumed: Vec<i64>,
}

pub struct CashCheckout {
    backend: Arc<dyn SalesBackend>,
    store: LocalStore,
    register: Register,
    state: CashState,
    lease: Option<CheckoutLease>,
    snapshot: Option<CartSnapshot>,
    tendered: Option<Decimal>,
    /// Product ids, or held ids when resuming, already recorded this checkout
    settled: Vec<i64>,
}

impl CashCheckout {
    pub fn new(backend: Arc<dyn SalesBackend>, store: LocalStore, register: Register) -> Self {
        Self {
            backend,
            store,
            register,
            state: CashState::Idle,
            lease: None,
            snapshot: None,
            tendered: None,
            settled: Vec::new(),
        }
    }

    pub fn state(&self) -> &CashState {
        &self.state
    }

    /// Lock the register and start amount entry; returns the amount due
    pub fn begin(&mut self) -> CheckoutResult<Decimal> {
        if self.lease.is_some() {
            return Err(CheckoutError::InvalidState("cash checkout already open".into()));
        }
        if self.register.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let lease = self.register.guard().try_begin(CheckoutKind::Cash)?;
        let snapshot = self.register.snapshot();
        let due = snapshot.pricing.grand_total;

        self.lease = Some(lease);
        self.snapshot = Some(snapshot);
        self.tendered = None;
        self.settled.clear();
        self.state = CashState::AmountEntry;
        tracing::debug!(grand_total = %due, "Cash checkout opened");
        Ok(due)
    }

    pub fn grand_total(&self) -> Option<Decimal> {
        self.snapshot.as_ref().map(|s| s.pricing.grand_total)
    }

    /// Record the tendered amount; returns the change it would give
    pub fn enter_tendered(&mut self, amount: f64) -> CheckoutResult<Decimal> {
        let total = self.editable_total()?;
        let tendered = validate_tender(amount)?;
        self.tendered = Some(tendered);
        Ok(change_due(tendered, total))
    }

    /// `max(0, tendered - grand_total)`
    pub fn change(&self) -> Decimal {
        match (self.tendered, self.grand_total()) {
            (Some(tendered), Some(total)) => change_due(tendered, total),
            _ => Decimal::ZERO,
        }
    }

    pub fn can_confirm(&self) -> bool {
        matches!(self.state, CashState::AmountEntry | CashState::Failed(_))
            && matches!(
                (self.tendered, self.grand_total()),
                (Some(tendered), Some(total)) if is_tender_sufficient(tendered, total)
            )
    }

    /// Submit the sale. With a resume marker in the session the held
    /// transactions are finalized instead of submitting new purchases.
    pub async fn confirm(&mut self, session: &mut SessionContext) -> CheckoutResult<CashReceipt> {
        let total = self.editable_total()?;
        let tendered = self.tendered.unwrap_or(Decimal::ZERO);
        if !is_tender_sufficient(tendered, total) {
            return Err(CheckoutError::InsufficientTender {
                tendered,
                required: total,
            });
        }
        let Some(snapshot) = self.snapshot.clone() else {
            return Err(CheckoutError::InvalidState("cash checkout not open".into()));
        };

        self.state = CashState::Submitting;
        let resumed = session
            .resume_marker()
            .map(|m| m.held_ids())
            .unwrap_or_default();

        let result = if resumed.is_empty() {
            let outstanding: Vec<_> = snapshot
                .lines
                .iter()
                .filter(|l| !self.settled.contains(&l.product_id))
                .cloned()
                .collect();
            submit_purchase_lines(
                self.backend.as_ref(),
                &outstanding,
                snapshot.discount,
                snapshot.tax_percent,
                PaymentMethod::Cash,
                None,
            )
            .await
            .map(|_| ())
        } else {
            let outstanding: Vec<i64> = resumed
                .iter()
                .copied()
                .filter(|id| !self.settled.contains(id))
                .collect();
            resume_held(self.backend.as_ref(), &outstanding).await.map(|_| ())
        };

        if let Err(e) = result {
            self.settled.extend_from_slice(e.accepted_ids());
            tracing::warn!(error = %e, settled = ?self.settled, "Cash checkout failed");
            self.state = CashState::Failed(e.user_message());
            return Err(e);
        }

        let receipt = CashReceipt {
            grand_total: total,
            tendered,
            change: change_due(tendered, total),
            lines: snapshot.lines.len(),
            resumed,
        };
        if let Some(lease) = self.lease.take() {
            self.register.reset(&lease);
        }
        if !receipt.resumed.is_empty() {
            session.clear_resume();
            if let Err(e) = self.store.remove_held(&receipt.resumed) {
                tracing::warn!(error = %e, "Failed to drop resumed holds from mirror");
            }
        }
        self.snapshot = None;
        self.tendered = None;
        self.settled.clear();
        tracing::info!(
            grand_total = %receipt.grand_total,
            change = %receipt.change,
            resumed = receipt.resumed.len(),
            "Cash checkout completed"
        );
        self.state = CashState::Completed(receipt.clone());
        Ok(receipt)
    }

    /// Abandon the checkout and unlock the register. The cart is kept,
    /// minus whatever a failed attempt already recorded.
    pub fn cancel(&mut self, session: &mut SessionContext) {
        if let Some(lease) = self.lease.take() {
            if !self.settled.is_empty() {
                self.drop_settled(&lease, session);
            }
            tracing::debug!("Cash checkout cancelled");
        }
        self.snapshot = None;
        self.tendered = None;
        self.settled.clear();
        self.state = CashState::Idle;
    }

    fn drop_settled(&self, lease: &CheckoutLease, session: &mut SessionContext) {
        let finalized = session.settle_resumed(&self.settled);
        if finalized.is_empty() {
            let settled = &self.settled;
            self.register.edit_owned(lease, |cart| {
                for &product_id in settled {
                    cart.remove(product_id);
                }
            });
        } else {
            self.register.edit_owned(lease, |cart| {
                for hold in &finalized {
                    let left = cart
                        .get(hold.product_id)
                        .map_or(0, |l| i64::from(l.quantity) - i64::from(hold.quantity));
                    cart.set_quantity(hold.product_id, left);
                }
            });
            let held_ids: Vec<i64> = finalized.iter().map(|h| h.held_id).collect();
            if let Err(e) = self.store.remove_held(&held_ids) {
                tracing::warn!(error = %e, "Failed to drop resumed holds from mirror");
            }
        }
        tracing::warn!(settled = ?self.settled, "Recorded lines taken off the cancelled cart");
    }

    fn editable_total(&self) -> CheckoutResult<Decimal> {
        match (&self.state, self.grand_total()) {
            (CashState::AmountEntry | CashState::Failed(_), Some(total)) => Ok(total),
            (state, _) => Err(CheckoutError::InvalidState(format!(
                "cash checkout is {:?}",
                state
            ))),
        }
    }
}
