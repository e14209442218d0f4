//! Hold orchestration
//!
//! Suspends the current cart as one held transaction per line, and loads
//! held transactions back into the cart for settlement.

use shared::models::{CartLine, DiscountPercent, HeldTransaction, Product};
use std::sync::Arc;
use std::time::Duration;

use crate::backend::SalesBackend;
use crate::cart::CartStore;
use crate::error::{CheckoutError, CheckoutResult};
use crate::guard::CheckoutKind;
use crate::register::Register;
use crate::session::{ReopenedHold, SessionContext};
use crate::storage::LocalStore;
use crate::submit::{BatchReport, submit_hold_lines};

#[derive(Clone)]
pub struct HoldOrchestrator {
    backend: Arc<dyn SalesBackend>,
    store: LocalStore,
    register: Register,
    settle_delay: Duration,
}

impl HoldOrchestrator {
    pub fn new(
        backend: Arc<dyn SalesBackend>,
        store: LocalStore,
        register: Register,
        settle_delay: Duration,
    ) -> Self {
        Self {
            backend,
            store,
            register,
            settle_delay,
        }
    }

    /// Hold the register's cart with its discount and tax rate
    ///
    /// A cart reopened from a hold must be settled or cleared first,
    /// otherwise the original held records would be duplicated.
    pub async fn hold(&self, session: &SessionContext) -> CheckoutResult<BatchReport<HeldTransaction>> {
        if self.register.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        if session.is_resuming() {
            return Err(CheckoutError::InvalidState(
                "reopened hold must be settled or cleared before holding again".into(),
            ));
        }

        let lease = self.register.guard().try_begin(CheckoutKind::Hold)?;
        let snapshot = self.register.snapshot();
        let report = match self
            .hold_lines(&snapshot.lines, snapshot.discount, snapshot.tax_percent)
            .await
        {
            Ok(report) => report,
            Err(e) => {
                // Held lines stay held on the server; keep only the rest
                let held = e.accepted_ids();
                if !held.is_empty() {
                    self.register.edit_owned(&lease, |cart| {
                        for &product_id in held {
                            cart.remove(product_id);
                        }
                    });
                }
                return Err(e);
            }
        };

        self.register.reset(&lease);
        drop(lease);

        // Mirror is display-only; a local write failure must not undo a successful hold
        let held: Vec<HeldTransaction> = report.accepted.iter().map(|a| a.value.clone()).collect();
        if let Err(e) = self.store.mirror_held(&held) {
            tracing::warn!(error = %e, "Failed to mirror held transactions");
        }

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
        Ok(report)
    }

    /// Submit `lines` as held transactions without touching the register
    pub async fn hold_lines(
        &self,
        lines: &[CartLine],
        discount: DiscountPercent,
        tax_percent: u32,
    ) -> CheckoutResult<BatchReport<HeldTransaction>> {
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let report = submit_hold_lines(self.backend.as_ref(), lines, discount, tax_percent).await?;
        tracing::info!(lines = report.len(), discount = %discount, "Cart held");
        Ok(report)
    }

    /// Held transactions of the branch. Falls back to the local mirror when
    /// the backend cannot be reached.
    pub async fn held_transactions(&self) -> CheckoutResult<Vec<HeldTransaction>> {
        match self.backend.list_holds().await {
            Ok(held) => {
                if let Err(e) = self.store.replace_held(&held) {
                    tracing::warn!(error = %e, "Failed to refresh held mirror");
                }
                Ok(held)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Listing holds failed, using local mirror");
                Ok(self.store.get_held()?)
            }
        }
    }

    /// Load held transactions back into the cart and mark the session as
    /// resuming them. Names and prices come from the current catalog. The
    /// cart cannot be edited until it is settled or cleared.
    pub fn reopen(
        &self,
        held: &[HeldTransaction],
        catalog: &[Product],
        session: &mut SessionContext,
    ) -> CheckoutResult<()> {
        let Some(first) = held.first() else {
            return Err(CheckoutError::EmptyCart);
        };

        let lines = held
            .iter()
            .map(|h| held_to_line(h, catalog))
            .collect::<CheckoutResult<Vec<_>>>()?;
        let reopened = held
            .iter()
            .zip(&lines)
            .map(|(h, line)| ReopenedHold {
                held_id: h.id,
                product_id: line.product_id,
                quantity: line.quantity,
            })
            .collect();
        let cart = CartStore::from_lines(lines);
        self.register.load_reopened(cart, first.discount_percent)?;

        let ids: Vec<i64> = held.iter().map(|h| h.id).collect();
        tracing::info!(held_ids = ?ids, "Held transactions reopened");
        session.mark_resumed(reopened);
        Ok(())
    }
}

fn held_to_line(held: &HeldTransaction, catalog: &[Product]) -> CheckoutResult<CartLine> {
    let product = catalog
        .iter()
        .find(|p| p.id == held.menu_item_id)
        .ok_or(CheckoutError::ProductNotFound(held.menu_item_id))?;

    let mut line = match held.menu_item_size_id {
        Some(size_id) => {
            let size = product.size(size_id).ok_or_else(|| CheckoutError::SizeUnavailable {
                product: product.name.clone(),
                size_id,
            })?;
            CartLine {
                product_id: product.id,
                name: product.name.clone(),
                unit_price: size.price,
                quantity: 1,
                selected_size: Some(size.label.clone()),
                selected_size_id: Some(size.id),
                sugar_level: None,
            }
        }
        None => CartLine::plain(product.id, product.name.clone(), product.price),
    };
    line.quantity = held.quantity.max(1);
    Ok(line)
}
