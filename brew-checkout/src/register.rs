//! Register: the cart, the discount and the guard every flow shares

use parking_lot::Mutex;
use shared::models::{CartLine, DiscountPercent};
use std::sync::Arc;

use crate::cart::CartStore;
use crate::error::{CheckoutError, CheckoutResult};
use crate::guard::{CheckoutGuard, CheckoutLease};
use crate::pricing::{PricingEngine, PricingSnapshot};
use crate::session::{ResumeMarker, SessionContext};

/// Cart contents and pricing inputs captured at checkout start
#[derive(Debug, Clone, PartialEq)]
pub struct CartSnapshot {
    pub lines: Vec<CartLine>,
    pub discount: DiscountPercent,
    pub tax_percent: u32,
    pub pricing: PricingSnapshot,
}

#[derive(Debug, Default)]
struct RegisterState {
    cart: CartStore,
    discount: DiscountPercent,
    /// Cart was loaded from held transactions and is settled as-is
    reopened: bool,
}

/// Cheap to clone; clones share state
#[derive(Debug, Clone, Default)]
pub struct Register {
    state: Arc<Mutex<RegisterState>>,
    engine: PricingEngine,
    guard: CheckoutGuard,
}

impl Register {
    pub fn new(engine: PricingEngine) -> Self {
        Self {
            state: Arc::default(),
            engine,
            guard: CheckoutGuard::new(),
        }
    }

    pub fn engine(&self) -> PricingEngine {
        self.engine
    }

    pub fn guard(&self) -> &CheckoutGuard {
        &self.guard
    }

    pub fn lines(&self) -> Vec<CartLine> {
        self.state.lock().cart.lines().to_vec()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().cart.is_empty()
    }

    pub fn discount(&self) -> DiscountPercent {
        self.state.lock().discount
    }

    /// Totals as currently displayed
    pub fn pricing(&self) -> PricingSnapshot {
        let state = self.state.lock();
        self.engine.price(state.cart.lines(), state.discount)
    }

    pub fn snapshot(&self) -> CartSnapshot {
        let state = self.state.lock();
        CartSnapshot {
            lines: state.cart.lines().to_vec(),
            discount: state.discount,
            tax_percent: self.engine.tax_percent(),
            pricing: self.engine.price(state.cart.lines(), state.discount),
        }
    }

    pub fn is_reopened(&self) -> bool {
        self.state.lock().reopened
    }

    /// Operator edit of the cart; refused while a checkout owns it or
    /// while it holds a reopened sale
    pub fn edit<R>(&self, f: impl FnOnce(&mut CartStore) -> R) -> CheckoutResult<R> {
        let mut state = self.state.lock();
        self.ensure_editable(&state)?;
        Ok(f(&mut state.cart))
    }

    pub fn set_discount(&self, discount: DiscountPercent) -> CheckoutResult<()> {
        let mut state = self.state.lock();
        self.ensure_editable(&state)?;
        state.discount = discount;
        Ok(())
    }

    /// Replace the cart with held transactions being reopened. The cart
    /// stays read-only until it is settled or cleared.
    pub fn load_reopened(&self, cart: CartStore, discount: DiscountPercent) -> CheckoutResult<()> {
        let mut state = self.state.lock();
        self.ensure_idle()?;
        state.cart = cart;
        state.discount = discount;
        state.reopened = true;
        Ok(())
    }

    /// Empty the cart and forget any reopened sale
    pub fn clear(&self, session: &mut SessionContext) -> CheckoutResult<Option<ResumeMarker>> {
        let mut state = self.state.lock();
        self.ensure_idle()?;
        state.cart.clear();
        state.discount = DiscountPercent::NONE;
        state.reopened = false;
        Ok(session.clear_resume())
    }

    /// Load while holding the lease of the flow that restores the cart
    pub(crate) fn load_owned(&self, _lease: &CheckoutLease, cart: CartStore, discount: DiscountPercent) {
        let mut state = self.state.lock();
        state.cart = cart;
        state.discount = discount;
        state.reopened = false;
    }

    /// Cart change made by the flow that owns the register
    pub(crate) fn edit_owned<R>(&self, _lease: &CheckoutLease, f: impl FnOnce(&mut CartStore) -> R) -> R {
        f(&mut self.state.lock().cart)
    }

    /// Terminal success of a flow: empty cart, no discount
    pub(crate) fn reset(&self, lease: &CheckoutLease) {
        let mut state = self.state.lock();
        state.cart.clear();
        state.discount = DiscountPercent::NONE;
        state.reopened = false;
        tracing::info!(kind = %lease.kind(), "Register cleared");
    }

    /// Callers hold the state lock, so a flow that claims the register
    /// meanwhile snapshots the cart only after the change
    fn ensure_idle(&self) -> CheckoutResult<()> {
        match self.guard.state().active() {
            Some(active) => Err(CheckoutError::CheckoutInProgress { active }),
            None => Ok(()),
        }
    }

    fn ensure_editable(&self, state: &RegisterState) -> CheckoutResult<()> {
        self.ensure_idle()?;
        if state.reopened {
            return Err(CheckoutError::ReopenedCartLocked);
        }
        Ok(())
    }
}
