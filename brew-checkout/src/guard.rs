//! Single-checkout guard
//!
//! Cash, hold and GCash all operate on the same cart, so at most one of
//! them may be active. A flow calls [`CheckoutGuard::try_begin`] before it
//! touches the network and keeps the returned [`CheckoutLease`] until it
//! reaches a terminal state; dropping the lease frees the register.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

use crate::error::CheckoutError;

/// Which flow owns the cart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckoutKind {
    Cash,
    Hold,
    GCash,
}

impl CheckoutKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CheckoutKind::Cash => "cash",
            CheckoutKind::Hold => "hold",
            CheckoutKind::GCash => "gcash",
        }
    }
}

impl fmt::Display for CheckoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Guard state shared by all three flows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutState {
    #[default]
    NoCheckout,
    Active(CheckoutKind),
}

impl CheckoutState {
    pub fn active(&self) -> Option<CheckoutKind> {
        match self {
            CheckoutState::NoCheckout => None,
            CheckoutState::Active(kind) => Some(*kind),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CheckoutGuard {
    state: Arc<Mutex<CheckoutState>>,
}

impl CheckoutGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CheckoutState {
        *self.state.lock()
    }

    pub fn is_busy(&self) -> bool {
        self.state().active().is_some()
    }

    /// Claim the register for `kind`
    pub fn try_begin(&self, kind: CheckoutKind) -> Result<CheckoutLease, CheckoutError> {
        let mut state = self.state.lock();
        if let CheckoutState::Active(active) = *state {
            tracing::debug!(requested = %kind, active = %active, "Checkout rejected, register busy");
            return Err(CheckoutError::CheckoutInProgress { active });
        }
        *state = CheckoutState::Active(kind);
        tracing::debug!(kind = %kind, "Checkout started");
        Ok(CheckoutLease {
            state: Arc::clone(&self.state),
            kind,
        })
    }
}

/// Ownership of the register; restores `NoCheckout` on drop
#[derive(Debug)]
pub struct CheckoutLease {
    state: Arc<Mutex<CheckoutState>>,
    kind: CheckoutKind,
}

impl CheckoutLease {
    pub fn kind(&self) -> CheckoutKind {
        self.kind
    }
}

impl Drop for CheckoutLease {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        if *state == CheckoutState::Active(self.kind) {
            *state = CheckoutState::NoCheckout;
            tracing::debug!(kind = %self.kind, "Checkout released");
        }
    }
}
