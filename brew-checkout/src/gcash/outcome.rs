//! Single-assignment outcome of a GCash session
//!
//! Several producers may try to end a session: the poller seeing the
//! webhook's completion, the poller's own manual completion, the operator
//! closing the session, the optional timeout. Only the first write sticks.

use std::sync::OnceLock;
use tokio::sync::Notify;

/// Which signal completed the payment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionSource {
    /// Backend had already materialized the sale from the pending record
    Webhook,
    /// Client forced completion and submitted the purchase itself
    ManualCompletion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Completed(CompletionSource),
    /// Closed by the operator
    Cancelled,
    /// Local session timeout elapsed
    Expired,
}

impl SessionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, SessionOutcome::Completed(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionOutcome::Completed(CompletionSource::Webhook) => "completed_by_webhook",
            SessionOutcome::Completed(CompletionSource::ManualCompletion) => "completed_manually",
            SessionOutcome::Cancelled => "cancelled",
            SessionOutcome::Expired => "expired",
        }
    }
}

#[derive(Debug, Default)]
pub struct OutcomeSlot {
    value: OnceLock<SessionOutcome>,
    settled: Notify,
}

impl OutcomeSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when this call set the outcome
    pub fn try_settle(&self, outcome: SessionOutcome) -> bool {
        let won = self.value.set(outcome).is_ok();
        if won {
            self.settled.notify_waiters();
        }
        won
    }

    pub fn get(&self) -> Option<SessionOutcome> {
        self.value.get().copied()
    }

    pub fn is_settled(&self) -> bool {
        self.value.get().is_some()
    }

    /// Wait until some producer settles the slot
    pub async fn wait(&self) -> SessionOutcome {
        loop {
            let notified = self.settled.notified();
            if let Some(outcome) = self.get() {
                return outcome;
            }
            notified.await;
        }
    }
}
