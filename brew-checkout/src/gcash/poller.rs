//! Reconciliation loop of one GCash session
//!
//! Ticks are strictly sequential: a status poll and its possible manual
//! completion finish before the next tick starts. The loop ends when the
//! outcome slot is settled, by whichever producer gets there first.

use parking_lot::Mutex;
use shared::payment::{PaymentMethod, PaymentStatus, QrCode};
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::GcashState;
use super::outcome::{CompletionSource, OutcomeSlot, SessionOutcome};
use crate::backend::{PaymentGateway, SalesBackend};
use crate::error::CheckoutResult;
use crate::guard::CheckoutLease;
use crate::register::{CartSnapshot, Register};
use crate::storage::LocalStore;
use crate::submit::submit_purchase_lines;

/// State shared by the session handle and its poll task
pub(super) struct SessionCore {
    pub(super) reference_id: String,
    pub(super) snapshot: CartSnapshot,
    pub(super) sales: Arc<dyn SalesBackend>,
    pub(super) gateway: Arc<dyn PaymentGateway>,
    pub(super) store: LocalStore,
    pub(super) register: Register,
    pub(super) lease: Mutex<Option<CheckoutLease>>,
    pub(super) qr: Mutex<Option<QrCode>>,
    /// Product ids already recorded by an earlier completion attempt
    pub(super) settled: Mutex<Vec<i64>>,
    pub(super) slot: OutcomeSlot,
    pub(super) stop: CancellationToken,
    pub(super) wake: Notify,
    pub(super) state: watch::Sender<GcashState>,
}

impl SessionCore {
    /// Settle the session. Only the winning caller runs the terminal side
    /// effects; later callers are no-ops.
    pub(super) fn finish(&self, outcome: SessionOutcome) -> bool {
        if !self.slot.try_settle(outcome) {
            tracing::warn!(
                reference_id = %self.reference_id,
                attempted = outcome.as_str(),
                settled = self.slot.get().map(|o| o.as_str()).unwrap_or("unknown"),
                "GCash session already settled, ignoring"
            );
            return false;
        }

        self.stop.cancel();
        self.qr.lock().take();
        if let Err(e) = self.store.remove_pending_payment(&self.reference_id) {
            tracing::warn!(reference_id = %self.reference_id, error = %e, "Failed to remove pending payment snapshot");
        }

        let lease = self.lease.lock().take();
        if let Some(lease) = lease
            && outcome.is_completed()
        {
            self.register.reset(&lease);
        }

        self.state.send_replace(GcashState::from(outcome));
        tracing::info!(
            reference_id = %self.reference_id,
            outcome = outcome.as_str(),
            grand_total = %self.snapshot.pricing.grand_total,
            "GCash session settled"
        );
        true
    }

    /// Publish a non-terminal state unless the session already settled
    fn publish(&self, next: GcashState) {
        self.state.send_if_modified(|current| {
            if self.slot.is_settled() || *current == next {
                return false;
            }
            *current = next;
            true
        });
    }

    async fn tick(&self) -> ControlFlow<()> {
        let report = match self.gateway.payment_status(&self.reference_id).await {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(reference_id = %self.reference_id, error = %e, "Payment status poll failed");
                return ControlFlow::Continue(());
            }
        };
        if self.slot.is_settled() {
            return ControlFlow::Break(());
        }
        tracing::debug!(
            reference_id = %self.reference_id,
            status = %report.status,
            completed = report.completed,
            "Payment status"
        );

        if report.completed {
            self.finish(SessionOutcome::Completed(CompletionSource::Webhook));
            return ControlFlow::Break(());
        }

        // Provider-side completion without a materialized sale takes the manual path too
        if report.status.is_authorized() || report.status == PaymentStatus::Completed {
            self.publish(GcashState::Completing);
            match self.complete_manually().await {
                Ok(true) => {
                    self.finish(SessionOutcome::Completed(CompletionSource::ManualCompletion));
                    return ControlFlow::Break(());
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(reference_id = %self.reference_id, error = %e, "Manual completion failed, retrying next tick");
                }
            }
        } else if report.status.is_terminal_failure() {
            tracing::warn!(
                reference_id = %self.reference_id,
                status = %report.status,
                "Provider reports payment not going through, waiting for operator"
            );
        }

        self.publish(GcashState::AwaitingAuthorization {
            provider_status: report.status,
        });
        if self.slot.is_settled() {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    /// Force-complete and record the sale. `Ok(false)` means not yet.
    async fn complete_manually(&self) -> CheckoutResult<bool> {
        let completion = self.gateway.force_complete(&self.reference_id).await?;
        if !completion.success {
            tracing::debug!(
                reference_id = %self.reference_id,
                message = completion.message.as_deref().unwrap_or(""),
                "Manual completion not accepted yet"
            );
            return Ok(false);
        }
        if self.slot.is_settled() {
            return Ok(false);
        }

        let outstanding: Vec<_> = {
            let settled = self.settled.lock();
            self.snapshot
                .lines
                .iter()
                .filter(|l| !settled.contains(&l.product_id))
                .cloned()
                .collect()
        };
        if let Err(e) = submit_purchase_lines(
            self.sales.as_ref(),
            &outstanding,
            self.snapshot.discount,
            self.snapshot.tax_percent,
            PaymentMethod::GCash,
            Some(&self.reference_id),
        )
        .await
        {
            self.settled.lock().extend_from_slice(e.accepted_ids());
            return Err(e);
        }
        Ok(true)
    }
}

/// Poll until the session settles or the handle stops the task
pub(super) async fn run(core: Arc<SessionCore>, poll_interval: Duration, timeout: Option<Duration>) {
    tracing::info!(
        reference_id = %core.reference_id,
        interval_ms = poll_interval.as_millis() as u64,
        "GCash poller started"
    );

    let poll_interval = poll_interval.max(Duration::from_millis(1));
    let started = Instant::now();
    let mut ticker = tokio::time::interval_at(started + poll_interval, poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let deadline = timeout.map(|t| started + t);

    loop {
        tokio::select! {
            biased;
            _ = core.stop.cancelled() => break,
            _ = expire_at(deadline) => {
                tracing::info!(reference_id = %core.reference_id, "GCash session timed out");
                core.finish(SessionOutcome::Expired);
                break;
            }
            _ = core.wake.notified() => {}
            _ = ticker.tick() => {}
        }

        if core.tick().await.is_break() {
            break;
        }
    }

    tracing::debug!(reference_id = %core.reference_id, "GCash poller stopped");
}

async fn expire_at(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
