//! Operator session context
//!
//! Holds what used to live in ambient browser storage: who is operating
//! the terminal and whether the current cart was reopened from a hold.
//! The terminal creates one per operator login and passes it to the
//! flows explicitly.

use chrono::{DateTime, Utc};

/// Operator identity taken from the bearer credential
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Operator {
    pub operator_id: Option<String>,
    pub branch_id: Option<i64>,
}

/// One held transaction loaded into the cart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReopenedHold {
    pub held_id: i64,
    pub product_id: i64,
    pub quantity: u32,
}

/// Set when held transactions are loaded back into the cart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeMarker {
    pub holds: Vec<ReopenedHold>,
    pub reopened_at: DateTime<Utc>,
}

impl ResumeMarker {
    pub fn held_ids(&self) -> Vec<i64> {
        self.holds.iter().map(|h| h.held_id).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    operator: Operator,
    resume: Option<ResumeMarker>,
}

impl SessionContext {
    pub fn new(operator: Operator) -> Self {
        Self {
            operator,
            resume: None,
        }
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    pub fn resume_marker(&self) -> Option<&ResumeMarker> {
        self.resume.as_ref()
    }

    pub fn is_resuming(&self) -> bool {
        self.resume.is_some()
    }

    /// Replaces any previous marker
    pub fn mark_resumed(&mut self, holds: Vec<ReopenedHold>) {
        tracing::debug!(held = holds.len(), "Resume marker set");
        self.resume = Some(ResumeMarker {
            holds,
            reopened_at: Utc::now(),
        });
    }

    /// Take finalized held ids off the marker and return their entries.
    /// The marker goes away once nothing is left to settle.
    pub fn settle_resumed(&mut self, held_ids: &[i64]) -> Vec<ReopenedHold> {
        let Some(marker) = self.resume.as_mut() else {
            return Vec::new();
        };
        let (settled, open): (Vec<_>, Vec<_>) = std::mem::take(&mut marker.holds)
            .into_iter()
            .partition(|h| held_ids.contains(&h.held_id));
        marker.holds = open;
        if marker.holds.is_empty() {
            self.resume = None;
        }
        settled
    }

    /// Drop the marker, e.g. when the operator clears the cart
    pub fn clear_resume(&mut self) -> Option<ResumeMarker> {
        self.resume.take()
    }
}
