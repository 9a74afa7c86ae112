use crate::domain::order::{Order, PaymentMode};
use crate::error::{CheckoutError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Lifecycle of a single checkout attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
    Idle,
    Authorizing,
    Charging,
    Succeeded,
    Failed,
}

impl CheckoutState {
    /// The UI busy indicator is on exactly in these states.
    pub fn is_busy(&self) -> bool {
        matches!(self, CheckoutState::Authorizing | CheckoutState::Charging)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutState::Succeeded | CheckoutState::Failed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutAttempt {
    pub order_identifier: String,
    pub payment_mode: PaymentMode,
    pub state: CheckoutState,
    pub last_error: Option<String>,
}

/// Tracks the latest attempt per order.
///
/// An attempt that ends without a verdict is removed on the spot. A settled
/// attempt (`Succeeded` or `Failed`) stays readable until the caller collects
/// it with [`AttemptTracker::take`] or a new attempt for the order replaces
/// it, so at most one entry per order is retained.
///
/// The lock is never held across an await; [`AttemptGuard`] also takes it
/// from `Drop`.
#[derive(Default, Clone)]
pub struct AttemptTracker {
    attempts: Arc<Mutex<HashMap<String, CheckoutAttempt>>>,
}

impl AttemptTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new attempt in `Authorizing`.
    ///
    /// Fails with [`CheckoutError::AttemptInFlight`] while a previous attempt
    /// for the same order is still busy. A finished attempt is replaced.
    pub fn begin(&self, order: &Order) -> Result<AttemptGuard> {
        let mut attempts = self.lock();
        if let Some(existing) = attempts.get(&order.identifier)
            && existing.state.is_busy()
        {
            return Err(CheckoutError::AttemptInFlight(order.identifier.clone()));
        }
        attempts.insert(
            order.identifier.clone(),
            CheckoutAttempt {
                order_identifier: order.identifier.clone(),
                payment_mode: order.payment_mode,
                state: CheckoutState::Authorizing,
                last_error: None,
            },
        );
        Ok(AttemptGuard {
            tracker: self.clone(),
            order_identifier: order.identifier.clone(),
        })
    }

    pub fn get(&self, order_identifier: &str) -> Option<CheckoutAttempt> {
        self.lock().get(order_identifier).cloned()
    }

    /// State of the order's attempt; `Idle` when none is tracked.
    pub fn state(&self, order_identifier: &str) -> CheckoutState {
        self.get(order_identifier)
            .map_or(CheckoutState::Idle, |attempt| attempt.state)
    }

    pub fn is_busy(&self, order_identifier: &str) -> bool {
        self.state(order_identifier).is_busy()
    }

    /// Removes and returns a settled attempt. Busy attempts stay in place and
    /// `None` is returned.
    pub fn take(&self, order_identifier: &str) -> Option<CheckoutAttempt> {
        let mut attempts = self.lock();
        if attempts
            .get(order_identifier)
            .is_some_and(|attempt| attempt.state.is_terminal())
        {
            return attempts.remove(order_identifier);
        }
        None
    }

    fn transition(&self, order_identifier: &str, state: CheckoutState, error: Option<String>) {
        if let Some(attempt) = self.lock().get_mut(order_identifier) {
            debug!(order = order_identifier, from = ?attempt.state, to = ?state, "checkout transition");
            attempt.state = state;
            if error.is_some() {
                attempt.last_error = error;
            }
        }
    }

    fn discard(&self, order_identifier: &str) {
        if self.lock().remove(order_identifier).is_some() {
            debug!(order = order_identifier, "checkout attempt discarded");
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CheckoutAttempt>> {
        self.attempts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle on an in-flight attempt.
///
/// Ending the attempt consumes the guard. If the guard is dropped while still
/// busy (panic, or the checkout future being dropped) the attempt is
/// discarded, so the busy indicator is always released.
pub struct AttemptGuard {
    tracker: AttemptTracker,
    order_identifier: String,
}

impl AttemptGuard {
    pub fn state(&self) -> Option<CheckoutState> {
        self.tracker
            .get(&self.order_identifier)
            .map(|attempt| attempt.state)
    }

    pub fn start_charging(&self) {
        self.tracker
            .transition(&self.order_identifier, CheckoutState::Charging, None);
    }

    pub fn succeed(self) {
        self.tracker
            .transition(&self.order_identifier, CheckoutState::Succeeded, None);
    }

    pub fn fail(self, error: &CheckoutError) {
        self.tracker.transition(
            &self.order_identifier,
            CheckoutState::Failed,
            Some(error.to_string()),
        );
    }

    /// Ends the attempt without a verdict (dismissed widget, hand-off to a
    /// hosted page). The order is back to `Idle` and nothing is retained.
    pub fn reset(self) {
        self.tracker.discard(&self.order_identifier);
    }
}

impl Drop for AttemptGuard {
    fn drop(&mut self) {
        if self.state().is_some_and(|state| state.is_busy()) {
            self.tracker.discard(&self.order_identifier);
        }
    }
}
