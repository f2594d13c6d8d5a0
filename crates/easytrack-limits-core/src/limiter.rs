// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! The periodic spend limiter.
//!
//! [`PeriodicSpendLimiter`] tracks cumulative spending against a limit over
//! calendar-aligned periods.  Its public contract:
//!
//! * [`set_parameters`](PeriodicSpendLimiter::set_parameters) — change limit and duration
//! * [`record_spend`](PeriodicSpendLimiter::record_spend)     — debit the current period
//! * [`preview`](PeriodicSpendLimiter::preview)               — what a spend would do, read-only
//! * [`snapshot`](PeriodicSpendLimiter::snapshot)             — stored state, no rollover
//! * [`import`](PeriodicSpendLimiter::import)                 — rebuild from a validated snapshot
//!
//! Periods roll over lazily: the stored window only moves on the next
//! mutating call after it has ended.  Read paths that need an as-of-now
//! answer ([`preview`](PeriodicSpendLimiter::preview),
//! [`preview_spendable`](PeriodicSpendLimiter::preview_spendable),
//! [`is_under_spendable_balance`](PeriodicSpendLimiter::is_under_spendable_balance))
//! apply the same rollover without mutating anything.
//!
//! Every failing call leaves the state exactly as it was.

use core::fmt::Debug;
use core::hash::Hash;

use tracing::{debug, trace};

use crate::access::AccessGate;
use crate::calendar;
use crate::clock::Clock;
use crate::error::{ImportError, LimiterError};
use crate::state::LimiterState;
use crate::types::{
    Amount, Capability, LimiterEvent, Outcome, PeriodDuration, PeriodWindow, Preview, Snapshot,
    Timestamp,
};

/// State of the current period after any pending rollover at some instant.
#[derive(Debug, Clone, Copy)]
struct Effective {
    limit: Amount,
    duration: PeriodDuration,
    window: PeriodWindow,
    already_spent: Amount,
    advanced: bool,
}

impl Effective {
    /// `already_spent + amount` when it stays within the limit.
    fn spend(&self, amount: Amount) -> Option<Amount> {
        self.already_spent
            .checked_add(amount)
            .filter(|total| *total <= self.limit)
    }
}

/// Calendar-aligned spend limiter guarded by an [`AccessGate`].
///
/// Mutating calls take `&mut self`, so a single instance is never observed
/// mid-update.  Hosts sharing one limiter across threads or tasks wrap it in
/// a lock (see [`SharedLimiter`] with the `async` feature).
///
/// # Examples
///
/// ```rust
/// use easytrack_limits_core::{
///     access::AccessGate,
///     calendar::timestamp_from_date,
///     clock::ManualClock,
///     error::LimiterError,
///     limiter::PeriodicSpendLimiter,
///     types::Capability,
/// };
///
/// let clock = ManualClock::new(timestamp_from_date(2024, 3, 15));
/// let gate = AccessGate::from_grants([
///     ("voting", Capability::SetParameters),
///     ("factory", Capability::RecordSpend),
/// ]);
/// let mut limiter = PeriodicSpendLimiter::new(gate, clock.clone());
///
/// limiter.set_parameters(100, 1, &"voting").unwrap();
/// limiter.record_spend(70, &"factory").unwrap();
/// assert_eq!(limiter.snapshot().spendable, 30);
/// assert_eq!(limiter.record_spend(31, &"factory"), Err(LimiterError::LimitExceeded));
///
/// // Next month the full limit is available again.
/// clock.set(timestamp_from_date(2024, 4, 2));
/// limiter.record_spend(100, &"factory").unwrap();
/// ```
///
/// [`SharedLimiter`]: crate::async_limiter::SharedLimiter
#[derive(Debug)]
pub struct PeriodicSpendLimiter<P: Eq + Hash, C: Clock> {
    gate: AccessGate<P>,
    state: LimiterState,
    clock: C,
}

impl<P, C> PeriodicSpendLimiter<P, C>
where
    P: Eq + Hash + Clone + Debug,
    C: Clock,
{
    /// Create an uninitialized limiter.
    ///
    /// Spends fail with [`LimiterError::NotInitialized`] until the first
    /// successful [`set_parameters`](Self::set_parameters).
    pub fn new(gate: AccessGate<P>, clock: C) -> Self {
        Self {
            gate,
            state: LimiterState::uninitialized(),
            clock,
        }
    }

    /// Rebuild a limiter from a snapshot the host persisted earlier.
    ///
    /// The snapshot is trusted for nothing: every invariant is checked
    /// before the limiter is returned.  The stored window is kept as-is, so
    /// a snapshot from an earlier period rolls over on the next spend.
    ///
    /// # Errors
    ///
    /// An [`ImportError`] naming the first violated invariant.
    pub fn import(snapshot: &Snapshot, gate: AccessGate<P>, clock: C) -> Result<Self, ImportError> {
        let state = LimiterState::from_snapshot(snapshot)?;
        debug!(
            limit = state.limit(),
            duration_months = state.duration_months(),
            already_spent = state.already_spent(),
            "limiter imported from snapshot"
        );
        Ok(Self { gate, state, clock })
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Replace the limit and period duration.
    ///
    /// The current window is recomputed from the clock under the new
    /// duration.  If it is the same window as before, the spent amount is
    /// kept but clamped to `new_limit`; otherwise it restarts at zero.
    ///
    /// Returns [`LimiterEvent::PeriodAdvanced`] followed by
    /// [`LimiterEvent::ParametersChanged`].
    ///
    /// # Errors
    ///
    /// * [`LimiterError::Unauthorized`]: `caller` lacks `SetParameters`.
    /// * [`LimiterError::InvalidPeriodDuration`]: months not in `{1, 2, 3, 6, 12}`.
    ///
    /// `new_limit` is a `u128`, so the `2¹²⁸ − 1` bound holds by type;
    /// [`LimiterError::LimitTooLarge`] is raised where limits are parsed
    /// from text (see [`crate::amount`]).
    pub fn set_parameters(
        &mut self,
        new_limit: Amount,
        new_duration_months: u32,
        caller: &P,
    ) -> Result<Outcome, LimiterError> {
        self.gate.authorize(caller, Capability::SetParameters)?;
        let duration = PeriodDuration::try_from(new_duration_months).map_err(|error| {
            trace!(new_duration_months, "rejected period duration");
            error
        })?;
        Ok(self.apply_parameters(new_limit, duration))
    }

    /// Commit new parameters without an access check.
    pub(crate) fn apply_parameters(&mut self, new_limit: Amount, duration: PeriodDuration) -> Outcome {
        let window = calendar::period_window(self.clock.now(), duration);
        let already_spent = if self.state.window() == Some(window) {
            self.state.already_spent().min(new_limit)
        } else {
            0
        };

        self.state
            .replace(LimiterState::active(new_limit, duration, already_spent, window));

        debug!(
            limit = new_limit,
            duration_months = duration.months(),
            already_spent,
            window_start = window.start,
            window_end = window.end,
            "limit parameters changed"
        );

        let mut outcome = Outcome::with_capacity(2);
        outcome.push(LimiterEvent::PeriodAdvanced { new_start: window.start });
        outcome.push(LimiterEvent::ParametersChanged {
            new_limit,
            new_duration: duration,
        });
        outcome
    }

    /// Record a spend of `amount` in the current period.
    ///
    /// If the stored period has ended, the limiter first advances to the
    /// period containing now and resets the spent amount (reported as a
    /// [`LimiterEvent::PeriodAdvanced`]).  The call always ends with a
    /// [`LimiterEvent::SpendRecorded`].  A zero amount is a valid way to
    /// force the rollover.
    ///
    /// # Errors
    ///
    /// * [`LimiterError::Unauthorized`]: `caller` lacks `RecordSpend`.
    /// * [`LimiterError::NotInitialized`]: parameters were never set.
    /// * [`LimiterError::LimitExceeded`]: the spend does not fit.  A pending
    ///   rollover is not committed in that case.
    pub fn record_spend(&mut self, amount: Amount, caller: &P) -> Result<Outcome, LimiterError> {
        self.gate.authorize(caller, Capability::RecordSpend)?;
        let effective = self.effective_at(self.clock.now())?;
        let new_already_spent = effective.spend(amount).ok_or_else(|| {
            trace!(
                amount,
                already_spent = effective.already_spent,
                limit = effective.limit,
                "spend exceeds limit"
            );
            LimiterError::LimitExceeded
        })?;

        self.state.replace(LimiterState::active(
            effective.limit,
            effective.duration,
            new_already_spent,
            effective.window,
        ));

        let mut outcome = Outcome::with_capacity(2);
        if effective.advanced {
            debug!(
                window_start = effective.window.start,
                window_end = effective.window.end,
                "period advanced"
            );
            outcome.push(LimiterEvent::PeriodAdvanced {
                new_start: effective.window.start,
            });
        }
        debug!(amount, already_spent = new_already_spent, "spend recorded");
        outcome.push(LimiterEvent::SpendRecorded {
            amount,
            new_already_spent,
            window: effective.window,
        });
        Ok(outcome)
    }

    /// Give `capability` to `principal`.  See [`AccessGate::grant`].
    pub fn grant(
        &mut self,
        admin: &P,
        principal: P,
        capability: Capability,
    ) -> Result<bool, LimiterError> {
        self.gate.grant(admin, principal, capability)
    }

    /// Take `capability` from `principal`.  See [`AccessGate::revoke`].
    pub fn revoke(
        &mut self,
        admin: &P,
        principal: &P,
        capability: Capability,
    ) -> Result<bool, LimiterError> {
        self.gate.revoke(admin, principal, capability)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// What [`record_spend`](Self::record_spend) of `amount` would do at
    /// `at`, without changing anything.
    ///
    /// When the spend does not fit, `permitted` is `false` and the returned
    /// amounts describe the period as it would stand without the spend.
    ///
    /// # Errors
    ///
    /// [`LimiterError::NotInitialized`] when parameters were never set.
    pub fn preview(&self, amount: Amount, at: Timestamp) -> Result<Preview, LimiterError> {
        let effective = self.effective_at(at)?;
        let spent = effective.spend(amount);
        let already_spent = spent.unwrap_or(effective.already_spent);
        Ok(Preview {
            permitted: spent.is_some(),
            would_advance: effective.advanced,
            already_spent,
            spendable: effective.limit - already_spent,
            window: effective.window,
        })
    }

    /// Spendable balance at `at`, applying rollover read-only.
    ///
    /// # Errors
    ///
    /// [`LimiterError::NotInitialized`] when parameters were never set.
    pub fn preview_spendable(&self, at: Timestamp) -> Result<Amount, LimiterError> {
        let effective = self.effective_at(at)?;
        Ok(effective.limit - effective.already_spent)
    }

    /// Whether a motion paying `amount` and enacted `motion_duration`
    /// seconds from now would fit.
    ///
    /// If enactment falls at or after the end of the stored period, the
    /// whole limit is available then; otherwise only the current spendable
    /// balance is.  An uninitialized limiter only admits zero.
    pub fn is_under_spendable_balance(&self, amount: Amount, motion_duration: u64) -> bool {
        let period_end = self.state.window().map_or(0, |window| window.end);
        if self.clock.now().saturating_add(motion_duration) >= period_end {
            amount <= self.state.limit()
        } else {
            amount <= self.state.spendable()
        }
    }

    /// Stored state.  Does not apply lazy rollover.
    pub fn snapshot(&self) -> Snapshot {
        self.state.to_snapshot()
    }

    /// Stored state of an initialized limiter.
    ///
    /// # Errors
    ///
    /// [`LimiterError::NotInitialized`] when parameters were never set.
    pub fn period_state(&self) -> Result<Snapshot, LimiterError> {
        if self.state.is_initialized() {
            Ok(self.state.to_snapshot())
        } else {
            Err(LimiterError::NotInitialized)
        }
    }

    /// `(limit, duration_months)`; `(0, 0)` while uninitialized.
    pub fn limit_parameters(&self) -> (Amount, u32) {
        (self.state.limit(), self.state.duration_months())
    }

    /// `limit - already_spent` for the stored window.
    pub fn spendable_balance(&self) -> Amount {
        self.state.spendable()
    }

    /// Borrow the access gate.
    pub fn gate(&self) -> &AccessGate<P> {
        &self.gate
    }

    /// Borrow the stored state.
    pub fn state(&self) -> &LimiterState {
        &self.state
    }

    /// Borrow the injected clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn effective_at(&self, at: Timestamp) -> Result<Effective, LimiterError> {
        let (duration, window) = match (self.state.duration(), self.state.window()) {
            (Some(duration), Some(window)) => (duration, window),
            _ => return Err(LimiterError::NotInitialized),
        };

        let effective = if window.has_ended(at) {
            Effective {
                limit: self.state.limit(),
                duration,
                window: calendar::period_window(at, duration),
                already_spent: 0,
                advanced: true,
            }
        } else {
            Effective {
                limit: self.state.limit(),
                duration,
                window,
                already_spent: self.state.already_spent(),
                advanced: false,
            }
        };
        Ok(effective)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
