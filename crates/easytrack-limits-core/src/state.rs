// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Stored limiter state.
//!
//! [`LimiterState`] is a plain data holder with no policy.  Fields are only
//! readable through accessors and only writable all at once through
//! [`replace`](LimiterState::replace), so a half-updated state is never
//! observable.

use crate::calendar;
use crate::error::ImportError;
use crate::types::{Amount, PeriodDuration, PeriodWindow, Snapshot};

/// Limit, duration, spent amount and current window of one limiter.
///
/// The default value is the uninitialized state: everything zero and no
/// window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LimiterState {
    limit: Amount,
    duration: Option<PeriodDuration>,
    already_spent: Amount,
    window: Option<PeriodWindow>,
}

impl LimiterState {
    /// The uninitialized state.
    pub const fn uninitialized() -> Self {
        Self {
            limit: 0,
            duration: None,
            already_spent: 0,
            window: None,
        }
    }

    /// An active state.  Callers keep `already_spent <= limit`.
    pub(crate) const fn active(
        limit: Amount,
        duration: PeriodDuration,
        already_spent: Amount,
        window: PeriodWindow,
    ) -> Self {
        Self {
            limit,
            duration: Some(duration),
            already_spent,
            window: Some(window),
        }
    }

    /// Cap per period.
    pub fn limit(&self) -> Amount {
        self.limit
    }

    /// Period duration, or `None` while uninitialized.
    pub fn duration(&self) -> Option<PeriodDuration> {
        self.duration
    }

    /// Period duration in months, `0` while uninitialized.
    pub fn duration_months(&self) -> u32 {
        self.duration.map_or(0, PeriodDuration::months)
    }

    /// Amount spent in the stored window.
    pub fn already_spent(&self) -> Amount {
        self.already_spent
    }

    /// Stored window, or `None` while uninitialized.
    pub fn window(&self) -> Option<PeriodWindow> {
        self.window
    }

    /// `limit - already_spent` for the stored window.
    pub fn spendable(&self) -> Amount {
        self.limit.saturating_sub(self.already_spent)
    }

    /// Whether parameters have been set.
    pub fn is_initialized(&self) -> bool {
        self.duration.is_some()
    }

    /// Overwrite every field at once.
    pub fn replace(&mut self, next: LimiterState) {
        *self = next;
    }

    /// Read-only view for the host.
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            limit: self.limit,
            duration_months: self.duration_months(),
            already_spent: self.already_spent,
            window: self.window,
            spendable: self.spendable(),
        }
    }

    /// Rebuild a state from a host-supplied snapshot, checking every
    /// invariant.
    ///
    /// # Errors
    ///
    /// An [`ImportError`] naming the first violated invariant.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self, ImportError> {
        if snapshot.already_spent > snapshot.limit {
            return Err(ImportError::SpentExceedsLimit);
        }
        if snapshot.spendable != snapshot.limit - snapshot.already_spent {
            return Err(ImportError::InconsistentSpendable);
        }

        if snapshot.duration_months == 0 {
            if snapshot.window.is_some() {
                return Err(ImportError::WindowMismatch);
            }
            // Uninitialized state is all zero.
            if snapshot.limit != 0 || snapshot.already_spent != 0 {
                return Err(ImportError::WindowMismatch);
            }
            return Ok(Self::uninitialized());
        }

        let duration = PeriodDuration::from_months(snapshot.duration_months)
            .ok_or(ImportError::InvalidPeriodDuration(snapshot.duration_months))?;
        let window = snapshot.window.ok_or(ImportError::WindowMismatch)?;
        if !calendar::is_aligned_window(&window, duration) {
            return Err(ImportError::MisalignedWindow);
        }

        Ok(Self::active(snapshot.limit, duration, snapshot.already_spent, window))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
