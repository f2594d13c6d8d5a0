// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Error kinds returned by the limiter.
//!
//! The core never retries, never logs failures, and never swallows an error.
//! Every failure surfaces to the immediate caller and leaves state unchanged.

use thiserror::Error;

/// Failure of a public [`PeriodicSpendLimiter`] or [`AccessGate`] call.
///
/// The set is exhaustive and carries no dynamic payload: hosts map kinds to
/// their own responses (a rejected motion for [`LimitExceeded`], an
/// access-denied response for [`Unauthorized`]).
///
/// [`PeriodicSpendLimiter`]: crate::limiter::PeriodicSpendLimiter
/// [`AccessGate`]: crate::access::AccessGate
/// [`LimitExceeded`]: LimiterError::LimitExceeded
/// [`Unauthorized`]: LimiterError::Unauthorized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum LimiterError {
    /// The caller lacks the required capability.
    #[error("caller lacks the required capability")]
    Unauthorized,
    /// Parameters were never set.
    #[error("limiter parameters have not been set")]
    NotInitialized,
    /// Duration is not one of 1, 2, 3, 6, or 12 months.
    #[error("invalid period duration")]
    InvalidPeriodDuration,
    /// The limit does not fit in 128 bits.
    #[error("limit is too large")]
    LimitTooLarge,
    /// The spend does not fit in the current period's balance.
    #[error("sum exceeds spendable balance")]
    LimitExceeded,
}

/// Reason a [`Snapshot`] was refused by
/// [`PeriodicSpendLimiter::import`](crate::limiter::PeriodicSpendLimiter::import).
///
/// [`Snapshot`]: crate::types::Snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ImportError {
    /// `duration_months` is neither zero nor a supported duration.
    #[error("snapshot has an invalid period duration: {0} months")]
    InvalidPeriodDuration(u32),
    /// `already_spent` is above `limit`.
    #[error("snapshot already_spent exceeds its limit")]
    SpentExceedsLimit,
    /// `spendable` disagrees with `limit - already_spent`.
    #[error("snapshot spendable balance is inconsistent")]
    InconsistentSpendable,
    /// An initialized snapshot has no window, or an uninitialized one has.
    #[error("snapshot window does not match its initialization state")]
    WindowMismatch,
    /// The window is not the calendar-aligned period for its duration.
    #[error("snapshot window is not aligned to the period grid")]
    MisalignedWindow,
}
