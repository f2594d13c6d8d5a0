// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Shared data types used across the limiter sub-systems.
//!
//! All public value types implement [`Clone`], [`Debug`],
//! [`serde::Serialize`], and [`serde::Deserialize`] so they can be
//! persisted by the host and transmitted across WASM boundaries without
//! additional conversion steps.  Amounts are encoded as decimal strings
//! (see [`crate::amount`]) because JSON numbers cannot carry 128 bits.

use alloc::vec::Vec;
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LimiterError;

/// A spend amount or limit.  Every sum of amounts must also fit in 128 bits.
pub type Amount = u128;

/// Seconds since the Unix epoch, interpreted in UTC.
pub type Timestamp = u64;

/// Number of seconds in one UTC day.
pub const SECONDS_PER_DAY: u64 = 86_400;

// ---------------------------------------------------------------------------
// Period duration
// ---------------------------------------------------------------------------

/// Length of one limiter period in calendar months.
///
/// Only divisors of twelve are supported so that January 1 of every year is
/// a period boundary for every duration.
///
/// # Examples
///
/// ```rust
/// use easytrack_limits_core::types::PeriodDuration;
///
/// assert_eq!(PeriodDuration::try_from(3).unwrap(), PeriodDuration::Quarter);
/// assert!(PeriodDuration::try_from(4).is_err());
/// assert_eq!(PeriodDuration::HalfYear.months(), 6);
/// ```
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PeriodDuration {
    /// One calendar month.
    Month = 1,
    /// Two calendar months (Jan–Feb, Mar–Apr, ...).
    TwoMonths = 2,
    /// A calendar quarter.
    Quarter = 3,
    /// A calendar half-year.
    HalfYear = 6,
    /// A full calendar year.
    Year = 12,
}

impl PeriodDuration {
    /// Every supported duration, shortest first.
    pub const ALL: [PeriodDuration; 5] = [
        PeriodDuration::Month,
        PeriodDuration::TwoMonths,
        PeriodDuration::Quarter,
        PeriodDuration::HalfYear,
        PeriodDuration::Year,
    ];

    /// Number of calendar months in one period.
    pub const fn months(self) -> u32 {
        self as u32
    }

    /// Try to construct a [`PeriodDuration`] from a month count.
    ///
    /// Returns `None` for anything outside `{1, 2, 3, 6, 12}`.
    pub const fn from_months(months: u32) -> Option<Self> {
        match months {
            1  => Some(PeriodDuration::Month),
            2  => Some(PeriodDuration::TwoMonths),
            3  => Some(PeriodDuration::Quarter),
            6  => Some(PeriodDuration::HalfYear),
            12 => Some(PeriodDuration::Year),
            _  => None,
        }
    }
}

impl TryFrom<u32> for PeriodDuration {
    type Error = LimiterError;

    fn try_from(months: u32) -> Result<Self, Self::Error> {
        Self::from_months(months).ok_or(LimiterError::InvalidPeriodDuration)
    }
}

impl From<PeriodDuration> for u32 {
    fn from(duration: PeriodDuration) -> Self {
        duration.months()
    }
}

impl fmt::Display for PeriodDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}mo", self.months())
    }
}

// ---------------------------------------------------------------------------
// Period window
// ---------------------------------------------------------------------------

/// A half-open `[start, end)` interval aligned to UTC month boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodWindow {
    /// First second of the period.
    pub start: Timestamp,
    /// First second of the next period (exclusive).
    pub end: Timestamp,
}

impl PeriodWindow {
    /// Whether `at` falls inside the window.
    pub fn contains(&self, at: Timestamp) -> bool {
        self.start <= at && at < self.end
    }

    /// Whether the window has ended by `at`.
    pub fn has_ended(&self, at: Timestamp) -> bool {
        at >= self.end
    }
}

// ---------------------------------------------------------------------------
// Access control
// ---------------------------------------------------------------------------

/// A named right granted to principals through the [`AccessGate`].
///
/// [`AccessGate`]: crate::access::AccessGate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Capability {
    /// May change the limit and period duration.
    SetParameters,
    /// May record spends against the limit.
    RecordSpend,
    /// May grant and revoke capabilities at runtime.
    Admin,
}

impl Capability {
    /// Stable role name for logging and wire formats.
    pub fn role_name(self) -> &'static str {
        match self {
            Capability::SetParameters => "SET_PARAMETERS",
            Capability::RecordSpend   => "RECORD_SPEND",
            Capability::Admin         => "ADMIN",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.role_name())
    }
}

// ---------------------------------------------------------------------------
// Snapshot & preview
// ---------------------------------------------------------------------------

/// Read-only view of the stored limiter state.
///
/// Produced by [`PeriodicSpendLimiter::snapshot`] and accepted by
/// [`PeriodicSpendLimiter::import`].  A snapshot never applies lazy
/// rollover: `window` is the stored one even if it has already ended.
///
/// [`PeriodicSpendLimiter::snapshot`]: crate::limiter::PeriodicSpendLimiter::snapshot
/// [`PeriodicSpendLimiter::import`]: crate::limiter::PeriodicSpendLimiter::import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Cap per period.
    #[serde(with = "crate::amount::serde_decimal")]
    pub limit: Amount,
    /// Period length in months; `0` while uninitialized.
    pub duration_months: u32,
    /// Amount spent within `window`.
    #[serde(with = "crate::amount::serde_decimal")]
    pub already_spent: Amount,
    /// Stored period window; `None` while uninitialized.
    pub window: Option<PeriodWindow>,
    /// `limit - already_spent`.
    #[serde(with = "crate::amount::serde_decimal")]
    pub spendable: Amount,
}

impl Snapshot {
    /// Serialise to a JSON string for host-side persistence.
    pub fn to_json(&self) -> Result<alloc::string::String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a snapshot previously produced by [`to_json`](Self::to_json).
    ///
    /// The result is not validated; pass it to
    /// [`PeriodicSpendLimiter::import`](crate::limiter::PeriodicSpendLimiter::import).
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// What [`record_spend`] would do at a given instant, computed read-only.
///
/// [`record_spend`]: crate::limiter::PeriodicSpendLimiter::record_spend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preview {
    /// Whether the spend fits within the limit after any pending rollover.
    pub permitted: bool,
    /// Whether a lazy rollover would happen first.
    pub would_advance: bool,
    /// Already-spent amount after the call (unchanged when not permitted).
    #[serde(with = "crate::amount::serde_decimal")]
    pub already_spent: Amount,
    /// Spendable balance after the call.
    #[serde(with = "crate::amount::serde_decimal")]
    pub spendable: Amount,
    /// Window the spend would be recorded in.
    pub window: PeriodWindow,
}

// ---------------------------------------------------------------------------
// Events & outcomes
// ---------------------------------------------------------------------------

/// Notification produced by a successful mutating call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum LimiterEvent {
    /// The current period moved (or was re-anchored) to a new start.
    PeriodAdvanced {
        /// First second of the new current period.
        new_start: Timestamp,
    },
    /// Limit and duration were replaced.
    ParametersChanged {
        /// The new per-period cap.
        #[serde(with = "crate::amount::serde_decimal")]
        new_limit: Amount,
        /// The new period duration.
        new_duration: PeriodDuration,
    },
    /// A spend was recorded.
    SpendRecorded {
        /// Amount recorded by this call.
        #[serde(with = "crate::amount::serde_decimal")]
        amount: Amount,
        /// Already-spent amount after the call.
        #[serde(with = "crate::amount::serde_decimal")]
        new_already_spent: Amount,
        /// Period the spend was recorded in.
        window: PeriodWindow,
    },
}

/// Structured result of a mutating limiter call.
///
/// Events are returned in the order they occurred so the host can forward
/// them to whatever sink it uses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Notifications the host should act on.
    pub events: Vec<LimiterEvent>,
}

impl Outcome {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self { events: Vec::with_capacity(capacity) }
    }

    pub(crate) fn push(&mut self, event: LimiterEvent) {
        self.events.push(event);
    }
}
