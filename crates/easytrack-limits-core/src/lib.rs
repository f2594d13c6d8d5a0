// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! # easytrack-limits-core
//!
//! Calendar-aligned periodic spend limiter for motion-based governance.
//!
//! A limiter caps cumulative spending per period.  Periods are 1, 2, 3, 6
//! or 12 months long and always start on the first day of a month whose
//! index is a multiple of the duration (quarters start in January, April,
//! July and October).  Limit and duration can change mid-period; every
//! mutation is gated by a capability.
//!
//! This crate is `no_std`-compatible (requires `alloc`).  Enable the `std`
//! feature (on by default) for [`clock::SystemClock`] and std error
//! integration.
//!
//! ## Architecture
//!
//! ```text
//! PeriodicSpendLimiter<P, C: Clock>
//!   ├── AccessGate<P>   — who may set parameters / record spends / administer
//!   ├── LimiterState    — limit, duration, spent amount, current window
//!   ├── calendar        — timestamp ↔ date, period start / end
//!   └── C: Clock        — injected time source
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use easytrack_limits_core::{
//!     calendar::timestamp_from_date, AccessGate, Capability, LimiterError, ManualClock,
//!     PeriodicSpendLimiter,
//! };
//!
//! let clock = ManualClock::new(timestamp_from_date(2024, 8, 20));
//! let gate = AccessGate::from_grants([
//!     ("dao-voting", Capability::SetParameters),
//!     ("top-up-factory", Capability::RecordSpend),
//! ]);
//! let mut limiter = PeriodicSpendLimiter::new(gate, clock);
//!
//! // A quarterly limit set in August covers July through September.
//! limiter.set_parameters(1_000, 3, &"dao-voting").unwrap();
//! let window = limiter.snapshot().window.unwrap();
//! assert_eq!(window.start, timestamp_from_date(2024, 7, 1));
//! assert_eq!(window.end, timestamp_from_date(2024, 10, 1));
//!
//! limiter.record_spend(400, &"top-up-factory").unwrap();
//! assert_eq!(limiter.spendable_balance(), 600);
//! assert_eq!(
//!     limiter.record_spend(601, &"top-up-factory"),
//!     Err(LimiterError::LimitExceeded)
//! );
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod access;
pub mod amount;
pub mod async_limiter;
pub mod calendar;
pub mod clock;
pub mod config;
pub mod config_loader;
pub mod error;
pub mod limiter;
pub mod state;
pub mod types;

pub use access::AccessGate;
#[cfg(feature = "async")]
pub use async_limiter::SharedLimiter;
#[cfg(feature = "std")]
pub use clock::SystemClock;
pub use clock::{Clock, ManualClock};
pub use config::LimiterConfig;
pub use error::{ImportError, LimiterError};
pub use limiter::PeriodicSpendLimiter;
pub use state::LimiterState;
pub use types::{
    Amount, Capability, LimiterEvent, Outcome, PeriodDuration, PeriodWindow, Preview, Snapshot,
    Timestamp,
};
