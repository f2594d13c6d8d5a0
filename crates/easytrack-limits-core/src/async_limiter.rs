// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Shared limiter for multi-task hosts, backed by Tokio.
//!
//! This module is only compiled when the `async` feature flag is enabled:
//!
//! ```toml
//! [dependencies]
//! easytrack-limits-core = { version = "0.1", features = ["async"] }
//! ```
//!
//! [`SharedLimiter`] wraps one [`PeriodicSpendLimiter`] in a
//! [`tokio::sync::RwLock`].  Queries take the shared lock; mutations take the
//! exclusive lock, so `set_parameters` and `record_spend` on the same
//! limiter are totally ordered.
//!
//! # Example
//!
//! ```rust,no_run
//! # #[cfg(feature = "async")]
//! # {
//! use easytrack_limits_core::{
//!     access::AccessGate,
//!     async_limiter::SharedLimiter,
//!     clock::SystemClock,
//!     limiter::PeriodicSpendLimiter,
//!     types::Capability,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let gate = AccessGate::from_grants([
//!         ("voting", Capability::SetParameters),
//!         ("factory", Capability::RecordSpend),
//!     ]);
//!     let limiter = SharedLimiter::new(PeriodicSpendLimiter::new(gate, SystemClock));
//!
//!     limiter.set_parameters(1_000, 3, &"voting").await.unwrap();
//!     limiter.record_spend(250, &"factory").await.unwrap();
//!     assert_eq!(limiter.snapshot().await.spendable, 750);
//! }
//! # }
//! ```

#![cfg(feature = "async")]

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::clock::Clock;
use crate::error::LimiterError;
use crate::limiter::PeriodicSpendLimiter;
use crate::types::{Amount, Capability, Outcome, Preview, Snapshot, Timestamp};

// ---------------------------------------------------------------------------
// SharedLimiter
// ---------------------------------------------------------------------------

/// Cloneable handle to a limiter guarded by a Tokio `RwLock`.
///
/// Clones share the same limiter.
pub struct SharedLimiter<P: Eq + Hash, C: Clock> {
    inner: Arc<RwLock<PeriodicSpendLimiter<P, C>>>,
}

impl<P: Eq + Hash, C: Clock> Clone for SharedLimiter<P, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P, C> SharedLimiter<P, C>
where
    P: Eq + Hash + Clone + Debug,
    C: Clock,
{
    /// Take ownership of `limiter`.
    pub fn new(limiter: PeriodicSpendLimiter<P, C>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(limiter)),
        }
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// See [`PeriodicSpendLimiter::set_parameters`].
    pub async fn set_parameters(
        &self,
        new_limit: Amount,
        new_duration_months: u32,
        caller: &P,
    ) -> Result<Outcome, LimiterError> {
        let mut limiter = self.inner.write().await;
        limiter.set_parameters(new_limit, new_duration_months, caller)
    }

    /// See [`PeriodicSpendLimiter::record_spend`].
    pub async fn record_spend(&self, amount: Amount, caller: &P) -> Result<Outcome, LimiterError> {
        let mut limiter = self.inner.write().await;
        limiter.record_spend(amount, caller)
    }

    /// See [`PeriodicSpendLimiter::grant`].
    pub async fn grant(
        &self,
        admin: &P,
        principal: P,
        capability: Capability,
    ) -> Result<bool, LimiterError> {
        let mut limiter = self.inner.write().await;
        limiter.grant(admin, principal, capability)
    }

    /// See [`PeriodicSpendLimiter::revoke`].
    pub async fn revoke(
        &self,
        admin: &P,
        principal: &P,
        capability: Capability,
    ) -> Result<bool, LimiterError> {
        let mut limiter = self.inner.write().await;
        limiter.revoke(admin, principal, capability)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// See [`PeriodicSpendLimiter::preview`].
    pub async fn preview(&self, amount: Amount, at: Timestamp) -> Result<Preview, LimiterError> {
        self.inner.read().await.preview(amount, at)
    }

    /// See [`PeriodicSpendLimiter::is_under_spendable_balance`].
    pub async fn is_under_spendable_balance(&self, amount: Amount, motion_duration: u64) -> bool {
        self.inner
            .read()
            .await
            .is_under_spendable_balance(amount, motion_duration)
    }

    /// See [`PeriodicSpendLimiter::snapshot`].
    pub async fn snapshot(&self) -> Snapshot {
        self.inner.read().await.snapshot()
    }

    /// See [`PeriodicSpendLimiter::period_state`].
    pub async fn period_state(&self) -> Result<Snapshot, LimiterError> {
        self.inner.read().await.period_state()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::AccessGate;
    use crate::calendar::timestamp_from_date;
    use crate::clock::ManualClock;

    fn shared(clock: ManualClock) -> SharedLimiter<&'static str, ManualClock> {
        let gate = AccessGate::from_grants([
            ("voting", Capability::Admin),
            ("voting", Capability::SetParameters),
            ("factory", Capability::RecordSpend),
        ]);
        SharedLimiter::new(PeriodicSpendLimiter::new(gate, clock))
    }

    #[tokio::test]
    async fn test_shared_limiter_basic_flow() {
        let clock = ManualClock::new(timestamp_from_date(2024, 3, 15));
        let limiter = shared(clock.clone());

        assert_eq!(limiter.period_state().await, Err(LimiterError::NotInitialized));
        limiter.set_parameters(100, 1, &"voting").await.unwrap();
        limiter.record_spend(100, &"factory").await.unwrap();
        assert_eq!(
            limiter.record_spend(1, &"factory").await,
            Err(LimiterError::LimitExceeded)
        );

        let next_month = timestamp_from_date(2024, 4, 1);
        assert!(limiter.preview(100, next_month).await.unwrap().permitted);
        assert!(limiter.is_under_spendable_balance(100, 30 * 86_400).await);
    }

    #[tokio::test]
    async fn test_concurrent_spends_never_exceed_limit() {
        let limiter = shared(ManualClock::new(timestamp_from_date(2024, 3, 15)));
        limiter.set_parameters(50, 1, &"voting").await.unwrap();

        let handles: Vec<_> = (0..100)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move { limiter.record_spend(1, &"factory").await.is_ok() })
            })
            .collect();

        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 50);
        assert_eq!(limiter.snapshot().await.already_spent, 50);
    }

    #[tokio::test]
    async fn test_grant_through_shared_handle() {
        let limiter = shared(ManualClock::new(timestamp_from_date(2024, 3, 15)));
        limiter.set_parameters(10, 1, &"voting").await.unwrap();
        assert_eq!(
            limiter.grant(&"voting", "bot", Capability::RecordSpend).await,
            Ok(true)
        );
        limiter.record_spend(10, &"bot").await.unwrap();
        assert_eq!(
            limiter.revoke(&"voting", &"bot", Capability::RecordSpend).await,
            Ok(true)
        );
        assert_eq!(limiter.record_spend(0, &"bot").await, Err(LimiterError::Unauthorized));
    }
}
