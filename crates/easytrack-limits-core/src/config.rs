// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Construction-time configuration.
//!
//! [`LimiterConfig`] describes who holds which capability and, optionally,
//! the parameters a limiter starts with.  Every field has a default, so
//! `LimiterConfig::default()` yields an uninitialized limiter that nobody
//! can change.

use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::access::AccessGate;
use crate::clock::Clock;
use crate::error::LimiterError;
use crate::limiter::PeriodicSpendLimiter;
use crate::types::{Amount, Capability, PeriodDuration};

/// Serialisation-friendly limiter setup.
///
/// `limit` is written as a decimal string (plain integers are accepted on
/// input).  A `period_duration_months` of `0` leaves the limiter
/// uninitialized.
///
/// # Examples
///
/// ```rust
/// use easytrack_limits_core::config::LimiterConfig;
/// use easytrack_limits_core::types::Capability;
///
/// let config: LimiterConfig = serde_json::from_str(r#"{
///     "limit": "1000000000000000000000",
///     "period_duration_months": 3,
///     "admins": ["dao"],
///     "record_spend": ["top-up-factory"]
/// }"#).unwrap();
///
/// let gate = config.build_gate();
/// assert!(gate.authorize(&"top-up-factory".into(), Capability::RecordSpend).is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimiterConfig {
    /// Initial per-period limit.
    #[serde(with = "crate::amount::serde_decimal")]
    pub limit: Amount,

    /// Initial period duration; `0` means "do not initialize".
    pub period_duration_months: u32,

    /// Principals holding [`Capability::Admin`].
    pub admins: Vec<String>,

    /// Principals holding [`Capability::SetParameters`].
    pub set_parameters: Vec<String>,

    /// Principals holding [`Capability::RecordSpend`].
    pub record_spend: Vec<String>,

    /// When `true` the gate is built with [`AccessGate::fixed`] and refuses
    /// runtime grants.
    pub fixed_roles: bool,
}

impl LimiterConfig {
    /// Build the access gate described by the principal lists.
    pub fn build_gate(&self) -> AccessGate<String> {
        let grants = self
            .admins
            .iter()
            .map(|p| (p.clone(), Capability::Admin))
            .chain(self.set_parameters.iter().map(|p| (p.clone(), Capability::SetParameters)))
            .chain(self.record_spend.iter().map(|p| (p.clone(), Capability::RecordSpend)));

        if self.fixed_roles {
            AccessGate::fixed(grants)
        } else {
            AccessGate::from_grants(grants)
        }
    }

    /// The initial duration, or `None` when the limiter starts uninitialized.
    ///
    /// # Errors
    ///
    /// [`LimiterError::InvalidPeriodDuration`] for an unsupported month
    /// count, or for a non-zero limit with a zero duration.
    pub fn initial_duration(&self) -> Result<Option<PeriodDuration>, LimiterError> {
        match self.period_duration_months {
            0 if self.limit == 0 => Ok(None),
            0 => Err(LimiterError::InvalidPeriodDuration),
            months => PeriodDuration::try_from(months).map(Some),
        }
    }
}

impl<C: Clock> PeriodicSpendLimiter<String, C> {
    /// Build a limiter from `config`.
    ///
    /// Initial parameters, when present, are applied at construction under
    /// `clock`'s current time without an access check.
    ///
    /// # Errors
    ///
    /// See [`LimiterConfig::initial_duration`].
    pub fn from_config(config: &LimiterConfig, clock: C) -> Result<Self, LimiterError> {
        let initial = config.initial_duration()?;
        let mut limiter = Self::new(config.build_gate(), clock);
        if let Some(duration) = initial {
            limiter.apply_parameters(config.limit, duration);
        }
        Ok(limiter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::timestamp_from_date;
    use crate::clock::ManualClock;
    use alloc::string::ToString;
    use alloc::vec;

    fn principals(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_default_is_uninitialized_and_locked() {
        let config = LimiterConfig::default();
        let mut limiter =
            PeriodicSpendLimiter::from_config(&config, ManualClock::new(0)).unwrap();
        assert!(!limiter.state().is_initialized());
        assert_eq!(
            limiter.grant(&"anyone".to_string(), "x".to_string(), Capability::Admin),
            Err(LimiterError::Unauthorized)
        );
    }

    #[test]
    fn test_from_config_applies_initial_parameters() {
        let config = LimiterConfig {
            limit: 500,
            period_duration_months: 6,
            set_parameters: principals(&["dao"]),
            record_spend: principals(&["factory"]),
            ..LimiterConfig::default()
        };
        let clock = ManualClock::new(timestamp_from_date(2024, 8, 20));
        let mut limiter = PeriodicSpendLimiter::from_config(&config, clock).unwrap();

        let snapshot = limiter.period_state().unwrap();
        assert_eq!(snapshot.limit, 500);
        assert_eq!(snapshot.duration_months, 6);
        assert_eq!(
            snapshot.window.map(|w| w.start),
            Some(timestamp_from_date(2024, 7, 1))
        );
        limiter.record_spend(500, &"factory".to_string()).unwrap();
    }

    #[test]
    fn test_invalid_initial_duration() {
        let bad_months = LimiterConfig {
            period_duration_months: 5,
            ..LimiterConfig::default()
        };
        assert_eq!(
            PeriodicSpendLimiter::from_config(&bad_months, ManualClock::new(0)).err(),
            Some(LimiterError::InvalidPeriodDuration)
        );

        let limit_without_duration = LimiterConfig {
            limit: 1,
            ..LimiterConfig::default()
        };
        assert_eq!(
            limit_without_duration.initial_duration(),
            Err(LimiterError::InvalidPeriodDuration)
        );
    }

    #[test]
    fn test_fixed_roles() {
        let config = LimiterConfig {
            admins: principals(&["dao"]),
            fixed_roles: true,
            ..LimiterConfig::default()
        };
        let mut gate = config.build_gate();
        assert!(gate.is_fixed());
        assert_eq!(
            gate.grant(&"dao".to_string(), "factory".to_string(), Capability::RecordSpend),
            Err(LimiterError::Unauthorized)
        );
    }

    #[test]
    fn test_json_round_trip_writes_limit_as_string() {
        let config = LimiterConfig {
            limit: u128::MAX,
            period_duration_months: 12,
            admins: vec!["dao".to_string()],
            ..LimiterConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"limit\":\"340282366920938463463374607431768211455\""));
        let parsed: LimiterConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_oversized_limit_rejected_on_parse() {
        let result: Result<LimiterConfig, _> =
            serde_json::from_str(r#"{"limit": "340282366920938463463374607431768211456"}"#);
        assert!(result.is_err());
    }
}
