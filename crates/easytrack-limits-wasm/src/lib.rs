// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! # easytrack-limits-wasm
//!
//! WebAssembly bindings for the EasyTrack periodic spend limiter.
//!
//! ## Architecture
//!
//! Each limiter is a [`PeriodicSpendLimiter<String, ManualClock>`] stored in
//! a thread-local registry keyed by integer handles.  JavaScript supplies the
//! current time on every call that needs it; the binding moves the limiter's
//! [`ManualClock`] there before delegating.
//!
//! Amounts cross the boundary as decimal strings and timestamps as whole
//! seconds in a JS number (at most 2⁵³ − 1).  Every function that can fail
//! returns a JSON string, either `{"ok": ...}` or
//! `{"error": "<Kind>", "message": "..."}`.
//!
//! ## Exported Functions
//!
//! | Function                     | Description                                         |
//! |------------------------------|-----------------------------------------------------|
//! | `create_limiter`             | Create a limiter from a JSON [`LimiterConfig`]      |
//! | `import_snapshot`            | Create a limiter from a persisted snapshot          |
//! | `destroy_limiter`            | Release a limiter handle                            |
//! | `set_parameters`             | Change limit and period duration                    |
//! | `record_spend`               | Record a spend in the current period                |
//! | `preview`                    | Read-only outcome of a spend at a given instant     |
//! | `is_under_spendable_balance` | Motion check against the period end                 |
//! | `snapshot`                   | Stored state as JSON                                |
//! | `grant` / `revoke`           | Change capability holders                           |
//!
//! ## JavaScript Usage
//!
//! ```js
//! import init, { create_limiter, set_parameters, record_spend, snapshot }
//!   from '@easytrack/limits-wasm';
//!
//! await init();
//!
//! const now = () => Math.floor(Date.now() / 1000);
//! const handle = create_limiter(JSON.stringify({
//!   admins: ['dao'],
//!   set_parameters: ['dao-voting'],
//!   record_spend: ['top-up-factory'],
//! }), now());
//!
//! set_parameters(handle, '1000000000000000000000', 3, 'dao-voting', now());
//! const result = JSON.parse(record_spend(handle, '250', 'top-up-factory', now()));
//! if (result.error === 'LimitExceeded') { ... }
//!
//! console.log(JSON.parse(snapshot(handle)).ok.spendable);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;

use easytrack_limits_core::{
    amount::{parse_amount, AmountError},
    Capability, ImportError, LimiterConfig, LimiterError, ManualClock, PeriodicSpendLimiter,
    Snapshot, Timestamp,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use wasm_bindgen::prelude::*;

type Limiter = PeriodicSpendLimiter<String, ManualClock>;

/// Largest integer a JS number represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
enum BindingError {
    #[error(transparent)]
    Limiter(#[from] LimiterError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error("invalid amount: {0}")]
    Amount(AmountError),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown limiter handle {0}")]
    UnknownHandle(u32),
    #[error("timestamp must be a whole number of seconds in 0..=2^53-1")]
    InvalidTimestamp,
    #[error("unknown capability \"{0}\"")]
    InvalidCapability(String),
}

impl BindingError {
    fn kind(&self) -> &'static str {
        match self {
            BindingError::Limiter(LimiterError::Unauthorized) => "Unauthorized",
            BindingError::Limiter(LimiterError::NotInitialized) => "NotInitialized",
            BindingError::Limiter(LimiterError::InvalidPeriodDuration) => "InvalidPeriodDuration",
            BindingError::Limiter(LimiterError::LimitTooLarge) => "LimitTooLarge",
            BindingError::Limiter(LimiterError::LimitExceeded) => "LimitExceeded",
            BindingError::Import(_) => "InvalidSnapshot",
            BindingError::Amount(AmountError::LimitTooLarge) => "LimitTooLarge",
            BindingError::Amount(_) => "InvalidAmount",
            BindingError::Json(_) => "InvalidJson",
            BindingError::UnknownHandle(_) => "UnknownHandle",
            BindingError::InvalidTimestamp => "InvalidTimestamp",
            BindingError::InvalidCapability(_) => "InvalidCapability",
        }
    }
}

fn respond<T: Serialize>(result: Result<T, BindingError>) -> String {
    let body = match result {
        Ok(value) => json!({ "ok": value }),
        Err(error) => json!({ "error": error.kind(), "message": error.to_string() }),
    };
    body.to_string()
}

fn parse_timestamp(value: f64) -> Result<Timestamp, BindingError> {
    if !value.is_finite() || value < 0.0 || value > MAX_SAFE_INTEGER || value.fract() != 0.0 {
        return Err(BindingError::InvalidTimestamp);
    }
    Ok(value as Timestamp)
}

fn parse_capability(raw: &str) -> Result<Capability, BindingError> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "SET_PARAMETERS" => Ok(Capability::SetParameters),
        "RECORD_SPEND" => Ok(Capability::RecordSpend),
        "ADMIN" => Ok(Capability::Admin),
        _ => Err(BindingError::InvalidCapability(raw.to_owned())),
    }
}

fn parse_value(raw: &str) -> Result<u128, BindingError> {
    parse_amount(raw).map_err(BindingError::Amount)
}

// ---------------------------------------------------------------------------
// Limiter registry
// ---------------------------------------------------------------------------

// WASM is single-threaded; RefCell<HashMap<...>> is sufficient.
thread_local! {
    static LIMITERS: RefCell<HashMap<u32, Limiter>> = RefCell::new(HashMap::new());
    static NEXT_HANDLE: RefCell<u32> = const { RefCell::new(0) };
}

/// Allocate a handle.  Wraps before `u32::MAX`, which is the error sentinel.
fn next_handle() -> u32 {
    NEXT_HANDLE.with(|counter| {
        let handle = *counter.borrow();
        let next = if handle >= u32::MAX - 1 { 0 } else { handle + 1 };
        *counter.borrow_mut() = next;
        handle
    })
}

fn register(limiter: Limiter) -> u32 {
    let handle = next_handle();
    LIMITERS.with(|limiters| {
        limiters.borrow_mut().insert(handle, limiter);
    });
    handle
}

/// Run `callback` on the limiter behind `handle` with its clock at `now`.
fn with_limiter_at<F, R>(handle: u32, now: Option<f64>, callback: F) -> Result<R, BindingError>
where
    F: FnOnce(&mut Limiter) -> Result<R, BindingError>,
{
    let now = now.map(parse_timestamp).transpose()?;
    LIMITERS.with(|limiters| {
        let mut map = limiters.borrow_mut();
        let limiter = map.get_mut(&handle).ok_or(BindingError::UnknownHandle(handle))?;
        if let Some(now) = now {
            limiter.clock().set(now);
        }
        callback(limiter)
    })
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Create a limiter from a JSON [`LimiterConfig`] with its clock at `now`.
///
/// Returns the handle, or `u32::MAX` when the config or timestamp is
/// invalid.
#[wasm_bindgen]
pub fn create_limiter(config_json: &str, now: f64) -> u32 {
    let build = || -> Result<Limiter, BindingError> {
        let config: LimiterConfig = serde_json::from_str(config_json)?;
        let clock = ManualClock::new(parse_timestamp(now)?);
        Ok(PeriodicSpendLimiter::from_config(&config, clock)?)
    };
    build().map_or(u32::MAX, register)
}

/// Rebuild a limiter from a snapshot produced by [`snapshot`].
///
/// Capability holders come from `config_json`; its initial parameters are
/// ignored.  Returns `u32::MAX` when either document is invalid or the
/// snapshot breaks an invariant.
#[wasm_bindgen]
pub fn import_snapshot(snapshot_json: &str, config_json: &str, now: f64) -> u32 {
    let build = || -> Result<Limiter, BindingError> {
        let snapshot = Snapshot::from_json(snapshot_json)?;
        let config: LimiterConfig = serde_json::from_str(config_json)?;
        let clock = ManualClock::new(parse_timestamp(now)?);
        Ok(PeriodicSpendLimiter::import(&snapshot, config.build_gate(), clock)?)
    };
    build().map_or(u32::MAX, register)
}

/// Release the limiter behind `handle`.  The handle is invalid afterwards.
#[wasm_bindgen]
pub fn destroy_limiter(handle: u32) {
    LIMITERS.with(|limiters| {
        limiters.borrow_mut().remove(&handle);
    });
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

/// Change limit and duration.  `ok` carries the emitted events.
#[wasm_bindgen]
pub fn set_parameters(
    handle: u32,
    limit: &str,
    duration_months: u32,
    caller: &str,
    now: f64,
) -> String {
    respond(with_limiter_at(handle, Some(now), |limiter| {
        let limit = parse_value(limit)?;
        let outcome = limiter.set_parameters(limit, duration_months, &caller.to_owned())?;
        Ok(outcome.events)
    }))
}

/// Record a spend.  `ok` carries the emitted events.
#[wasm_bindgen]
pub fn record_spend(handle: u32, amount: &str, caller: &str, now: f64) -> String {
    respond(with_limiter_at(handle, Some(now), |limiter| {
        let amount = parse_value(amount)?;
        let outcome = limiter.record_spend(amount, &caller.to_owned())?;
        Ok(outcome.events)
    }))
}

/// Give `capability` (`"SET_PARAMETERS"`, `"RECORD_SPEND"` or `"ADMIN"`) to
/// `principal`.  `ok` is `true` when it was newly granted.
#[wasm_bindgen]
pub fn grant(handle: u32, admin: &str, principal: &str, capability: &str) -> String {
    respond(with_limiter_at(handle, None, |limiter| {
        let capability = parse_capability(capability)?;
        Ok(limiter.grant(&admin.to_owned(), principal.to_owned(), capability)?)
    }))
}

/// Take `capability` from `principal`.  `ok` is `true` when it was held.
#[wasm_bindgen]
pub fn revoke(handle: u32, admin: &str, principal: &str, capability: &str) -> String {
    respond(with_limiter_at(handle, None, |limiter| {
        let capability = parse_capability(capability)?;
        Ok(limiter.revoke(&admin.to_owned(), &principal.to_owned(), capability)?)
    }))
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// What `record_spend(amount)` would do at `at`, without changing anything.
#[wasm_bindgen]
pub fn preview(handle: u32, amount: &str, at: f64) -> String {
    respond(with_limiter_at(handle, None, |limiter| {
        let amount = parse_value(amount)?;
        Ok(limiter.preview(amount, parse_timestamp(at)?)?)
    }))
}

/// Whether a motion paying `amount`, enacted `motion_duration` seconds after
/// `now`, would fit.  `false` on any invalid input.
#[wasm_bindgen]
pub fn is_under_spendable_balance(handle: u32, amount: &str, motion_duration: f64, now: f64) -> bool {
    with_limiter_at(handle, Some(now), |limiter| {
        let amount = parse_value(amount)?;
        let motion_duration = parse_timestamp(motion_duration)?;
        Ok(limiter.is_under_spendable_balance(amount, motion_duration))
    })
    .unwrap_or(false)
}

/// Stored state, without lazy rollover.
#[wasm_bindgen]
pub fn snapshot(handle: u32) -> String {
    respond(with_limiter_at(handle, None, |limiter| Ok(limiter.snapshot())))
}

// ---------------------------------------------------------------------------
// wasm-bindgen-test stubs
// ---------------------------------------------------------------------------

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    const CONFIG: &str = r#"{"admins":["dao"],"set_parameters":["dao"],"record_spend":["factory"]}"#;

    #[wasm_bindgen_test]
    fn test_create_and_destroy_limiter() {
        let handle = create_limiter(CONFIG, 1_710_460_800.0);
        assert_ne!(handle, u32::MAX);
        destroy_limiter(handle);
    }

    #[wasm_bindgen_test]
    fn test_spend_flow() {
        let handle = create_limiter(CONFIG, 1_710_460_800.0);
        assert!(set_parameters(handle, "100", 1, "dao", 1_710_460_800.0).contains("\"ok\""));
        assert!(record_spend(handle, "100", "factory", 1_710_460_800.0).contains("\"ok\""));
        assert!(record_spend(handle, "1", "factory", 1_710_460_800.0).contains("LimitExceeded"));
        destroy_limiter(handle);
    }
}

// ---------------------------------------------------------------------------
// Native unit tests (run with `cargo test` outside of WASM)
// ---------------------------------------------------------------------------
