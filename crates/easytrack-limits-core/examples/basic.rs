// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! # Basic Limiter Example
//!
//! Walks a quarterly limiter through a limit change, a rejected spend and a
//! period rollover using a manual clock.  Run with:
//!
//! ```bash
//! cargo run --example basic
//! ```

use easytrack_limits_core::{
    calendar::{timestamp_from_date, timestamp_to_date},
    LimiterConfig, LimiterError, ManualClock, PeriodicSpendLimiter, Snapshot,
};

fn print_state(label: &str, snapshot: &Snapshot) {
    let window = snapshot.window.map(|window| {
        let start = timestamp_to_date(window.start);
        let end = timestamp_to_date(window.end);
        format!(
            "{}-{:02}-{:02} .. {}-{:02}-{:02}",
            start.year, start.month, start.day, end.year, end.month, end.day
        )
    });
    println!(
        "  {label:<24} limit={} spent={} spendable={} window={}",
        snapshot.limit,
        snapshot.already_spent,
        snapshot.spendable,
        window.as_deref().unwrap_or("-"),
    );
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("EasyTrack periodic limits: basic example\n");

    // -----------------------------------------------------------------------
    // 1. Build from configuration
    // -----------------------------------------------------------------------
    let config: LimiterConfig = serde_json::from_str(
        r#"{
            "limit": "1000",
            "period_duration_months": 3,
            "admins": ["dao"],
            "set_parameters": ["dao-voting"],
            "record_spend": ["top-up-factory"]
        }"#,
    )?;
    let clock = ManualClock::new(timestamp_from_date(2024, 8, 20));
    let mut limiter = PeriodicSpendLimiter::from_config(&config, clock.clone())?;

    let voting = "dao-voting".to_string();
    let factory = "top-up-factory".to_string();
    print_state("initial", &limiter.period_state()?);

    // -----------------------------------------------------------------------
    // 2. Spend within the quarter
    // -----------------------------------------------------------------------
    limiter.record_spend(600, &factory)?;
    print_state("after spending 600", &limiter.snapshot());

    match limiter.record_spend(500, &factory) {
        Err(LimiterError::LimitExceeded) => println!("  spend of 500 rejected: limit exceeded"),
        other => println!("  unexpected: {other:?}"),
    }

    // -----------------------------------------------------------------------
    // 3. Lower the limit below what was already spent
    // -----------------------------------------------------------------------
    limiter.set_parameters(400, 3, &voting)?;
    print_state("limit lowered to 400", &limiter.snapshot());

    // -----------------------------------------------------------------------
    // 4. Motion check across the period boundary
    // -----------------------------------------------------------------------
    let motion_duration = 45 * 86_400;
    println!(
        "  motion for 400 enacted in 45 days fits: {}",
        limiter.is_under_spendable_balance(400, motion_duration)
    );

    // -----------------------------------------------------------------------
    // 5. Next quarter
    // -----------------------------------------------------------------------
    clock.set(timestamp_from_date(2024, 10, 3));
    let outcome = limiter.record_spend(150, &factory)?;
    print_state("next quarter, spent 150", &limiter.snapshot());
    for event in &outcome.events {
        println!("  event: {}", serde_json::to_string(event)?);
    }

    Ok(())
}
