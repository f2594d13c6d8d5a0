// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Configuration loader for [`LimiterConfig`].
//!
//! Supports two load strategies:
//!
//! 1. **TOML file** — [`load_config`] reads and deserialises a TOML file.
//! 2. **Environment variables** — [`load_config_from_env`] reads
//!    `EASYTRACK_`-prefixed variables.
//!
//! Both loaders require the `config-loader` feature.
//!
//! # File format
//!
//! ```toml
//! limit                  = "1000000000000000000000"   # decimal string or integer
//! period_duration_months = 3                          # 0, 1, 2, 3, 6 or 12
//! admins                 = ["dao"]
//! set_parameters         = ["dao-voting"]
//! record_spend           = ["top-up-factory"]
//! fixed_roles            = false
//! ```
//!
//! # Environment variables
//!
//! | Variable                   | Type                | Default |
//! |----------------------------|---------------------|---------|
//! | `EASYTRACK_LIMIT`          | decimal u128        | 0       |
//! | `EASYTRACK_PERIOD_MONTHS`  | 0, 1, 2, 3, 6, 12   | 0       |
//! | `EASYTRACK_ADMINS`         | comma-separated     | empty   |
//! | `EASYTRACK_SET_PARAMETERS` | comma-separated     | empty   |
//! | `EASYTRACK_RECORD_SPEND`   | comma-separated     | empty   |
//! | `EASYTRACK_FIXED_ROLES`    | bool                | false   |

#![cfg(feature = "config-loader")]

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::amount::{parse_amount, AmountError};
use crate::config::LimiterConfig;
use crate::types::PeriodDuration;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors that can occur while loading or parsing limiter configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be opened.
    #[error("failed to read config file \"{path}\": {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The TOML content could not be deserialised.
    #[error("failed to parse TOML config: {source}")]
    TomlParse {
        #[from]
        source: toml::de::Error,
    },
    /// A field could not be parsed to its expected type.
    #[error("field \"{field}\": cannot parse \"{value}\": {reason}")]
    ParseField { field: String, value: String, reason: String },
    /// A field value is outside the permitted range.
    #[error("field \"{field}\": value \"{value}\" out of range: {reason}")]
    InvalidRange { field: String, value: String, reason: String },
}

// ---------------------------------------------------------------------------
// TOML loader
// ---------------------------------------------------------------------------

/// Load a [`LimiterConfig`] from a TOML file.
///
/// # Errors
///
/// [`ConfigError::FileRead`] if the file cannot be read, or
/// [`ConfigError::TomlParse`] if its content does not match the schema
/// (including limits wider than 128 bits).
///
/// # Example
///
/// ```rust,no_run
/// use easytrack_limits_core::config_loader::load_config;
///
/// let config = load_config("/etc/easytrack/limits.toml").unwrap();
/// println!("period: {} months", config.period_duration_months);
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<LimiterConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&content)
}

/// Parse a [`LimiterConfig`] from TOML text.
///
/// # Errors
///
/// [`ConfigError::TomlParse`] when the text does not match the schema.
pub fn parse_config(content: &str) -> Result<LimiterConfig, ConfigError> {
    Ok(toml::from_str::<LimiterConfig>(content)?)
}

// ---------------------------------------------------------------------------
// Environment variable loader
// ---------------------------------------------------------------------------

/// Load a [`LimiterConfig`] from `EASYTRACK_`-prefixed environment variables.
///
/// Unset variables fall back to their defaults.  Principal lists are split
/// on commas; surrounding whitespace and empty entries are dropped.
///
/// # Errors
///
/// [`ConfigError::ParseField`] if a variable cannot be parsed, or
/// [`ConfigError::InvalidRange`] for a limit above `2¹²⁸ − 1` or an
/// unsupported period duration.
pub fn load_config_from_env() -> Result<LimiterConfig, ConfigError> {
    load_config_from_lookup(|key| std::env::var(key).ok())
}

/// Same as [`load_config_from_env`] but reading variables through `lookup`.
///
/// # Errors
///
/// See [`load_config_from_env`].
pub fn load_config_from_lookup<F>(lookup: F) -> Result<LimiterConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let limit = match lookup("EASYTRACK_LIMIT") {
        Some(val) => parse_amount(&val).map_err(|error| match error {
            AmountError::LimitTooLarge => ConfigError::InvalidRange {
                field: "EASYTRACK_LIMIT".into(),
                value: val.clone(),
                reason: error.to_string(),
            },
            _ => ConfigError::ParseField {
                field: "EASYTRACK_LIMIT".into(),
                value: val.clone(),
                reason: error.to_string(),
            },
        })?,
        None => 0,
    };

    let period_duration_months = match lookup("EASYTRACK_PERIOD_MONTHS") {
        Some(val) => {
            let months = val.trim().parse::<u32>().map_err(|source| ConfigError::ParseField {
                field: "EASYTRACK_PERIOD_MONTHS".into(),
                value: val.clone(),
                reason: source.to_string(),
            })?;
            if months != 0 && PeriodDuration::from_months(months).is_none() {
                return Err(ConfigError::InvalidRange {
                    field: "EASYTRACK_PERIOD_MONTHS".into(),
                    value: val,
                    reason: "must be one of 0, 1, 2, 3, 6, 12".into(),
                });
            }
            months
        }
        None => 0,
    };

    let fixed_roles = read_bool(&lookup, "EASYTRACK_FIXED_ROLES", false)?;

    Ok(LimiterConfig {
        limit,
        period_duration_months,
        admins: read_list(&lookup, "EASYTRACK_ADMINS"),
        set_parameters: read_list(&lookup, "EASYTRACK_SET_PARAMETERS"),
        record_spend: read_list(&lookup, "EASYTRACK_RECORD_SPEND"),
        fixed_roles,
    })
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn read_list<F>(lookup: &F, key: &str) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|val| {
            val.split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

fn read_bool<F>(lookup: &F, key: &str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) => match val.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            other => Err(ConfigError::ParseField {
                field: key.to_owned(),
                value: other.to_owned(),
                reason: "expected one of: true/false, 1/0, yes/no, on/off".into(),
            }),
        },
        None => Ok(default),
    }
}
