// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Decimal text encoding for 128-bit amounts.
//!
//! JSON numbers and JavaScript numbers cannot represent every `u128`, so
//! amounts crossing a text boundary (config files, persisted snapshots, the
//! WASM surface) are written as base-10 strings.  Parsing is where the
//! `limit ≤ 2¹²⁸ − 1` bound is enforced: anything wider is rejected with
//! [`AmountError::LimitTooLarge`].

use alloc::string::{String, ToString};

use thiserror::Error;

use crate::types::Amount;

/// Failure to parse a decimal amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmountError {
    /// The input had no digits.
    #[error("amount is empty")]
    Empty,
    /// The input contained something other than `0-9` and `_` separators.
    #[error("amount contains an invalid character at byte {0}")]
    InvalidDigit(usize),
    /// The value does not fit in 128 bits.
    #[error("amount exceeds 2^128 - 1")]
    LimitTooLarge,
}

/// Parse a base-10 amount, allowing `_` digit separators.
///
/// # Examples
///
/// ```rust
/// use easytrack_limits_core::amount::{parse_amount, AmountError};
///
/// assert_eq!(parse_amount("1_000").unwrap(), 1_000);
/// assert_eq!(
///     parse_amount("340282366920938463463374607431768211455").unwrap(),
///     u128::MAX,
/// );
/// assert_eq!(
///     parse_amount("340282366920938463463374607431768211456"),
///     Err(AmountError::LimitTooLarge),
/// );
/// ```
pub fn parse_amount(raw: &str) -> Result<Amount, AmountError> {
    let trimmed = raw.trim();
    let mut value: Amount = 0;
    let mut seen_digit = false;

    for (index, byte) in trimmed.bytes().enumerate() {
        if byte == b'_' {
            continue;
        }
        if !byte.is_ascii_digit() {
            return Err(AmountError::InvalidDigit(index));
        }
        seen_digit = true;
        value = value
            .checked_mul(10)
            .and_then(|shifted| shifted.checked_add(Amount::from(byte - b'0')))
            .ok_or(AmountError::LimitTooLarge)?;
    }

    if !seen_digit {
        return Err(AmountError::Empty);
    }
    Ok(value)
}

/// Render an amount as a plain base-10 string.
pub fn format_amount(amount: Amount) -> String {
    amount.to_string()
}

/// `#[serde(with = "...")]` adapter that writes amounts as decimal strings.
///
/// Deserialisation also accepts plain unsigned JSON integers so that
/// hand-written config files may use small literal numbers.
pub mod serde_decimal {
    use core::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    use super::{format_amount, parse_amount};
    use crate::types::Amount;

    pub fn serialize<S: Serializer>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_amount(*amount))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }

    struct AmountVisitor;

    impl<'de> Visitor<'de> for AmountVisitor {
        type Value = Amount;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a decimal string or unsigned integer no larger than 2^128 - 1")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Amount, E> {
            parse_amount(value).map_err(E::custom)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Amount, E> {
            Ok(Amount::from(value))
        }

        fn visit_u128<E: de::Error>(self, value: u128) -> Result<Amount, E> {
            Ok(value)
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Amount, E> {
            u64::try_from(value)
                .map(Amount::from)
                .map_err(|_| E::custom("amount must not be negative"))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Wrapper {
        #[serde(with = "serde_decimal")]
        amount: Amount,
    }

    #[test]
    fn test_parse_plain_and_separated() {
        assert_eq!(parse_amount("0"), Ok(0));
        assert_eq!(parse_amount(" 42 "), Ok(42));
        assert_eq!(parse_amount("3_000_000_000_000_000_000"), Ok(3 * 10u128.pow(18)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_amount(""), Err(AmountError::Empty));
        assert_eq!(parse_amount("___"), Err(AmountError::Empty));
        assert_eq!(parse_amount("12a"), Err(AmountError::InvalidDigit(2)));
        assert_eq!(parse_amount("-1"), Err(AmountError::InvalidDigit(0)));
    }

    #[test]
    fn test_max_limit_boundary() {
        let max = u128::MAX.to_string();
        assert_eq!(parse_amount(&max), Ok(u128::MAX));
        assert_eq!(
            parse_amount("340282366920938463463374607431768211456"),
            Err(AmountError::LimitTooLarge)
        );
    }

    #[test]
    fn test_serde_writes_string_and_reads_both_forms() {
        let json = serde_json::to_string(&Wrapper { amount: u128::MAX }).unwrap();
        assert_eq!(json, r#"{"amount":"340282366920938463463374607431768211455"}"#);

        let from_int: Wrapper = serde_json::from_str(r#"{"amount":100}"#).unwrap();
        assert_eq!(from_int.amount, 100);

        let too_large = serde_json::from_str::<Wrapper>(
            r#"{"amount":"340282366920938463463374607431768211456"}"#,
        );
        assert!(too_large.is_err());

        let negative = serde_json::from_str::<Wrapper>(r#"{"amount":-5}"#);
        assert!(negative.is_err());
    }
}
