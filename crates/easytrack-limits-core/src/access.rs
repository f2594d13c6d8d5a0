// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Capability-based access control.
//!
//! [`AccessGate`] maps each [`Capability`] to the set of principals holding
//! it.  It is responsible for three operations only:
//!
//! * [`authorize`](AccessGate::authorize) — succeed or fail with [`LimiterError::Unauthorized`]
//! * [`grant`](AccessGate::grant)         — add a holder (caller must hold `Admin`)
//! * [`revoke`](AccessGate::revoke)       — remove a holder (caller must hold `Admin`)
//!
//! Holders are only ever changed by an explicit admin call; the gate never
//! grants anything on its own.  A gate built with [`AccessGate::fixed`]
//! refuses every runtime change.

use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::{HashMap, HashSet};
use tracing::{info, trace};

use crate::error::LimiterError;
use crate::types::Capability;

/// Set of principals per capability.
///
/// `P` is an opaque principal identifier; equality is the only operation
/// the gate relies on (plus hashing for set membership).
///
/// # Examples
///
/// ```rust
/// use easytrack_limits_core::access::AccessGate;
/// use easytrack_limits_core::types::Capability;
///
/// let mut gate = AccessGate::with_admin("dao");
/// gate.grant(&"dao", "factory", Capability::RecordSpend).unwrap();
///
/// assert!(gate.authorize(&"factory", Capability::RecordSpend).is_ok());
/// assert!(gate.authorize(&"factory", Capability::SetParameters).is_err());
/// assert!(gate.grant(&"factory", "stranger", Capability::Admin).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct AccessGate<P: Eq + Hash> {
    holders: HashMap<Capability, HashSet<P>>,
    fixed: bool,
}

impl<P: Eq + Hash + Clone + Debug> Default for AccessGate<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Eq + Hash + Clone + Debug> AccessGate<P> {
    /// Create an empty gate that accepts runtime grants from admins.
    ///
    /// Nobody holds `Admin` yet, so an empty gate can never be changed;
    /// use [`with_admin`](Self::with_admin) or [`from_grants`](Self::from_grants).
    pub fn new() -> Self {
        Self {
            holders: HashMap::new(),
            fixed: false,
        }
    }

    /// Create a mutable gate whose only holder is `admin` with [`Capability::Admin`].
    pub fn with_admin(admin: P) -> Self {
        Self::from_grants([(admin, Capability::Admin)])
    }

    /// Create a mutable gate pre-populated with `(principal, capability)` pairs.
    pub fn from_grants<I>(grants: I) -> Self
    where
        I: IntoIterator<Item = (P, Capability)>,
    {
        let mut gate = Self::new();
        for (principal, capability) in grants {
            gate.holders.entry(capability).or_default().insert(principal);
        }
        gate
    }

    /// Create a gate whose holders are fixed at construction.
    ///
    /// [`grant`](Self::grant) and [`revoke`](Self::revoke) always fail with
    /// [`LimiterError::Unauthorized`], even for `Admin` holders.
    pub fn fixed<I>(grants: I) -> Self
    where
        I: IntoIterator<Item = (P, Capability)>,
    {
        let mut gate = Self::from_grants(grants);
        gate.fixed = true;
        gate
    }

    /// Whether runtime grants and revocations are disabled.
    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    /// Whether `principal` currently holds `capability`.
    pub fn has_capability(&self, principal: &P, capability: Capability) -> bool {
        self.holders
            .get(&capability)
            .is_some_and(|set| set.contains(principal))
    }

    /// Succeed when `caller` holds `capability`.
    ///
    /// # Errors
    ///
    /// [`LimiterError::Unauthorized`] otherwise.
    pub fn authorize(&self, caller: &P, capability: Capability) -> Result<(), LimiterError> {
        if self.has_capability(caller, capability) {
            Ok(())
        } else {
            trace!(?caller, %capability, "access denied");
            Err(LimiterError::Unauthorized)
        }
    }

    /// Give `capability` to `principal`.
    ///
    /// Returns `Ok(true)` when the principal did not hold it before.
    ///
    /// # Errors
    ///
    /// [`LimiterError::Unauthorized`] when `admin` lacks `Admin` or the gate
    /// is fixed.  The gate is unchanged on error.
    pub fn grant(
        &mut self,
        admin: &P,
        principal: P,
        capability: Capability,
    ) -> Result<bool, LimiterError> {
        self.authorize_change(admin)?;
        info!(?admin, ?principal, %capability, "capability granted");
        Ok(self.holders.entry(capability).or_default().insert(principal))
    }

    /// Take `capability` away from `principal`.
    ///
    /// Returns `Ok(true)` when the principal held it.  An admin may revoke
    /// its own `Admin` capability, which can leave the gate without admins.
    ///
    /// # Errors
    ///
    /// [`LimiterError::Unauthorized`] when `admin` lacks `Admin` or the gate
    /// is fixed.
    pub fn revoke(
        &mut self,
        admin: &P,
        principal: &P,
        capability: Capability,
    ) -> Result<bool, LimiterError> {
        self.authorize_change(admin)?;
        info!(?admin, ?principal, %capability, "capability revoked");
        Ok(self
            .holders
            .get_mut(&capability)
            .is_some_and(|set| set.remove(principal)))
    }

    /// Every principal holding `capability`, in no particular order.
    pub fn holders(&self, capability: Capability) -> impl Iterator<Item = &P> {
        self.holders.get(&capability).into_iter().flatten()
    }

    fn authorize_change(&self, admin: &P) -> Result<(), LimiterError> {
        if self.fixed {
            trace!(?admin, "gate is fixed; change refused");
            return Err(LimiterError::Unauthorized);
        }
        self.authorize(admin, Capability::Admin)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn test_rights_are_not_shared_between_capabilities() {
        let gate = AccessGate::from_grants([
            ("setter", Capability::SetParameters),
            ("spender", Capability::RecordSpend),
        ]);

        assert!(gate.authorize(&"setter", Capability::SetParameters).is_ok());
        assert_eq!(
            gate.authorize(&"setter", Capability::RecordSpend),
            Err(LimiterError::Unauthorized)
        );
        assert!(gate.authorize(&"spender", Capability::RecordSpend).is_ok());
        assert_eq!(
            gate.authorize(&"spender", Capability::SetParameters),
            Err(LimiterError::Unauthorized)
        );
        assert_eq!(
            gate.authorize(&"stranger", Capability::Admin),
            Err(LimiterError::Unauthorized)
        );
    }

    #[test]
    fn test_multiple_holders() {
        let gate = AccessGate::from_grants([
            ("a", Capability::RecordSpend),
            ("b", Capability::RecordSpend),
        ]);
        assert!(gate.authorize(&"a", Capability::RecordSpend).is_ok());
        assert!(gate.authorize(&"b", Capability::RecordSpend).is_ok());

        let mut holders: Vec<_> = gate.holders(Capability::RecordSpend).copied().collect();
        holders.sort_unstable();
        assert_eq!(holders, ["a", "b"]);
        assert_eq!(gate.holders(Capability::Admin).count(), 0);
    }

    #[test]
    fn test_admin_grant_and_revoke() {
        let mut gate = AccessGate::with_admin("dao");

        assert_eq!(gate.grant(&"dao", "factory", Capability::RecordSpend), Ok(true));
        assert_eq!(gate.grant(&"dao", "factory", Capability::RecordSpend), Ok(false));
        assert!(gate.has_capability(&"factory", Capability::RecordSpend));

        assert_eq!(gate.revoke(&"dao", &"factory", Capability::RecordSpend), Ok(true));
        assert_eq!(gate.revoke(&"dao", &"factory", Capability::RecordSpend), Ok(false));
        assert!(!gate.has_capability(&"factory", Capability::RecordSpend));
    }

    #[test]
    fn test_non_admin_cannot_change_holders() {
        let mut gate = AccessGate::from_grants([
            ("dao", Capability::Admin),
            ("setter", Capability::SetParameters),
        ]);

        assert_eq!(
            gate.grant(&"setter", "setter", Capability::Admin),
            Err(LimiterError::Unauthorized)
        );
        assert_eq!(
            gate.revoke(&"setter", &"dao", Capability::Admin),
            Err(LimiterError::Unauthorized)
        );
        assert!(gate.has_capability(&"dao", Capability::Admin));
        assert!(!gate.has_capability(&"setter", Capability::Admin));
    }

    #[test]
    fn test_fixed_gate_refuses_changes() {
        let mut gate = AccessGate::fixed([("dao", Capability::Admin)]);
        assert!(gate.is_fixed());
        assert_eq!(
            gate.grant(&"dao", "other", Capability::RecordSpend),
            Err(LimiterError::Unauthorized)
        );
        assert_eq!(
            gate.revoke(&"dao", &"dao", Capability::Admin),
            Err(LimiterError::Unauthorized)
        );
        assert!(gate.has_capability(&"dao", Capability::Admin));
    }

    #[test]
    fn test_admin_can_renounce() {
        let mut gate = AccessGate::with_admin(7u32);
        assert_eq!(gate.revoke(&7, &7, Capability::Admin), Ok(true));
        assert_eq!(
            gate.grant(&7, 7, Capability::Admin),
            Err(LimiterError::Unauthorized)
        );
    }
}
