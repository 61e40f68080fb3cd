//! Redemption-code bookkeeping and plan upgrades.
//!
//! Three pieces, matching the upgrade flow end to end:
//!
//! - [`RedemptionLedger`] — which codes exist and who consumed which.
//! - [`UpgradeRegistry`] — which users hold pro status.
//! - [`UpgradeRegistry::verify`] — reconcile a user against the registry.
//!
//! Redeeming a code and upgrading the plan are two separate calls; a client
//! that stops between them is left with a consumed code and no upgrade. Both
//! collections are process-local and start empty on boot — nothing here
//! survives a restart.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;
use serde::Serialize;

use crate::codes;
use crate::types::{Plan, RedemptionCode, UserId};

/// Why a redemption attempt was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RedeemError {
    #[error("Invalid code format")]
    InvalidFormat,

    /// Normalized code is not on the allow-list.
    #[error("Invalid redemption code")]
    UnknownCode,

    /// This account consumed this code before.
    #[error("Code already redeemed by this account")]
    AlreadyRedeemed,
}

/// Why an upgrade attempt was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpgradeError {
    /// Caller could not prove a redeemed code backs the request.
    #[error("Invalid upgrade request - valid code required")]
    MissingProof,
}

/// Resolved plan standing for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanStatus {
    pub plan: Plan,
    pub has_pro_code: bool,
}

/// Tracks the code allow-list and which user consumed which code.
///
/// A code is consumable at most once per user; two different users may each
/// consume the same code. Check-and-insert happens under a single write
/// guard, so concurrent redemptions of the same (user, code) pair cannot both
/// succeed.
pub struct RedemptionLedger {
    allowed: HashSet<String>,
    consumed: RwLock<HashMap<UserId, HashSet<RedemptionCode>>>,
}

impl Default for RedemptionLedger {
    fn default() -> Self {
        Self::new(codes::DEFAULT_CODES.iter().map(|c| (*c).to_string()))
    }
}

impl RedemptionLedger {
    /// Create a ledger with a custom allow-list.
    ///
    /// Entries are normalized on the way in, so a config value of
    /// `" early_bird "` matches a submitted `"EARLY_BIRD"`.
    #[must_use]
    pub fn new(allowed: impl IntoIterator<Item = String>) -> Self {
        Self {
            allowed: allowed
                .into_iter()
                .map(|c| codes::normalize(&c))
                .filter(|c| !c.is_empty())
                .collect(),
            consumed: RwLock::new(HashMap::new()),
        }
    }

    /// Redeem `raw_code` for `user_id`.
    ///
    /// Success records the consumption and nothing else — granting pro status
    /// is [`UpgradeRegistry::upgrade`]'s job.
    ///
    /// # Errors
    ///
    /// [`RedeemError::InvalidFormat`] for blank input,
    /// [`RedeemError::UnknownCode`] for codes off the allow-list,
    /// [`RedeemError::AlreadyRedeemed`] when this user consumed it before.
    pub fn redeem(
        &self,
        user_id: &UserId,
        raw_code: &str,
    ) -> Result<RedemptionCode, RedeemError> {
        let code: RedemptionCode =
            raw_code.parse().map_err(|_| RedeemError::InvalidFormat)?;

        if !self.allowed.contains(code.as_str()) {
            return Err(RedeemError::UnknownCode);
        }

        let mut consumed = self.consumed.write();
        let user_codes = consumed.entry(user_id.clone()).or_default();
        if !user_codes.insert(code.clone()) {
            return Err(RedeemError::AlreadyRedeemed);
        }

        Ok(code)
    }

    /// Whether `user_id` has consumed at least one code.
    ///
    /// This is the server-side proof the upgrade path checks, instead of
    /// trusting the client's asserted flag alone.
    #[must_use]
    pub fn has_redeemed(&self, user_id: &UserId) -> bool {
        self.consumed
            .read()
            .get(user_id)
            .is_some_and(|codes| !codes.is_empty())
    }
}

/// Tracks which users have been granted pro status.
///
/// Membership is monotonic: there is no downgrade path, re-granting is a
/// no-op.
#[derive(Default)]
pub struct UpgradeRegistry {
    upgraded: RwLock<HashSet<UserId>>,
}

impl UpgradeRegistry {
    /// Grant pro status to `user_id`.
    ///
    /// `has_valid_code` must be true — the route handler computes it from the
    /// client's asserted flag AND the redemption ledger, so a bare assertion
    /// without a consumed code does not pass.
    ///
    /// # Errors
    ///
    /// [`UpgradeError::MissingProof`] when `has_valid_code` is false; the
    /// registry is left untouched.
    pub fn upgrade(
        &self,
        user_id: &UserId,
        has_valid_code: bool,
    ) -> Result<Plan, UpgradeError> {
        if !has_valid_code {
            return Err(UpgradeError::MissingProof);
        }

        self.upgraded.write().insert(user_id.clone());
        Ok(Plan::Pro)
    }

    /// Reconcile `user_id` against the registry. Pure read.
    #[must_use]
    pub fn verify(&self, user_id: &UserId) -> PlanStatus {
        let upgraded = self.upgraded.read().contains(user_id);
        PlanStatus {
            plan: if upgraded { Plan::Pro } else { Plan::Free },
            has_pro_code: upgraded,
        }
    }

    #[must_use]
    pub fn is_upgraded(&self, user_id: &UserId) -> bool {
        self.upgraded.read().contains(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(id: &str) -> UserId {
        UserId::from(id)
    }

    #[test]
    fn redeem_unknown_code_fails() {
        let ledger = RedemptionLedger::default();
        assert_eq!(
            ledger.redeem(&u("u1"), "NOT_A_REAL_CODE"),
            Err(RedeemError::UnknownCode)
        );
        assert!(!ledger.has_redeemed(&u("u1")));
    }

    #[test]
    fn redeem_blank_code_is_format_error() {
        let ledger = RedemptionLedger::default();
        assert_eq!(ledger.redeem(&u("u1"), "   "), Err(RedeemError::InvalidFormat));
        assert_eq!(ledger.redeem(&u("u1"), ""), Err(RedeemError::InvalidFormat));
    }

    #[test]
    fn redeem_normalizes_input() {
        let ledger = RedemptionLedger::default();
        let code = ledger.redeem(&u("u1"), "  tempmail_pro_2024 ").unwrap();
        assert_eq!(code.as_str(), "TEMPMAIL_PRO_2024");
    }

    #[test]
    fn second_redemption_same_user_fails() {
        let ledger = RedemptionLedger::default();
        ledger.redeem(&u("u1"), "TEMPMAIL_PRO_2024").unwrap();
        assert_eq!(
            ledger.redeem(&u("u1"), "TEMPMAIL_PRO_2024"),
            Err(RedeemError::AlreadyRedeemed)
        );
        // Different casing of the same code is still the same code.
        assert_eq!(
            ledger.redeem(&u("u1"), "tempmail_pro_2024"),
            Err(RedeemError::AlreadyRedeemed)
        );
    }

    #[test]
    fn same_code_redeemable_by_different_users() {
        let ledger = RedemptionLedger::default();
        ledger.redeem(&u("u1"), "TEMPMAIL_PRO_2024").unwrap();
        ledger.redeem(&u("u2"), "TEMPMAIL_PRO_2024").unwrap();
        assert!(ledger.has_redeemed(&u("u1")));
        assert!(ledger.has_redeemed(&u("u2")));
    }

    #[test]
    fn one_user_may_redeem_multiple_codes() {
        let ledger = RedemptionLedger::default();
        ledger.redeem(&u("u1"), "TEMPMAIL_PRO_2024").unwrap();
        ledger.redeem(&u("u1"), "PREMIUM_ACCESS_2024").unwrap();
        assert!(ledger.has_redeemed(&u("u1")));
    }

    #[test]
    fn custom_allow_list_is_normalized() {
        let ledger = RedemptionLedger::new(vec![" early_bird ".to_string()]);
        ledger.redeem(&u("u1"), "EARLY_BIRD").unwrap();
        assert_eq!(
            ledger.redeem(&u("u1"), "TEMPMAIL_PRO_2024"),
            Err(RedeemError::UnknownCode)
        );
    }

    #[test]
    fn upgrade_without_proof_leaves_registry_unchanged() {
        let registry = UpgradeRegistry::default();
        assert_eq!(
            registry.upgrade(&u("u1"), false),
            Err(UpgradeError::MissingProof)
        );
        assert!(!registry.is_upgraded(&u("u1")));
        assert_eq!(registry.verify(&u("u1")).plan, Plan::Free);
    }

    #[test]
    fn upgrade_is_idempotent() {
        let registry = UpgradeRegistry::default();
        assert_eq!(registry.upgrade(&u("u1"), true), Ok(Plan::Pro));
        assert_eq!(registry.upgrade(&u("u1"), true), Ok(Plan::Pro));
        assert!(registry.is_upgraded(&u("u1")));
    }

    #[test]
    fn verify_reflects_registry_membership() {
        let registry = UpgradeRegistry::default();

        let before = registry.verify(&u("u1"));
        assert_eq!(before.plan, Plan::Free);
        assert!(!before.has_pro_code);

        registry.upgrade(&u("u1"), true).unwrap();

        let after = registry.verify(&u("u1"));
        assert_eq!(after.plan, Plan::Pro);
        assert!(after.has_pro_code);

        // Other users are unaffected.
        assert_eq!(registry.verify(&u("u2")).plan, Plan::Free);
    }

    #[test]
    fn redeem_then_upgrade_scenario() {
        let ledger = RedemptionLedger::default();
        let registry = UpgradeRegistry::default();

        ledger.redeem(&u("u1"), "TEMPMAIL_PRO_2024").unwrap();
        assert_eq!(
            ledger.redeem(&u("u1"), "TEMPMAIL_PRO_2024"),
            Err(RedeemError::AlreadyRedeemed)
        );
        ledger.redeem(&u("u2"), "TEMPMAIL_PRO_2024").unwrap();

        let proof = ledger.has_redeemed(&u("u1"));
        registry.upgrade(&u("u1"), proof).unwrap();
        assert_eq!(registry.verify(&u("u1")).plan, Plan::Pro);
        assert_eq!(registry.verify(&u("u2")).plan, Plan::Free);
    }
}
