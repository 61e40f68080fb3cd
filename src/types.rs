use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

use crate::codes;
use crate::error::Error;

/// Discord user identifier (snowflake, the `id` field of the userinfo payload).
///
/// Immutable, unique per Discord account. Everything plan-related — session,
/// redemption ledger, upgrade registry — keys on this value.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into,
)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Session identifier (opaque string, ULID format).
///
/// Issued by [`SessionStore::create`](crate::server::SessionStore::create) and
/// carried in the session cookie.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into,
)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Service tier attached to a session.
///
/// Discord logins start at `Free`; `Pro` is granted through the upgrade
/// registry. There is no downgrade path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Pro,
}

impl Plan {
    #[must_use]
    pub fn is_pro(self) -> bool {
        matches!(self, Self::Pro)
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Free => "free",
            Self::Pro => "pro",
        })
    }
}

/// Normalized redemption code.
///
/// Guaranteed well-formed by construction: trimmed, ASCII-uppercased and
/// non-empty. Whether the code is on the allow-list is the
/// [`RedemptionLedger`](crate::plan::RedemptionLedger)'s call, not a format
/// question.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RedemptionCode(String);

impl RedemptionCode {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RedemptionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for RedemptionCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl TryFrom<String> for RedemptionCode {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let normalized = codes::normalize(&s);
        if normalized.is_empty() {
            return Err(Error::InvalidCode(s));
        }
        Ok(Self(normalized))
    }
}

impl From<RedemptionCode> for String {
    fn from(c: RedemptionCode) -> Self {
        c.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Plan::Free).unwrap(), "\"free\"");
        assert_eq!(serde_json::to_string(&Plan::Pro).unwrap(), "\"pro\"");
    }

    #[test]
    fn plan_deserializes_lowercase() {
        let plan: Plan = serde_json::from_str("\"pro\"").unwrap();
        assert_eq!(plan, Plan::Pro);
        assert!(serde_json::from_str::<Plan>("\"premium\"").is_err());
    }

    #[test]
    fn plan_defaults_to_free() {
        assert_eq!(Plan::default(), Plan::Free);
        assert!(!Plan::default().is_pro());
    }

    #[test]
    fn redemption_code_normalizes_on_parse() {
        let code: RedemptionCode = "  tempmail_pro_2024 ".parse().unwrap();
        assert_eq!(code.as_str(), "TEMPMAIL_PRO_2024");
    }

    #[test]
    fn redemption_code_rejects_blank() {
        assert!("".parse::<RedemptionCode>().is_err());
        assert!("   ".parse::<RedemptionCode>().is_err());
    }

    #[test]
    fn redemption_code_serde_roundtrip() {
        let code: RedemptionCode = "upgrade_now_2024".parse().unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"UPGRADE_NOW_2024\"");
        let parsed: RedemptionCode = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, code);
    }

    #[test]
    fn newtypes_prevent_mixing() {
        fn takes_user_id(_: &UserId) {}
        fn takes_session_id(_: &SessionId) {}

        let user = UserId::from("190000000000000001");
        let session = SessionId::from("01J0000000000000000000000".to_string());

        takes_user_id(&user);
        takes_session_id(&session);
        // takes_user_id(&session);  // Compile error!
    }
}
