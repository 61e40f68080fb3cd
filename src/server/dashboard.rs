use serde::Serialize;

use super::session::Session;
use super::upstream::DashboardData;
use crate::types::Plan;

/// What the dashboard shows a visitor.
///
/// `Unauth → {Free, Pro}` once a session resolves; `Free → Pro` when a plan
/// sync observes pro status in the registry. There is no `Pro → Free`
/// transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Unauth,
    Free,
    Pro,
}

impl AccessLevel {
    /// Resolve the access level from an optional session snapshot.
    #[must_use]
    pub fn resolve(session: Option<&Session>) -> Self {
        match session {
            None => Self::Unauth,
            Some(s) if s.plan.is_pro() => Self::Pro,
            Some(_) => Self::Free,
        }
    }
}

/// Session owner as the dashboard presents them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerProfile {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub avatar_url: String,
    pub plan: Plan,
    pub has_pro_code: bool,
}

impl From<&Session> for ViewerProfile {
    fn from(session: &Session) -> Self {
        Self {
            id: session.user.id.to_string(),
            name: session.user.display_name().to_string(),
            email: session.user.email.clone(),
            avatar_url: session.user.avatar_url(),
            plan: session.plan,
            has_pro_code: session.has_pro_code,
        }
    }
}

/// Server-assembled dashboard view model.
///
/// `data` is only present at pro level; a failed upstream fetch leaves it as
/// an empty payload rather than an error.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub access_level: AccessLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<ViewerProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<DashboardData>,
}

impl DashboardView {
    #[must_use]
    pub fn unauth() -> Self {
        Self {
            access_level: AccessLevel::Unauth,
            user: None,
            data: None,
        }
    }

    #[must_use]
    pub fn free(session: &Session) -> Self {
        Self {
            access_level: AccessLevel::Free,
            user: Some(ViewerProfile::from(session)),
            data: None,
        }
    }

    #[must_use]
    pub fn pro(session: &Session, data: DashboardData) -> Self {
        Self {
            access_level: AccessLevel::Pro,
            user: Some(ViewerProfile::from(session)),
            data: Some(data),
        }
    }
}
