use std::collections::HashMap;

use parking_lot::RwLock;
use time::{Duration, OffsetDateTime};
use ulid::Ulid;

use crate::oauth::DiscordUser;
use crate::types::{Plan, SessionId, UserId};

/// Authenticated session.
///
/// Created at OAuth callback, mutated by the plan-sync trigger, destroyed at
/// logout or TTL expiry. The store owns the canonical copy; handlers work on
/// snapshots.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub user: DiscordUser,
    pub plan: Plan,
    pub has_pro_code: bool,
    pub created_at: OffsetDateTime,
}

impl Session {
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user.id
    }
}

/// Process-wide, ULID-keyed session store.
///
/// In-memory only: every session is gone on restart, and a multi-process
/// deployment would need a shared backing store instead.
pub struct SessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl_days: i64) -> Self {
        Self {
            ttl: Duration::days(ttl_days),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Create a session for a freshly authenticated Discord user.
    ///
    /// Every login starts on the free plan; pro status is reapplied by the
    /// plan sync once the verifier has been consulted.
    pub fn create(&self, user: DiscordUser) -> SessionId {
        let id = SessionId(Ulid::new().to_string());
        let session = Session {
            id: id.clone(),
            user,
            plan: Plan::Free,
            has_pro_code: false,
            created_at: OffsetDateTime::now_utc(),
        };
        self.sessions.write().insert(id.clone(), session);
        id
    }

    /// Look up a session, evicting it if past its TTL.
    #[must_use]
    pub fn find(&self, id: &SessionId) -> Option<Session> {
        let session = self.sessions.read().get(id).cloned()?;
        if OffsetDateTime::now_utc() - session.created_at >= self.ttl {
            self.sessions.write().remove(id);
            return None;
        }
        Some(session)
    }

    /// Apply a reconciled plan to a live session (the "update" trigger).
    ///
    /// Returns false when the session no longer exists.
    pub fn set_plan(&self, id: &SessionId, plan: Plan, has_pro_code: bool) -> bool {
        let mut sessions = self.sessions.write();
        match sessions.get_mut(id) {
            Some(session) => {
                session.plan = plan;
                session.has_pro_code = has_pro_code;
                true
            }
            None => false,
        }
    }

    /// Delete a session (logout). Deleting a missing session is a no-op.
    pub fn delete(&self, id: &SessionId) {
        self.sessions.write().remove(id);
    }
}
