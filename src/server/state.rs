use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use super::config::{GateConfig, GateSettings};
use super::session::SessionStore;
use super::upstream::UpstreamClient;
use crate::oauth::AuthClient;
use crate::plan::{RedemptionLedger, UpgradeRegistry};

/// Shared state for all gate route handlers.
#[derive(Clone)]
pub struct GateState {
    pub(super) client: Arc<AuthClient>,
    pub(super) sessions: Arc<SessionStore>,
    pub(super) ledger: Arc<RedemptionLedger>,
    pub(super) registry: Arc<UpgradeRegistry>,
    pub(super) upstream: Arc<UpstreamClient>,
    pub(super) settings: GateSettings,
}

impl GateState {
    #[must_use]
    pub(super) fn from_config(config: GateConfig) -> Self {
        Self {
            client: Arc::new(config.client),
            sessions: Arc::new(SessionStore::new(config.settings.session_ttl_days)),
            ledger: Arc::new(RedemptionLedger::new(config.redemption_codes)),
            registry: Arc::new(UpgradeRegistry::default()),
            upstream: Arc::new(UpstreamClient::new(config.service_api_url)),
            settings: config.settings,
        }
    }
}

// PrivateCookieJar requires Key to be extractable from state
impl FromRef<GateState> for Key {
    fn from_ref(state: &GateState) -> Self {
        state.settings.cookie_key.clone()
    }
}
