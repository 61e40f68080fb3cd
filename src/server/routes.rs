use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::PrivateCookieJar;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::config::GateConfig;
use super::cookies;
use super::dashboard::{AccessLevel, DashboardView};
use super::error::ApiError;
use super::extractor::CurrentUser;
use super::state::GateState;
use super::upstream::DashboardData;
use crate::oauth::DiscordUser;
use crate::types::{Plan, UserId};

/// Create the gate router: Discord auth routes plus the plan-gating API.
#[must_use]
pub fn router(config: GateConfig) -> Router {
    let auth_path = config.settings.auth_path.clone();
    let state = GateState::from_config(config);

    let mut router = Router::new()
        .route(&format!("{auth_path}/login"), get(login))
        .route(&format!("{auth_path}/callback"), get(callback))
        .route(
            &format!("{auth_path}/logout"),
            get(logout).post(logout),
        )
        .route("/api/redemption-code", post(redeem_code))
        .route("/api/plan-upgrade", post(upgrade_plan))
        .route("/api/plan-verify", post(verify_plan))
        .route("/api/user/{user_id}/dashboard-data", get(dashboard_data))
        .route("/api/dashboard", get(dashboard));

    if state.settings.dev_login_enabled {
        router = router.route(&format!("{auth_path}/dev-login"), get(dev_login));
    }

    router.with_state(state)
}

// ── Login ──────────────────────────────────────────────────────────

async fn login(
    State(state): State<GateState>,
    jar: PrivateCookieJar,
) -> Result<(PrivateCookieJar, Redirect), Response> {
    let auth_req = state.client.authorization_url();

    let (pkce_cookie, state_cookie) = cookies::pkce_cookies(
        &auth_req.code_verifier,
        &auth_req.state,
        state.settings.secure_cookies,
        &state.settings.auth_path,
    );

    let jar = jar.add(pkce_cookie).add(state_cookie);

    Ok((jar, Redirect::to(&auth_req.url)))
}

// ── Callback ───────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

async fn callback(
    State(state): State<GateState>,
    jar: PrivateCookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<(PrivateCookieJar, Redirect), Response> {
    if let Some(error) = &params.error {
        let desc = params.error_description.as_deref().unwrap_or("Unknown error");
        tracing::warn!(error = %error, description = %desc, "OAuth2 error from Discord");
        return Err(login_error(&state.settings.error_redirect, desc));
    }

    let code = params
        .code
        .ok_or_else(|| login_error(&state.settings.error_redirect, "missing_code"))?;

    let received_state = params
        .state
        .ok_or_else(|| login_error(&state.settings.error_redirect, "state_mismatch"))?;

    let stored_state = cookies::get_state(&jar)
        .ok_or_else(|| login_error(&state.settings.error_redirect, "state_mismatch"))?;

    if received_state != stored_state {
        tracing::warn!("OAuth state mismatch");
        return Err(login_error(&state.settings.error_redirect, "state_mismatch"));
    }

    let code_verifier = cookies::get_pkce_verifier(&jar)
        .ok_or_else(|| login_error(&state.settings.error_redirect, "missing_verifier"))?;

    let token_response = state
        .client
        .exchange_code(&code, &code_verifier)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Token exchange failed");
            login_error(&state.settings.error_redirect, "token_exchange_failed")
        })?;

    let user = state
        .client
        .get_user_info(&token_response.access_token)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Userinfo request failed");
            login_error(&state.settings.error_redirect, "userinfo_failed")
        })?;

    tracing::info!(user = %user.username, id = %user.id, "Discord login successful");

    let session_id = state.sessions.create(user);

    let session_cookie = cookies::session_cookie(
        &state.settings.session_cookie_name,
        session_id.as_str(),
        state.settings.session_ttl_days,
        state.settings.secure_cookies,
    );

    let (clear_pkce, clear_state) = cookies::clear_pkce_cookies(&state.settings.auth_path);

    let jar = jar
        .add(session_cookie)
        .add(clear_pkce)
        .add(clear_state);

    Ok((jar, Redirect::to(&state.settings.login_redirect)))
}

// ── Logout ─────────────────────────────────────────────────────────

async fn logout(
    State(state): State<GateState>,
    jar: PrivateCookieJar,
) -> (PrivateCookieJar, Redirect) {
    if let Some(cookie) = jar.get(&state.settings.session_cookie_name) {
        let session_id = crate::types::SessionId(cookie.value().to_string());
        state.sessions.delete(&session_id);
    }

    let clear_cookie = cookies::clear_session_cookie(&state.settings.session_cookie_name);
    (jar.remove(clear_cookie), Redirect::to(&state.settings.logout_redirect))
}

// ── Dev Login ──────────────────────────────────────────────────────

#[derive(Deserialize)]
struct DevLoginParams {
    user: Option<String>,
}

async fn dev_login(
    State(state): State<GateState>,
    jar: PrivateCookieJar,
    Query(params): Query<DevLoginParams>,
) -> (PrivateCookieJar, Redirect) {
    // No runtime guard needed — route is only registered when dev_login_enabled is true

    let test_id = params
        .user
        .filter(|u| !u.is_empty() && u.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or_else(|| "100000000000000000".to_string());

    let user = DiscordUser::new(UserId(test_id.clone()), format!("dev-{test_id}"))
        .with_email(format!("{test_id}@dev.local"))
        .with_verified(true);

    let session_id = state.sessions.create(user);

    let session_cookie = cookies::session_cookie(
        &state.settings.session_cookie_name,
        session_id.as_str(),
        state.settings.session_ttl_days,
        state.settings.secure_cookies,
    );

    tracing::info!(session_id = %session_id, "Dev login successful");

    (jar.add(session_cookie), Redirect::to(&state.settings.login_redirect))
}

// ── Redemption ─────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RedeemResponse {
    success: bool,
    message: &'static str,
    valid_code: bool,
}

async fn redeem_code(
    State(state): State<GateState>,
    CurrentUser(session): CurrentUser,
    Json(body): Json<Value>,
) -> Result<Json<RedeemResponse>, ApiError> {
    let raw_code = body
        .get("code")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::InvalidInput("Invalid code format".into()))?;

    let code = state.ledger.redeem(session.user_id(), raw_code)?;

    tracing::info!(user = %session.user_id(), code = %code, "Redemption code accepted");

    Ok(Json(RedeemResponse {
        success: true,
        message: "Pro code redeemed successfully! Your account will be upgraded.",
        valid_code: true,
    }))
}

// ── Upgrade ────────────────────────────────────────────────────────

#[derive(Serialize)]
struct UpgradeResponse {
    success: bool,
    message: &'static str,
    plan: Plan,
}

async fn upgrade_plan(
    State(state): State<GateState>,
    CurrentUser(session): CurrentUser,
    Json(body): Json<Value>,
) -> Result<Json<UpgradeResponse>, ApiError> {
    let asserted = body
        .get("validCode")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    // The asserted flag alone is not proof; the ledger must agree.
    let has_valid_code = asserted && state.ledger.has_redeemed(session.user_id());

    let plan = state.registry.upgrade(session.user_id(), has_valid_code)?;

    tracing::info!(user = %session.user_id(), "Plan upgraded to pro");

    Ok(Json(UpgradeResponse {
        success: true,
        message: "Plan upgraded to Pro successfully!",
        plan,
    }))
}

// ── Verify ─────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyResponse {
    plan: Plan,
    has_pro_code: bool,
    verified: bool,
}

async fn verify_plan(
    State(state): State<GateState>,
    CurrentUser(session): CurrentUser,
    Json(body): Json<Value>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let claimed_id = body.get("userId").and_then(Value::as_str);

    if claimed_id != Some(session.user_id().as_str()) {
        return Err(ApiError::Forbidden);
    }

    let status = state.registry.verify(session.user_id());

    Ok(Json(VerifyResponse {
        plan: status.plan,
        has_pro_code: status.has_pro_code,
        verified: true,
    }))
}

// ── Dashboard data ─────────────────────────────────────────────────

async fn dashboard_data(
    State(state): State<GateState>,
    CurrentUser(session): CurrentUser,
    Path(user_id): Path<String>,
) -> Result<Json<DashboardData>, ApiError> {
    if user_id != session.user_id().as_str() {
        return Err(ApiError::Forbidden);
    }

    let data = state.upstream.fetch_dashboard_data(session.user_id()).await?;
    Ok(Json(data))
}

// ── Dashboard view ─────────────────────────────────────────────────

async fn dashboard(
    State(state): State<GateState>,
    user: Option<CurrentUser>,
) -> Json<DashboardView> {
    let Some(CurrentUser(mut session)) = user else {
        return Json(DashboardView::unauth());
    };

    // Plan sync: reconcile the session snapshot against the registry before
    // deciding what to show.
    let status = state.registry.verify(session.user_id());
    if status.plan != session.plan || status.has_pro_code != session.has_pro_code {
        state
            .sessions
            .set_plan(&session.id, status.plan, status.has_pro_code);
        session.plan = status.plan;
        session.has_pro_code = status.has_pro_code;
    }

    if AccessLevel::resolve(Some(&session)) != AccessLevel::Pro {
        return Json(DashboardView::free(&session));
    }

    let data = match state.upstream.fetch_dashboard_data(session.user_id()).await {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!(error = %e, "Dashboard data fetch failed, serving empty payload");
            DashboardData::default()
        }
    };

    Json(DashboardView::pro(&session, data))
}

// ── Helpers ────────────────────────────────────────────────────────

fn login_error(error_redirect: &str, code: &str) -> Response {
    let encoded = urlencoding::encode(code);
    Redirect::to(&format!("{error_redirect}?error={encoded}")).into_response()
}
