use std::convert::Infallible;

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use axum_extra::extract::PrivateCookieJar;
use axum_extra::extract::cookie::Key;

use super::error::ApiError;
use super::session::Session;
use super::state::GateState;

/// Authenticated session extracted from the session cookie.
///
/// Use as an Axum extractor in route handlers. Returns `401 Unauthorized`
/// if no valid session exists.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected(CurrentUser(session): CurrentUser) -> impl IntoResponse {
///     format!("Hello, {}", session.user.display_name())
/// }
///
/// // Optional: accessible to both authenticated and anonymous users
/// async fn public(user: Option<CurrentUser>) -> impl IntoResponse {
///     match user {
///         Some(CurrentUser(s)) => format!("Hello, {}", s.user.display_name()),
///         None => "Hello, guest".to_string(),
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Session);

impl FromRequestParts<GateState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &GateState,
    ) -> Result<Self, Self::Rejection> {
        let jar: PrivateCookieJar<Key> = PrivateCookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Unauthorized)?;

        let session_id = jar
            .get(&state.settings.session_cookie_name)
            .map(|c| crate::types::SessionId(c.value().to_string()))
            .ok_or(ApiError::Unauthorized)?;

        state
            .sessions
            .find(&session_id)
            .map(CurrentUser)
            .ok_or(ApiError::Unauthorized)
    }
}

// Lets handlers take Option<CurrentUser> for pages with an anonymous rendering.
impl OptionalFromRequestParts<GateState> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &GateState,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(
            <Self as FromRequestParts<GateState>>::from_request_parts(parts, state)
                .await
                .ok(),
        )
    }
}
