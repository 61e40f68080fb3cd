//! Axum server layer: Discord auth routes, session handling and the
//! plan-gating API.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tempmail_gate::server::{GateConfig, router};
//!
//! // 1. Configure from environment
//! let config = GateConfig::from_env()?;
//!
//! // 2. Mount the gate (auth routes + plan API + dashboard view)
//! let app = router(config);
//! axum::serve(listener, app).await?;
//! ```
//!
//! Handlers take [`CurrentUser`] to require an authenticated session, or
//! `Option<CurrentUser>` for pages with an anonymous rendering.

mod config;
mod cookies;
mod dashboard;
mod error;
mod extractor;
mod routes;
mod session;
mod state;
mod upstream;

pub use config::GateConfig;
pub use dashboard::{AccessLevel, DashboardView, ViewerProfile};
pub use error::ApiError;
pub use extractor::CurrentUser;
pub use routes::router;
pub use session::{Session, SessionStore};
pub use state::GateState;
pub use upstream::{DashboardData, UpstreamClient};

/// Re-export cookie key type for builder API.
pub use axum_extra::extract::cookie::Key as CookieKey;
