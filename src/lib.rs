#![doc = include_str!("../README.md")]

pub mod codes;
pub mod error;
#[cfg(feature = "oauth")]
pub mod oauth;
#[cfg(feature = "oauth")]
pub mod pkce;
pub mod plan;
#[cfg(feature = "server")]
pub mod server;
pub mod types;

// Re-exports for convenient access
pub use error::Error;
#[cfg(feature = "oauth")]
pub use oauth::{
    AuthClient, AuthorizationRequest, DiscordUser, OAuthConfig, TokenResponse,
};
#[cfg(feature = "oauth")]
pub use pkce::{generate_code_challenge, generate_code_verifier, generate_state};
pub use plan::{
    PlanStatus, RedeemError, RedemptionLedger, UpgradeError, UpgradeRegistry,
};
pub use types::{Plan, RedemptionCode, SessionId, UserId};
