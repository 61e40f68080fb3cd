#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Discord endpoint returned a non-success status.
    #[error("OAuth2 error during {operation}: status {status:?}: {detail}")]
    OAuth {
        operation: &'static str,
        status: Option<u16>,
        detail: String,
    },
    #[cfg(feature = "oauth")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Malformed redemption code: {0:?}")]
    InvalidCode(String),
}
