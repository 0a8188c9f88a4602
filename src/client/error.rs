use thiserror::Error;

/// Errors surfaced by [`ApiClient`](crate::client::ApiClient).
///
/// `SessionExpired` is the cue that the stored refresh token stopped working
/// and the persisted session was discarded; the embedding app should send the
/// user back to its login screen.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("not logged in")]
    NotAuthenticated,

    #[error("session expired, log in again")]
    SessionExpired,

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("token store: {0}")]
    Store(#[source] anyhow::Error),

    #[error("configuration error: {0}")]
    Config(String),
}
