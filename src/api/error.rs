//! Error taxonomy for calls made through the API client.
//!
//! Every caller gets the same mapping from HTTP status to variant, so the
//! command layer only has to decide how to present each case.

use thiserror::Error;

use super::auth::TokenStoreError;

/// Laravel returns 419 when the session/CSRF pairing is stale.
pub const STATUS_SESSION_EXPIRED: u16 = 419;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The XSRF cookie never materialized, even after asking the server for one.
    #[error("CSRF token unavailable")]
    CsrfUnavailable,

    #[error("Not authenticated")]
    Unauthorized,

    #[error("Session expired")]
    SessionExpired,

    /// Any other non-2xx response.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Token storage failed: {0}")]
    TokenStore(#[from] TokenStoreError),

    #[error("{0}")]
    InvalidInput(String),
}

impl ClientError {
    /// Map a non-success status and its body to the matching variant.
    ///
    /// The body's `message` field is used when present and non-empty.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 => ClientError::Unauthorized,
            STATUS_SESSION_EXPIRED => ClientError::SessionExpired,
            _ => ClientError::Api {
                status,
                message: extract_message(body)
                    .unwrap_or_else(|| format!("Request failed with status {}", status)),
            },
        }
    }

    /// Human-readable text for showing the error to the user.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::CsrfUnavailable => {
                "Could not obtain a CSRF token from the server.".to_string()
            }
            ClientError::Unauthorized => {
                "You are not logged in or your session has ended.".to_string()
            }
            ClientError::SessionExpired => {
                "Session expired. Please try again.".to_string()
            }
            ClientError::Api { message, .. } => message.clone(),
            ClientError::Network(_) => "Could not reach the server.".to_string(),
            ClientError::Decode(_) => "The server returned an unexpected response.".to_string(),
            ClientError::InvalidBaseUrl(url) => format!("Invalid API address: {}", url),
            ClientError::TokenStore(_) => "Could not access the stored login token.".to_string(),
            ClientError::InvalidInput(msg) => msg.clone(),
        }
    }

    /// Whether the caller should send the user back to the login screen.
    pub fn requires_login(&self) -> bool {
        matches!(self, ClientError::Unauthorized)
    }
}

fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}
