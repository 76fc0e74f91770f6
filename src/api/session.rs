//! Login and logout against the backend session endpoints.

use reqwest::Method;

use super::client::ApiClient;
use super::error::ClientError;
use super::types::{LoginRequest, LoginResponse};

/// Authenticate and install the returned bearer token.
///
/// POST /login with the CSRF header. A response without a token is treated
/// as a failed login.
pub async fn login(api: &ApiClient, email: &str, password: &str) -> Result<(), ClientError> {
    let request = LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    };

    let resp: LoginResponse = api.post_json("/login", &request).await?;
    let token = resp
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ClientError::Api {
            status: 200,
            message: "Authentication failed - no token received".to_string(),
        })?;

    api.set_bearer_token(&token).await?;
    log::info!("Logged in as {}", email);
    Ok(())
}

/// Invalidate the session on the server and drop the local token.
///
/// The local token is cleared even when the server call fails; the server
/// error is still returned.
pub async fn logout(api: &ApiClient) -> Result<(), ClientError> {
    let result = api.send::<()>(Method::POST, "/logout", None, None).await;
    if let Err(ref e) = result {
        log::warn!("Logout request failed: {}", e);
    }

    api.clear_bearer_token().await?;
    result.map(|_| ())
}
