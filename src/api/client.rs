//! HTTP client with CSRF bootstrap and bearer-token injection.
//!
//! Every request carries cookies from the injected jar. Mutating requests
//! first make sure the XSRF cookie exists and echo it back in `X-XSRF-TOKEN`.
//! The bearer token, once set, goes out as `Authorization: Bearer <token>`
//! and is mirrored to durable storage so it survives a restart.

use std::sync::Arc;

use reqwest::cookie::CookieStore;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Method, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use zeroize::Zeroize;

use super::auth::TokenStore;
use super::credentials::{self, CSRF_HEADER};
use super::error::ClientError;
use crate::config::ClientConfig;

/// Endpoint that issues the XSRF cookie.
pub const CSRF_COOKIE_PATH: &str = "/sanctum/csrf-cookie";

/// HTTP client wrapper for the order-management API.
///
/// One instance owns the bearer token; callers share it by reference.
pub struct ApiClient {
    client: Client,
    base_url: String,
    cookie_url: Url,
    cookies: Arc<dyn CookieStore>,
    bearer_token: Arc<RwLock<Option<String>>>,
    token_store: Arc<dyn TokenStore>,
}

impl ApiClient {
    /// Create a client with a fresh cookie jar.
    pub fn new(config: &ClientConfig, token_store: Arc<dyn TokenStore>) -> Result<Self, ClientError> {
        Self::with_cookie_store(config, credentials::new_jar(), token_store)
    }

    /// Create a client around an injected cookie store.
    pub fn with_cookie_store<C: CookieStore + 'static>(
        config: &ClientConfig,
        cookies: Arc<C>,
        token_store: Arc<dyn TokenStore>,
    ) -> Result<Self, ClientError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let cookie_url = Url::parse(&format!("{}/", base_url))
            .map_err(|_| ClientError::InvalidBaseUrl(config.base_url.clone()))?;
        if !matches!(cookie_url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl(config.base_url.clone()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert("X-Requested-With", HeaderValue::from_static("XMLHttpRequest"));

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .default_headers(headers)
            .cookie_provider(Arc::clone(&cookies))
            .build()?;

        Ok(Self {
            client,
            base_url,
            cookie_url,
            cookies,
            bearer_token: Arc::new(RwLock::new(None)),
            token_store,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Current CSRF token from the cookie jar. Never performs I/O.
    pub fn read_csrf_token(&self) -> Option<String> {
        credentials::read_csrf_token(self.cookies.as_ref(), &self.cookie_url)
    }

    /// Return the CSRF token, asking the server for the cookie once if it is missing.
    ///
    /// Fails with `CsrfUnavailable` if the cookie is still absent afterwards.
    pub async fn ensure_csrf_token(&self) -> Result<String, ClientError> {
        if let Some(token) = self.read_csrf_token() {
            return Ok(token);
        }

        log::debug!("No CSRF cookie, requesting one from {}", CSRF_COOKIE_PATH);
        match self.client.get(self.url(CSRF_COOKIE_PATH)).send().await {
            Ok(resp) if resp.status().is_success() => {}
            Ok(resp) => log::warn!("CSRF cookie request failed ({})", resp.status()),
            Err(e) => log::warn!("CSRF cookie request failed: {}", e),
        }

        self.read_csrf_token().ok_or(ClientError::CsrfUnavailable)
    }

    /// Attach a bearer token to all subsequent requests and persist it.
    ///
    /// The in-memory token is applied even if persisting fails.
    pub async fn set_bearer_token(&self, token: &str) -> Result<(), ClientError> {
        *self.bearer_token.write().await = Some(token.to_string());
        self.token_store.save(token)?;
        Ok(())
    }

    /// Drop the bearer token from memory and durable storage (used on logout).
    pub async fn clear_bearer_token(&self) -> Result<(), ClientError> {
        {
            let mut guard = self.bearer_token.write().await;
            if let Some(ref mut t) = *guard {
                t.zeroize();
            }
            *guard = None;
        }
        self.token_store.delete()?;
        Ok(())
    }

    /// Apply the durably stored token, if any. Returns whether one was found.
    pub async fn restore_bearer_token(&self) -> Result<bool, ClientError> {
        match self.token_store.load()? {
            Some(token) => {
                *self.bearer_token.write().await = Some(token);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn has_bearer_token(&self) -> bool {
        self.bearer_token.read().await.is_some()
    }

    /// Send a request to a path relative to the base URL.
    ///
    /// Mutating methods carry the CSRF header. Non-2xx statuses are mapped
    /// to `ClientError`; nothing is retried.
    pub async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<Response, ClientError> {
        let mut builder = self.client.request(method.clone(), self.url(path));

        if is_mutating(&method) {
            let csrf = self.ensure_csrf_token().await?;
            builder = builder.header(CSRF_HEADER, csrf);
        }

        let token = self.bearer_token.read().await.clone();
        if let Some(ref t) = token {
            builder = builder.bearer_auth(t);
        }

        if let Some(body) = body {
            builder = builder.json(body);
        }

        if let Some(headers) = extra_headers {
            builder = builder.headers(headers);
        }

        log::debug!("{} {}", method, path);
        let resp = builder.send().await?;
        check_status(resp).await
    }

    /// GET a path and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self.send::<()>(Method::GET, path, None, None).await?;
        decode(resp).await
    }

    /// POST a JSON body and decode the JSON response.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let resp = self.send(Method::POST, path, Some(body), None).await?;
        decode(resp).await
    }

    /// PUT a JSON body and decode the JSON response.
    pub async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let resp = self.send(Method::PUT, path, Some(body), None).await?;
        decode(resp).await
    }

    /// DELETE a path, ignoring any response body.
    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.send::<()>(Method::DELETE, path, None, None).await?;
        Ok(())
    }
}

fn is_mutating(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

async fn check_status(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let path = resp.url().path().to_string();
    let body = resp.text().await.unwrap_or_default();
    log::warn!("Request to {} failed ({}): {}", path, status, body_snippet(&body));
    Err(ClientError::from_status(status.as_u16(), &body))
}

// Keeps the log line short when the server returns an HTML error page.
fn body_snippet(body: &str) -> &str {
    let end = body
        .char_indices()
        .nth(80)
        .map(|(i, _)| i)
        .unwrap_or(body.len());
    body[..end].lines().next().unwrap_or_default()
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
}
