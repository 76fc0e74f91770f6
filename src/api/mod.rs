//! API client module for the order-management backend.
//!
//! Provides the HTTP client with CSRF bootstrap and bearer-token injection,
//! keychain token storage, the error taxonomy, request/response types, and
//! one module per backend resource.

pub mod auth;
pub mod client;
pub mod clients;
pub mod credentials;
pub mod error;
pub mod orders;
pub mod products;
pub mod session;
#[cfg(test)]
pub mod test_server;
pub mod types;
