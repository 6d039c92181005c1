//! Anchor HTTP Client
//!
//! A small, type-safe HTTP client for the Anchor baseline API.
//!
//! # Example
//!
//! ```no_run
//! use anchor_client::AnchorClient;
//! use anchor_core::domain::actor::Actor;
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = AnchorClient::new("http://localhost:8080")
//!         .with_actor(Actor::new("u-1", "Jane"));
//!
//!     let records = client.mark_baseline(Uuid::new_v4(), Uuid::new_v4(), true).await?;
//!     println!("{} baselines active", records.len());
//!     Ok(())
//! }
//! ```

mod baselines;
pub mod error;

// Re-export commonly used types
pub use anchor_core::domain::baseline::BaselineRecord;
pub use error::{ClientError, Result};

use anchor_core::domain::actor::Actor;
use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the Anchor baseline API
#[derive(Debug, Clone)]
pub struct AnchorClient {
    /// Base URL of the server (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
    /// Identity sent with mutating requests
    actor: Option<Actor>,
}

impl AnchorClient {
    /// Create a new client
    ///
    /// # Example
    /// ```
    /// use anchor_client::AnchorClient;
    ///
    /// let client = AnchorClient::new("http://localhost:8080");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            actor: None,
        }
    }

    /// Set the actor recorded as creator of baselines
    pub fn with_actor(mut self, actor: Actor) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Get the base URL of the server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn actor(&self) -> Option<&Actor> {
        self.actor.as_ref()
    }

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}
