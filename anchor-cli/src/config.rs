//! Configuration module
//!
//! Server location and the identity requests are made under.

use anchor_client::AnchorClient;
use anchor_core::domain::actor::Actor;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the Anchor server
    pub server_url: String,
    /// Identity sent with mark and unmark requests
    pub actor: Actor,
}

impl Config {
    pub fn client(&self) -> AnchorClient {
        AnchorClient::new(&self.server_url).with_actor(self.actor.clone())
    }
}
