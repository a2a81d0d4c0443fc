//! Client for the external identity service that maps bearer
//! credentials to agent identities.

use anyhow::Result;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::IdentityConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A resolved agent: stable unique id plus display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentIdentity {
    pub id: String,
    pub name: String,
}

/// Exchanges an opaque bearer credential for an agent identity.
///
/// `Ok(None)` means the service answered and did not recognize the
/// credential. Transport-level failures are `Err`; the repository decides
/// how to surface them.
pub trait IdentityProvider: Send + Sync {
    fn resolve(&self, credential: &str) -> Result<Option<AgentIdentity>>;
}

pub struct MoltbookClient {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct AgentEnvelope {
    success: Option<bool>,
    agent: Option<AgentBody>,
}

#[derive(Deserialize)]
struct AgentBody {
    id: Option<String>,
    name: Option<String>,
}

impl MoltbookClient {
    pub fn new(config: &IdentityConfig) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl IdentityProvider for MoltbookClient {
    fn resolve(&self, credential: &str) -> Result<Option<AgentIdentity>> {
        let url = format!("{}/api/v1/agents/me", self.base_url);
        let response = self.client.get(&url).bearer_auth(credential).send()?;

        if !response.status().is_success() {
            log::debug!("identity service rejected credential: {}", response.status());
            return Ok(None);
        }

        let body: AgentEnvelope = response.json()?;
        if body.success != Some(true) {
            return Ok(None);
        }

        let agent = body.agent.and_then(|a| {
            Some(AgentIdentity {
                id: a.id?,
                name: a.name?,
            })
        });
        Ok(agent)
    }
}

/// Fixed-table provider for tests: credential string -> identity.
#[cfg(test)]
pub struct StaticIdentities(pub std::collections::HashMap<String, AgentIdentity>);

#[cfg(test)]
impl StaticIdentities {
    pub fn single(credential: &str, id: &str, name: &str) -> Self {
        let mut map = std::collections::HashMap::new();
        map.insert(
            credential.to_string(),
            AgentIdentity {
                id: id.to_string(),
                name: name.to_string(),
            },
        );
        Self(map)
    }
}

#[cfg(test)]
impl IdentityProvider for StaticIdentities {
    fn resolve(&self, credential: &str) -> Result<Option<AgentIdentity>> {
        if credential == "boom" {
            anyhow::bail!("identity service unreachable");
        }
        Ok(self.0.get(credential).cloned())
    }
}
