use anyhow::Context;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub version: u32,
    pub catalog: CatalogConfig,
    pub http: HttpConfig,
    pub identity: IdentityConfig,
    pub public_endpoint: PublicEndpoint,
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Config> {
        let contents = std::fs::read_to_string(path).expect("Failed to read user config");
        toml::from_str(&contents).with_context(|| "Failed to parse config TOML")
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub bind_addr: String,
    pub port: u16,
}

/// Location of the catalog document on disk.
#[derive(Debug, Deserialize)]
pub struct CatalogConfig {
    pub path: PathBuf,
}

/// The external identity service that resolves bearer credentials.
#[derive(Debug, Deserialize, Clone)]
pub struct IdentityConfig {
    pub base_url: String,
}

/// Base URL of the public player, used to derive share links.
#[derive(Debug, Deserialize, Clone)]
pub struct PublicEndpoint {
    pub base_url: String,
}
