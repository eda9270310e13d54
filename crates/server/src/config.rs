use std::fs::read_to_string;
use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::database::connection::DbConfig;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    pub address: String,
}

/// Token signing settings, handed to [`crate::auth::token::TokenIssuer`] on startup.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthConfig {
    pub secret: String,
    pub issuer: String,
    token_ttl_secs: Option<i64>,
}

impl AuthConfig {
    const TOKEN_TTL_FALLBACK: i64 = 24 * 60 * 60;

    pub fn new(secret: &str, issuer: &str) -> Self {
        Self {
            secret: secret.to_string(),
            issuer: issuer.to_string(),
            token_ttl_secs: None,
        }
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.token_ttl_secs.unwrap_or(Self::TOKEN_TTL_FALLBACK))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DbConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn from_yaml_file<P: Into<PathBuf>>(path: P) -> Result<Self, anyhow::Error> {
        let path = path.into();
        let content = read_to_string(&path).with_context(|| format!("path: {path:?}"))?;
        Ok(serde_yaml::from_str(&content)?)
    }
}
