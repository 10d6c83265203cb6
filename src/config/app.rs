use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

/// Process-wide configuration, built once at startup and passed by reference
/// into the services that need it.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Public origin links are built against, e.g. `http://localhost:3000`.
    pub origin: String,
    /// Symmetric secret the magic-link payload cipher derives its key from.
    pub magic_link_secret: String,
    pub environment: Environment,
}

impl AppConfig {
    /// Fails at startup when the origin or secret is missing.
    pub fn from_env() -> Result<Self> {
        let origin = env::var("ORIGIN").context("ORIGIN must be set")?;
        let magic_link_secret =
            env::var("MAGIC_LINK_SECRET").context("MAGIC_LINK_SECRET must be set")?;

        let environment = match env::var("ENVIRONMENT").as_deref() {
            Ok("production") => Environment::Production,
            _ => Environment::Development,
        };

        Ok(Self {
            origin: origin.trim_end_matches('/').to_string(),
            magic_link_secret,
            environment,
        })
    }

    pub fn new(origin: &str, magic_link_secret: &str, environment: Environment) -> Self {
        Self {
            origin: origin.trim_end_matches('/').to_string(),
            magic_link_secret: magic_link_secret.to_string(),
            environment,
        }
    }
}
