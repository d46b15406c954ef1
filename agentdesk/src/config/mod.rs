//! Process configuration shared by the agent binaries.
//!
//! Secrets come from the environment (optionally seeded from a `.env` file);
//! bind addresses and peer URLs come from the command line, with environment
//! fallbacks declared on the clap structs in `src/bin`.

pub mod env_resolver;

pub use env_resolver::{default_env_resolver, EnvKey, EnvResolverFn};

use std::fmt;

/// Loads `.env` from the working directory or its parents, if there is one.
///
/// Must run before any [`EnvKey`] is resolved.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded environment file"),
        Err(err) if err.not_found() => {}
        Err(err) => tracing::warn!(error = %err, "failed to read .env file"),
    }
}

/// Host and port an agent binds to; also yields the URL it advertises.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddress {
    pub host: String,
    pub port: u16,
}

impl ServerAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// URL published in the agent card, with a trailing slash.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}/", self.host, self.port)
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_has_trailing_slash() {
        let address = ServerAddress::new("localhost", 10007);
        assert_eq!(address.base_url(), "http://localhost:10007/");
        assert_eq!(address.to_string(), "localhost:10007");
    }
}
