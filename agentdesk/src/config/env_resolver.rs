//! Explicit references to secrets held in environment variables.
//!
//! Provider constructors take an [`EnvKey`] rather than a raw string so it is
//! obvious at the call site that the value is looked up, and so the lookup can
//! be redirected through a custom [`EnvResolverFn`].

use crate::errors::AgentError;
use std::fmt;
use std::sync::Arc;

/// A reference to an environment variable or secret key
///
/// ```no_run
/// use agentdesk::config::EnvKey;
///
/// let key = EnvKey::new("OPENAI_API_KEY");
/// let api_key = key.resolve()?;
/// # Ok::<(), agentdesk::AgentError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnvKey(String);

impl EnvKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn key(&self) -> &str {
        &self.0
    }

    /// Resolves the key from the process environment.
    ///
    /// An unset variable is `MissingConfiguration`; a blank one is
    /// `InvalidConfiguration`.
    pub fn resolve(&self) -> Result<String, AgentError> {
        default_env_resolver(&self.0)
    }

    /// Resolves the key with `resolver`, or the process environment when `None`.
    pub fn resolve_with(&self, resolver: Option<EnvResolverFn>) -> Result<String, AgentError> {
        match resolver {
            Some(resolver) => resolver(self.key()),
            None => self.resolve(),
        }
    }
}

impl fmt::Display for EnvKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EnvKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for EnvKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Custom secret lookup, e.g. backed by a vault instead of the environment.
pub type EnvResolverFn = Arc<dyn Fn(&str) -> Result<String, AgentError> + Send + Sync>;

/// Looks `key` up with `std::env::var`, rejecting unset and blank values.
pub fn default_env_resolver(key: &str) -> Result<String, AgentError> {
    let value = std::env::var(key).map_err(|_| AgentError::MissingConfiguration {
        field: key.to_string(),
    })?;

    if value.trim().is_empty() {
        return Err(AgentError::InvalidConfiguration {
            field: key.to_string(),
            reason: format!("Environment variable '{key}' is empty"),
        });
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_key_display_and_from() {
        let key: EnvKey = "OPENAI_API_KEY".into();
        assert_eq!(key.key(), "OPENAI_API_KEY");
        assert_eq!(key.to_string(), "OPENAI_API_KEY");
    }

    #[test]
    fn resolves_present_variable() {
        std::env::set_var("AGENTDESK_TEST_KEY_PRESENT", "value-1");
        let key = EnvKey::new("AGENTDESK_TEST_KEY_PRESENT");
        assert_eq!(key.resolve().unwrap(), "value-1");
    }

    #[test]
    fn missing_variable_is_missing_configuration() {
        let key = EnvKey::new("AGENTDESK_TEST_KEY_ABSENT_XYZ");
        assert!(matches!(
            key.resolve(),
            Err(AgentError::MissingConfiguration { field }) if field == "AGENTDESK_TEST_KEY_ABSENT_XYZ"
        ));
    }

    #[test]
    fn blank_variable_is_invalid() {
        std::env::set_var("AGENTDESK_TEST_KEY_BLANK", "   ");
        let key = EnvKey::new("AGENTDESK_TEST_KEY_BLANK");
        assert!(matches!(
            key.resolve(),
            Err(AgentError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn custom_resolver_takes_precedence() {
        let vault: EnvResolverFn = Arc::new(|key| Ok(format!("vault:{key}")));
        let key = EnvKey::new("ANY_KEY");
        assert_eq!(key.resolve_with(Some(vault)).unwrap(), "vault:ANY_KEY");
    }
}
