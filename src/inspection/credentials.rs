//! Access-token providers for the inspection API
//!
//! Authentication lives outside this crate; the client only asks an injected
//! provider for a bearer token before each call.

use crate::InspectError;
use async_trait::async_trait;

/// Supplies OAuth bearer tokens to the inspection client
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, InspectError>;
}

/// A fixed token, e.g. one handed over by an outer session layer
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String, InspectError> {
        Ok(self.0.clone())
    }
}

/// Reads the token from an environment variable on every call
///
/// Re-reading lets an external refresher rotate the token mid-job.
pub struct EnvToken {
    var: String,
}

impl EnvToken {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

#[async_trait]
impl TokenProvider for EnvToken {
    async fn access_token(&self) -> Result<String, InspectError> {
        match std::env::var(&self.var) {
            Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            _ => Err(InspectError::Credentials(format!(
                "environment variable {} is not set",
                self.var
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_token() {
        let provider = StaticToken::new("abc");
        assert_eq!(provider.access_token().await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_env_token_missing() {
        let provider = EnvToken::new("SUMI_INSPECT_TEST_TOKEN_THAT_IS_NEVER_SET");
        assert!(matches!(
            provider.access_token().await,
            Err(InspectError::Credentials(_))
        ));
    }

    #[tokio::test]
    async fn test_env_token_present() {
        std::env::set_var("SUMI_INSPECT_TEST_TOKEN_PRESENT", " tok-123 \n");
        let provider = EnvToken::new("SUMI_INSPECT_TEST_TOKEN_PRESENT");
        assert_eq!(provider.access_token().await.unwrap(), "tok-123");
    }
}
