//! HTTP client for the managed identity + realtime-database service.
//!
//! There is no official Rust SDK for the provider, so this module talks to
//! its REST surface directly: the identity-toolkit API for account lookups
//! and listing, and the realtime database for the `paid_users` records.
//! Every call is authorized with a bearer access token supplied through the
//! environment.

pub mod database;
pub mod identity;

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use url::Url;

use crate::config::UserConfig;
use crate::error::{AppError, AppResult};

/// Configuration for the provider client.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL of the identity-toolkit API for the project,
    /// e.g. `https://identitytoolkit.googleapis.com/v1/projects/my-project`
    pub identity_url: String,
    /// Base URL of the realtime database, e.g. `https://my-project.firebaseio.com`
    pub database_url: String,
    /// Bearer token sent on every request
    pub access_token: String,
    /// HTTP request timeout
    pub timeout: Duration,
    /// Accounts fetched per page when listing users
    pub page_size: u32,
}

impl ProviderConfig {
    /// Build a provider configuration from user settings plus the
    /// environment-supplied access token.
    pub fn from_user_config(config: &UserConfig) -> AppResult<Self> {
        if config.provider.identity_url.is_empty() {
            return Err(AppError::BadRequest(
                "provider.identity_url is not configured (run `paid-admin config set identity_url <url>`)"
                    .to_string(),
            ));
        }
        if config.provider.database_url.is_empty() {
            return Err(AppError::BadRequest(
                "provider.database_url is not configured (run `paid-admin config set database_url <url>`)"
                    .to_string(),
            ));
        }

        let access_token = UserConfig::access_token()?;

        Ok(Self {
            identity_url: config.provider.identity_url.clone(),
            database_url: config.provider.database_url.clone(),
            access_token,
            timeout: Duration::from_secs(config.provider.timeout_secs),
            page_size: config.provider.page_size,
        })
    }
}

/// HTTP client for provider communication.
///
/// Holds a single pooled [`reqwest::Client`]; construct it once and share it
/// behind an `Arc`.
pub struct ProviderClient {
    client: Client,
    config: ProviderConfig,
}

impl ProviderClient {
    /// Create a new provider client with the given configuration.
    ///
    /// Both base URLs are parsed up front so that a typo in the configuration
    /// fails at startup rather than on the first request, and trailing
    /// slashes are normalized away.
    pub fn new(mut config: ProviderConfig) -> AppResult<Self> {
        for (name, url) in [
            ("identity_url", &config.identity_url),
            ("database_url", &config.database_url),
        ] {
            Url::parse(url)
                .map_err(|e| AppError::BadRequest(format!("invalid {name} '{url}': {e}")))?;
        }

        config.identity_url = config.identity_url.trim_end_matches('/').to_string();
        config.database_url = config.database_url.trim_end_matches('/').to_string();

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("paid-admin/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Create a provider client straight from user configuration.
    pub fn from_user_config(config: &UserConfig) -> AppResult<Self> {
        Self::new(ProviderConfig::from_user_config(config)?)
    }

    pub fn page_size(&self) -> u32 {
        self.config.page_size
    }

    pub(crate) fn identity_url(&self) -> &str {
        &self.config.identity_url
    }

    pub(crate) fn database_url(&self) -> &str {
        &self.config.database_url
    }

    pub(crate) fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url).bearer_auth(&self.config.access_token)
    }

    pub(crate) fn post(&self, url: &str) -> RequestBuilder {
        self.client.post(url).bearer_auth(&self.config.access_token)
    }

    pub(crate) fn patch(&self, url: &str) -> RequestBuilder {
        self.client
            .patch(url)
            .bearer_auth(&self.config.access_token)
    }
}

/// Turn a non-success provider response into an [`AppError::Provider`] that
/// carries the status and a bounded slice of the body.
pub(crate) async fn check_status(response: Response, operation: &str) -> AppResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let mut body = response.text().await.unwrap_or_default();
    if body.len() > 512 {
        body.truncate(512);
    }
    Err(AppError::Provider(format!(
        "{operation} failed: {status} {body}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ProviderConfig {
        ProviderConfig {
            identity_url: "https://identity.example.com/v1/projects/demo/".to_string(),
            database_url: "https://demo.example-db.app/".to_string(),
            access_token: "test-token".to_string(),
            timeout: Duration::from_secs(5),
            page_size: 100,
        }
    }

    #[test]
    fn new_normalizes_trailing_slashes() {
        let client = ProviderClient::new(test_config()).unwrap();
        assert_eq!(
            client.identity_url(),
            "https://identity.example.com/v1/projects/demo"
        );
        assert_eq!(client.database_url(), "https://demo.example-db.app");
    }

    #[test]
    fn new_rejects_unparseable_urls() {
        let mut config = test_config();
        config.database_url = "not a url".to_string();
        assert!(matches!(
            ProviderClient::new(config),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn from_user_config_requires_urls() {
        let user = UserConfig::default();
        assert!(matches!(
            ProviderConfig::from_user_config(&user),
            Err(AppError::BadRequest(_))
        ));
    }
}
