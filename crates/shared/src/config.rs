//! Application configuration management.
//!
//! Configuration is loaded once per process by [`AppConfig::load`] and then
//! passed by value into the clients that need it. Nothing in the workspace
//! reads credentials from the environment after that point.

use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Accounting API configuration.
    #[serde(default)]
    pub xero: XeroConfig,
    /// Retry configuration applied to every network call.
    #[serde(default)]
    pub retry: RetrySettings,
    /// Journal pagination configuration.
    #[serde(default)]
    pub journals: JournalSettings,
}

/// Accounting API configuration.
///
/// Credential fields are optional at load time so that their absence can be
/// reported as a precondition failure by [`XeroConfig::credentials`] instead
/// of failing the whole configuration load.
#[derive(Debug, Clone, Deserialize)]
pub struct XeroConfig {
    /// OAuth client identifier.
    #[serde(default)]
    pub client_id: Option<String>,
    /// OAuth client secret.
    #[serde(default)]
    pub client_secret: Option<String>,
    /// OAuth redirect URI registered with the platform.
    #[serde(default)]
    pub redirect_uri: Option<String>,
    /// Bearer access token obtained by the token-exchange collaborator.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Default tenant to query when the caller does not name one.
    #[serde(default)]
    pub tenant_id: Option<String>,
    /// Base URL of the accounting API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "https://api.xero.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for XeroConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: None,
            access_token: None,
            tenant_id: None,
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Client credentials that must be present before any network attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// OAuth client identifier.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// OAuth redirect URI.
    pub redirect_uri: String,
}

impl XeroConfig {
    /// Returns the client credentials, or the list of missing keys.
    ///
    /// Blank values count as missing.
    pub fn credentials(&self) -> ConfigResult<Credentials> {
        let mut missing = Vec::new();
        let client_id = present(self.client_id.as_deref(), "client_id", &mut missing);
        let client_secret = present(self.client_secret.as_deref(), "client_secret", &mut missing);
        let redirect_uri = present(self.redirect_uri.as_deref(), "redirect_uri", &mut missing);

        match (client_id, client_secret, redirect_uri) {
            (Some(client_id), Some(client_secret), Some(redirect_uri)) => Ok(Credentials {
                client_id,
                client_secret,
                redirect_uri,
            }),
            _ => Err(ConfigError::MissingCredentials(missing)),
        }
    }

    /// Returns the bearer access token used to authorize API requests.
    pub fn bearer_token(&self) -> ConfigResult<String> {
        let mut missing = Vec::new();
        present(self.access_token.as_deref(), "access_token", &mut missing)
            .ok_or(ConfigError::MissingCredentials(missing))
    }
}

fn present(
    value: Option<&str>,
    key: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => {
            missing.push(key);
            None
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySettings {
    /// Total attempts per network call, the first call included.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the second attempt, in milliseconds.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Upper bound for any backoff delay before jitter, in milliseconds.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Growth factor applied per attempt.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: u32,
    /// Stop retrying as soon as an error is classified as permanent.
    #[serde(default)]
    pub transient_only: bool,
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_backoff_multiplier() -> u32 {
    2
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            transient_only: false,
        }
    }
}

/// Journal pagination configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JournalSettings {
    /// Journals requested per page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Offset beyond which pagination stops with a warning.
    #[serde(default = "default_max_offset")]
    pub max_offset: u64,
}

fn default_page_size() -> u32 {
    100
}

fn default_max_offset() -> u64 {
    10_000
}

impl Default for JournalSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_offset: default_max_offset(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or a value is out of
    /// range. Missing credentials are not an error here.
    pub fn load() -> ConfigResult<Self> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("LEDGERLINK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app: Self = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "retry.max_attempts",
                reason: "must be at least 1".into(),
            });
        }
        if self.retry.backoff_multiplier == 0 {
            return Err(ConfigError::Invalid {
                key: "retry.backoff_multiplier",
                reason: "must be at least 1".into(),
            });
        }
        if self.journals.page_size == 0 {
            return Err(ConfigError::Invalid {
                key: "journals.page_size",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn configured() -> XeroConfig {
        XeroConfig {
            client_id: Some("client".into()),
            client_secret: Some("secret".into()),
            redirect_uri: Some("http://localhost:3000/auth/callback".into()),
            access_token: Some("token".into()),
            ..XeroConfig::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.xero.api_base_url, "https://api.xero.com");
        assert_eq!(config.xero.request_timeout_secs, 30);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay_ms, 1000);
        assert_eq!(config.retry.max_delay_ms, 30_000);
        assert_eq!(config.retry.backoff_multiplier, 2);
        assert!(!config.retry.transient_only);
        assert_eq!(config.journals.page_size, 100);
        assert_eq!(config.journals.max_offset, 10_000);
    }

    #[test]
    fn test_credentials_present() {
        let creds = configured().credentials().unwrap();
        assert_eq!(creds.client_id, "client");
        assert_eq!(creds.client_secret, "secret");
        assert_eq!(creds.redirect_uri, "http://localhost:3000/auth/callback");
    }

    #[test]
    fn test_credentials_missing_reports_every_key() {
        let err = XeroConfig::default().credentials().unwrap_err();
        match err {
            ConfigError::MissingCredentials(keys) => {
                assert_eq!(keys, vec!["client_id", "client_secret", "redirect_uri"]);
            }
            other => panic!("Expected MissingCredentials, got: {other:?}"),
        }
    }

    #[rstest]
    #[case::blank_id(XeroConfig { client_id: Some("   ".into()), ..configured() }, "client_id")]
    #[case::no_secret(XeroConfig { client_secret: None, ..configured() }, "client_secret")]
    #[case::no_redirect(XeroConfig { redirect_uri: Some(String::new()), ..configured() }, "redirect_uri")]
    fn test_credentials_single_missing(#[case] config: XeroConfig, #[case] key: &str) {
        match config.credentials() {
            Err(ConfigError::MissingCredentials(keys)) => assert_eq!(keys, vec![key]),
            other => panic!("Expected MissingCredentials, got: {other:?}"),
        }
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(configured().bearer_token().unwrap(), "token");
        assert!(matches!(
            XeroConfig::default().bearer_token(),
            Err(ConfigError::MissingCredentials(keys)) if keys == vec!["access_token"]
        ));
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = AppConfig::default();
        config.retry.max_attempts = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { key: "retry.max_attempts", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_page_size() {
        let mut config = AppConfig::default();
        config.journals.page_size = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { key: "journals.page_size", .. })
        ));
    }

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("LEDGERLINK_XERO__CLIENT_ID", Some("env-client")),
                ("LEDGERLINK_XERO__TENANT_ID", Some("tenant-1")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.xero.client_id.as_deref(), Some("env-client"));
                assert_eq!(config.xero.tenant_id.as_deref(), Some("tenant-1"));
                assert_eq!(config.retry.max_attempts, 5);
            },
        );
    }

    #[test]
    fn test_load_documented_env_names() {
        temp_env::with_vars(
            [
                ("LEDGERLINK_XERO__CLIENT_ID", Some("client")),
                ("LEDGERLINK_XERO__CLIENT_SECRET", Some("secret")),
                (
                    "LEDGERLINK_XERO__REDIRECT_URI",
                    Some("http://localhost:3000/api/xero/auth/callback"),
                ),
                ("LEDGERLINK_XERO__ACCESS_TOKEN", Some("token")),
                ("LEDGERLINK_RETRY__MAX_ATTEMPTS", Some("3")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                let creds = config.xero.credentials().unwrap();
                assert_eq!(creds.client_id, "client");
                assert_eq!(creds.client_secret, "secret");
                assert_eq!(
                    creds.redirect_uri,
                    "http://localhost:3000/api/xero/auth/callback"
                );
                assert_eq!(config.xero.bearer_token().unwrap(), "token");
                assert_eq!(config.retry.max_attempts, 3);
            },
        );
    }
}
