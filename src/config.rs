//! Runtime configuration.
//!
//! Two layers, both resolved once at startup:
//! - [`Settings`]: non-secret knobs (endpoints, model, locale, timeouts, bind
//!   address) read from an optional YAML file, every field defaulted.
//! - [`Credentials`]: API keys and the CMS authorization header, taken from
//!   CLI flags or their environment variables and held as [`SecretString`].
//!
//! Missing or invalid values are reported as [`ConfigError`] before any
//! upstream request is attempted.
//!
//! ```yaml
//! server:
//!   bind: 0.0.0.0:8000
//! completion:
//!   model: gpt-4o-mini
//!   temperature: 0.2
//! search:
//!   country: br
//!   language: pt
//! extraction:
//!   timeout_secs: 40
//! publish:
//!   posts_url: https://blog.example/wp-json/wp/v2/posts
//! ```

use crate::cli::CredentialArgs;
use crate::error::ConfigError;
use secrecy::SecretString;
use serde::Deserialize;
use tracing::{info, instrument};
use url::Url;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub completion: CompletionSettings,
    pub search: SearchSettings,
    pub extraction: ExtractionSettings,
    pub publish: PublishSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompletionSettings {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub base_url: String,
    pub engine: String,
    /// Google `gl` parameter.
    pub country: String,
    /// Google `hl` parameter.
    pub language: String,
    pub timeout_secs: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            base_url: "https://serpapi.com".to_string(),
            engine: "google_news".to_string(),
            country: "br".to_string(),
            language: "pt".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    pub base_url: String,
    /// Per-URL limit; an extraction still running after this is a failure.
    pub timeout_secs: u64,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            base_url: "https://r.jina.ai".to_string(),
            timeout_secs: 40,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublishSettings {
    pub posts_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            posts_url: None,
            timeout_secs: 30,
        }
    }
}

impl Settings {
    /// Load settings from `path`, or defaults when no file is given.
    #[instrument(level = "info")]
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let settings = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_string(),
                    source,
                })?;
                let parsed = Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
                    path: path.to_string(),
                    source,
                })?;
                info!(path, "Loaded settings file");
                parsed
            }
            None => Self::default(),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file deserializes to unit, not to a map.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_url("completion.base_url", &self.completion.base_url)?;
        check_url("search.base_url", &self.search.base_url)?;
        check_url("extraction.base_url", &self.extraction.base_url)?;
        if let Some(posts_url) = &self.publish.posts_url {
            check_url("publish.posts_url", posts_url)?;
        }
        if !(0.0..=2.0).contains(&self.completion.temperature) {
            return Err(ConfigError::InvalidSetting {
                key: "completion.temperature",
                reason: format!("{} is outside 0.0..=2.0", self.completion.temperature),
            });
        }
        for (key, secs) in [
            ("completion.timeout_secs", self.completion.timeout_secs),
            ("search.timeout_secs", self.search.timeout_secs),
            ("extraction.timeout_secs", self.extraction.timeout_secs),
            ("publish.timeout_secs", self.publish.timeout_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::InvalidSetting {
                    key,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }
}

fn check_url(key: &'static str, value: &str) -> Result<(), ConfigError> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidSetting {
            key,
            reason: format!("{value:?} is not a valid URL: {e}"),
        })
}

/// Secrets resolved from the command line or environment.
///
/// Each `*` accessor hands out a fresh [`SecretString`] or the
/// [`ConfigError::MissingCredential`] naming the variable to set.
pub struct Credentials {
    openai_api_key: Option<String>,
    serpapi_api_key: Option<String>,
    jina_api_key: Option<String>,
    wordpress_auth: Option<String>,
    wordpress_posts_url: Option<String>,
}

impl Credentials {
    pub fn from_args(args: &CredentialArgs) -> Self {
        fn present(value: &Option<String>) -> Option<String> {
            value.as_ref().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        }
        Self {
            openai_api_key: present(&args.openai_api_key),
            serpapi_api_key: present(&args.serpapi_api_key),
            jina_api_key: present(&args.jina_api_key),
            wordpress_auth: present(&args.wordpress_auth),
            wordpress_posts_url: present(&args.wordpress_posts_url),
        }
    }

    pub fn openai_api_key(&self) -> Result<SecretString, ConfigError> {
        require(&self.openai_api_key, "OPENAI_API_KEY", "openai-api-key")
    }

    pub fn serpapi_api_key(&self) -> Result<SecretString, ConfigError> {
        require(&self.serpapi_api_key, "SERPAPI_API_KEY", "serpapi-api-key")
    }

    /// The reader works without a token, at a lower rate limit.
    pub fn jina_api_key(&self) -> Option<SecretString> {
        self.jina_api_key.clone().map(SecretString::from)
    }

    pub fn wordpress_auth(&self) -> Result<SecretString, ConfigError> {
        require(&self.wordpress_auth, "WORDPRESS_AUTH", "wordpress-auth")
    }

    /// The posts endpoint: the flag/env value wins over the settings file.
    pub fn wordpress_posts_url(&self, settings: &PublishSettings) -> Result<String, ConfigError> {
        let url = self
            .wordpress_posts_url
            .clone()
            .or_else(|| settings.posts_url.clone())
            .ok_or(ConfigError::MissingSetting {
                key: "publish.posts_url",
                env: "WORDPRESS_POSTS_URL",
            })?;
        check_url("publish.posts_url", &url)?;
        Ok(url)
    }
}

fn require(
    value: &Option<String>,
    env: &'static str,
    flag: &'static str,
) -> Result<SecretString, ConfigError> {
    value
        .clone()
        .map(SecretString::from)
        .ok_or(ConfigError::MissingCredential { env, flag })
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn args() -> CredentialArgs {
        CredentialArgs {
            openai_api_key: Some("sk-test".to_string()),
            serpapi_api_key: Some("  ".to_string()),
            jina_api_key: None,
            wordpress_auth: Some("Basic YWRtaW46cGFzcw==".to_string()),
            wordpress_posts_url: None,
        }
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.server.bind, "0.0.0.0:8000");
        assert_eq!(settings.completion.model, "gpt-4o-mini");
        assert_eq!(settings.extraction.timeout_secs, 40);
        assert_eq!(settings.search.engine, "google_news");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let settings = Settings::from_yaml(
            "search:\n  country: us\n  language: en\nextraction:\n  timeout_secs: 5\n",
        )
        .unwrap();
        assert_eq!(settings.search.country, "us");
        assert_eq!(settings.search.language, "en");
        assert_eq!(settings.search.engine, "google_news");
        assert_eq!(settings.extraction.timeout_secs, 5);
        assert_eq!(settings.completion.temperature, 0.2);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let settings = Settings::from_yaml("\n").unwrap();
        assert_eq!(settings.server.bind, "0.0.0.0:8000");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let settings = Settings::from_yaml("completion:\n  base_url: not a url\n").unwrap();
        let err = settings.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidSetting {
                key: "completion.base_url",
                ..
            }
        ));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let settings = Settings::from_yaml("extraction:\n  timeout_secs: 0\n").unwrap();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = Settings::load(Some("/nonexistent/curation.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_present_credentials_are_exposed() {
        let creds = Credentials::from_args(&args());
        assert_eq!(creds.openai_api_key().unwrap().expose_secret(), "sk-test");
        assert_eq!(
            creds.wordpress_auth().unwrap().expose_secret(),
            "Basic YWRtaW46cGFzcw=="
        );
    }

    #[test]
    fn test_blank_credential_counts_as_missing() {
        let creds = Credentials::from_args(&args());
        let err = creds.serpapi_api_key().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingCredential {
                env: "SERPAPI_API_KEY",
                ..
            }
        ));
        assert!(creds.jina_api_key().is_none());
    }

    #[test]
    fn test_posts_url_falls_back_to_settings() {
        let creds = Credentials::from_args(&args());
        assert!(matches!(
            creds.wordpress_posts_url(&PublishSettings::default()),
            Err(ConfigError::MissingSetting { .. })
        ));

        let settings = PublishSettings {
            posts_url: Some("https://blog.example/wp-json/wp/v2/posts".to_string()),
            ..PublishSettings::default()
        };
        assert_eq!(
            creds.wordpress_posts_url(&settings).unwrap(),
            "https://blog.example/wp-json/wp/v2/posts"
        );
    }
}
