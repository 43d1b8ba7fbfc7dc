//! Layered client configuration.
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults,
//! 2. an optional YAML file,
//! 3. environment variables prefixed with `PSNAWP_`, nested with `__`
//!    (e.g. `PSNAWP_HTTP__REQUEST_TIMEOUT=10s`, `PSNAWP_ACCESS_TOKEN=...`).

use std::path::Path;
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use psnawp_http::{AccessToken, HttpClientConfig, TransportSecurity};
use serde::{Deserialize, Serialize};

use crate::endpoints::Endpoints;
use crate::error::PsnError;

/// Prefix of the environment variables read by [`PsnConfig::load`].
pub const ENV_PREFIX: &str = "PSNAWP_";

/// Whether `allow_insecure_http` is honored in this build: debug builds, or
/// the `allow-insecure-http` feature.
pub const INSECURE_HTTP_AVAILABLE: bool =
    cfg!(any(debug_assertions, feature = "allow-insecure-http"));

/// Everything needed to build a [`Psnawp`](crate::Psnawp).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PsnConfig {
    pub endpoints: Endpoints,
    pub http: HttpSettings,
    /// Bearer token sent on every request. Never serialized.
    #[serde(skip_serializing)]
    pub access_token: Option<AccessToken>,
}

/// Transport knobs exposed through configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    #[serde(with = "humantime_duration")]
    pub request_timeout: Duration,
    pub user_agent: String,
    pub max_body_size: usize,
    /// Accept plain `http://` endpoints. Only meant for local mock servers;
    /// ignored unless [`INSECURE_HTTP_AVAILABLE`].
    pub allow_insecure_http: bool,
}

impl Default for HttpSettings {
    fn default() -> Self {
        let defaults = HttpClientConfig::default();
        Self {
            request_timeout: defaults.request_timeout,
            user_agent: defaults.user_agent,
            max_body_size: defaults.max_body_size,
            allow_insecure_http: false,
        }
    }
}

impl HttpSettings {
    /// Transport configuration with these settings applied.
    #[must_use]
    pub fn to_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            request_timeout: self.request_timeout,
            user_agent: self.user_agent.clone(),
            max_body_size: self.max_body_size,
            transport: self.transport_security(),
            ..HttpClientConfig::default()
        }
    }

    fn transport_security(&self) -> TransportSecurity {
        if !self.allow_insecure_http {
            return TransportSecurity::TlsOnly;
        }
        if INSECURE_HTTP_AVAILABLE {
            TransportSecurity::AllowInsecureHttp
        } else {
            tracing::warn!(
                "allow_insecure_http ignored: build has neither debug assertions nor the \
                 allow-insecure-http feature"
            );
            TransportSecurity::TlsOnly
        }
    }
}

impl PsnConfig {
    /// Load defaults, then `path` (if given), then the environment.
    ///
    /// # Errors
    /// [`PsnError::Config`] if `path` does not exist or a source does not
    /// match the expected shape.
    pub fn load(path: Option<&Path>) -> Result<Self, PsnError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = path {
            if !path.is_file() {
                return Err(PsnError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            tracing::debug!(path = %path.display(), "loading config file");
            figment = figment.merge(Yaml::file(path));
        }

        let config: Self = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| PsnError::Config(e.to_string()))?;
        config.endpoints.validate()?;
        Ok(config)
    }

    /// The access token, if one is configured and not blank.
    #[must_use]
    pub fn token(&self) -> Option<&AccessToken> {
        self.access_token.as_ref().filter(|t| !t.is_blank())
    }
}

/// `Duration` as a humantime string (`"30s"`, `"1m 30s"`).
mod humantime_duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&humantime::format_duration(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(d)?;
        humantime::parse_duration(&raw)
            .map_err(|_| de::Error::invalid_value(de::Unexpected::Str(&raw), &"a duration"))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::io::Write;

    const ENV_KEYS: [&str; 4] = [
        "PSNAWP_ACCESS_TOKEN",
        "PSNAWP_HTTP__REQUEST_TIMEOUT",
        "PSNAWP_HTTP__USER_AGENT",
        "PSNAWP_ENDPOINTS__TROPHY_BASE",
    ];

    fn without_env<F: FnOnce()>(f: F) {
        temp_env::with_vars_unset(ENV_KEYS, f);
    }

    #[test]
    fn defaults_without_sources() {
        without_env(|| {
            let config = PsnConfig::load(None).unwrap();
            assert_eq!(config.endpoints, Endpoints::default());
            assert_eq!(config.http, HttpSettings::default());
            assert_eq!(config.http.request_timeout, Duration::from_secs(30));
            assert!(config.token().is_none());
        });
    }

    #[test]
    fn yaml_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "access_token: from-file\nhttp:\n  request_timeout: 1m 30s\n  allow_insecure_http: true\nendpoints:\n  group_base: https://groups.example.test/v1"
        )
        .unwrap();

        without_env(|| {
            let config = PsnConfig::load(Some(file.path())).unwrap();
            assert_eq!(config.http.request_timeout, Duration::from_secs(90));
            assert!(config.http.allow_insecure_http);
            assert_eq!(config.endpoints.group_base, "https://groups.example.test/v1");
            assert_eq!(
                config.endpoints.profile_base,
                Endpoints::default().profile_base
            );
            assert_eq!(config.token().map(AccessToken::expose), Some("from-file"));
        });
    }

    #[test]
    fn env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "http:\n  request_timeout: 5s\n  user_agent: from-file").unwrap();

        temp_env::with_vars(
            [
                ("PSNAWP_ACCESS_TOKEN", Some("from-env")),
                ("PSNAWP_HTTP__REQUEST_TIMEOUT", Some("12s")),
                ("PSNAWP_HTTP__USER_AGENT", None),
                ("PSNAWP_ENDPOINTS__TROPHY_BASE", None),
            ],
            || {
                let config = PsnConfig::load(Some(file.path())).unwrap();
                assert_eq!(config.http.request_timeout, Duration::from_secs(12));
                assert_eq!(config.http.user_agent, "from-file");
                assert_eq!(config.token().map(AccessToken::expose), Some("from-env"));
            },
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        without_env(|| {
            let err = PsnConfig::load(Some(Path::new("/nonexistent/psnawp.yaml"))).unwrap_err();
            assert!(matches!(err, PsnError::Config(_)));
        });
    }

    #[test]
    fn bad_duration_is_an_error() {
        temp_env::with_vars(
            [
                ("PSNAWP_HTTP__REQUEST_TIMEOUT", Some("soon")),
                ("PSNAWP_ACCESS_TOKEN", None),
                ("PSNAWP_HTTP__USER_AGENT", None),
                ("PSNAWP_ENDPOINTS__TROPHY_BASE", None),
            ],
            || {
                assert!(matches!(PsnConfig::load(None), Err(PsnError::Config(_))));
            },
        );
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        temp_env::with_vars(
            [
                ("PSNAWP_ENDPOINTS__TROPHY_BASE", Some("not a url")),
                ("PSNAWP_ACCESS_TOKEN", None),
                ("PSNAWP_HTTP__REQUEST_TIMEOUT", None),
                ("PSNAWP_HTTP__USER_AGENT", None),
            ],
            || {
                assert!(matches!(
                    PsnConfig::load(None),
                    Err(PsnError::InvalidEndpoint { .. })
                ));
            },
        );
    }

    #[test]
    fn token_is_redacted_and_not_serialized() {
        let config = PsnConfig {
            access_token: Some(AccessToken::new("super-secret")),
            ..PsnConfig::default()
        };
        assert!(!format!("{config:?}").contains("super-secret"));
        let json = serde_json::to_value(&config).unwrap();
        assert!(json.get("access_token").is_none());
        assert_eq!(json["http"]["request_timeout"], "30s");
    }

    #[test]
    fn blank_token_counts_as_missing() {
        let config = PsnConfig {
            access_token: Some(AccessToken::new("  ")),
            ..PsnConfig::default()
        };
        assert!(config.token().is_none());
    }

    #[test]
    fn insecure_flag_maps_to_transport_security() {
        let settings = HttpSettings {
            allow_insecure_http: true,
            ..HttpSettings::default()
        };
        let expected = if INSECURE_HTTP_AVAILABLE {
            TransportSecurity::AllowInsecureHttp
        } else {
            TransportSecurity::TlsOnly
        };
        assert_eq!(settings.to_client_config().transport, expected);
        assert_eq!(
            HttpSettings::default().to_client_config().transport,
            TransportSecurity::TlsOnly
        );
    }
}
