//! Listener and public URL settings for the gateway

use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use super::error::ValidationError;

const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

/// `server` section
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address, an IP literal
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub environment: Environment,

    /// Filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whole-request budget, including upstream provider and CMS calls
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Comma-separated list of browser origins allowed by CORS
    pub cors_origins: Option<String>,

    /// Address visitors reach the gateway at. OAuth redirect URLs are
    /// derived from it. Falls back to `http://localhost:{port}`.
    pub public_url: Option<String>,
}

/// Deployment environment. Production switches on JSON logs, `Secure`
/// cookies, a longer session lifetime and the HTTPS requirement.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ValidationError> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|_| ValidationError::InvalidUrl("server.host"))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Public base URL without a trailing slash.
    pub fn public_base(&self) -> String {
        match self.public_url.as_deref() {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://localhost:{}", self.port),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Configured CORS origins; blank entries are dropped.
    pub fn cors_origins_list(&self) -> Vec<String> {
        self.cors_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        self.socket_addr()?;
        if self.request_timeout_secs == 0 || self.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            return Err(ValidationError::InvalidTimeout);
        }
        if let Some(url) = &self.public_url {
            if !is_http_url(url) {
                return Err(ValidationError::InvalidUrl("server.public_url"));
            }
        }
        if self.cors_origins_list().iter().any(|origin| !is_http_url(origin)) {
            return Err(ValidationError::InvalidUrl("server.cors_origins"));
        }
        if self.is_production() && !self.public_base().starts_with("https://") {
            return Err(ValidationError::PublicUrlMustBeHttps);
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: Environment::default(),
            log_level: default_log_level(),
            request_timeout_secs: default_request_timeout(),
            cors_origins: None,
            public_url: None,
        }
    }
}

/// True for absolute `http://` or `https://` URLs with a host
pub(crate) fn is_http_url(value: &str) -> bool {
    value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"))
        .map_or(false, |rest| !rest.is_empty() && !rest.starts_with('/'))
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info,patron_gate=debug".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    fn production(public_url: Option<&str>) -> ServerConfig {
        ServerConfig {
            environment: Environment::Production,
            public_url: public_url.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn public_base_falls_back_to_localhost_on_the_listening_port() {
        let config = ServerConfig {
            port: 3000,
            ..Default::default()
        };
        assert_eq!(config.public_base(), "http://localhost:3000");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn public_base_drops_trailing_slashes() {
        let config = ServerConfig {
            public_url: Some("https://members.example.com//".to_string()),
            ..Default::default()
        };
        assert_eq!(config.public_base(), "https://members.example.com");
    }

    #[test]
    fn relative_public_url_is_rejected() {
        let config = ServerConfig {
            public_url: Some("/gate".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidUrl("server.public_url"))
        ));
        assert!(!is_http_url("https://"));
        assert!(!is_http_url("members.example.com"));
    }

    #[test]
    fn production_needs_an_https_public_url() {
        assert!(matches!(
            production(None).validate(),
            Err(ValidationError::PublicUrlMustBeHttps)
        ));
        assert!(matches!(
            production(Some("http://members.example.com")).validate(),
            Err(ValidationError::PublicUrlMustBeHttps)
        ));
        assert!(production(Some("https://members.example.com")).validate().is_ok());
    }

    #[test]
    fn bind_host_must_be_an_ip_literal() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 9000,
            ..Default::default()
        };
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:9000");

        let config = ServerConfig {
            host: "localhost".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn cors_list_skips_blank_entries_and_checks_schemes() {
        let config = ServerConfig {
            cors_origins: Some("https://members.example.com, ,http://localhost:5173,".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.cors_origins_list(),
            vec!["https://members.example.com", "http://localhost:5173"]
        );
        assert!(config.validate().is_ok());

        let config = ServerConfig {
            cors_origins: Some("members.example.com".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn request_timeout_is_bounded() {
        for secs in [0, MAX_REQUEST_TIMEOUT_SECS + 1] {
            let config = ServerConfig {
                request_timeout_secs: secs,
                ..Default::default()
            };
            assert!(matches!(config.validate(), Err(ValidationError::InvalidTimeout)));
        }
        assert_eq!(ServerConfig::default().request_timeout(), Duration::from_secs(30));
    }
}
