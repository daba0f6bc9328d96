//! Per-app network proxy selection.

use serde::{Deserialize, Serialize};
use strum::Display;
use url::Url;

use crate::constants::{DEFAULT_PROXY_HOST, DEFAULT_PROXY_PORT};

/// How an app reaches the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ProxyMode {
    /// Follow the operating system's proxy configuration.
    #[default]
    System,
    /// Connect directly, ignoring any system proxy.
    Direct,
    /// Use the host and port stored in [`ProxySettings`].
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySettings {
    pub mode: ProxyMode,
    pub use_socks: bool,
    pub host: String,
    pub port: u16,
    pub use_auth: bool,
    pub username: String,
    pub password: String,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            mode: ProxyMode::System,
            use_socks: false,
            host: DEFAULT_PROXY_HOST.to_string(),
            port: DEFAULT_PROXY_PORT,
            use_auth: false,
            username: String::new(),
            password: String::new(),
        }
    }
}

impl ProxySettings {
    /// Whether any custom-proxy field differs from its default.
    pub fn has_custom_fields(&self) -> bool {
        self.use_socks
            || (!self.host.is_empty() && self.host != DEFAULT_PROXY_HOST)
            || self.port != DEFAULT_PROXY_PORT
            || self.use_auth
            || !self.username.is_empty()
            || !self.password.is_empty()
    }

    /// Proxy endpoint for `Custom` mode, e.g. `socks5://user:pw@host:1080`.
    ///
    /// Returns `None` in the other modes or when the host is unusable.
    pub fn proxy_url(&self) -> Option<Url> {
        if self.mode != ProxyMode::Custom {
            return None;
        }
        let scheme = if self.use_socks { "socks5" } else { "http" };
        let host = if self.host.is_empty() {
            DEFAULT_PROXY_HOST
        } else {
            self.host.as_str()
        };
        let mut url = Url::parse(&format!("{}://{}:{}", scheme, host, self.port)).ok()?;
        if self.use_auth {
            url.set_username(&self.username).ok()?;
            if !self.password.is_empty() {
                url.set_password(Some(&self.password)).ok()?;
            }
        }
        Some(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_no_custom_fields() {
        assert!(!ProxySettings::default().has_custom_fields());
    }

    #[test]
    fn test_custom_fields_detected() {
        let settings = ProxySettings {
            port: 3128,
            ..Default::default()
        };
        assert!(settings.has_custom_fields());
    }

    #[test]
    fn test_proxy_url_only_for_custom_mode() {
        let mut settings = ProxySettings {
            host: "proxy.local".to_string(),
            port: 1080,
            use_socks: true,
            use_auth: true,
            username: "me".to_string(),
            password: "pw".to_string(),
            ..Default::default()
        };
        assert!(settings.proxy_url().is_none());

        settings.mode = ProxyMode::Custom;
        assert_eq!(
            settings.proxy_url().unwrap().as_str(),
            "socks5://me:pw@proxy.local:1080"
        );
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(ProxyMode::Direct.to_string(), "direct");
    }
}
