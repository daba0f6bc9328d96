//! On-disk shape of an app record.
//!
//! Keys use the PascalCase names of the record format. Every field is
//! optional: a key equal to its default is never written, and a missing key
//! reads back as the default.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use liquid_core::app::{
    AppName, AppRecord, Cookie, CookieJar, ProxyMode, ProxySettings, Rgba, parse_domain_list,
};
use liquid_core::constants::{DEFAULT_PROXY_HOST, DEFAULT_PROXY_PORT};
use serde::{Deserialize, Serialize};
use tracing::warn;

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfigDto {
    #[serde(rename = "URL", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "Title", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "EnableJS", skip_serializing_if = "is_false")]
    pub enable_js: bool,
    #[serde(rename = "AllowCookies", skip_serializing_if = "is_false")]
    pub allow_cookies: bool,
    #[serde(rename = "AllowThirdPartyCookies", skip_serializing_if = "is_false")]
    pub allow_third_party_cookies: bool,
    #[serde(rename = "HideScrollBars", skip_serializing_if = "is_false")]
    pub hide_scroll_bars: bool,
    #[serde(rename = "RemoveWindowFrame", skip_serializing_if = "is_false")]
    pub remove_window_frame: bool,
    #[serde(rename = "MuteAudio", skip_serializing_if = "is_false")]
    pub mute_audio: bool,
    #[serde(rename = "LockWindowGeometry", skip_serializing_if = "is_false")]
    pub lock_window_geometry: bool,
    #[serde(rename = "AdditionalCSS", skip_serializing_if = "Option::is_none")]
    pub additional_css: Option<String>,
    #[serde(rename = "AdditionalJS", skip_serializing_if = "Option::is_none")]
    pub additional_js: Option<String>,
    #[serde(rename = "Notes", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(rename = "UserAgent", skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Whitespace-separated.
    #[serde(rename = "AdditionalDomains", skip_serializing_if = "Option::is_none")]
    pub additional_domains: Option<String>,
    /// `#AARRGGBB`
    #[serde(rename = "BackgroundColor", skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(rename = "ZoomLevel", skip_serializing_if = "Option::is_none")]
    pub zoom_level: Option<f64>,
    /// Lower-case hex.
    #[serde(rename = "WindowGeometry", skip_serializing_if = "Option::is_none")]
    pub window_geometry: Option<String>,
    /// Standard base64.
    #[serde(rename = "Icon", skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Absent: system proxy. `false`: direct. `true`: custom.
    #[serde(rename = "UseProxy", skip_serializing_if = "Option::is_none")]
    pub use_proxy: Option<bool>,
    // Tables stay last so they serialize after plain keys.
    #[serde(rename = "Cookies", skip_serializing_if = "BTreeMap::is_empty")]
    pub cookies: BTreeMap<String, String>,
    #[serde(rename = "Proxy", skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxyDto>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyDto {
    #[serde(rename = "Host", skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(rename = "Port", skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(rename = "UseSocks", skip_serializing_if = "is_false")]
    pub use_socks: bool,
    #[serde(rename = "UseAuthentication", skip_serializing_if = "is_false")]
    pub use_authentication: bool,
    #[serde(rename = "UserName", skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(rename = "UserPassword", skip_serializing_if = "Option::is_none")]
    pub user_password: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

impl AppConfigDto {
    /// Builds the sparse on-disk form of a record.
    pub fn from_record(record: &AppRecord) -> Self {
        let domains = record
            .additional_domains()
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(" ");

        let zoom = record.zoom_level();

        Self {
            url: Some(record.url.clone()),
            title: non_empty(&record.title),
            enable_js: record.enable_js,
            allow_cookies: record.allow_cookies(),
            allow_third_party_cookies: record.allow_third_party_cookies(),
            hide_scroll_bars: record.hide_scroll_bars,
            remove_window_frame: record.remove_window_frame,
            mute_audio: record.mute_audio,
            lock_window_geometry: record.lock_window_geometry,
            additional_css: non_empty(&record.additional_css),
            additional_js: non_empty(&record.additional_js),
            notes: non_empty(&record.notes),
            user_agent: non_empty(&record.user_agent),
            additional_domains: Some(domains).filter(|d| !d.is_empty()),
            background_color: record.background_color.map(|c| c.to_string()),
            zoom_level: ((zoom - 1.0).abs() > f64::EPSILON).then_some(zoom),
            window_geometry: record
                .window_geometry
                .as_ref()
                .filter(|g| !g.is_empty())
                .map(hex::encode),
            icon: record
                .icon
                .as_ref()
                .filter(|i| !i.is_empty())
                .map(|i| STANDARD.encode(i)),
            use_proxy: match record.proxy.mode {
                ProxyMode::System => None,
                ProxyMode::Direct => Some(false),
                ProxyMode::Custom => Some(true),
            },
            cookies: record
                .cookies
                .iter()
                .map(|c| (c.storage_key(), c.to_wire()))
                .collect(),
            proxy: ProxyDto::from_settings(&record.proxy),
        }
    }

    /// Rebuilds a record, normalising values so its invariants hold.
    ///
    /// Returns `None` when the file carries no URL: such a record does not
    /// identify a launchable app. Malformed optional values are dropped with
    /// a warning instead of failing the whole record.
    pub fn into_record(self, name: AppName) -> Option<AppRecord> {
        let url = self.url.filter(|u| !u.trim().is_empty())?;
        let mut record = AppRecord::new(name, url);

        record.title = self.title.filter(|t| !t.is_empty());
        record.enable_js = self.enable_js;
        record.set_allow_cookies(self.allow_cookies);
        if self.allow_third_party_cookies {
            record.set_allow_third_party_cookies(true);
        }
        record.hide_scroll_bars = self.hide_scroll_bars;
        record.remove_window_frame = self.remove_window_frame;
        record.mute_audio = self.mute_audio;
        record.lock_window_geometry = self.lock_window_geometry;
        record.additional_css = self.additional_css.filter(|v| !v.is_empty());
        record.additional_js = self.additional_js.filter(|v| !v.is_empty());
        record.notes = self.notes.filter(|v| !v.is_empty());
        record.user_agent = self.user_agent.filter(|v| !v.is_empty());

        if let Some(domains) = &self.additional_domains {
            record.set_additional_domains(parse_domain_list(domains));
        }

        if let Some(color) = &self.background_color {
            match color.parse::<Rgba>() {
                Ok(c) => record.background_color = Some(c),
                Err(e) => warn!(app = %record.name, "[AppConfigStore] Ignoring BackgroundColor: {}", e),
            }
        }

        if let Some(zoom) = self.zoom_level {
            record.set_zoom_level(zoom);
        }

        if let Some(geometry) = &self.window_geometry {
            match hex::decode(geometry.trim()) {
                Ok(bytes) => record.window_geometry = Some(bytes),
                Err(e) => warn!(app = %record.name, "[AppConfigStore] Ignoring WindowGeometry: {}", e),
            }
        }

        if let Some(icon) = &self.icon {
            match STANDARD.decode(icon.trim()) {
                Ok(bytes) => record.icon = Some(bytes),
                Err(e) => warn!(app = %record.name, "[AppConfigStore] Ignoring Icon: {}", e),
            }
        }

        record.cookies = self
            .cookies
            .iter()
            .filter_map(|(key, wire)| match Cookie::from_wire(wire) {
                Ok(cookie) => Some(cookie),
                Err(e) => {
                    warn!(app = %record.name, "[AppConfigStore] Skipping cookie '{}': {}", key, e);
                    None
                }
            })
            .collect::<CookieJar>();

        let mut proxy = self.proxy.map(ProxyDto::into_settings).unwrap_or_default();
        proxy.mode = match self.use_proxy {
            None => ProxyMode::System,
            Some(false) => ProxyMode::Direct,
            Some(true) => ProxyMode::Custom,
        };
        record.proxy = proxy;

        Some(record)
    }
}

impl ProxyDto {
    fn from_settings(settings: &ProxySettings) -> Option<Self> {
        if !settings.has_custom_fields() {
            return None;
        }
        Some(Self {
            host: Some(settings.host.clone())
                .filter(|h| !h.is_empty() && h != DEFAULT_PROXY_HOST),
            port: (settings.port != DEFAULT_PROXY_PORT).then_some(settings.port),
            use_socks: settings.use_socks,
            use_authentication: settings.use_auth,
            user_name: Some(settings.username.clone()).filter(|u| !u.is_empty()),
            user_password: Some(settings.password.clone()).filter(|p| !p.is_empty()),
        })
    }

    fn into_settings(self) -> ProxySettings {
        let defaults = ProxySettings::default();
        ProxySettings {
            mode: defaults.mode,
            use_socks: self.use_socks,
            host: self.host.filter(|h| !h.is_empty()).unwrap_or(defaults.host),
            port: self.port.unwrap_or(defaults.port),
            use_auth: self.use_authentication,
            username: self.user_name.unwrap_or_default(),
            password: self.user_password.unwrap_or_default(),
        }
    }
}
