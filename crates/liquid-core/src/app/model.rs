//! The app record: one packaged website and its behaviour flags.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use super::cookie::CookieJar;
use super::proxy::ProxySettings;
use crate::constants::{ZOOM_LEVEL_MAX, ZOOM_LEVEL_MIN};
use crate::error::{LiquidError, Result};

/// Characters that may never appear in an additional domain entry.
static DISALLOWED_DOMAIN_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9.:\-]").expect("static regex is valid"));

/// Unique, filesystem-safe identity of an app.
///
/// Directory separators are replaced with underscores so a name can never
/// create sub-directories inside the apps directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AppName(String);

impl AppName {
    pub fn new(raw: &str) -> Result<Self> {
        let normalized: String = raw
            .trim()
            .chars()
            .map(|c| {
                if c == '/' || c == '\\' || std::path::is_separator(c) {
                    '_'
                } else {
                    c
                }
            })
            .collect();

        if normalized.is_empty() {
            return Err(LiquidError::InvalidAppName(format!(
                "'{}' is empty after normalisation",
                raw
            )));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AppName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An RGBA colour, stored as `#AARRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.a, self.r, self.g, self.b)
    }
}

impl FromStr for Rgba {
    type Err = LiquidError;

    /// Accepts `#RRGGBB` and `#AARRGGBB`.
    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        let byte = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| LiquidError::Serialization {
                format: "color".to_string(),
                message: format!("'{}': {}", s, e),
            })
        };

        match hex.len() {
            6 if hex.is_ascii() => Ok(Self::opaque(byte(0)?, byte(2)?, byte(4)?)),
            8 if hex.is_ascii() => Ok(Self {
                a: byte(0)?,
                r: byte(2)?,
                g: byte(4)?,
                b: byte(6)?,
            }),
            _ => Err(LiquidError::Serialization {
                format: "color".to_string(),
                message: format!("'{}' is not #RRGGBB or #AARRGGBB", s),
            }),
        }
    }
}

/// Lower-cases a domain entry and strips characters outside `[a-z0-9.:-]`.
///
/// Returns `None` when nothing usable remains.
pub fn normalize_domain(raw: &str) -> Option<String> {
    let lowered = raw.trim().to_lowercase();
    let cleaned = DISALLOWED_DOMAIN_CHARS.replace_all(&lowered, "");
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.into_owned())
    }
}

/// Parses a whitespace-separated domain list.
pub fn parse_domain_list(raw: &str) -> BTreeSet<String> {
    raw.split_whitespace().filter_map(normalize_domain).collect()
}

/// Persistent configuration of one app.
///
/// The two cookie flags and the zoom level are private so the invariants
/// (third-party cookies imply cookies, zoom within bounds) hold for every
/// value that can be observed or persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct AppRecord {
    pub name: AppName,
    /// Starting URL as entered; parsed at launch.
    pub url: String,
    /// When set, the window title is pinned to this text.
    pub title: Option<String>,
    pub enable_js: bool,
    allow_cookies: bool,
    allow_third_party_cookies: bool,
    pub hide_scroll_bars: bool,
    pub remove_window_frame: bool,
    pub mute_audio: bool,
    pub lock_window_geometry: bool,
    pub additional_css: Option<String>,
    pub additional_js: Option<String>,
    pub notes: Option<String>,
    pub user_agent: Option<String>,
    additional_domains: BTreeSet<String>,
    pub background_color: Option<Rgba>,
    zoom_level: f64,
    /// Platform-serialized window placement.
    pub window_geometry: Option<Vec<u8>>,
    /// Favicon captured on the first launch; never overwritten afterwards.
    pub icon: Option<Vec<u8>>,
    pub cookies: CookieJar,
    pub proxy: ProxySettings,
}

impl AppRecord {
    /// Creates a record with every optional setting at its default.
    pub fn new(name: AppName, url: impl Into<String>) -> Self {
        Self {
            name,
            url: url.into(),
            title: None,
            enable_js: false,
            allow_cookies: false,
            allow_third_party_cookies: false,
            hide_scroll_bars: false,
            remove_window_frame: false,
            mute_audio: false,
            lock_window_geometry: false,
            additional_css: None,
            additional_js: None,
            notes: None,
            user_agent: None,
            additional_domains: BTreeSet::new(),
            background_color: None,
            zoom_level: 1.0,
            window_geometry: None,
            icon: None,
            cookies: CookieJar::default(),
            proxy: ProxySettings::default(),
        }
    }

    /// Parses the starting URL.
    pub fn start_url(&self) -> Result<Url> {
        let url = Url::parse(self.url.trim())
            .map_err(|e| LiquidError::invalid_url(self.name.as_str(), &self.url, e.to_string()))?;

        if url.cannot_be_a_base() {
            return Err(LiquidError::invalid_url(
                self.name.as_str(),
                &self.url,
                "not a navigable URL",
            ));
        }

        Ok(url)
    }

    /// Host of the starting URL, if it parses and has one.
    pub fn primary_host(&self) -> Option<String> {
        self.start_url()
            .ok()
            .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
    }

    pub fn is_title_pinned(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn allow_cookies(&self) -> bool {
        self.allow_cookies
    }

    /// Clearing cookie permission also clears third-party permission.
    pub fn set_allow_cookies(&mut self, allow: bool) {
        self.allow_cookies = allow;
        if !allow {
            self.allow_third_party_cookies = false;
        }
    }

    pub fn allow_third_party_cookies(&self) -> bool {
        self.allow_third_party_cookies
    }

    /// Granting third-party permission also grants cookie permission.
    pub fn set_allow_third_party_cookies(&mut self, allow: bool) {
        self.allow_third_party_cookies = allow;
        if allow {
            self.allow_cookies = true;
        }
    }

    pub fn zoom_level(&self) -> f64 {
        self.zoom_level
    }

    /// Stores the zoom factor clamped to the supported range and returns it.
    pub fn set_zoom_level(&mut self, level: f64) -> f64 {
        self.zoom_level = clamp_zoom(level);
        self.zoom_level
    }

    pub fn additional_domains(&self) -> &BTreeSet<String> {
        &self.additional_domains
    }

    pub fn set_additional_domains<I, S>(&mut self, domains: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.additional_domains = domains
            .into_iter()
            .filter_map(|d| normalize_domain(d.as_ref()))
            .collect();
    }
}

/// Clamps a zoom factor to `[ZOOM_LEVEL_MIN, ZOOM_LEVEL_MAX]`; non-finite input resets to 1.0.
pub fn clamp_zoom(level: f64) -> f64 {
    if !level.is_finite() {
        return 1.0;
    }
    level.clamp(ZOOM_LEVEL_MIN, ZOOM_LEVEL_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> AppRecord {
        AppRecord::new(AppName::new("example").unwrap(), "https://example.com")
    }

    #[test]
    fn test_app_name_replaces_separators() {
        let name = AppName::new("work/mail\\inbox").unwrap();
        assert_eq!(name.as_str(), "work_mail_inbox");
    }

    #[test]
    fn test_app_name_rejects_empty() {
        assert!(matches!(
            AppName::new("   "),
            Err(LiquidError::InvalidAppName(_))
        ));
    }

    #[test]
    fn test_third_party_implies_cookies() {
        let mut r = record();
        r.set_allow_third_party_cookies(true);
        assert!(r.allow_cookies());
        assert!(r.allow_third_party_cookies());

        r.set_allow_cookies(false);
        assert!(!r.allow_cookies());
        assert!(!r.allow_third_party_cookies());
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut r = record();
        assert_eq!(r.set_zoom_level(9.0), ZOOM_LEVEL_MAX);
        assert_eq!(r.set_zoom_level(0.1), ZOOM_LEVEL_MIN);
        assert_eq!(r.set_zoom_level(f64::NAN), 1.0);
        assert_eq!(r.set_zoom_level(1.5), 1.5);
    }

    #[test]
    fn test_domains_are_filtered_and_lowercased() {
        let mut r = record();
        r.set_additional_domains(["CDN.Example.com", "bad_domain!", "%%%", "api.example.com:8443"]);
        let domains: Vec<&str> = r.additional_domains().iter().map(String::as_str).collect();
        assert_eq!(
            domains,
            vec!["api.example.com:8443", "baddomain", "cdn.example.com"]
        );
    }

    #[test]
    fn test_parse_domain_list_splits_on_whitespace() {
        let parsed = parse_domain_list("a.com\tb.com\n  c.com ");
        assert_eq!(parsed.len(), 3);
        assert!(parsed.contains("b.com"));
    }

    #[test]
    fn test_start_url_validation() {
        let mut r = record();
        assert_eq!(r.start_url().unwrap().host_str(), Some("example.com"));
        assert_eq!(r.primary_host().as_deref(), Some("example.com"));

        r.url = "not a url".to_string();
        assert!(r.start_url().unwrap_err().is_invalid_url());
        assert!(r.primary_host().is_none());

        r.url = "mailto:someone@example.com".to_string();
        assert!(r.start_url().unwrap_err().is_invalid_url());
    }

    #[test]
    fn test_rgba_parse_and_display() {
        let c: Rgba = "#80ff0000".parse().unwrap();
        assert_eq!(c, Rgba { r: 0xff, g: 0, b: 0, a: 0x80 });
        assert_eq!(c.to_string(), "#80ff0000");

        let opaque: Rgba = "#00ff00".parse().unwrap();
        assert_eq!(opaque.to_string(), "#ff00ff00");

        assert!("#12345".parse::<Rgba>().is_err());
        assert!("#gggggg".parse::<Rgba>().is_err());
    }
}
