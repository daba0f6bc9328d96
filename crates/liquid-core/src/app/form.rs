//! Create/edit form state for an app record.
//!
//! The form keeps the raw values a user typed and re-derives dependent
//! fields after every change, so cross-field rules live in one place
//! instead of being spread across UI callbacks.

use url::Url;

use super::model::{AppName, AppRecord, Rgba, parse_domain_list};
use super::proxy::{ProxyMode, ProxySettings};
use crate::constants::DEFAULT_PROXY_HOST;
use crate::error::{LiquidError, Result};

/// A single user edit.
#[derive(Debug, Clone, PartialEq)]
pub enum FormChange {
    Name(String),
    Url(String),
    Title(String),
    EnableJs(bool),
    AllowCookies(bool),
    AllowThirdPartyCookies(bool),
    HideScrollBars(bool),
    RemoveWindowFrame(bool),
    AdditionalCss(String),
    AdditionalJs(String),
    Notes(String),
    UserAgent(String),
    AdditionalDomains(String),
    BackgroundColor(Option<Rgba>),
    ProxyMode(ProxyMode),
    ProxyHost(String),
    ProxyPort(u16),
    ProxyUseSocks(bool),
    ProxyUseAuth(bool),
    ProxyUsername(String),
    ProxyPassword(String),
}

impl FormChange {
    fn touches_custom_proxy(&self) -> bool {
        matches!(
            self,
            Self::ProxyHost(_)
                | Self::ProxyPort(_)
                | Self::ProxyUseSocks(_)
                | Self::ProxyUseAuth(_)
                | Self::ProxyUsername(_)
                | Self::ProxyPassword(_)
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfigForm {
    pub name: String,
    pub url: String,
    pub title: String,
    pub enable_js: bool,
    pub allow_cookies: bool,
    pub allow_third_party_cookies: bool,
    pub hide_scroll_bars: bool,
    pub remove_window_frame: bool,
    pub additional_css: String,
    pub additional_js: String,
    pub notes: String,
    pub user_agent: String,
    pub additional_domains: String,
    pub background_color: Option<Rgba>,
    pub proxy: ProxySettings,
}

impl AppConfigForm {
    /// An empty form for creating `name`.
    pub fn for_new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// A form pre-filled from an existing record.
    pub fn from_record(record: &AppRecord) -> Self {
        Self {
            name: record.name.to_string(),
            url: record.url.clone(),
            title: record.title.clone().unwrap_or_default(),
            enable_js: record.enable_js,
            allow_cookies: record.allow_cookies(),
            allow_third_party_cookies: record.allow_third_party_cookies(),
            hide_scroll_bars: record.hide_scroll_bars,
            remove_window_frame: record.remove_window_frame,
            additional_css: record.additional_css.clone().unwrap_or_default(),
            additional_js: record.additional_js.clone().unwrap_or_default(),
            notes: record.notes.clone().unwrap_or_default(),
            user_agent: record.user_agent.clone().unwrap_or_default(),
            additional_domains: record
                .additional_domains()
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(" "),
            background_color: record.background_color,
            proxy: record.proxy.clone(),
        }
    }

    /// Applies one edit, then the derived-state rules for it.
    pub fn apply(&mut self, change: FormChange) {
        let custom_proxy_edit = change.touches_custom_proxy();

        match change {
            FormChange::Name(v) => self.name = v,
            FormChange::Url(v) => self.url = v,
            FormChange::Title(v) => self.title = v,
            FormChange::EnableJs(v) => self.enable_js = v,
            FormChange::AllowCookies(v) => {
                self.allow_cookies = v;
                if !v {
                    self.allow_third_party_cookies = false;
                }
            }
            FormChange::AllowThirdPartyCookies(v) => {
                self.allow_third_party_cookies = v;
                if v {
                    self.allow_cookies = true;
                }
            }
            FormChange::HideScrollBars(v) => self.hide_scroll_bars = v,
            FormChange::RemoveWindowFrame(v) => self.remove_window_frame = v,
            FormChange::AdditionalCss(v) => self.additional_css = v,
            FormChange::AdditionalJs(v) => self.additional_js = v,
            FormChange::Notes(v) => self.notes = v,
            FormChange::UserAgent(v) => self.user_agent = v,
            FormChange::AdditionalDomains(v) => self.additional_domains = v,
            FormChange::BackgroundColor(v) => self.background_color = v,
            FormChange::ProxyMode(v) => self.proxy.mode = v,
            FormChange::ProxyHost(v) => self.proxy.host = v,
            FormChange::ProxyPort(v) => self.proxy.port = v,
            FormChange::ProxyUseSocks(v) => self.proxy.use_socks = v,
            FormChange::ProxyUseAuth(v) => self.proxy.use_auth = v,
            FormChange::ProxyUsername(v) => self.proxy.username = v,
            FormChange::ProxyPassword(v) => self.proxy.password = v,
        }

        if custom_proxy_edit {
            self.derive_proxy_state();
        }
    }

    fn derive_proxy_state(&mut self) {
        if !self.proxy.username.is_empty() || !self.proxy.password.is_empty() {
            self.proxy.use_auth = true;
        }

        if self.proxy.has_custom_fields() {
            self.proxy.mode = ProxyMode::Custom;
        } else if self.proxy.mode == ProxyMode::Custom {
            self.proxy.mode = ProxyMode::System;
        }
    }

    /// Validates the form and produces a record.
    ///
    /// When editing, `existing` supplies the session-owned state the form
    /// does not show (cookies, geometry, icon, zoom, mute, lock).
    pub fn build(&self, existing: Option<&AppRecord>) -> Result<AppRecord> {
        let name = AppName::new(&self.name)?;
        let url = normalize_start_url(name.as_str(), &self.url)?;

        let mut record = match existing {
            Some(previous) => {
                let mut r = previous.clone();
                r.name = name;
                r.url = url;
                r
            }
            None => AppRecord::new(name, url),
        };

        record.title = non_empty(&self.title);
        record.enable_js = self.enable_js;
        record.set_allow_cookies(self.allow_cookies);
        if self.allow_third_party_cookies {
            record.set_allow_third_party_cookies(true);
        }
        record.hide_scroll_bars = self.hide_scroll_bars;
        record.remove_window_frame = self.remove_window_frame;
        record.additional_css = non_empty(&self.additional_css);
        record.additional_js = non_empty(&self.additional_js);
        record.notes = non_empty(&self.notes);
        record.user_agent = non_empty(&self.user_agent);
        record.set_additional_domains(parse_domain_list(&self.additional_domains));
        record.background_color = self.background_color;

        let mut proxy = self.proxy.clone();
        if proxy.host.trim().is_empty() {
            proxy.host = DEFAULT_PROXY_HOST.to_string();
        }
        record.proxy = proxy;

        Ok(record)
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Validates a user-entered starting URL, prepending `https://` when no scheme is given.
pub fn normalize_start_url(app: &str, raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LiquidError::invalid_url(app, raw, "URL is required"));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&candidate).map_err(|e| LiquidError::invalid_url(app, raw, e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(LiquidError::invalid_url(
            app,
            raw,
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(LiquidError::invalid_url(app, raw, "URL has no host"));
    }

    Ok(url.to_string())
}
