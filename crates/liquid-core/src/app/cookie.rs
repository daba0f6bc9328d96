//! Cookies as persisted in an app record.

use std::collections::BTreeMap;

use time::OffsetDateTime;
use url::Url;

use crate::error::{LiquidError, Result};

/// A browser cookie.
///
/// `expires` is a UNIX timestamp in seconds; `None` marks a session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub expires: Option<i64>,
    pub http_only: bool,
    pub secure: bool,
}

/// Identity of a cookie within a jar: `(domain, path, name)`.
///
/// The domain is stored without its leading dot so `.example.com` and
/// `example.com` collapse to one entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CookieId {
    pub domain: String,
    pub path: String,
    pub name: String,
}

impl Cookie {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        domain: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            path: path.into(),
            expires: None,
            http_only: false,
            secure: false,
        }
    }

    /// Domain without any leading dot, lower-cased.
    pub fn normalized_domain(&self) -> String {
        self.domain.trim_start_matches('.').to_ascii_lowercase()
    }

    fn normalized_path(&self) -> &str {
        if self.path.is_empty() { "/" } else { &self.path }
    }

    pub fn id(&self) -> CookieId {
        CookieId {
            domain: self.normalized_domain(),
            path: self.normalized_path().to_string(),
            name: self.name.clone(),
        }
    }

    /// Key under which the cookie is stored in the `[Cookies]` table.
    pub fn storage_key(&self) -> String {
        format!(
            "{}_{}_{}",
            self.normalized_domain(),
            self.normalized_path(),
            self.name
        )
    }

    /// Serializes the cookie as a `Set-Cookie` header value.
    pub fn to_wire(&self) -> String {
        let mut builder = cookie::Cookie::build((self.name.clone(), self.value.clone()))
            .path(self.normalized_path().to_string())
            .http_only(self.http_only)
            .secure(self.secure);

        let domain = self.normalized_domain();
        if !domain.is_empty() {
            builder = builder.domain(domain);
        }

        if let Some(ts) = self.expires
            && let Ok(when) = OffsetDateTime::from_unix_timestamp(ts)
        {
            builder = builder.expires(when);
        }

        builder.build().to_string()
    }

    /// Parses a `Set-Cookie` header value.
    pub fn from_wire(raw: &str) -> Result<Self> {
        let parsed = cookie::Cookie::parse(raw.to_string()).map_err(|e| {
            LiquidError::Serialization {
                format: "Set-Cookie".to_string(),
                message: format!("'{}': {}", raw, e),
            }
        })?;

        Ok(Self {
            name: parsed.name().to_string(),
            value: parsed.value().to_string(),
            domain: parsed.domain().unwrap_or_default().to_ascii_lowercase(),
            path: parsed.path().unwrap_or("/").to_string(),
            expires: parsed.expires_datetime().map(|dt| dt.unix_timestamp()),
            http_only: parsed.http_only().unwrap_or(false),
            secure: parsed.secure().unwrap_or(false),
        })
    }

    /// Whether the cookie's domain matches `host` or is a parent of it.
    ///
    /// A cookie without a domain is host-only and always first-party.
    pub fn is_first_party_for(&self, host: &str) -> bool {
        let domain = self.normalized_domain();
        if domain.is_empty() {
            return true;
        }
        let host = host.trim_start_matches('.').to_ascii_lowercase();
        host == domain || host.ends_with(&format!(".{}", domain))
    }

    /// Origin URL a cookie store needs to accept this cookie.
    ///
    /// Returns `None` for host-only cookies, which carry no domain.
    pub fn origin_url(&self) -> Option<Url> {
        let domain = self.normalized_domain();
        if domain.is_empty() {
            return None;
        }
        let scheme = if self.secure { "https" } else { "http" };
        let path = self.normalized_path();
        let sep = if path.starts_with('/') { "" } else { "/" };
        Url::parse(&format!("{}://{}{}{}", scheme, domain, sep, path)).ok()
    }
}

/// The cookies of one app, keyed by identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: BTreeMap<CookieId, Cookie>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cookie> {
        self.cookies.values()
    }

    pub fn get(&self, id: &CookieId) -> Option<&Cookie> {
        self.cookies.get(id)
    }

    pub fn contains(&self, id: &CookieId) -> bool {
        self.cookies.contains_key(id)
    }

    /// Inserts a cookie, replacing any entry with the same identity.
    pub fn insert(&mut self, cookie: Cookie) -> Option<Cookie> {
        self.cookies.insert(cookie.id(), cookie)
    }

    pub fn remove(&mut self, id: &CookieId) -> Option<Cookie> {
        self.cookies.remove(id)
    }

    pub fn clear(&mut self) {
        self.cookies.clear();
    }
}

impl FromIterator<Cookie> for CookieJar {
    fn from_iter<I: IntoIterator<Item = Cookie>>(iter: I) -> Self {
        let mut jar = Self::new();
        for cookie in iter {
            jar.insert(cookie);
        }
        jar
    }
}
