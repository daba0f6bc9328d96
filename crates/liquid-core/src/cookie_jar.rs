//! Bridges live session cookies and the persisted cookie jar.

use tracing::debug;

use crate::app::{AppConfigRepository, AppRecord, Cookie};
use crate::surface::LiveCookieStore;

/// Applies an app's cookie policy to live cookie events.
///
/// Every accepted change rewrites the whole jar into the record and saves
/// it. That is O(n) per change, which is fine for the handful of cookies a
/// single site keeps.
#[derive(Debug, Clone)]
pub struct CookieJarBridge {
    primary_host: Option<String>,
}

impl CookieJarBridge {
    pub fn new(record: &AppRecord) -> Self {
        Self {
            primary_host: record.primary_host(),
        }
    }

    /// Whether `cookie` may be stored under the record's current policy.
    pub fn permits(&self, record: &AppRecord, cookie: &Cookie) -> bool {
        if !record.allow_cookies() {
            return false;
        }
        if record.allow_third_party_cookies() {
            return true;
        }
        match &self.primary_host {
            Some(host) => cookie.is_first_party_for(host),
            None => cookie.normalized_domain().is_empty(),
        }
    }

    /// Stores or replaces a cookie reported by the session.
    ///
    /// Returns `false` when the policy rejects it. A failed save still
    /// returns `true`: the cookie is accepted in memory.
    pub fn upsert(
        &self,
        record: &mut AppRecord,
        store: &dyn AppConfigRepository,
        cookie: Cookie,
    ) -> bool {
        if !self.permits(record, &cookie) {
            debug!(
                app = %record.name,
                "[CookieJarBridge] Rejected cookie '{}' for domain '{}'",
                cookie.name,
                cookie.domain
            );
            return false;
        }

        let id = cookie.id();
        record.cookies.remove(&id);
        record.cookies.insert(cookie);
        store.save_or_warn(record, "cookies");
        true
    }

    /// Removes a cookie the session dropped.
    pub fn remove(
        &self,
        record: &mut AppRecord,
        store: &dyn AppConfigRepository,
        cookie: &Cookie,
    ) -> bool {
        if !self.permits(record, cookie) {
            return false;
        }

        if record.cookies.remove(&cookie.id()).is_some() {
            store.save_or_warn(record, "cookies");
        }
        true
    }

    /// Re-injects every persisted cookie into a fresh live store.
    ///
    /// Returns the number of cookies restored.
    pub fn restore(&self, record: &AppRecord, live: &mut dyn LiveCookieStore) -> usize {
        if !record.allow_cookies() {
            return 0;
        }

        let fallback_origin = record.start_url().ok();
        let mut restored = 0;

        for cookie in record.cookies.iter() {
            let Some(origin) = cookie.origin_url().or_else(|| fallback_origin.clone()) else {
                debug!(
                    app = %record.name,
                    "[CookieJarBridge] No origin for cookie '{}', skipping",
                    cookie.name
                );
                continue;
            };

            let mut injected = cookie.clone();
            // The store re-applies the leading dot itself.
            injected.domain = cookie.normalized_domain();
            live.set_cookie(&injected, &origin);
            restored += 1;
        }

        debug!(
            app = %record.name,
            "[CookieJarBridge] Restored {} cookie(s)",
            restored
        );
        restored
    }
}
