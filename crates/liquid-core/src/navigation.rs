//! Navigation policy: keep the app on its own hosts.

use std::collections::BTreeSet;

use url::Url;

/// What triggered a navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    LinkClicked,
    FormSubmitted,
    Typed,
    BackForward,
    Reload,
    Redirect,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Navigate inside the app window.
    Allow,
    /// Hand the URL to the system's default handler instead.
    Divert,
    /// Drop the navigation.
    Block,
}

#[derive(Debug, Clone)]
pub struct NavigationRequest<'a> {
    /// Host of the page currently shown; `None` before the first load.
    pub current_host: Option<&'a str>,
    pub url: &'a Url,
    pub kind: NavigationKind,
    pub is_main_frame: bool,
    /// The user explicitly asked to open the link outside (e.g. middle click).
    pub user_forced_external: bool,
}

/// Decides where each navigation goes.
///
/// Cross-host main-frame link clicks are diverted to the system browser;
/// cross-host form submissions are blocked outright so credentials never
/// leave silently. Hosts listed in `allowed_domains` (and their subdomains)
/// count as in-app.
#[derive(Debug, Clone, Default)]
pub struct NavigationPolicy {
    allowed_domains: BTreeSet<String>,
}

impl NavigationPolicy {
    pub fn new(allowed_domains: BTreeSet<String>) -> Self {
        Self { allowed_domains }
    }

    pub fn decide(&self, request: &NavigationRequest<'_>) -> NavigationDecision {
        let Some(current_host) = request.current_host else {
            return NavigationDecision::Allow;
        };

        let foreign = !self.is_same_site(current_host, request.url);

        match request.kind {
            NavigationKind::LinkClicked
                if request.is_main_frame && (foreign || request.user_forced_external) =>
            {
                NavigationDecision::Divert
            }
            NavigationKind::FormSubmitted if foreign => NavigationDecision::Block,
            _ => NavigationDecision::Allow,
        }
    }

    fn is_same_site(&self, current_host: &str, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            // about:, data: and similar carry no host and stay in-app.
            return true;
        };
        let host = host.to_ascii_lowercase();

        if host == current_host.to_ascii_lowercase() {
            return true;
        }

        let with_port = url.port().map(|p| format!("{}:{}", host, p));
        self.allowed_domains.iter().any(|domain| {
            host == *domain
                || host.ends_with(&format!(".{}", domain))
                || with_port.as_deref() == Some(domain.as_str())
        })
    }
}
