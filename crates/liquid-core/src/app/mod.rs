//! App record domain model.

pub mod cookie;
pub mod form;
pub mod model;
pub mod proxy;
pub mod repository;

pub use cookie::{Cookie, CookieId, CookieJar};
pub use form::{AppConfigForm, FormChange, normalize_start_url};
pub use model::{AppName, AppRecord, Rgba, clamp_zoom, normalize_domain, parse_domain_list};
pub use proxy::{ProxyMode, ProxySettings};
pub use repository::AppConfigRepository;
