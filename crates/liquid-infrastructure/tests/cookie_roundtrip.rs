//! Cookies accepted during one session come back in the next.

use liquid_core::app::{AppConfigRepository, AppName, AppRecord, Cookie};
use liquid_core::cookie_jar::CookieJarBridge;
use liquid_core::surface::LiveCookieStore;
use liquid_infrastructure::TomlAppConfigRepository;
use tempfile::TempDir;
use url::Url;

#[derive(Default)]
struct FreshSession {
    cookies: Vec<(Cookie, Url)>,
}

impl LiveCookieStore for FreshSession {
    fn set_cookie(&mut self, cookie: &Cookie, origin: &Url) {
        self.cookies.push((cookie.clone(), origin.clone()));
    }

    fn delete_cookie(&mut self, cookie: &Cookie) {
        self.cookies.retain(|(c, _)| c.id() != cookie.id());
    }
}

fn cookies_allowed_record() -> AppRecord {
    let mut record = AppRecord::new(AppName::new("bank").unwrap(), "https://www.bank.example/");
    record.set_allow_cookies(true);
    record
}

#[test]
fn test_cookie_survives_store_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let repo = TomlAppConfigRepository::with_dir(temp_dir.path().join("apps"));

    let mut record = cookies_allowed_record();
    repo.save(&record).unwrap();

    let bridge = CookieJarBridge::new(&record);
    let samples = [
        {
            let mut c = Cookie::new("session", "s3cr3t-value", ".bank.example", "/");
            c.http_only = true;
            c.secure = true;
            c.expires = Some(2_000_000_000);
            c
        },
        Cookie::new("lang", "en", "www.bank.example", "/settings"),
        Cookie::new("host_only", "1", "", "/"),
    ];
    for cookie in samples.iter().cloned() {
        assert!(bridge.upsert(&mut record, &repo, cookie));
    }

    // Next launch: load from disk into a fresh session.
    let reloaded = repo.load(&record.name).unwrap();
    let mut session = FreshSession::default();
    let restored = CookieJarBridge::new(&reloaded).restore(&reloaded, &mut session);
    assert_eq!(restored, samples.len());

    for original in &samples {
        let (found, _) = session
            .cookies
            .iter()
            .find(|(c, _)| c.name == original.name)
            .unwrap();
        assert_eq!(found.domain, original.normalized_domain());
        assert_eq!(found.path, original.path);
        assert_eq!(found.value, original.value);
        assert_eq!(found.http_only, original.http_only);
        assert_eq!(found.secure, original.secure);
    }
}

#[test]
fn test_third_party_flag_never_persisted_alone() {
    let temp_dir = TempDir::new().unwrap();
    let repo = TomlAppConfigRepository::with_dir(temp_dir.path().join("apps"));

    let mut record = AppRecord::new(AppName::new("news").unwrap(), "https://news.example/");
    record.set_allow_third_party_cookies(true);
    repo.save(&record).unwrap();

    let text = std::fs::read_to_string(temp_dir.path().join("apps").join("news.toml")).unwrap();
    assert!(text.contains("AllowThirdPartyCookies = true"));
    assert!(text.contains("AllowCookies = true"));

    record.set_allow_cookies(false);
    repo.save(&record).unwrap();
    let loaded = repo.load(&record.name).unwrap();
    assert!(!loaded.allow_cookies());
    assert!(!loaded.allow_third_party_cookies());

    // A hand-edited file with only the stronger flag is repaired on load.
    std::fs::write(
        temp_dir.path().join("apps").join("news.toml"),
        "URL = \"https://news.example/\"\nAllowThirdPartyCookies = true\n",
    )
    .unwrap();
    let repaired = repo.load(&record.name).unwrap();
    assert!(repaired.allow_cookies());
}

#[test]
fn test_rejected_cookie_is_not_persisted() {
    let temp_dir = TempDir::new().unwrap();
    let repo = TomlAppConfigRepository::with_dir(temp_dir.path().join("apps"));

    let mut record = cookies_allowed_record();
    let bridge = CookieJarBridge::new(&record);
    assert!(!bridge.upsert(&mut record, &repo, Cookie::new("track", "1", ".ads.example", "/")));
    assert!(!repo.exists(&record.name));
}
