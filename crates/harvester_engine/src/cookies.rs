//! Cookie jar for the HTTP fetcher.
//!
//! Cookies are held as [`CookieRecord`]s with the scope and lifetime they
//! were set with, so the session written at the end of a run restores the
//! same path-scoped, `HttpOnly` and expiring cookies on the next one.

use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

use harvest_logging::{harvest_debug, harvest_trace};
use reqwest::header::HeaderValue;
use url::Url;

use crate::session::CookieRecord;

#[derive(Debug, Default)]
pub struct SessionJar {
    cookies: RwLock<Vec<CookieRecord>>,
}

impl SessionJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unexpired cookies in the order they were first stored.
    pub fn snapshot(&self) -> Vec<CookieRecord> {
        let now = unix_now();
        self.cookies
            .read()
            .map(|cookies| {
                cookies
                    .iter()
                    .filter(|cookie| !is_expired(cookie, now))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Stores `cookie`, replacing one with the same name, domain and path.
    /// An already expired cookie removes its stored counterpart.
    pub fn insert(&self, cookie: CookieRecord) {
        let Ok(mut cookies) = self.cookies.write() else {
            return;
        };
        let position = cookies.iter().position(|c| same_slot(c, &cookie));
        let expired = is_expired(&cookie, unix_now());
        match (position, expired) {
            (Some(index), true) => {
                cookies.remove(index);
            }
            (Some(index), false) => cookies[index] = cookie,
            (None, true) => {}
            (None, false) => cookies.push(cookie),
        }
    }

    /// Cookies to send with a request to `url`, longest path first.
    pub fn matching(&self, url: &Url) -> Vec<CookieRecord> {
        let now = unix_now();
        let mut matched: Vec<CookieRecord> = self
            .cookies
            .read()
            .map(|cookies| {
                cookies
                    .iter()
                    .filter(|cookie| !is_expired(cookie, now) && applies_to(cookie, url))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        matched.sort_by(|a, b| b.path.len().cmp(&a.path.len()));
        matched
    }

    fn store_set_cookie(&self, header: &str, url: &Url) {
        match from_set_cookie(header, url) {
            Some(cookie) => {
                harvest_trace!("Cookie {} set for {}{}", cookie.name, cookie.domain, cookie.path);
                self.insert(cookie);
            }
            None => harvest_debug!("Ignoring cookie from {}: {}", url, header),
        }
    }
}

impl reqwest::cookie::CookieStore for SessionJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        for header in cookie_headers {
            if let Ok(header) = header.to_str() {
                self.store_set_cookie(header, url);
            }
        }
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let header = self
            .matching(url)
            .iter()
            .map(|cookie| format!("{}={}", cookie.name, cookie.value))
            .collect::<Vec<_>>()
            .join("; ");
        if header.is_empty() {
            return None;
        }
        HeaderValue::from_str(&header).ok()
    }
}

/// Builds a record from a `Set-Cookie` header received from `url`.
///
/// A `Domain` attribute makes a domain cookie (stored with a leading dot)
/// and must cover the request host. Without `Path` the cookie is scoped to
/// the directory of the request path. `Max-Age` wins over `Expires`.
fn from_set_cookie(header: &str, url: &Url) -> Option<CookieRecord> {
    let raw = cookie::Cookie::parse(header).ok()?;
    let host = url.host_str()?.to_ascii_lowercase();

    let domain = match raw.domain().map(|d| d.trim_start_matches('.').to_ascii_lowercase()) {
        Some(domain) if !domain.is_empty() => {
            if !domain_matches(&host, &domain) {
                return None;
            }
            format!(".{domain}")
        }
        _ => host,
    };

    let path = match raw.path() {
        Some(path) if path.starts_with('/') => path.to_string(),
        _ => default_path(url),
    };

    let expires = match (raw.max_age(), raw.expires_datetime()) {
        (Some(max_age), _) => Some(unix_now() + max_age.whole_seconds() as f64),
        (None, Some(at)) => Some(at.unix_timestamp() as f64),
        (None, None) => None,
    };

    let mut record = CookieRecord::new(
        raw.name(),
        raw.value(),
        &domain,
        raw.secure().unwrap_or(false),
    );
    record.path = path;
    record.expires = expires;
    record.http_only = raw.http_only().unwrap_or(false);
    if let Some(same_site) = raw.same_site() {
        record
            .extra
            .insert("sameSite".to_string(), same_site.to_string().into());
    }
    Some(record)
}

fn applies_to(cookie: &CookieRecord, url: &Url) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();
    let domain_ok = if cookie.domain.starts_with('.') {
        domain_matches(&host, &cookie.host().to_ascii_lowercase())
    } else {
        host == cookie.domain.to_ascii_lowercase()
    };
    domain_ok && path_matches(url.path(), &cookie.path) && (!cookie.secure || url.scheme() == "https")
}

fn domain_matches(host: &str, domain: &str) -> bool {
    host == domain || host.ends_with(&format!(".{domain}"))
}

fn path_matches(request_path: &str, cookie_path: &str) -> bool {
    request_path == cookie_path
        || (request_path.starts_with(cookie_path)
            && (cookie_path.ends_with('/')
                || request_path[cookie_path.len()..].starts_with('/')))
}

fn default_path(url: &Url) -> String {
    match url.path().rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(index) => url.path()[..index].to_string(),
    }
}

/// Same name and scope: a later cookie replaces the earlier one.
fn same_slot(a: &CookieRecord, b: &CookieRecord) -> bool {
    a.name == b.name
        && a.path == b.path
        && a.domain.eq_ignore_ascii_case(&b.domain)
}

/// Negative `expires` marks a session cookie in browser dumps.
fn is_expired(cookie: &CookieRecord, now: f64) -> bool {
    matches!(cookie.expires, Some(at) if at >= 0.0 && at <= now)
}

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or(0.0)
}
