use crate::cookies::canonical_cookie::CanonicalCookie;
use dashmap::DashMap;
use std::sync::Arc;
use time::{Date, OffsetDateTime};
use url::Url;

/// The in-memory cookie jar standing in for the browser's cookie store.
/// Modeled after Chromium's `net::CookieMonster`.
///
/// Cloning yields another handle onto the same jar.
#[derive(Clone)]
pub struct CookieMonster {
    // Store: Map<Domain, List<Cookie>>
    store: Arc<DashMap<String, Vec<CanonicalCookie>>>,
}

impl Default for CookieMonster {
    fn default() -> Self {
        Self::new()
    }
}

impl CookieMonster {
    pub fn new() -> Self {
        Self {
            store: Arc::new(DashMap::new()),
        }
    }

    /// Insert `cookie`, replacing whatever occupies its (domain, name, path) slot.
    ///
    /// An already-expired cookie is a deletion: the slot is cleared and
    /// nothing is stored.
    pub fn set_canonical_cookie(&self, cookie: CanonicalCookie) {
        let now = OffsetDateTime::now_utc();
        let mut entry = self.store.entry(cookie.domain.clone()).or_default();

        entry.retain(|c| !c.same_slot(&cookie.name, &cookie.path));

        if cookie.is_expired(now) {
            tracing::trace!(name = %cookie.name, domain = %cookie.domain, "expired write cleared slot");
            return;
        }

        entry.push(cookie);
    }

    /// Get cookies matching the URL with proper domain suffix matching.
    pub fn get_cookies_for_url(&self, url: &Url) -> Vec<CanonicalCookie> {
        let mut result = Vec::new();
        let host = url.host_str().unwrap_or("").to_lowercase();
        let now = OffsetDateTime::now_utc();

        for domain in Self::get_matching_domains(&host) {
            if let Some(entry) = self.store.get(&domain) {
                for cookie in entry.iter() {
                    if !Self::domain_matches(&cookie.domain, &host, cookie.host_only) {
                        continue;
                    }

                    if !Self::path_matches(&cookie.path, url.path()) {
                        continue;
                    }

                    if cookie.secure && url.scheme() != "https" {
                        continue;
                    }

                    if cookie.is_expired(now) {
                        continue;
                    }

                    result.push(cookie.clone());
                }
            }
        }

        // Sort by path length (longest first) then creation time
        result.sort_by(|a, b| {
            b.path
                .len()
                .cmp(&a.path.len())
                .then_with(|| a.creation_time.cmp(&b.creation_time))
        });

        result
    }

    /// Check if cookie domain matches request host.
    /// Implements RFC 6265 domain matching.
    fn domain_matches(cookie_domain: &str, request_host: &str, host_only: bool) -> bool {
        if host_only {
            return cookie_domain.eq_ignore_ascii_case(request_host);
        }

        if request_host.eq_ignore_ascii_case(cookie_domain) {
            return true;
        }

        request_host.len() > cookie_domain.len()
            && request_host
                .to_lowercase()
                .ends_with(&format!(".{}", cookie_domain.to_lowercase()))
    }

    /// Check if request path matches cookie path.
    /// Implements RFC 6265 path matching.
    fn path_matches(cookie_path: &str, request_path: &str) -> bool {
        if request_path == cookie_path {
            return true;
        }

        if let Some(rest) = request_path.strip_prefix(cookie_path) {
            return cookie_path.ends_with('/') || rest.starts_with('/');
        }

        false
    }

    /// Get all domains to check for a given host.
    /// Returns the host itself and all parent domains short of the TLD.
    fn get_matching_domains(host: &str) -> Vec<String> {
        let mut domains = vec![host.to_string()];

        // "foo.bar.example.com" -> "bar.example.com", "example.com"
        let parts: Vec<&str> = host.split('.').collect();
        for i in 1..parts.len().saturating_sub(1) {
            domains.push(parts[i..].join("."));
        }

        domains
    }

    /// Apply a `Set-Cookie` / `document.cookie` assignment made by `url`.
    ///
    /// Returns `false` when the line is rejected (unparseable, or a `Domain`
    /// attribute the page may not use).
    pub fn parse_and_save_cookie(&self, url: &Url, cookie_line: &str) -> bool {
        use cookie::Cookie;

        let parsed = match Cookie::parse(cookie_line) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!(line = %cookie_line, error = %e, "failed to parse cookie");
                return false;
            }
        };

        let now = OffsetDateTime::now_utc();
        let host = url.host_str().unwrap_or("").to_lowercase();

        let (domain, host_only) = match parsed.domain() {
            // A Domain equal to a public-suffix host (intranet names,
            // "localhost") degrades to host-only, as in Chromium.
            Some(d)
                if d.trim_start_matches('.').eq_ignore_ascii_case(&host)
                    && crate::cookies::psl::is_public_suffix(&host) =>
            {
                (host, true)
            }
            Some(d) => {
                // PSL validation: reject cookies set on public suffixes
                if !crate::cookies::psl::is_valid_cookie_domain(d, &host) {
                    tracing::debug!(domain = %d, host = %host, "rejected cookie domain");
                    return false;
                }
                (d.trim_start_matches('.').to_lowercase(), false)
            }
            None => (host, true),
        };

        let path = parsed.path().unwrap_or("/").to_string();

        // Max-Age wins over Expires. Out-of-range lifetimes are clamped.
        let expiration_time = match parsed.max_age() {
            Some(max_age) => Some(now.checked_add(max_age).unwrap_or_else(|| {
                tracing::debug!(name = %parsed.name(), "clamped out-of-range Max-Age");
                if max_age.is_negative() {
                    OffsetDateTime::UNIX_EPOCH
                } else {
                    Date::MAX.midnight().assume_utc()
                }
            })),
            None => parsed.expires().and_then(|e| e.datetime()),
        };

        self.set_canonical_cookie(CanonicalCookie {
            name: parsed.name().to_string(),
            value: parsed.value().to_string(),
            domain,
            path,
            creation_time: now,
            expiration_time,
            secure: parsed.secure().unwrap_or(false),
            http_only: parsed.http_only().unwrap_or(false),
            host_only,
        });

        true
    }

    /// Get total cookie count.
    pub fn total_cookie_count(&self) -> usize {
        self.store.iter().map(|e| e.value().len()).sum()
    }
}
