//! Public Suffix List (PSL) helpers for cookie domain scoping.
//!
//! Used by the jar to reject `Domain` attributes naming a public suffix
//! (`.com`, `.co.uk`), and by the deletion sweep to work out which parent
//! domain a cookie may have been scoped to.
//!
//! Uses Mozilla's Public Suffix List via the `psl` crate.

use psl::{List, Psl};
use std::net::IpAddr;

/// Check if a domain is a public suffix (e.g., "com", "co.uk").
pub fn is_public_suffix(domain: &str) -> bool {
    let domain_lower = domain.trim_start_matches('.').to_lowercase();
    if domain_lower.is_empty() {
        return false;
    }
    let domain_bytes = domain_lower.as_bytes();

    match List.suffix(domain_bytes) {
        Some(suffix) => suffix.as_bytes() == domain_bytes,
        None => false,
    }
}

/// Whether `host` is an IPv4/IPv6 literal rather than a DNS name.
pub fn is_ip_literal(host: &str) -> bool {
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
        .is_ok()
}

/// Check if a cookie domain is valid for a page host.
/// The cookie domain must domain-match the host and must not be a public suffix.
pub fn is_valid_cookie_domain(cookie_domain: &str, url_host: &str) -> bool {
    let cookie_domain = cookie_domain.trim_start_matches('.').to_lowercase();
    let url_host = url_host.to_lowercase();

    if cookie_domain.is_empty() || is_public_suffix(&cookie_domain) {
        return false;
    }

    if is_ip_literal(&url_host) {
        return url_host == cookie_domain;
    }

    url_host == cookie_domain || url_host.ends_with(&format!(".{}", cookie_domain))
}

/// The parent ("upper") domain a cookie for `host` may have been scoped to.
///
/// `www.shop.example.com` -> `shop.example.com`. Falls back to `host` itself
/// when there is no usable parent: single-label hosts, IP literals, or a
/// parent that is a public suffix (`example.co.uk` -> `example.co.uk`).
pub fn upper_domain(host: &str) -> String {
    let host = host.trim_start_matches('.').to_lowercase();
    if is_ip_literal(&host) {
        return host;
    }

    match host.split_once('.') {
        Some((_, parent)) if !parent.is_empty() && !is_public_suffix(parent) => {
            parent.to_string()
        }
        _ => host,
    }
}
