//! Cookie read/write/delete primitives over a [`CookieDocument`].
//!
//! This is the key/value view the consent core works against: names and
//! values are percent-decoded on read and percent-encoded on write, every
//! read re-parses the document's cookie string, and deletion is a
//! best-effort sweep across the domain scopes a cookie may have been set with.

use crate::base::consenterror::ConsentError;
use crate::cookies::document::CookieDocument;
use crate::cookies::psl::upper_domain;
use cookie::Cookie;
use std::fmt;
use std::sync::Arc;
use time::{Duration, OffsetDateTime};

const SECONDS_PER_DAY: i64 = 86_400;

/// A cookie as currently visible to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveCookie {
    pub name: String,
    pub value: String,
}

impl LiveCookie {
    /// The value parsed as JSON, if it is JSON.
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.value).ok()
    }
}

/// Cookie primitives for one page.
///
/// Cheap to clone; all clones talk to the same document.
#[derive(Clone)]
pub struct CookieAccess {
    document: Arc<dyn CookieDocument>,
}

impl fmt::Debug for CookieAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieAccess")
            .field("hostname", &self.document.hostname())
            .finish()
    }
}

impl CookieAccess {
    pub fn new(document: Arc<dyn CookieDocument>) -> Self {
        Self { document }
    }

    /// The document these primitives operate on.
    pub fn document(&self) -> &Arc<dyn CookieDocument> {
        &self.document
    }

    /// All cookies visible to the page right now, decoded, in document order.
    pub fn get_all_cookies(&self) -> Vec<LiveCookie> {
        self.document
            .cookie_string()
            .split(';')
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
            .filter_map(decode_pair)
            .collect()
    }

    /// The first visible cookie named `name`.
    pub fn get_cookie(&self, name: &str) -> Option<LiveCookie> {
        self.get_all_cookies().into_iter().find(|c| c.name == name)
    }

    /// Write `name=value` on path `/`, expiring after `expiry_days` (session
    /// cookie when `None`). Fails without writing when the expiry date is not
    /// representable.
    pub fn set_cookie(
        &self,
        name: &str,
        value: &str,
        expiry_days: Option<i64>,
        secure: bool,
    ) -> Result<(), ConsentError> {
        validate_cookie_name(name)?;

        let mut builder = Cookie::build((name.to_string(), value.to_string()))
            .path("/")
            .secure(secure);
        if let Some(days) = expiry_days {
            let expires = days
                .checked_mul(SECONDS_PER_DAY)
                .and_then(|secs| OffsetDateTime::now_utc().checked_add(Duration::seconds(secs)))
                .ok_or_else(|| ConsentError::expiry_out_of_range(days))?;
            builder = builder.expires(expires);
        }

        let cookie = builder.build();
        self.document.write_cookie(&cookie.encoded().to_string());
        Ok(())
    }

    /// Clear `name` under every domain scope it may have been written with:
    /// the hostname, `.hostname`, the upper domain and `.upper domain`.
    ///
    /// Each attempt is an independent, unconditional write of an
    /// already-expired cookie on path `/`. Cookies written on another path or
    /// on a deeper parent domain can survive.
    pub fn delete_cookie(&self, name: &str) {
        let hostname = self.document.hostname();
        let upper = upper_domain(&hostname);

        let variants = [
            hostname.clone(),
            format!(".{}", hostname),
            upper.clone(),
            format!(".{}", upper),
        ];

        for domain in variants {
            let cookie = Cookie::build((name.to_string(), String::new()))
                .domain(domain)
                .path("/")
                .expires(OffsetDateTime::UNIX_EPOCH)
                .build();
            self.document.write_cookie(&cookie.encoded().to_string());
        }

        tracing::debug!(cookie = %name, host = %hostname, upper = %upper, "deleted cookie");
    }
}

fn decode_pair(pair: &str) -> Option<LiveCookie> {
    match Cookie::parse_encoded(pair) {
        Ok(c) => Some(LiveCookie {
            name: c.name().to_string(),
            value: c.value().to_string(),
        }),
        Err(_) => {
            // Undecodable escapes; surface the raw pair rather than hide the cookie.
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            if name.trim().is_empty() {
                return None;
            }
            Some(LiveCookie {
                name: name.trim().to_string(),
                value: value.trim().to_string(),
            })
        }
    }
}

/// Reject names a cookie header cannot carry.
pub fn validate_cookie_name(name: &str) -> Result<(), ConsentError> {
    let invalid = name.is_empty()
        || name
            .chars()
            .any(|ch| ch.is_whitespace() || ch.is_control() || matches!(ch, ';' | '=' | ','));

    if invalid {
        return Err(ConsentError::invalid_cookie_name(name));
    }
    Ok(())
}
