//! The `document.cookie` surface of a page.
//!
//! Everything above this layer treats the browser as a single string getter
//! (`"a=1; b=2"`) plus a setter taking one `Set-Cookie`-style assignment at a
//! time. [`JarDocument`] implements it over a [`CookieMonster`] so the consent
//! core can run (and be tested) without a browser.

use crate::cookies::monster::CookieMonster;
use url::Url;

/// A page's view of its cookies.
///
/// Implementations must reflect writes in the very next
/// [`cookie_string`](CookieDocument::cookie_string) call; nothing above this
/// trait caches cookie state.
pub trait CookieDocument: Send + Sync {
    /// Hostname of the page (no port), e.g. `www.example.com`.
    fn hostname(&self) -> String;

    /// The `document.cookie` getter: `name=value` pairs joined by `"; "`.
    fn cookie_string(&self) -> String;

    /// The `document.cookie` setter: one cookie assignment with attributes.
    fn write_cookie(&self, line: &str);
}

/// A page bound to an in-memory cookie jar.
#[derive(Clone)]
pub struct JarDocument {
    jar: CookieMonster,
    url: Url,
}

impl JarDocument {
    /// A page at `url` sharing `jar` with any other handle onto it.
    pub fn new(jar: CookieMonster, url: Url) -> Self {
        Self { jar, url }
    }

    /// A fresh, empty jar for `url`.
    pub fn for_url(url: Url) -> Self {
        Self::new(CookieMonster::new(), url)
    }

    /// The underlying jar.
    pub fn jar(&self) -> &CookieMonster {
        &self.jar
    }

    /// The page URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Whether a cookie named `name` is visible to the page.
    pub fn has_cookie(&self, name: &str) -> bool {
        self.jar
            .get_cookies_for_url(&self.url)
            .iter()
            .any(|c| c.name == name && !c.http_only)
    }
}

impl CookieDocument for JarDocument {
    fn hostname(&self) -> String {
        self.url.host_str().unwrap_or("").to_string()
    }

    fn cookie_string(&self) -> String {
        self.jar
            .get_cookies_for_url(&self.url)
            .iter()
            .filter(|c| !c.http_only) // invisible to scripts
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn write_cookie(&self, line: &str) {
        if let Ok(Some(true)) = cookie::Cookie::parse(line).map(|c| c.http_only()) {
            // Scripts cannot create HttpOnly cookies.
            tracing::debug!(line = %line, "ignored HttpOnly write from document");
            return;
        }
        self.jar.parse_and_save_cookie(&self.url, line);
    }
}
