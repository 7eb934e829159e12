//! Consent configuration.
//!
//! The JSON layout is the one sites embed in their pages:
//!
//! ```json
//! {
//!   "preferenceCookieName": "cookie-consent-preferences",
//!   "preferenceCookieExpiryDays": 365,
//!   "preferenceCookieSecure": true,
//!   "defaultConsent": false,
//!   "deleteUndefinedCookies": true,
//!   "categoryManifest": [
//!     { "categoryName": "essential", "optional": false, "cookies": ["session"] },
//!     { "categoryName": "analytics", "matchBy": "startsWith", "cookies": ["_ga"] }
//!   ]
//! }
//! ```
//!
//! Every key is optional; missing keys take the [`Default`] values.

use crate::base::consenterror::ConsentError;
use crate::consent::manifest::{MatchStrategy, INTERNAL_CATEGORY, UNCATEGORIZED};
use crate::cookies::access::validate_cookie_name;
use serde::{Deserialize, Serialize};

/// Longest accepted preference cookie lifetime (100 years).
pub const MAX_PREFERENCE_COOKIE_EXPIRY_DAYS: i64 = 36_500;

/// One category as declared in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDecl {
    pub category_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
    /// Raw match strategy name; unknown names fall back to `startsWith`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_by: Option<String>,
    pub cookies: Vec<String>,
}

impl CategoryDecl {
    /// An optional `startsWith` category.
    pub fn new<I, S>(name: impl Into<String>, cookies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            category_name: name.into(),
            optional: None,
            match_by: None,
            cookies: cookies.into_iter().map(Into::into).collect(),
        }
    }

    /// Set whether the category needs consent.
    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = Some(optional);
        self
    }

    /// Set the match strategy.
    pub fn match_by(mut self, strategy: MatchStrategy) -> Self {
        self.match_by = Some(strategy.as_str().to_string());
        self
    }
}

/// A manifest entry. Entries that do not have the shape of a category are
/// kept verbatim so the classifier can drop them without failing the whole
/// configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ManifestEntry {
    Declared(CategoryDecl),
    Malformed(serde_json::Value),
}

impl From<CategoryDecl> for ManifestEntry {
    fn from(decl: CategoryDecl) -> Self {
        ManifestEntry::Declared(decl)
    }
}

/// Configuration for one consent instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsentConfig {
    /// Name of the cookie holding the stored preferences.
    pub preference_cookie_name: String,
    /// Lifetime of the preference cookie in days.
    pub preference_cookie_expiry_days: i64,
    /// Write the preference cookie with `Secure`.
    pub preference_cookie_secure: bool,
    /// Declared categories, in match order.
    pub category_manifest: Vec<ManifestEntry>,
    /// Consent applied to every optional category when nothing is stored.
    pub default_consent: bool,
    /// Delete cookies that match no category.
    pub delete_undefined_cookies: bool,
    /// Show the banner when the visitor has not chosen yet.
    pub show_banner: bool,
    /// Wire the preferences form.
    pub show_preferences_form: bool,
}

impl Default for ConsentConfig {
    fn default() -> Self {
        Self {
            preference_cookie_name: "cookie-consent-preferences".to_string(),
            preference_cookie_expiry_days: 365,
            preference_cookie_secure: true,
            category_manifest: Vec::new(),
            default_consent: false,
            delete_undefined_cookies: true,
            show_banner: true,
            show_preferences_form: true,
        }
    }
}

impl ConsentConfig {
    /// Create a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConsentError> {
        serde_json::from_str(json).map_err(|e| ConsentError::invalid_config(e.to_string()))
    }

    /// Set the preference cookie name.
    pub fn preference_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.preference_cookie_name = name.into();
        self
    }

    /// Set the preference cookie lifetime.
    pub fn preference_cookie_expiry_days(mut self, days: i64) -> Self {
        self.preference_cookie_expiry_days = days;
        self
    }

    /// Set the preference cookie `Secure` flag.
    pub fn preference_cookie_secure(mut self, secure: bool) -> Self {
        self.preference_cookie_secure = secure;
        self
    }

    /// Append a category to the manifest.
    pub fn category(mut self, entry: impl Into<ManifestEntry>) -> Self {
        self.category_manifest.push(entry.into());
        self
    }

    /// Set the default consent.
    pub fn default_consent(mut self, consent: bool) -> Self {
        self.default_consent = consent;
        self
    }

    /// Enable or disable deletion of uncategorized cookies.
    pub fn delete_undefined_cookies(mut self, delete: bool) -> Self {
        self.delete_undefined_cookies = delete;
        self
    }

    /// Enable or disable the banner.
    pub fn show_banner(mut self, show: bool) -> Self {
        self.show_banner = show;
        self
    }

    /// Enable or disable the preferences form.
    pub fn show_preferences_form(mut self, show: bool) -> Self {
        self.show_preferences_form = show;
        self
    }

    /// Reject configurations the consent core cannot enforce correctly.
    ///
    /// Malformed manifest entries are not an error here; they are dropped
    /// when the classifier is built.
    pub fn validate(&self) -> Result<(), ConsentError> {
        validate_cookie_name(&self.preference_cookie_name).map_err(|_| {
            ConsentError::invalid_config(format!(
                "preferenceCookieName {:?} is not a valid cookie name",
                self.preference_cookie_name
            ))
        })?;

        if !(1..=MAX_PREFERENCE_COOKIE_EXPIRY_DAYS).contains(&self.preference_cookie_expiry_days) {
            return Err(ConsentError::invalid_config(format!(
                "preferenceCookieExpiryDays must be between 1 and {}, got {}",
                MAX_PREFERENCE_COOKIE_EXPIRY_DAYS, self.preference_cookie_expiry_days
            )));
        }

        for entry in &self.category_manifest {
            if let ManifestEntry::Declared(decl) = entry {
                let name = decl.category_name.as_str();
                if name == INTERNAL_CATEGORY || name == UNCATEGORIZED {
                    return Err(ConsentError::invalid_config(format!(
                        "category name {:?} is reserved",
                        name
                    )));
                }
            }
        }

        Ok(())
    }
}
