use thiserror::Error;

/// Errors raised by the consent core.
///
/// Only [`ConsentError::InvalidConfig`] ever escapes initialization. The
/// preference-cookie variants are produced while loading stored consent and
/// are recovered from locally by discarding the cookie and rebuilding the
/// record from defaults.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConsentError {
    // Configuration Errors
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
    #[error("Invalid cookie name: {name:?}")]
    InvalidCookieName { name: String },
    #[error("Cookie expiry of {days} days is out of range")]
    ExpiryOutOfRange { days: i64 },

    // Preference Cookie Errors
    #[error("Preference cookie {cookie:?} is not valid JSON: {reason}")]
    MalformedPreferenceCookie { cookie: String, reason: String },
    #[error("Preference cookie {cookie:?} is not a record of strings (found {found})")]
    PreferenceShape { cookie: String, found: String },
    #[error("Stored preferences have no entry for category {category:?}")]
    MissingPreference { category: String },

    // Usage Errors
    #[error("Preferences queried before they were processed")]
    PreferencesNotLoaded,
}

impl ConsentError {
    /// Create an invalid configuration error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create an invalid cookie name error.
    pub fn invalid_cookie_name(name: impl Into<String>) -> Self {
        Self::InvalidCookieName { name: name.into() }
    }

    /// Create an out-of-range expiry error.
    pub fn expiry_out_of_range(days: i64) -> Self {
        Self::ExpiryOutOfRange { days }
    }

    /// Create a malformed preference cookie error.
    pub fn malformed_preferences(cookie: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedPreferenceCookie {
            cookie: cookie.into(),
            reason: reason.into(),
        }
    }

    /// Create a wrong-shape preference cookie error.
    pub fn preference_shape(cookie: impl Into<String>, found: impl Into<String>) -> Self {
        Self::PreferenceShape {
            cookie: cookie.into(),
            found: found.into(),
        }
    }

    /// Create a missing preference error.
    pub fn missing_preference(category: impl Into<String>) -> Self {
        Self::MissingPreference {
            category: category.into(),
        }
    }

    /// Whether this error is recovered from by discarding the stored
    /// preference cookie.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MalformedPreferenceCookie { .. }
                | Self::PreferenceShape { .. }
                | Self::MissingPreference { .. }
                | Self::PreferencesNotLoaded
        )
    }
}
