//! Ergonomic error context helpers.
//!
//! Provides extension traits for adding context to `Result` types,
//! converting JSON errors into context-rich `ConsentError` variants.

use crate::base::consenterror::ConsentError;

/// Extension trait for adding context to JSON Results.
pub trait JsonResultExt<T> {
    /// Attach the name of the cookie whose payload failed to parse.
    ///
    /// # Example
    /// ```ignore
    /// use cookiewarden::base::context::JsonResultExt;
    ///
    /// let value: serde_json::Value = serde_json::from_str(raw)
    ///     .cookie_context("cookie-consent-preferences")?;
    /// // Error: "Preference cookie \"cookie-consent-preferences\" is not valid JSON: ..."
    /// ```
    fn cookie_context(self, cookie: &str) -> Result<T, ConsentError>;
}

impl<T> JsonResultExt<T> for Result<T, serde_json::Error> {
    fn cookie_context(self, cookie: &str) -> Result<T, ConsentError> {
        self.map_err(|e| ConsentError::malformed_preferences(cookie, e.to_string()))
    }
}
