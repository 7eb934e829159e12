//! The visitor-facing consent UI.
//!
//! Rendering lives outside this crate. A surface is handed the current record
//! when it should appear; choices come back through
//! [`CookieConsent`](crate::consent::CookieConsent)'s consent actions
//! (`accept_all`, `reject_all`, `update_preferences`, `set_category`).

use crate::consent::preferences::PreferenceRecord;

pub trait ConsentSurface: Send + Sync {
    /// Show the banner. Only called while the visitor has no stored choice.
    fn show_banner(&self, current: &PreferenceRecord);

    /// Wire the preferences form, pre-filled with `current`.
    fn show_preferences_form(&self, current: &PreferenceRecord);
}
