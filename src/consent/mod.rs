//! Consent enforcement.
//!
//! Components, leaf first:
//!
//! | Component | Responsibility |
//! |-----------|----------------|
//! | [`ManifestClassifier`](manifest::ManifestClassifier) | Cookie name -> declared category |
//! | [`PreferenceStore`](preferences::PreferenceStore) | Load, validate, migrate and persist consent |
//! | [`CookieSweeper`](sweeper::CookieSweeper) | Delete cookies lacking consent |
//! | [`CookieConsent`](controller::CookieConsent) | Sequence the above for one page |
//!
//! Preferences must be processed before the first sweep; the controller
//! guarantees that ordering.

pub mod config;
pub mod controller;
pub mod events;
pub mod manifest;
pub mod preferences;
pub mod surface;
pub mod sweeper;

pub use config::{CategoryDecl, ConsentConfig, ManifestEntry};
pub use controller::{CookieConsent, CookieConsentBuilder};
pub use events::{ConsentEvent, EventBus, EventKind, ListenerId};
pub use manifest::{Category, Classification, ManifestClassifier, MatchStrategy};
pub use preferences::{LoadState, PreferenceRecord, PreferenceStore};
pub use surface::ConsentSurface;
pub use sweeper::{CookieSweeper, SweepReport};
