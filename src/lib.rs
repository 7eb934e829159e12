//! # cookiewarden
//!
//! Cookie consent enforcement for a page's cookie jar.
//!
//! `cookiewarden` reconciles the cookies a page actually holds against a
//! site-declared category manifest and the visitor's stored consent, and
//! deletes every cookie the visitor has not agreed to.
//!
//! ## Features
//!
//! - **Manifest Matching**: `exact`, `startsWith` and `includes` cookie-name patterns
//! - **Stored Consent**: Compact `"on"`/`"off"` record in a cookie, migrated when the manifest changes
//! - **Cookie Sweeping**: Deletion across host and parent-domain scopes
//! - **Lifecycle Events**: Per-instance event bus for loaded/set/saved/swept notifications
//! - **Cookie Jar**: Chromium-inspired in-memory jar with PSL validation for running off-browser
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use cookiewarden::consent::{CategoryDecl, ConsentConfig, CookieConsent};
//! use cookiewarden::cookies::document::{CookieDocument, JarDocument};
//!
//! let page = JarDocument::for_url("https://www.example.com/".parse().unwrap());
//! page.write_cookie("session=abc");
//! page.write_cookie("_ga=GA1.2.3");
//!
//! let consent = CookieConsent::builder()
//!     .config(
//!         ConsentConfig::new()
//!             .category(CategoryDecl::new("essential", ["session"]).optional(false))
//!             .category(CategoryDecl::new("analytics", ["_ga"])),
//!     )
//!     .document(Arc::new(page.clone()))
//!     .init()
//!     .unwrap();
//!
//! assert!(!consent.preferences().is_granted("analytics"));
//! assert!(page.has_cookie("session"));
//! assert!(!page.has_cookie("_ga"));
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error type and error context helpers
//! - [`cookies`] - Cookie jar, `document.cookie` facade and cookie primitives
//! - [`consent`] - Classifier, preference store, sweeper and controller

pub mod base;
pub mod consent;
pub mod cookies;
