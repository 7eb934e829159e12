//! Cookie storage and the page-level cookie primitives.
//!
//! This module provides the browser side of consent enforcement:
//!
//! - **Storage**: In-memory cookie jar ([`CookieMonster`](monster::CookieMonster))
//! - **Document**: The `document.cookie` getter/setter pair ([`CookieDocument`](document::CookieDocument))
//! - **Primitives**: Decoded read, encoded write, and multi-scope delete ([`CookieAccess`](access::CookieAccess))
//! - **PSL**: Public-suffix checks for `Domain` attributes and parent-domain lookup
//!
//! # Architecture
//!
//! | Chromium (C++) | cookiewarden (Rust) | Responsibility |
//! |----------------|---------------------|----------------|
//! | `net::CookieMonster` | [`CookieMonster`](monster::CookieMonster) | Cookie jar |
//! | `net::CanonicalCookie` | [`CanonicalCookie`](canonical_cookie::CanonicalCookie) | Single cookie representation |
//! | `Document::cookie()` | [`CookieDocument`](document::CookieDocument) | Script-visible cookie string |
//!
//! # Deleting a cookie from script
//!
//! ```rust
//! use std::sync::Arc;
//! use cookiewarden::cookies::access::CookieAccess;
//! use cookiewarden::cookies::document::{CookieDocument, JarDocument};
//!
//! let doc = JarDocument::for_url("https://www.example.com/".parse().unwrap());
//! doc.write_cookie("_ga=GA1.2.3; Domain=example.com; Path=/");
//!
//! let access = CookieAccess::new(Arc::new(doc.clone()));
//! access.delete_cookie("_ga");
//! assert!(access.get_cookie("_ga").is_none());
//! ```

pub mod access;
pub mod canonical_cookie;
pub mod document;
pub mod monster;
pub mod psl;
