//! Base types and error handling.
//!
//! Provides foundational types shared by the cookie and consent layers:
//! - [`ConsentError`](consenterror::ConsentError): the crate-wide error type
//! - [`JsonResultExt`](context::JsonResultExt): context for JSON failures

pub mod consenterror;
pub mod context;
