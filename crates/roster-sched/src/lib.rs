//! HTTP implementation of [`roster_core::store::RemoteStore`] for the
//! scheduling service's JSON REST API.
//!
//! Thin I/O wrapper: bearer-token auth, paginated listing, and the five
//! person/account operations. Rejections by the service (non-2xx) are kept
//! distinct from transport failures so the executor can log them usefully.

pub mod client;
pub mod error;

pub use client::{SchedClient, SchedConfig};
pub use error::{Error, Result};
