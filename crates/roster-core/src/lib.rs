//! Core types and reconciliation logic for the roster directory sync.
//!
//! This crate is deliberately free of LDAP and HTTP dependencies. It defines
//! the person records on both sides of the sync boundary, the field mapper
//! that projects directory records into the scheduling system's shape, the
//! reconciliation engine that computes create/update/delete actions, the
//! executor that applies them, and the post-run anomaly checks. The I/O
//! crates (`roster-ldap`, `roster-sched`) implement the traits in
//! [`store`]; the binary wires everything together.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod executor;
pub mod map;
pub mod person;
pub mod reconcile;
pub mod report;
pub mod store;

pub use error::{Error, Result};
