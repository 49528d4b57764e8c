//! Error types for `roster-sched`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The request never completed: connection, TLS, timeout, or a body that
  /// failed to read or deserialise.
  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),

  /// The service answered with an unexpected status — invalid payload,
  /// unknown id, auth failure. Always actionable from the body.
  #[error("{method} {path} rejected with status {status}: {body}")]
  Rejected {
    method: &'static str,
    path:   String,
    status: reqwest::StatusCode,
    body:   String,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
