//! Error types for `roster-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A contract date from the directory matched none of the configured
  /// parser strategies. Fatal for the record being mapped, not for the run.
  #[error("could not parse directory date {value:?} for '{name}'")]
  DateFormat { name: String, value: String },

  /// The directory record carries no email address. Email is the sole join
  /// key, so such a record can never be reconciled.
  #[error("directory person '{name}' has no email address")]
  MissingEmail { name: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
