//! Error types for `roster-ldap`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("LDAP error: {0}")]
  Ldap(#[from] ldap3::LdapError),

  #[error("expected exactly one group entry at {dn}, found {count}")]
  GroupCount { dn: String, count: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
