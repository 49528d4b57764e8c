//! The `DirectorySource` and `RemoteStore` traits.
//!
//! Implemented by the I/O crates (`roster-ldap`, `roster-sched`). The engine
//! and executor depend on these abstractions, not on any concrete backend;
//! connection, auth, and TLS setup are entirely the implementor's concern.

use std::collections::HashSet;

use crate::person::{
  CanonicalPerson, DirectoryPerson, RemoteAccount, RemotePerson,
};

/// The authoritative source of people and group memberships.
pub trait DirectorySource {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The `unique_id`s of everyone in the designated access group.
  async fn fetch_group_members(
    &mut self,
  ) -> Result<HashSet<String>, Self::Error>;

  /// All people matching the configured search base and filter.
  ///
  /// `is_group_member` is left `false` on the returned records; the caller
  /// marks membership with [`crate::person::mark_group_members`].
  async fn search_people(
    &mut self,
  ) -> Result<Vec<DirectoryPerson>, Self::Error>;
}

/// The scheduling system's person and account records.
///
/// Each mutating call must distinguish a rejection by the remote system
/// (invalid payload, unexpected status) from a transport failure; the
/// executor treats both as per-action, but the distinction matters for
/// operator logs.
pub trait RemoteStore {
  type Error: std::error::Error + Send + Sync + 'static;

  async fn list_people(&self) -> Result<Vec<RemotePerson>, Self::Error>;

  async fn list_accounts(&self) -> Result<Vec<RemoteAccount>, Self::Error>;

  /// Create a person; returns the new `people_id`.
  async fn create_person(
    &self,
    person: &CanonicalPerson,
  ) -> Result<i64, Self::Error>;

  async fn update_person(
    &self,
    people_id: i64,
    person: &CanonicalPerson,
  ) -> Result<(), Self::Error>;

  async fn delete_person(&self, people_id: i64) -> Result<(), Self::Error>;
}
