//! Post-run anomaly checks. Read-only; nothing here mutates the remote
//! system.
//!
//! Runs against the pre-mutation snapshot — the remote side is fetched once
//! per run and never re-read, so these are drift reports, not guarantees
//! about the post-run state.

use std::collections::HashSet;

use crate::{
  person::{RemoteAccount, RemotePerson},
  reconcile::RemoteSnapshot,
};

/// Remote people whose email has no eligible directory counterpart this run.
///
/// Informational only — disappearance from the directory is not a deletion
/// trigger.
pub fn unmatched_remote_people<'a>(
  snapshot: &'a RemoteSnapshot,
  eligible_emails: &HashSet<String>,
) -> Vec<&'a RemotePerson> {
  let mut unmatched: Vec<&RemotePerson> = snapshot
    .people()
    .filter(|p| !eligible_emails.contains(&p.fields.email))
    .collect();
  unmatched.sort_by_key(|p| p.people_id);
  unmatched
}

/// Accounts whose email matches neither a known remote person nor the guest
/// allow-list.
pub fn unknown_accounts<'a>(
  accounts: &'a [RemoteAccount],
  snapshot: &RemoteSnapshot,
  valid_guests: &[String],
) -> Vec<&'a RemoteAccount> {
  accounts
    .iter()
    .filter(|a| match a.email.as_deref() {
      Some(email) => {
        !valid_guests.iter().any(|g| g == email)
          && !snapshot.contains(email)
      }
      // An account without an email can match neither list.
      None => true,
    })
    .collect()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use crate::person::{CanonicalPerson, EmployeeType, PeopleType};

  fn remote(people_id: i64, email: &str) -> RemotePerson {
    RemotePerson {
      people_id,
      fields: CanonicalPerson {
        name:           format!("Person {people_id}"),
        email:          email.to_string(),
        job_title:      None,
        start_date:     None,
        end_date:       None,
        active:         true,
        employee_type:  EmployeeType::PartTime,
        people_type_id: PeopleType::Contractor,
      },
    }
  }

  fn account(account_id: i64, email: Option<&str>) -> RemoteAccount {
    RemoteAccount {
      account_id,
      name: format!("Account {account_id}"),
      email: email.map(String::from),
    }
  }

  #[test]
  fn flags_remote_people_unknown_to_the_directory() {
    let snapshot = RemoteSnapshot::new(vec![
      remote(1, "known@co.com"),
      remote(2, "drifted@co.com"),
    ]);
    let eligible: HashSet<String> = ["known@co.com".to_string()].into();

    let unmatched = unmatched_remote_people(&snapshot, &eligible);
    assert_eq!(unmatched.len(), 1);
    assert_eq!(unmatched[0].people_id, 2);
  }

  #[test]
  fn flags_accounts_without_person_or_guest_entry() {
    let snapshot = RemoteSnapshot::new(vec![remote(1, "jane@co.com")]);
    let guests = vec!["guest@partner.com".to_string()];
    let accounts = vec![
      account(10, Some("jane@co.com")),      // matches a person
      account(11, Some("guest@partner.com")), // allow-listed
      account(12, Some("stranger@co.com")),  // flagged
      account(13, None),                     // flagged
    ];

    let unknown = unknown_accounts(&accounts, &snapshot, &guests);
    let ids: Vec<i64> = unknown.iter().map(|a| a.account_id).collect();
    assert_eq!(ids, vec![12, 13]);
  }
}
