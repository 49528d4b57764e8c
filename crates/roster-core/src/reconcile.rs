//! Reconciliation engine: directory snapshot + remote snapshot → ordered
//! action list.
//!
//! Computes the create/update/delete set that aligns the scheduling system
//! with the directory, then applies the deletion policy (grace period,
//! per-run cap) before any destructive action reaches the executor. Pure
//! except for logging; nothing here touches the network.

use std::collections::{HashMap, HashSet};

use chrono::Days;
use tracing::{debug, error, warn};

use crate::{
  map::{MapContext, map_person},
  person::{CanonicalPerson, DirectoryPerson, RemotePerson},
};

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// The remote people fetched at the start of the run, keyed by email.
///
/// Read once, never re-fetched; every decision this run is made against this
/// point-in-time copy. Records without an email carry no join key and are
/// excluded (they are purged separately, see
/// [`crate::executor::purge_missing_email`]).
#[derive(Debug, Default)]
pub struct RemoteSnapshot {
  by_email: HashMap<String, RemotePerson>,
}

impl RemoteSnapshot {
  pub fn new(people: Vec<RemotePerson>) -> Self {
    let by_email = people
      .into_iter()
      .filter(|p| p.email().is_some())
      .map(|p| (p.fields.email.clone(), p))
      .collect();
    Self { by_email }
  }

  pub fn get(&self, email: &str) -> Option<&RemotePerson> {
    self.by_email.get(email)
  }

  pub fn contains(&self, email: &str) -> bool {
    self.by_email.contains_key(email)
  }

  pub fn len(&self) -> usize {
    self.by_email.len()
  }

  pub fn is_empty(&self) -> bool {
    self.by_email.is_empty()
  }

  pub fn people(&self) -> impl Iterator<Item = &RemotePerson> {
    self.by_email.values()
  }
}

// ─── Actions ─────────────────────────────────────────────────────────────────

/// Why a person is being removed from the scheduling system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteReason {
  /// No longer (or never) a member of the designated access group.
  NotGroupMember,
  /// Contract end date is more than the grace period in the past.
  Expired,
  /// The remote record has no email and can never be reconciled.
  MissingEmail,
}

impl std::fmt::Display for DeleteReason {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      DeleteReason::NotGroupMember => f.write_str("not a group member"),
      DeleteReason::Expired => f.write_str("expired"),
      DeleteReason::MissingEmail => f.write_str("missing email"),
    }
  }
}

/// One mutation of the remote system. Constructed here, consumed exactly
/// once by the executor, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
  Create(CanonicalPerson),
  Update {
    people_id: i64,
    person:    CanonicalPerson,
  },
  Delete {
    people_id: i64,
    name:      String,
    reason:    DeleteReason,
  },
}

// ─── Policy ──────────────────────────────────────────────────────────────────

/// Bounds on destructive actions.
#[derive(Debug, Clone, Copy)]
pub struct DeletionPolicy {
  /// Days past a person's end date before they become eligible for expiry
  /// deletion.
  pub grace_days:    u32,
  /// Hard cap on expiry deletions per run. Access-loss deletions are not
  /// counted against it.
  pub max_deletions: u32,
}

// ─── Plan ────────────────────────────────────────────────────────────────────

/// The engine's output: the ordered action list plus counters for the
/// end-of-run summary.
#[derive(Debug, Default)]
pub struct Plan {
  /// Creates first, then updates and access-loss deletes, then expiry
  /// deletes — a freshly created person can never be deleted by stale state
  /// in the same pass, and access loss takes priority over expiry.
  pub actions:          Vec<Action>,
  /// Directory records skipped because mapping failed.
  pub mapping_failures: usize,
  /// Expiry deletions skipped because the per-run cap was reached.
  pub capped_expiries:  usize,
  /// Emails of eligible directory people seen this run, post-override.
  /// Input to the anomaly reporter.
  pub eligible_emails:  HashSet<String>,
}

/// Compute the ordered action list that reconciles `remote` with `directory`.
///
/// Decision rules, per directory person `d` with canonical form `c`:
///
/// 1. `c.email` absent from remote and contract not already ended → Create.
/// 2. `c.email` present and `d` not a group member → Delete (access loss);
///    no update is attempted for that person.
/// 3. `c.email` present, `d` a group member, any field differs → Update.
/// 4. Independently, anyone present remotely whose end date is more than
///    `grace_days` in the past → Delete (expiry), capped at
///    `max_deletions` per run; skips past the cap are logged, not queued.
///
/// People absent from the directory snapshot entirely are never touched —
/// disappearance is not a deletion trigger, only explicit group-membership
/// loss or expiry.
pub fn plan(
  directory: &[DirectoryPerson],
  remote: &RemoteSnapshot,
  ctx: &MapContext,
  policy: &DeletionPolicy,
) -> Plan {
  let mut plan = Plan::default();

  // Map every directory record up front. A record that fails to map (no
  // email, unparsable date) is skipped with an error log and never affects
  // the action list.
  let mut mapped: Vec<(&DirectoryPerson, CanonicalPerson)> = Vec::new();
  for person in directory {
    match map_person(ctx, person) {
      Ok(canonical) => mapped.push((person, canonical)),
      Err(e) => {
        error!("skipping directory record: {e}");
        plan.mapping_failures += 1;
      }
    }
  }

  for (person, canonical) in &mapped {
    if person.is_group_member {
      plan.eligible_emails.insert(canonical.email.clone());
    }
  }

  // Pass 1: creates.
  for (person, canonical) in &mapped {
    if !person.is_group_member {
      debug!(
        "'{}' is not a member of the access group, not creating",
        canonical.name
      );
      continue;
    }
    if remote.contains(&canonical.email) {
      debug!("'{}' already present remotely, not creating", canonical.name);
      continue;
    }
    // Never create someone whose contract has already ended.
    if canonical.end_date.is_some_and(|end| end < ctx.today) {
      debug!(
        "not creating '{}': end date is in the past",
        canonical.name
      );
      continue;
    }
    plan.actions.push(Action::Create(canonical.clone()));
  }

  // Pass 2: updates and access-loss deletes. Track deleted ids so the
  // expiry pass cannot emit a second delete for the same person.
  let mut deleted_ids: HashSet<i64> = HashSet::new();
  for (person, canonical) in &mapped {
    let Some(existing) = remote.get(&canonical.email) else {
      continue;
    };

    if !person.is_group_member {
      deleted_ids.insert(existing.people_id);
      plan.actions.push(Action::Delete {
        people_id: existing.people_id,
        name:      canonical.name.clone(),
        reason:    DeleteReason::NotGroupMember,
      });
      continue;
    }

    if existing.fields != *canonical {
      plan.actions.push(Action::Update {
        people_id: existing.people_id,
        person:    canonical.clone(),
      });
    } else {
      debug!("'{}' is up to date", canonical.name);
    }
  }

  // Pass 3: expiry deletes, bounded by the per-run cap.
  let mut expiry_deletions = 0u32;
  for (_, canonical) in &mapped {
    let Some(existing) = remote.get(&canonical.email) else {
      continue;
    };
    if deleted_ids.contains(&existing.people_id) {
      continue;
    }
    let Some(end_date) = canonical.end_date else {
      continue;
    };
    let cutoff = end_date
      .checked_add_days(Days::new(u64::from(policy.grace_days)))
      .unwrap_or(end_date);
    if cutoff >= ctx.today {
      continue;
    }

    if expiry_deletions >= policy.max_deletions {
      warn!(
        "not deleting '{}': {} users already deleted this run",
        canonical.name, expiry_deletions
      );
      plan.capped_expiries += 1;
      continue;
    }

    expiry_deletions += 1;
    deleted_ids.insert(existing.people_id);
    plan.actions.push(Action::Delete {
      people_id: existing.people_id,
      name:      canonical.name.clone(),
      reason:    DeleteReason::Expired,
    });
  }

  plan
}

// ─── Tests ───────────────────────────────────────────────────────────────────
