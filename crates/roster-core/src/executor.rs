//! Action executor: applies the plan against the remote store.
//!
//! Failures are isolated per action — one rejected operation never aborts
//! the run. Every success and failure is logged with the acting person's
//! name for operator visibility.

use tracing::{error, info, warn};

use crate::{
  person::RemotePerson,
  reconcile::{Action, DeleteReason},
  store::RemoteStore,
};

/// What happened when the plan was applied.
#[derive(Debug, Default)]
pub struct RunReport {
  pub created: usize,
  pub updated: usize,
  pub deleted: usize,
  pub failed:  Vec<ActionFailure>,
}

/// One action that the remote system rejected or that failed in transit.
#[derive(Debug)]
pub struct ActionFailure {
  /// Display name of the person the action targeted.
  pub name:  String,
  /// `"create"`, `"update"`, or `"delete"`.
  pub kind:  &'static str,
  pub error: String,
}

impl RunReport {
  fn record_failure(
    &mut self,
    name: &str,
    kind: &'static str,
    error: impl std::fmt::Display,
  ) {
    error!("could not {kind} '{name}': {error}");
    self.failed.push(ActionFailure {
      name: name.to_string(),
      kind,
      error: error.to_string(),
    });
  }
}

/// Apply each action in order, continuing past individual failures.
pub async fn execute<S: RemoteStore>(
  store: &S,
  actions: Vec<Action>,
) -> RunReport {
  let mut report = RunReport::default();

  for action in actions {
    match action {
      Action::Create(person) => {
        match store.create_person(&person).await {
          Ok(people_id) => {
            info!("added '{}' ({people_id}) to the scheduling system", person.name);
            report.created += 1;
          }
          Err(e) => report.record_failure(&person.name, "create", e),
        }
      }
      Action::Update { people_id, person } => {
        match store.update_person(people_id, &person).await {
          Ok(()) => {
            info!("updated '{}'", person.name);
            report.updated += 1;
          }
          Err(e) => report.record_failure(&person.name, "update", e),
        }
      }
      Action::Delete {
        people_id,
        name,
        reason,
      } => match store.delete_person(people_id).await {
        Ok(()) => {
          info!("deleted '{name}': {reason}");
          report.deleted += 1;
        }
        Err(e) => report.record_failure(&name, "delete", e),
      },
    }
  }

  report
}

/// Delete every remote person that has no email address.
///
/// Email is the join key; a keyless record can never be reconciled, so it is
/// removed before the snapshot is built. Runs ahead of planning, and like
/// the executor proper it continues past individual failures.
pub async fn purge_missing_email<S: RemoteStore>(
  store: &S,
  people: &[RemotePerson],
) -> RunReport {
  let mut report = RunReport::default();

  for person in people.iter().filter(|p| p.email().is_none()) {
    match store.delete_person(person.people_id).await {
      Ok(()) => {
        warn!(
          "deleted '{}': {}",
          person.fields.name,
          DeleteReason::MissingEmail
        );
        report.deleted += 1;
      }
      Err(e) => {
        report.record_failure(&person.fields.name, "delete", e);
      }
    }
  }

  report
}

// ─── Tests ───────────────────────────────────────────────────────────────────
