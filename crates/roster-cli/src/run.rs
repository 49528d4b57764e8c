//! One sync run, start to finish.
//!
//! Sequential batch pass: remote bulk fetch → missing-email purge →
//! directory fetch → reconciliation plan → execution → anomaly report.
//! Errors returned from here abort the run with exit code 1; everything
//! after the bulk fetches is per-action and never propagates.

use std::path::Path;

use anyhow::Context;
use chrono::Local;
use roster_core::{
  executor,
  map::MapContext,
  person::mark_group_members,
  reconcile::{self, DeletionPolicy, RemoteSnapshot},
  report,
  store::{DirectorySource, RemoteStore},
};
use roster_ldap::LdapDirectory;
use roster_sched::SchedClient;
use tracing::{error, info, warn};

use crate::config::Config;

pub async fn run(config_path: &Path) -> anyhow::Result<()> {
  let config = Config::load(config_path)?;
  info!("starting sync run");

  let sched = SchedClient::new(config.remote)
    .context("failed to build scheduling API client")?;

  // The one bulk fetch every decision this run is made against. Failure
  // here is the only error that aborts with nothing mutated at all.
  let remote_people = sched
    .list_people()
    .await
    .context("could not fetch people from the scheduling service")?;
  info!("fetched {} people from the scheduling service", remote_people.len());

  // Records without an email carry no join key; remove them up front.
  let purge = executor::purge_missing_email(&sched, &remote_people).await;
  if purge.deleted > 0 {
    info!("purged {} people without an email address", purge.deleted);
  }

  let snapshot = RemoteSnapshot::new(remote_people);

  // Directory side.
  let mut directory = LdapDirectory::connect(config.directory)
    .await
    .context("could not connect to the directory")?;
  let members = directory
    .fetch_group_members()
    .await
    .context("could not fetch the access group")?;
  let mut directory_people = directory
    .search_people()
    .await
    .context("could not search the directory for people")?;
  mark_group_members(&mut directory_people, &members);
  info!(
    "fetched {} directory people, {} access group members",
    directory_people.len(),
    members.len()
  );

  let ctx = MapContext {
    email_domain_overrides: config.sync.email_domain_overrides,
    source_date_format:     config.sync.source_date_format,
    today:                  Local::now().date_naive(),
  };
  let policy = DeletionPolicy {
    grace_days:    config.sync.delete_after_days,
    max_deletions: config.sync.max_users_to_delete,
  };

  let plan = reconcile::plan(&directory_people, &snapshot, &ctx, &policy);
  info!(
    "plan: {} action(s), {} mapping failure(s), {} expiry deletion(s) over cap",
    plan.actions.len(),
    plan.mapping_failures,
    plan.capped_expiries
  );

  let result = executor::execute(&sched, plan.actions).await;

  // Anomaly checks, against the pre-mutation snapshot. Read-only.
  for person in
    report::unmatched_remote_people(&snapshot, &plan.eligible_emails)
  {
    warn!(
      "'{}' with email '{}' has no eligible directory entry",
      person.fields.name, person.fields.email
    );
  }
  match sched.list_accounts().await {
    Ok(accounts) => {
      for account in
        report::unknown_accounts(&accounts, &snapshot, &config.sync.valid_guests)
      {
        warn!(
          "account '{}' with email '{}' has no matching person",
          account.name,
          account.email.as_deref().unwrap_or("")
        );
      }
    }
    // The people-side checks already ran; losing the guest check is not
    // worth aborting a completed run for.
    Err(e) => error!("could not fetch accounts: {e}"),
  }

  info!(
    "sync run done: {} created, {} updated, {} deleted, {} failed",
    result.created,
    result.updated,
    result.deleted + purge.deleted,
    result.failed.len() + purge.failed.len()
  );

  Ok(())
}
