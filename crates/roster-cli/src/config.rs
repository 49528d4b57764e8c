//! Typed configuration, loaded from a TOML file with a `ROSTER`-prefixed
//! environment overlay.
//!
//! Every value is an explicit typed field validated before any directory or
//! remote I/O happens; there is no string evaluation anywhere. Override
//! pairs and the guest list are plain serde lists.

use std::path::Path;

use anyhow::{Context, bail};
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Deserialize)]
pub struct Config {
  pub directory: roster_ldap::DirectoryConfig,
  pub remote:    roster_sched::SchedConfig,
  pub sync:      SyncConfig,
}

/// Reconciliation policy and mapping settings.
#[derive(Debug, Deserialize)]
pub struct SyncConfig {
  /// People are deleted once their end date is this many days in the past.
  pub delete_after_days:      u32,
  /// Hard cap on expiry deletions per invocation. Zero disables them.
  pub max_users_to_delete:    u32,
  /// Accounts expected to have no matching person record.
  #[serde(default)]
  pub valid_guests:           Vec<String>,
  /// Ordered `(old_domain, new_domain)` substring-replacement pairs.
  #[serde(default)]
  pub email_domain_overrides: Vec<(String, String)>,
  /// Format contract dates are stored in by the directory.
  pub source_date_format:     String,
}

impl Config {
  /// Read and validate the configuration. Fails before any I/O when a value
  /// is out of range.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path))
      .add_source(config::Environment::with_prefix("ROSTER"))
      .build()
      .context("failed to read config file")?;

    let config: Config = settings
      .try_deserialize()
      .context("failed to deserialise configuration")?;

    config.sync.validate()?;
    Ok(config)
  }
}

impl SyncConfig {
  fn validate(&self) -> anyhow::Result<()> {
    // max_users_to_delete is unsigned by type; zero is a valid value that
    // disables expiry deletions entirely.
    if self.delete_after_days == 0 {
      bail!(
        "config sync.delete_after_days must be positive, got {}",
        self.delete_after_days
      );
    }
    Ok(())
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
