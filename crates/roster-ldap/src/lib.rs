//! LDAP implementation of [`roster_core::store::DirectorySource`].
//!
//! Thin I/O wrapper with no decision logic: connect (optionally upgrading
//! with STARTTLS), simple bind, one BASE-scope search for the access group's
//! member list, one SUBTREE search for people. Everything the sync engine
//! decides on happens in `roster-core`.

pub mod error;

use std::collections::HashSet;

use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, Scope, SearchEntry};
use roster_core::{person::DirectoryPerson, store::DirectorySource};
use serde::Deserialize;
use tracing::{debug, warn};

pub use error::{Error, Result};

// ─── Attribute names ─────────────────────────────────────────────────────────

const ATTR_UID: &str = "uid";
const ATTR_NAME: &str = "cn";
const ATTR_MAIL: &str = "mail";
const ATTR_TITLE: &str = "title";
const ATTR_EMPLOYEE_TYPE: &str = "employeeType";
const ATTR_CONTRACT_START: &str = "fdContractStartDate";
const ATTR_CONTRACT_END: &str = "fdContractEndDate";

// ─── Configuration ───────────────────────────────────────────────────────────

/// Connection and search settings for the directory.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryConfig {
  /// e.g. `ldap://ldap.example.com` or `ldaps://ldap.example.com`.
  pub url:              String,
  pub bind_dn:          String,
  pub bind_password:    String,
  /// Upgrade a plain connection with STARTTLS before binding.
  #[serde(default)]
  pub use_starttls:     bool,
  /// DN of the access group gating who is synced.
  pub group_dn:         String,
  /// Attribute on the group entry holding member `unique_id`s.
  #[serde(default = "default_member_attribute")]
  pub member_attribute: String,
  /// Search base for people.
  pub people_base:      String,
  /// Search filter for people.
  pub people_filter:    String,
}

fn default_member_attribute() -> String {
  "memberUid".to_string()
}

// ─── Directory ───────────────────────────────────────────────────────────────

/// A bound LDAP connection plus the search settings for one sync run.
pub struct LdapDirectory {
  config: DirectoryConfig,
  ldap:   Ldap,
}

impl LdapDirectory {
  /// Connect and bind. The connection driver runs on a background task for
  /// the lifetime of the process.
  pub async fn connect(config: DirectoryConfig) -> Result<Self> {
    debug!("connecting to directory at {}", config.url);
    let settings =
      LdapConnSettings::new().set_starttls(config.use_starttls);
    let (conn, mut ldap) =
      LdapConnAsync::with_settings(settings, &config.url).await?;

    tokio::spawn(async move {
      if let Err(e) = conn.drive().await {
        warn!("LDAP connection driver error: {e}");
      }
    });

    debug!("binding as {}", config.bind_dn);
    ldap
      .simple_bind(&config.bind_dn, &config.bind_password)
      .await?
      .success()?;

    Ok(Self { config, ldap })
  }

  fn entry_to_person(entry: SearchEntry) -> DirectoryPerson {
    let first = |attr: &str| -> Option<String> {
      entry.attrs.get(attr).and_then(|v| v.first()).cloned()
    };

    DirectoryPerson {
      unique_id:       first(ATTR_UID).unwrap_or_default(),
      display_name:    first(ATTR_NAME).unwrap_or_default(),
      titles:          entry
        .attrs
        .get(ATTR_TITLE)
        .cloned()
        .unwrap_or_default(),
      raw_email:       first(ATTR_MAIL),
      employment_kind: first(ATTR_EMPLOYEE_TYPE),
      contract_start:  first(ATTR_CONTRACT_START),
      contract_end:    first(ATTR_CONTRACT_END),
      // Marked by the caller once the group member list is known.
      is_group_member: false,
    }
  }
}

impl DirectorySource for LdapDirectory {
  type Error = Error;

  async fn fetch_group_members(&mut self) -> Result<HashSet<String>> {
    let (entries, _) = self
      .ldap
      .search(
        &self.config.group_dn,
        Scope::Base,
        "(objectClass=*)",
        vec![self.config.member_attribute.as_str()],
      )
      .await?
      .success()?;

    // The group DN must resolve to exactly one entry.
    if entries.len() != 1 {
      return Err(Error::GroupCount {
        dn:    self.config.group_dn.clone(),
        count: entries.len(),
      });
    }

    let entry = SearchEntry::construct(entries.into_iter().next().unwrap());
    let members: HashSet<String> = entry
      .attrs
      .get(&self.config.member_attribute)
      .map(|values| values.iter().cloned().collect())
      .unwrap_or_default();

    debug!(
      "group {} has {} members",
      self.config.group_dn,
      members.len()
    );
    Ok(members)
  }

  async fn search_people(&mut self) -> Result<Vec<DirectoryPerson>> {
    let (entries, _) = self
      .ldap
      .search(
        &self.config.people_base,
        Scope::Subtree,
        &self.config.people_filter,
        vec![
          ATTR_NAME,
          ATTR_UID,
          ATTR_MAIL,
          ATTR_TITLE,
          ATTR_EMPLOYEE_TYPE,
          ATTR_CONTRACT_START,
          ATTR_CONTRACT_END,
        ],
      )
      .await?
      .success()?;

    let people: Vec<DirectoryPerson> = entries
      .into_iter()
      .map(SearchEntry::construct)
      .map(Self::entry_to_person)
      .collect();

    debug!("directory search returned {} people", people.len());
    Ok(people)
  }
}
