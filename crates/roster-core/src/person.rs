//! Person records on both sides of the sync boundary.
//!
//! [`DirectoryPerson`] is the raw shape fetched from the directory;
//! [`CanonicalPerson`] is its projection into the scheduling system's person
//! schema (see [`crate::map`]); [`RemotePerson`] and [`RemoteAccount`] mirror
//! what the scheduling API returns. Email is the sole join key between the
//! two sides.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ─── Directory side ──────────────────────────────────────────────────────────

/// One entry from the directory, untouched except for attribute extraction.
///
/// Contract dates stay raw strings until mapping; the directory serialises
/// them either in a site-specific format or as generalized-time values, and
/// the mapper owns that decision.
#[derive(Debug, Clone, Default)]
pub struct DirectoryPerson {
  /// Stable identifier, used only for group-membership checks.
  pub unique_id:       String,
  pub display_name:    String,
  /// Multi-valued in the directory; joined with `", "` at mapping time.
  pub titles:          Vec<String>,
  pub raw_email:       Option<String>,
  /// Categorical, e.g. `"employee"` vs. anything else.
  pub employment_kind: Option<String>,
  pub contract_start:  Option<String>,
  pub contract_end:    Option<String>,
  /// True iff `unique_id` appears in the designated access group.
  pub is_group_member: bool,
}

/// Mark each person whose `unique_id` appears in `members` as a group member.
pub fn mark_group_members(
  people: &mut [DirectoryPerson],
  members: &HashSet<String>,
) {
  for person in people.iter_mut() {
    person.is_group_member = members.contains(&person.unique_id);
  }
}

// ─── Canonical (scheduling-system) shape ─────────────────────────────────────

/// Full time vs. part time, serialised as the API's `0`/`1` integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmployeeType {
  #[default]
  PartTime,
  FullTime,
}

/// Employee vs. contractor category, serialised as the API's `1`/`2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeopleType {
  Employee,
  #[default]
  Contractor,
}

/// A directory person projected into the scheduling system's person schema.
///
/// Derives `PartialEq` over the full field set — update detection is a plain
/// `!=` against the existing remote record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalPerson {
  #[serde(default)]
  pub name:           String,
  #[serde(default)]
  pub email:          String,
  #[serde(default, deserialize_with = "de_opt_string")]
  pub job_title:      Option<String>,
  #[serde(default, with = "opt_date")]
  pub start_date:     Option<NaiveDate>,
  #[serde(default, with = "opt_date")]
  pub end_date:       Option<NaiveDate>,
  #[serde(with = "int_bool")]
  pub active:         bool,
  pub employee_type:  EmployeeType,
  pub people_type_id: PeopleType,
}

// ─── Remote side ─────────────────────────────────────────────────────────────

/// A person record already present in the scheduling system. The remote
/// system owns this data; we hold a point-in-time read copy for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemotePerson {
  pub people_id: i64,
  #[serde(flatten)]
  pub fields:    CanonicalPerson,
}

impl RemotePerson {
  /// The join key, if this record has one.
  pub fn email(&self) -> Option<&str> {
    if self.fields.email.is_empty() {
      None
    } else {
      Some(&self.fields.email)
    }
  }
}

/// A login-capable entity in the scheduling system, linked to a person by
/// email or orphaned ("guest").
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteAccount {
  pub account_id: i64,
  #[serde(default)]
  pub name:       String,
  #[serde(default, deserialize_with = "de_opt_string")]
  pub email:      Option<String>,
}

// ─── Serde helpers ───────────────────────────────────────────────────────────

/// The API sends `""` where it means "no value"; collapse that to `None` so
/// field-wise comparison against freshly-mapped records is stable.
fn de_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: serde::Deserializer<'de>,
{
  let value = Option::<String>::deserialize(deserializer)?;
  Ok(value.filter(|s| !s.is_empty()))
}

/// `YYYY-MM-DD` on the wire, [`NaiveDate`] in memory. Empty strings and
/// nulls both read as `None`.
mod opt_date {
  use chrono::NaiveDate;
  use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

  const FORMAT: &str = "%Y-%m-%d";

  pub fn serialize<S>(
    date: &Option<NaiveDate>,
    serializer: S,
  ) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    match date {
      Some(d) => {
        serializer.serialize_str(&d.format(FORMAT).to_string())
      }
      None => serializer.serialize_none(),
    }
  }

  pub fn deserialize<'de, D>(
    deserializer: D,
  ) -> Result<Option<NaiveDate>, D::Error>
  where
    D: Deserializer<'de>,
  {
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref() {
      None | Some("") => Ok(None),
      Some(s) => NaiveDate::parse_from_str(s, FORMAT)
        .map(Some)
        .map_err(D::Error::custom),
    }
  }
}

/// `active` is `0`/`1` on the wire. Accept booleans too — some endpoints
/// return them.
mod int_bool {
  use serde::{Deserializer, Serializer, de::Visitor};

  pub fn serialize<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.serialize_u8(u8::from(*value))
  }

  pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
  where
    D: Deserializer<'de>,
  {
    struct IntBoolVisitor;

    impl Visitor<'_> for IntBoolVisitor {
      type Value = bool;

      fn expecting(
        &self,
        f: &mut std::fmt::Formatter<'_>,
      ) -> std::fmt::Result {
        f.write_str("0, 1, or a boolean")
      }

      fn visit_bool<E: serde::de::Error>(self, v: bool) -> Result<bool, E> {
        Ok(v)
      }

      fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<bool, E> {
        Ok(v != 0)
      }

      fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<bool, E> {
        Ok(v != 0)
      }
    }

    deserializer.deserialize_any(IntBoolVisitor)
  }
}

impl Serialize for EmployeeType {
  fn serialize<S: serde::Serializer>(
    &self,
    serializer: S,
  ) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(match self {
      EmployeeType::PartTime => 0,
      EmployeeType::FullTime => 1,
    })
  }
}

impl<'de> Deserialize<'de> for EmployeeType {
  fn deserialize<D: serde::Deserializer<'de>>(
    deserializer: D,
  ) -> Result<Self, D::Error> {
    match u8::deserialize(deserializer)? {
      0 => Ok(EmployeeType::PartTime),
      1 => Ok(EmployeeType::FullTime),
      other => Err(serde::de::Error::custom(format!(
        "unknown employee_type: {other}"
      ))),
    }
  }
}

impl Serialize for PeopleType {
  fn serialize<S: serde::Serializer>(
    &self,
    serializer: S,
  ) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(match self {
      PeopleType::Employee => 1,
      PeopleType::Contractor => 2,
    })
  }
}

impl<'de> Deserialize<'de> for PeopleType {
  fn deserialize<D: serde::Deserializer<'de>>(
    deserializer: D,
  ) -> Result<Self, D::Error> {
    match u8::deserialize(deserializer)? {
      1 => Ok(PeopleType::Employee),
      2 => Ok(PeopleType::Contractor),
      other => Err(serde::de::Error::custom(format!(
        "unknown people_type_id: {other}"
      ))),
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn remote_person_from_api_json() {
    let raw = r#"{
      "people_id": 42,
      "name": "Alice Smith",
      "email": "alice@example.com",
      "job_title": "",
      "start_date": "2024-01-15",
      "end_date": null,
      "active": 1,
      "employee_type": 1,
      "people_type_id": 1
    }"#;
    let person: RemotePerson = serde_json::from_str(raw).unwrap();
    assert_eq!(person.people_id, 42);
    assert_eq!(person.email(), Some("alice@example.com"));
    // Empty string collapses to None.
    assert_eq!(person.fields.job_title, None);
    assert_eq!(
      person.fields.start_date,
      NaiveDate::from_ymd_opt(2024, 1, 15)
    );
    assert_eq!(person.fields.end_date, None);
    assert!(person.fields.active);
    assert_eq!(person.fields.employee_type, EmployeeType::FullTime);
    assert_eq!(person.fields.people_type_id, PeopleType::Employee);
  }

  #[test]
  fn canonical_person_serialises_wire_integers() {
    let person = CanonicalPerson {
      name:           "Bob".into(),
      email:          "bob@example.com".into(),
      job_title:      None,
      start_date:     None,
      end_date:       NaiveDate::from_ymd_opt(2020, 1, 1),
      active:         false,
      employee_type:  EmployeeType::PartTime,
      people_type_id: PeopleType::Contractor,
    };
    let value = serde_json::to_value(&person).unwrap();
    assert_eq!(value["active"], 0);
    assert_eq!(value["employee_type"], 0);
    assert_eq!(value["people_type_id"], 2);
    assert_eq!(value["end_date"], "2020-01-01");
  }

  #[test]
  fn mark_group_members_matches_on_unique_id() {
    let mut people = vec![
      DirectoryPerson {
        unique_id: "jdoe".into(),
        ..Default::default()
      },
      DirectoryPerson {
        unique_id: "asmith".into(),
        ..Default::default()
      },
    ];
    let members: HashSet<String> = ["jdoe".to_string()].into();
    mark_group_members(&mut people, &members);
    assert!(people[0].is_group_member);
    assert!(!people[1].is_group_member);
  }
}
