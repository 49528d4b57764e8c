//! Field mapper: directory records → the scheduling system's person shape.
//!
//! All mapping decisions take an explicit [`MapContext`] — overrides, date
//! format, and "today" come from the caller, never from ambient state, which
//! also keeps the lifecycle derivation testable.

use chrono::{NaiveDate, NaiveDateTime};

use crate::{
  Error, Result,
  person::{CanonicalPerson, DirectoryPerson, EmployeeType, PeopleType},
};

// ─── Context ─────────────────────────────────────────────────────────────────

/// Inputs the mapper needs besides the directory record itself.
#[derive(Debug, Clone)]
pub struct MapContext {
  /// Ordered `(old_domain, new_domain)` replacement pairs. Applied as plain
  /// substring replacements in configured order, first occurrence per pair —
  /// deliberately not anchored to the domain part of the address.
  pub email_domain_overrides: Vec<(String, String)>,
  /// The site-specific format contract dates are stored in, e.g.
  /// `"%d. %B %Y"`. Tried before the generalized-time fallbacks.
  pub source_date_format:     String,
  /// The date `active` and expiry decisions are made against.
  pub today:                  NaiveDate,
}

impl MapContext {
  /// Apply the configured domain overrides to an email address.
  ///
  /// Must be applied identically on both sides of every comparison; the
  /// remote system already stores addresses in overridden form.
  pub fn override_email(&self, email: &str) -> String {
    let mut result = email.to_string();
    for (old_domain, new_domain) in &self.email_domain_overrides {
      result = result.replacen(old_domain.as_str(), new_domain, 1);
    }
    result
  }

  /// Parse a raw contract date from the directory.
  ///
  /// Strategies are tried in order until one succeeds: the configured source
  /// format, then generalized-time, then the ISO shape the directory emits
  /// for native date values. Exhausting all of them is fatal for the record.
  fn parse_date(&self, person: &str, raw: &str) -> Result<NaiveDate> {
    let strategies = [
      DateStrategy::Date(self.source_date_format.as_str()),
      DateStrategy::DateTime("%Y%m%d%H%M%SZ"),
      DateStrategy::Date("%Y-%m-%d"),
    ];

    strategies
      .iter()
      .find_map(|s| s.parse(raw))
      .ok_or_else(|| Error::DateFormat {
        name:  person.to_string(),
        value: raw.to_string(),
      })
  }
}

/// One way a directory date value may be shaped.
#[derive(Debug, Clone, Copy)]
enum DateStrategy<'a> {
  /// A bare calendar date in the given format.
  Date(&'a str),
  /// A timestamp in the given format; the time component is discarded.
  DateTime(&'a str),
}

impl DateStrategy<'_> {
  fn parse(&self, raw: &str) -> Option<NaiveDate> {
    match self {
      DateStrategy::Date(format) => {
        NaiveDate::parse_from_str(raw, format).ok()
      }
      DateStrategy::DateTime(format) => {
        NaiveDateTime::parse_from_str(raw, format)
          .ok()
          .map(|dt| dt.date())
      }
    }
  }
}

// ─── Mapping ─────────────────────────────────────────────────────────────────

/// Project a directory record into the scheduling system's person schema.
///
/// Fails with [`Error::MissingEmail`] when the record has no email (it can
/// never be joined to a remote record) and with [`Error::DateFormat`] when a
/// present contract date matches none of the parser strategies. Both are
/// fatal for this record only.
pub fn map_person(
  ctx: &MapContext,
  person: &DirectoryPerson,
) -> Result<CanonicalPerson> {
  let email = person
    .raw_email
    .as_deref()
    .filter(|e| !e.is_empty())
    .ok_or_else(|| Error::MissingEmail {
      name: person.display_name.clone(),
    })?;

  let start_date = person
    .contract_start
    .as_deref()
    .map(|raw| ctx.parse_date(&person.display_name, raw))
    .transpose()?;
  let end_date = person
    .contract_end
    .as_deref()
    .map(|raw| ctx.parse_date(&person.display_name, raw))
    .transpose()?;

  // Inactive iff the last day is strictly in the past.
  let active = match end_date {
    Some(end) => end >= ctx.today,
    None => true,
  };

  // "employee" in the directory means full-time employee in the scheduling
  // system; everything else defaults to part-time contractor.
  let is_employee = person.employment_kind.as_deref() == Some("employee");

  Ok(CanonicalPerson {
    name: person.display_name.clone(),
    email: ctx.override_email(email),
    job_title: if person.titles.is_empty() {
      None
    } else {
      Some(person.titles.join(", "))
    },
    start_date,
    end_date,
    active,
    employee_type: if is_employee {
      EmployeeType::FullTime
    } else {
      EmployeeType::PartTime
    },
    people_type_id: if is_employee {
      PeopleType::Employee
    } else {
      PeopleType::Contractor
    },
  })
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn ctx() -> MapContext {
    MapContext {
      email_domain_overrides: vec![],
      source_date_format:     "%d. %B %Y".to_string(),
      today:                  NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
    }
  }

  fn person(email: &str) -> DirectoryPerson {
    DirectoryPerson {
      unique_id: "jdoe".into(),
      display_name: "Jane Doe".into(),
      raw_email: Some(email.to_string()),
      ..Default::default()
    }
  }

  #[test]
  fn missing_email_is_an_error() {
    let mut p = person("j@co.com");
    p.raw_email = None;
    assert!(matches!(
      map_person(&ctx(), &p),
      Err(Error::MissingEmail { .. })
    ));
  }

  #[test]
  fn override_applies_pairs_in_order() {
    let mut c = ctx();
    c.email_domain_overrides = vec![
      ("old.com".into(), "mid.com".into()),
      ("mid.com".into(), "new.com".into()),
    ];
    assert_eq!(c.override_email("a@old.com"), "a@new.com");
    // Untouched addresses pass through.
    assert_eq!(c.override_email("b@other.com"), "b@other.com");
  }

  #[test]
  fn override_is_substring_based_not_domain_anchored() {
    let mut c = ctx();
    c.email_domain_overrides = vec![("old.com".into(), "new.com".into())];
    // The fragment in the local part is rewritten too. Intentional: the
    // overrides are plain substring replacements.
    assert_eq!(c.override_email("old.comrade@old.com"), "new.comrade@old.com");
  }

  #[test]
  fn source_format_dates_parse() {
    let mut p = person("j@co.com");
    p.contract_start = Some("15. January 2024".into());
    let mapped = map_person(&ctx(), &p).unwrap();
    assert_eq!(mapped.start_date, NaiveDate::from_ymd_opt(2024, 1, 15));
  }

  #[test]
  fn generalized_time_dates_parse() {
    let mut p = person("j@co.com");
    p.contract_end = Some("20240630000000Z".into());
    let mapped = map_person(&ctx(), &p).unwrap();
    assert_eq!(mapped.end_date, NaiveDate::from_ymd_opt(2024, 6, 30));
  }

  #[test]
  fn unparsable_date_is_an_error() {
    let mut p = person("j@co.com");
    p.contract_end = Some("sometime next year".into());
    assert!(matches!(
      map_person(&ctx(), &p),
      Err(Error::DateFormat { .. })
    ));
  }

  #[test]
  fn past_end_date_means_inactive() {
    let mut p = person("j@co.com");
    p.contract_end = Some("2020-01-01".into());
    let mapped = map_person(&ctx(), &p).unwrap();
    assert!(!mapped.active);
  }

  #[test]
  fn today_or_future_end_date_means_active() {
    let mut p = person("j@co.com");
    p.contract_end = Some("2024-06-01".into());
    assert!(map_person(&ctx(), &p).unwrap().active);
    p.contract_end = None;
    assert!(map_person(&ctx(), &p).unwrap().active);
  }

  #[test]
  fn employee_kind_maps_to_full_time_employee() {
    let mut p = person("j@co.com");
    p.employment_kind = Some("employee".into());
    let mapped = map_person(&ctx(), &p).unwrap();
    assert_eq!(mapped.employee_type, EmployeeType::FullTime);
    assert_eq!(mapped.people_type_id, PeopleType::Employee);

    p.employment_kind = Some("student".into());
    let mapped = map_person(&ctx(), &p).unwrap();
    assert_eq!(mapped.employee_type, EmployeeType::PartTime);
    assert_eq!(mapped.people_type_id, PeopleType::Contractor);
  }

  #[test]
  fn titles_join_in_encounter_order() {
    let mut p = person("j@co.com");
    p.titles = vec!["Engineer".into(), "Team Lead".into()];
    let mapped = map_person(&ctx(), &p).unwrap();
    assert_eq!(mapped.job_title.as_deref(), Some("Engineer, Team Lead"));

    p.titles = vec![];
    assert_eq!(map_person(&ctx(), &p).unwrap().job_title, None);
  }
}
