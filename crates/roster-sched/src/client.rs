//! Async HTTP client for the scheduling service's JSON API.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use roster_core::{
  person::{CanonicalPerson, RemoteAccount, RemotePerson},
  store::RemoteStore,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{Error, Result};

/// List endpoints are paginated; pages smaller than this end the listing.
const PER_PAGE: usize = 200;

/// Connection settings for the scheduling API.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct SchedConfig {
  pub base_url:         String,
  pub access_token:     String,
  /// Sent in the User-Agent, as the service asks of API consumers.
  pub application_name: String,
  /// Likewise part of the User-Agent.
  pub contact_email:    String,
}

/// Async client for the scheduling API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct SchedClient {
  client: Client,
  config: SchedConfig,
}

impl SchedClient {
  pub fn new(config: SchedConfig) -> Result<Self> {
    let user_agent =
      format!("{} ({})", config.application_name, config.contact_email);
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .user_agent(user_agent)
      .build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn request(&self, method: Method, path: &str) -> RequestBuilder {
    self
      .client
      .request(method, self.url(path))
      .bearer_auth(&self.config.access_token)
  }

  /// Turn a non-2xx response into [`Error::Rejected`], keeping the body for
  /// the operator.
  async fn check(
    method: &'static str,
    path: &str,
    resp: Response,
  ) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(Error::Rejected {
      method,
      path: path.to_string(),
      status,
      body,
    })
  }

  /// `GET` every page of a list endpoint.
  async fn get_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
    let mut items: Vec<T> = Vec::new();
    let mut page = 1usize;
    loop {
      let resp = self
        .request(Method::GET, path)
        .query(&[("page", page.to_string()), ("per-page", PER_PAGE.to_string())])
        .send()
        .await?;
      let batch: Vec<T> =
        Self::check("GET", path, resp).await?.json().await?;
      let batch_len = batch.len();
      items.extend(batch);
      if batch_len < PER_PAGE {
        break;
      }
      page += 1;
    }
    debug!("GET {path} returned {} items over {page} page(s)", items.len());
    Ok(items)
  }
}

impl RemoteStore for SchedClient {
  type Error = Error;

  /// `GET /people`
  async fn list_people(&self) -> Result<Vec<RemotePerson>> {
    self.get_all("/people").await
  }

  /// `GET /accounts`
  async fn list_accounts(&self) -> Result<Vec<RemoteAccount>> {
    self.get_all("/accounts").await
  }

  /// `POST /people` — returns the service-assigned `people_id`.
  async fn create_person(&self, person: &CanonicalPerson) -> Result<i64> {
    let resp = self
      .request(Method::POST, "/people")
      .json(person)
      .send()
      .await?;
    let created: RemotePerson =
      Self::check("POST", "/people", resp).await?.json().await?;
    Ok(created.people_id)
  }

  /// `PATCH /people/{id}`
  async fn update_person(
    &self,
    people_id: i64,
    person: &CanonicalPerson,
  ) -> Result<()> {
    let path = format!("/people/{people_id}");
    let resp = self
      .request(Method::PATCH, &path)
      .json(person)
      .send()
      .await?;
    Self::check("PATCH", &path, resp).await?;
    Ok(())
  }

  /// `DELETE /people/{id}`
  async fn delete_person(&self, people_id: i64) -> Result<()> {
    let path = format!("/people/{people_id}");
    let resp = self.request(Method::DELETE, &path).send().await?;
    Self::check("DELETE", &path, resp).await?;
    Ok(())
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use roster_core::person::{EmployeeType, PeopleType};

  use super::*;

  #[test]
  fn url_join_tolerates_trailing_slash() {
    let mut config = SchedConfig {
      base_url:         "https://api.example.com/v3/".to_string(),
      access_token:     "t".to_string(),
      application_name: "roster".to_string(),
      contact_email:    "ops@example.com".to_string(),
    };
    let client = SchedClient::new(config.clone()).unwrap();
    assert_eq!(client.url("/people"), "https://api.example.com/v3/people");

    config.base_url = "https://api.example.com/v3".to_string();
    let client = SchedClient::new(config).unwrap();
    assert_eq!(client.url("/people"), "https://api.example.com/v3/people");
  }

  #[test]
  fn create_payload_matches_the_wire_schema() {
    let person = CanonicalPerson {
      name:           "Jane Doe".into(),
      email:          "j@co.com".into(),
      job_title:      Some("Engineer".into()),
      start_date:     NaiveDate::from_ymd_opt(2024, 1, 15),
      end_date:       None,
      active:         true,
      employee_type:  EmployeeType::FullTime,
      people_type_id: PeopleType::Employee,
    };
    let value = serde_json::to_value(&person).unwrap();
    assert_eq!(value["name"], "Jane Doe");
    assert_eq!(value["start_date"], "2024-01-15");
    assert_eq!(value["active"], 1);
    assert_eq!(value["employee_type"], 1);
    assert_eq!(value["people_type_id"], 1);
  }
}
