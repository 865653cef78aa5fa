//! Async HTTP client wrapping the roster JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Response, header};
use roster_core::{
  StudentId,
  barangay::Barangay,
  lifecycle::{Completion, LifecycleAction, RecordOutcome, StudentStatus},
  student::{Student, StudentForm},
};
use serde::Deserialize;
use serde_json::json;

/// Connection settings for the roster API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// Response body of the bulk endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSummary {
  pub success:         bool,
  pub modified_count:  Option<u64>,
  pub deleted_count:   Option<u64>,
  pub requested_count: usize,
  pub completion:      Completion,
  #[serde(default)]
  pub results:         Vec<RecordOutcome>,
}

impl BulkSummary {
  pub fn applied(&self) -> u64 {
    self.modified_count.or(self.deleted_count).unwrap_or(0)
  }
}

#[derive(Deserialize)]
struct ErrorBody {
  message: String,
}

/// Async HTTP client for the roster JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  /// Turn a non-2xx response into an error carrying the server's message.
  async fn check(resp: Response, what: &str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let message = resp
      .json::<ErrorBody>()
      .await
      .map(|b| b.message)
      .unwrap_or_else(|_| status.to_string());
    Err(anyhow!("{what}: {message}"))
  }

  // ── Barangays ─────────────────────────────────────────────────────────────

  /// `GET /api/barangays`
  pub async fn list_barangays(&self) -> Result<Vec<Barangay>> {
    let resp = self
      .client
      .get(self.url("/barangays"))
      .send()
      .await
      .context("GET /barangays failed")?;
    Self::check(resp, "GET /barangays")
      .await?
      .json()
      .await
      .context("deserialising barangays")
  }

  // ── Students ──────────────────────────────────────────────────────────────

  /// `GET /api/students?status=<status>`
  pub async fn list_students(&self, status: StudentStatus) -> Result<Vec<Student>> {
    let resp = self
      .client
      .get(self.url("/students"))
      .query(&[("status", status.as_ref())])
      .send()
      .await
      .context("GET /students failed")?;
    Self::check(resp, "GET /students")
      .await?
      .json()
      .await
      .context("deserialising students")
  }

  /// `GET /api/students/{id}`: the record and its ETag.
  pub async fn get_student(&self, id: StudentId) -> Result<(Student, Option<String>)> {
    let resp = self
      .client
      .get(self.url(&format!("/students/{id}")))
      .send()
      .await
      .context("GET /students/{id} failed")?;
    let resp = Self::check(resp, "GET /students/{id}").await?;
    let etag = resp
      .headers()
      .get(header::ETAG)
      .and_then(|v| v.to_str().ok())
      .map(str::to_owned);
    let student = resp.json().await.context("deserialising student")?;
    Ok((student, etag))
  }

  /// `POST /api/students`
  pub async fn create_student(&self, form: &StudentForm) -> Result<Student> {
    let resp = self
      .client
      .post(self.url("/students"))
      .json(form)
      .send()
      .await
      .context("POST /students failed")?;
    Self::check(resp, "POST /students")
      .await?
      .json()
      .await
      .context("deserialising student")
  }

  /// `PUT /api/students/{id}`, conditional on `etag` when given.
  pub async fn update_student(
    &self,
    id: StudentId,
    form: &StudentForm,
    etag: Option<&str>,
  ) -> Result<Student> {
    let mut req = self.client.put(self.url(&format!("/students/{id}"))).json(form);
    if let Some(etag) = etag {
      req = req.header(header::IF_MATCH, etag);
    }
    let resp = req.send().await.context("PUT /students/{id} failed")?;
    Self::check(resp, "PUT /students/{id}")
      .await?
      .json()
      .await
      .context("deserialising student")
  }

  /// `GET /api/students/export?status=<status>`: raw CSV bytes.
  pub async fn export(&self, status: StudentStatus) -> Result<Vec<u8>> {
    let resp = self
      .client
      .get(self.url("/students/export"))
      .query(&[("status", status.as_ref())])
      .send()
      .await
      .context("GET /students/export failed")?;
    let bytes = Self::check(resp, "GET /students/export")
      .await?
      .bytes()
      .await
      .context("reading export body")?;
    Ok(bytes.to_vec())
  }

  // ── Lifecycle ─────────────────────────────────────────────────────────────

  /// Apply `action` to `ids` through the bulk endpoints.
  ///
  /// Graduation has its own route; removal is the bulk `delete` action.
  pub async fn bulk(&self, action: LifecycleAction, ids: &[StudentId]) -> Result<BulkSummary> {
    let (path, body) = match action {
      LifecycleAction::Graduate => ("/students/bulk/graduate", json!({ "studentIds": ids })),
      LifecycleAction::Archive => (
        "/students/bulk",
        json!({ "studentIds": ids, "action": "archive" }),
      ),
      LifecycleAction::Retrieve => (
        "/students/bulk",
        json!({ "studentIds": ids, "action": "retrieve" }),
      ),
      LifecycleAction::Remove => (
        "/students/bulk",
        json!({ "studentIds": ids, "action": "delete" }),
      ),
    };

    let resp = self
      .client
      .post(self.url(path))
      .json(&body)
      .send()
      .await
      .with_context(|| format!("POST {path} failed"))?;
    Self::check(resp, &format!("POST {path}"))
      .await?
      .json()
      .await
      .context("deserialising bulk response")
  }
}
