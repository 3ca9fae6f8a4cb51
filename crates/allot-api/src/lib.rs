//! JSON REST API for allot.
//!
//! Exposes an axum [`Router`] backed by any [`allot_core::store::AllotStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", allot_api::api_router(store.clone(), 10 * 1024 * 1024))
//! ```

pub mod agents;
pub mod error;
pub mod lists;

use std::sync::Arc;

use allot_core::store::AllotStore;
use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{get, post},
};

pub use error::ApiError;

/// Default cap on uploaded file size.
pub const DEFAULT_UPLOAD_LIMIT: usize = 10 * 1024 * 1024;

/// Build a fully-materialised API router for `store`.
///
/// `upload_limit` caps the request body of `POST /lists/upload` in bytes;
/// larger uploads are answered with 413. The returned `Router<()>` can be
/// nested into any parent router regardless of its own state type.
pub fn api_router<S>(store: Arc<S>, upload_limit: usize) -> Router<()>
where
  S: AllotStore + 'static,
{
  Router::new()
    // Agents
    .route("/agents", get(agents::list::<S>).post(agents::create::<S>))
    .route(
      "/agents/{id}",
      get(agents::get_one::<S>)
        .put(agents::update::<S>)
        .delete(agents::delete_one::<S>),
    )
    // Distributions
    .route(
      "/lists/upload",
      post(lists::upload::<S>).layer(DefaultBodyLimit::max(upload_limit)),
    )
    .route("/lists", get(lists::list::<S>))
    .route(
      "/lists/{id}",
      get(lists::get_one::<S>).delete(lists::delete_one::<S>),
    )
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use allot_store_sqlite::SqliteStore;
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  const LEADS_XLSX: &[u8] =
    include_bytes!("../../allot-ingest/tests/fixtures/leads.xlsx");
  const LEADS_XLS: &[u8] =
    include_bytes!("../../allot-ingest/tests/fixtures/leads.xls");
  const BOUNDARY: &str = "allot-test-boundary";

  async fn make_store() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::open_in_memory().await.unwrap())
  }

  async fn send(
    store: &Arc<SqliteStore>,
    req: Request<Body>,
  ) -> (StatusCode, Value) {
    send_with_limit(store, req, DEFAULT_UPLOAD_LIMIT).await
  }

  async fn send_with_limit(
    store: &Arc<SqliteStore>,
    req: Request<Body>,
    limit: usize,
  ) -> (StatusCode, Value) {
    let resp: Response = api_router(store.clone(), limit).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
  }

  fn json_req(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
      .method(method)
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap()
  }

  fn empty_req(method: &str, uri: &str) -> Request<Body> {
    Request::builder().method(method).uri(uri).body(Body::empty()).unwrap()
  }

  fn upload_req(field: &str, file_name: &str, content: &[u8]) -> Request<Body> {
    let mut body = format!(
      "--{BOUNDARY}\r\n\
       Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
       Content-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
      .method("POST")
      .uri("/lists/upload")
      .header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}"),
      )
      .body(Body::from(body))
      .unwrap()
  }

  async fn add_agent(store: &Arc<SqliteStore>, name: &str) -> Value {
    let email = format!("{}@example.com", name.to_lowercase());
    let (status, body) = send(
      store,
      json_req(
        "POST",
        "/agents",
        json!({ "name": name, "email": email, "mobile": "+1 555 0100" }),
      ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
  }

  fn csv_rows(n: usize) -> String {
    let mut out = String::from("FirstName,Phone,Notes\n");
    for i in 0..n {
      out.push_str(&format!("lead{i},555-{i:04},\n"));
    }
    out
  }

  // ── Agents ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_and_list_agents() {
    let store = make_store().await;
    let created = add_agent(&store, "Ada").await;
    assert_eq!(created["is_active"], true);

    let (status, body) = send(&store, empty_req("GET", "/agents")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "Ada");
  }

  #[tokio::test]
  async fn invalid_agent_returns_400() {
    let store = make_store().await;
    let (status, body) = send(
      &store,
      json_req(
        "POST",
        "/agents",
        json!({ "name": "A", "email": "nope", "mobile": "1" }),
      ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("name"));
  }

  #[tokio::test]
  async fn duplicate_agent_email_returns_400() {
    let store = make_store().await;
    add_agent(&store, "Ada").await;
    let (status, body) = send(
      &store,
      json_req(
        "POST",
        "/agents",
        json!({ "name": "Ada Again", "email": "ADA@example.com", "mobile": "5550100199" }),
      ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Agent with this email already exists");
  }

  #[tokio::test]
  async fn concurrent_creates_with_one_email_yield_one_conflict() {
    let store = make_store().await;
    let body = json!({ "name": "Ada", "email": "ada@example.com", "mobile": "+1 555 0100" });

    let (first, second) = tokio::join!(
      send(&store, json_req("POST", "/agents", body.clone())),
      send(&store, json_req("POST", "/agents", body.clone())),
    );

    let mut statuses = [first.0, second.0];
    statuses.sort_by_key(|s| s.as_u16());
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::BAD_REQUEST]);

    let conflict = if first.0 == StatusCode::BAD_REQUEST { first.1 } else { second.1 };
    assert_eq!(conflict["error"], "Agent with this email already exists");

    let (_, agents) = send(&store, empty_req("GET", "/agents")).await;
    assert_eq!(agents.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn update_to_taken_email_returns_400() {
    let store = make_store().await;
    add_agent(&store, "Ada").await;
    let bo = add_agent(&store, "Bo").await;
    let bo_id = bo["agent_id"].as_str().unwrap();

    let (status, body) = send(
      &store,
      json_req("PUT", &format!("/agents/{bo_id}"), json!({ "email": "ADA@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Agent with this email already exists");
  }

  #[tokio::test]
  async fn update_and_delete_agent() {
    let store = make_store().await;
    let ada = add_agent(&store, "Ada").await;
    let id = ada["agent_id"].as_str().unwrap();

    let (status, body) = send(
      &store,
      json_req("PUT", &format!("/agents/{id}"), json!({ "is_active": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_active"], false);
    assert_eq!(body["name"], "Ada");

    let (status, _) = send(&store, empty_req("DELETE", &format!("/agents/{id}"))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&store, empty_req("GET", &format!("/agents/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Upload ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn upload_without_agents_returns_400() {
    let store = make_store().await;
    let (status, body) =
      send(&store, upload_req("file", "leads.csv", csv_rows(3).as_bytes())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("no active agents"));
  }

  #[tokio::test]
  async fn upload_distributes_ten_over_three() {
    let store = make_store().await;
    for name in ["Ada", "Bo", "Cy"] {
      add_agent(&store, name).await;
    }

    let (status, receipt) =
      send(&store, upload_req("file", "leads.csv", csv_rows(10).as_bytes())).await;
    assert_eq!(status, StatusCode::CREATED, "{receipt}");
    assert_eq!(receipt["total_records"], 10);
    assert_eq!(receipt["agent_count"], 3);
    let counts: Vec<_> = receipt["assignments"]
      .as_array()
      .unwrap()
      .iter()
      .map(|a| (a["agent_name"].as_str().unwrap().to_owned(), a["record_count"].as_u64().unwrap()))
      .collect();
    assert_eq!(
      counts,
      [("Ada".to_owned(), 4), ("Bo".to_owned(), 3), ("Cy".to_owned(), 3)]
    );

    // Listing.
    let (status, lists) = send(&store, empty_req("GET", "/lists")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lists.as_array().unwrap().len(), 1);
    assert_eq!(lists[0]["file_name"], "leads.csv");
    assert_eq!(lists[0]["agent_count"], 3);

    // Detail carries the contiguous slices.
    let id = receipt["distribution_id"].as_str().unwrap();
    let (status, detail) = send(&store, empty_req("GET", &format!("/lists/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["assignments"][0]["records"][0]["first_name"], "lead0");
    assert_eq!(detail["assignments"][0]["records"][3]["first_name"], "lead3");
    assert_eq!(detail["assignments"][1]["records"][0]["first_name"], "lead4");
    assert_eq!(detail["assignments"][2]["records"][2]["first_name"], "lead9");
  }

  #[tokio::test]
  async fn inactive_agents_are_left_out() {
    let store = make_store().await;
    add_agent(&store, "Ada").await;
    let bo = add_agent(&store, "Bo").await;
    let bo_id = bo["agent_id"].as_str().unwrap();
    send(
      &store,
      json_req("PUT", &format!("/agents/{bo_id}"), json!({ "is_active": false })),
    )
    .await;

    let (status, receipt) =
      send(&store, upload_req("file", "leads.csv", csv_rows(5).as_bytes())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(receipt["agent_count"], 1);
    assert_eq!(receipt["assignments"][0]["agent_name"], "Ada");
    assert_eq!(receipt["assignments"][0]["record_count"], 5);
  }

  #[tokio::test]
  async fn upload_workbook() {
    let store = make_store().await;
    add_agent(&store, "Ada").await;
    add_agent(&store, "Bo").await;

    let (status, receipt) = send(&store, upload_req("file", "leads.xlsx", LEADS_XLSX)).await;
    assert_eq!(status, StatusCode::CREATED, "{receipt}");
    assert_eq!(receipt["total_records"], 3);
    assert_eq!(receipt["assignments"][0]["record_count"], 2);
    assert_eq!(receipt["assignments"][1]["record_count"], 1);
  }

  #[tokio::test]
  async fn upload_legacy_workbook() {
    let store = make_store().await;
    add_agent(&store, "Ada").await;

    let (status, receipt) = send(&store, upload_req("file", "leads.xls", LEADS_XLS)).await;
    assert_eq!(status, StatusCode::CREATED, "{receipt}");
    assert_eq!(receipt["total_records"], 3);
    assert_eq!(receipt["file_name"], "leads.xls");
  }

  #[tokio::test]
  async fn upload_with_no_usable_rows_is_not_persisted() {
    let store = make_store().await;
    add_agent(&store, "Ada").await;

    let csv = "FirstName,Phone,Notes\n,,only notes\n  ,  ,\n";
    let (status, body) = send(&store, upload_req("file", "blank.csv", csv.as_bytes())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("no valid records"));

    let (_, lists) = send(&store, empty_req("GET", "/lists")).await;
    assert!(lists.as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn upload_with_unsupported_extension_returns_400() {
    let store = make_store().await;
    add_agent(&store, "Ada").await;
    let (status, body) =
      send(&store, upload_req("file", "leads.txt", csv_rows(2).as_bytes())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("invalid file type"));
  }

  #[tokio::test]
  async fn upload_of_corrupt_workbook_returns_400() {
    let store = make_store().await;
    add_agent(&store, "Ada").await;
    let (status, _) = send(&store, upload_req("file", "leads.xlsx", b"not a zip")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn upload_without_file_field_returns_400() {
    let store = make_store().await;
    add_agent(&store, "Ada").await;
    let (status, body) =
      send(&store, upload_req("attachment", "leads.csv", csv_rows(2).as_bytes())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file uploaded");
  }

  #[tokio::test]
  async fn oversized_upload_returns_413() {
    let store = make_store().await;
    add_agent(&store, "Ada").await;
    let (status, _) = send_with_limit(
      &store,
      upload_req("file", "leads.csv", csv_rows(100).as_bytes()),
      256,
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
  }

  // ── Distribution reads ──────────────────────────────────────────────────────

  #[tokio::test]
  async fn unknown_distribution_returns_404() {
    let store = make_store().await;
    let id = uuid::Uuid::new_v4();
    let (status, _) = send(&store, empty_req("GET", &format!("/lists/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn delete_distribution() {
    let store = make_store().await;
    add_agent(&store, "Ada").await;
    let (_, receipt) =
      send(&store, upload_req("file", "leads.csv", csv_rows(2).as_bytes())).await;
    let id = receipt["distribution_id"].as_str().unwrap();

    let (status, _) = send(&store, empty_req("DELETE", &format!("/lists/{id}"))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&store, empty_req("DELETE", &format!("/lists/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}
