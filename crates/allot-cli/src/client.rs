//! Async HTTP client wrapping the allot JSON API.

use std::{path::Path, time::Duration};

use allot_core::{
  agent::{Agent, AgentPatch, NewAgent},
  distribution::{DistributionSnapshot, DistributionSummary, UploadReceipt},
};
use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Response, multipart};
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// Connection settings for the allot API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// Async HTTP client for the allot JSON REST API.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(60))
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
      .json::<serde_json::Value>()
      .await
      .ok()
      .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_owned))
      .unwrap_or_else(|| status.to_string());
    Err(anyhow!("{what} → {status}: {message}"))
  }

  async fn read<T: DeserializeOwned>(resp: Response, what: &str) -> Result<T> {
    Self::check(resp, what)
      .await?
      .json()
      .await
      .with_context(|| format!("deserialising {what} response"))
  }

  // ── Agents ────────────────────────────────────────────────────────────────

  /// `GET /api/agents`
  pub async fn list_agents(&self) -> Result<Vec<Agent>> {
    let resp = self
      .client
      .get(self.url("/agents"))
      .send()
      .await
      .context("GET /agents failed")?;
    Self::read(resp, "GET /agents").await
  }

  /// `POST /api/agents`
  pub async fn add_agent(&self, agent: &NewAgent) -> Result<Agent> {
    let resp = self
      .client
      .post(self.url("/agents"))
      .json(agent)
      .send()
      .await
      .context("POST /agents failed")?;
    Self::read(resp, "POST /agents").await
  }

  /// `PUT /api/agents/:id`
  pub async fn update_agent(&self, id: Uuid, patch: &AgentPatch) -> Result<Agent> {
    let path = format!("/agents/{id}");
    let resp = self
      .client
      .put(self.url(&path))
      .json(patch)
      .send()
      .await
      .with_context(|| format!("PUT {path} failed"))?;
    Self::read(resp, &format!("PUT {path}")).await
  }

  /// `DELETE /api/agents/:id`
  pub async fn delete_agent(&self, id: Uuid) -> Result<()> {
    let path = format!("/agents/{id}");
    let resp = self
      .client
      .delete(self.url(&path))
      .send()
      .await
      .with_context(|| format!("DELETE {path} failed"))?;
    Self::check(resp, &format!("DELETE {path}")).await?;
    Ok(())
  }

  // ── Lists ─────────────────────────────────────────────────────────────────

  /// `POST /api/lists/upload` with the file at `path` as the `file` field.
  pub async fn upload(&self, path: &Path) -> Result<UploadReceipt> {
    let data = tokio::fs::read(path)
      .await
      .with_context(|| format!("reading {}", path.display()))?;
    let file_name = path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .ok_or_else(|| anyhow!("{} has no file name", path.display()))?;

    let form = multipart::Form::new()
      .part("file", multipart::Part::bytes(data).file_name(file_name));
    let resp = self
      .client
      .post(self.url("/lists/upload"))
      .multipart(form)
      .send()
      .await
      .context("POST /lists/upload failed")?;
    Self::read(resp, "POST /lists/upload").await
  }

  /// `GET /api/lists`
  pub async fn list_distributions(&self) -> Result<Vec<DistributionSummary>> {
    let resp = self
      .client
      .get(self.url("/lists"))
      .send()
      .await
      .context("GET /lists failed")?;
    Self::read(resp, "GET /lists").await
  }

  /// `GET /api/lists/:id`
  pub async fn get_distribution(&self, id: Uuid) -> Result<DistributionSnapshot> {
    let path = format!("/lists/{id}");
    let resp = self
      .client
      .get(self.url(&path))
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;
    Self::read(resp, &format!("GET {path}")).await
  }
}
