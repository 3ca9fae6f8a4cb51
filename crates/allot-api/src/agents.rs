//! Handlers for `/agents` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/agents` | All agents in creation order |
//! | `POST`   | `/agents` | Body: [`NewAgent`]; returns 201 + stored agent |
//! | `GET`    | `/agents/:id` | 404 if not found |
//! | `PUT`    | `/agents/:id` | Body: [`AgentPatch`]; partial update |
//! | `DELETE` | `/agents/:id` | 204; stored distributions are untouched |

use std::sync::Arc;

use allot_core::{
  agent::{Agent, AgentPatch, NewAgent},
  store::AllotStore,
};
use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use uuid::Uuid;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /agents`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Agent>>, ApiError>
where
  S: AllotStore,
{
  let agents = store.list_agents().await.map_err(ApiError::store)?;
  Ok(Json(agents))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /agents`, body: `{"name":"…","email":"…","mobile":"…"}`
///
/// The lookup gives a quick answer for the common case; a conflict that slips
/// past it still comes back from the store as a duplicate-email error.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewAgent>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AllotStore,
{
  let input = body.validate()?;

  let existing = store
    .find_agent_by_email(&input.email)
    .await
    .map_err(ApiError::store)?;
  if existing.is_some() {
    return Err(allot_core::Error::DuplicateEmail(input.email).into());
  }

  let agent = store.add_agent(input).await.map_err(ApiError::store)?;
  tracing::info!(agent_id = %agent.agent_id, "agent created");
  Ok((StatusCode::CREATED, Json(agent)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /agents/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Agent>, ApiError>
where
  S: AllotStore,
{
  let agent = store
    .get_agent(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("agent {id} not found")))?;
  Ok(Json(agent))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /agents/:id`, any subset of `name`, `email`, `mobile`, `is_active`.
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<AgentPatch>,
) -> Result<Json<Agent>, ApiError>
where
  S: AllotStore,
{
  let patch = body.validate()?;

  if let Some(email) = &patch.email {
    let holder = store
      .find_agent_by_email(email)
      .await
      .map_err(ApiError::store)?;
    if holder.is_some_and(|a| a.agent_id != id) {
      return Err(allot_core::Error::DuplicateEmail(email.clone()).into());
    }
  }

  let agent = store
    .update_agent(id, patch)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("agent {id} not found")))?;
  Ok(Json(agent))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /agents/:id`
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: AllotStore,
{
  if !store.delete_agent(id).await.map_err(ApiError::store)? {
    return Err(ApiError::NotFound(format!("agent {id} not found")));
  }
  tracing::info!(agent_id = %id, "agent deleted");
  Ok(StatusCode::NO_CONTENT)
}
