//! Handlers for `/requests` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/requests` | All requests, newest first |
//! | `POST` | `/requests` | Body: [`CreateBody`]; returns 201 + `{"success":true,"id":N}` |
//! | `GET`  | `/requests/{id}` | Single request |
//! | `GET`  | `/requests/{id}/approve` | Action link; returns an HTML confirmation |
//! | `GET`  | `/requests/{id}/reject` | Action link; returns an HTML confirmation |

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
  response::{Html, IntoResponse},
};
use datareq_core::{
  compose::escape_html,
  lifecycle::LifecycleManager,
  notify::Notifier,
  request::{CreateRequest, Decision, Request, RequestId, RequestType},
  store::RequestStore,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /requests`
pub async fn list<S, N>(
  State(manager): State<LifecycleManager<S, N>>,
) -> Result<Json<Vec<Request>>, ApiError>
where
  S: RequestStore,
  N: Notifier + 'static,
{
  Ok(Json(manager.list_requests().await?))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /requests/{id}`
pub async fn get_one<S, N>(
  State(manager): State<LifecycleManager<S, N>>,
  Path(id): Path<RequestId>,
) -> Result<Json<Request>, ApiError>
where
  S: RequestStore,
  N: Notifier + 'static,
{
  Ok(Json(manager.get_request(id).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// The selected request type: either the `"<name>:<email>"` encoding or the
/// approver spelled out.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RequestTypeBody {
  Encoded(String),
  Structured {
    approver_name:  String,
    approver_email: String,
  },
}

impl RequestTypeBody {
  fn into_encoded(self) -> Result<String, ApiError> {
    match self {
      Self::Encoded(s) => Ok(s),
      Self::Structured { approver_name, approver_email } => {
        let (name, email) = (approver_name.trim(), approver_email.trim());
        if name.is_empty() || email.is_empty() {
          return Err(ApiError::BadRequest(
            "approver_name and approver_email are required".to_owned(),
          ));
        }
        if name.contains(':') {
          return Err(ApiError::BadRequest(
            "approver_name must not contain ':'".to_owned(),
          ));
        }
        Ok(RequestType::for_approver(name, email).0)
      }
    }
  }
}

/// JSON body accepted by `POST /requests`.
///
/// Every field defaults to empty so that a missing field is reported as a
/// validation error rather than a deserialisation failure.
#[derive(Debug, Default, Deserialize)]
pub struct CreateBody {
  #[serde(default)]
  pub requester_name:  String,
  #[serde(default)]
  pub requester_email: String,
  #[serde(default)]
  pub request_type:    Option<RequestTypeBody>,
  #[serde(default)]
  pub requested_date:  String,
  #[serde(default)]
  pub notes:           Option<String>,
}

impl TryFrom<CreateBody> for CreateRequest {
  type Error = ApiError;

  fn try_from(b: CreateBody) -> Result<Self, ApiError> {
    Ok(CreateRequest {
      requester_name:  b.requester_name,
      requester_email: b.requester_email,
      request_type:    b
        .request_type
        .map(RequestTypeBody::into_encoded)
        .transpose()?
        .unwrap_or_default(),
      requested_date:  b.requested_date,
      notes:           b.notes,
    })
  }
}

/// `POST /requests`: returns 201 + `{"success":true,"id":N}`.
pub async fn create<S, N>(
  State(manager): State<LifecycleManager<S, N>>,
  body: Result<Json<CreateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RequestStore,
  N: Notifier + 'static,
{
  let Json(body) = body?;
  let id = manager.create_request(CreateRequest::try_from(body)?).await?;
  Ok((StatusCode::CREATED, Json(json!({ "success": true, "id": id }))))
}

// ─── Decisions ────────────────────────────────────────────────────────────────

/// `GET /requests/{id}/approve`
pub async fn approve<S, N>(
  State(manager): State<LifecycleManager<S, N>>,
  Path(id): Path<RequestId>,
) -> Result<Html<String>, ApiError>
where
  S: RequestStore,
  N: Notifier + 'static,
{
  decide(&manager, id, Decision::Approve).await
}

/// `GET /requests/{id}/reject`
pub async fn reject<S, N>(
  State(manager): State<LifecycleManager<S, N>>,
  Path(id): Path<RequestId>,
) -> Result<Html<String>, ApiError>
where
  S: RequestStore,
  N: Notifier + 'static,
{
  decide(&manager, id, Decision::Reject).await
}

async fn decide<S, N>(
  manager:  &LifecycleManager<S, N>,
  id:       RequestId,
  decision: Decision,
) -> Result<Html<String>, ApiError>
where
  S: RequestStore,
  N: Notifier + 'static,
{
  let outcome = manager.transition_request(id, decision).await?;
  Ok(Html(format!("<p>{}</p>", escape_html(&outcome.confirmation()))))
}
