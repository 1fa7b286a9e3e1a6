//! The request lifecycle manager.
//!
//! Creation and the two decisions each follow the same shape: validate, write
//! to the store, then fire notifications on background tasks. Nothing after
//! the write can fail the operation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result, compose,
  notify::{Notifier, dispatch},
  request::{CreateRequest, Decision, NewRequest, Request, RequestId},
  store::{RequestStore, StatusGuard},
};

// ─── Configuration ───────────────────────────────────────────────────────────

/// What happens when a decision arrives for a request that is no longer
/// pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
  /// Apply the decision regardless of the current status (last click wins).
  #[default]
  AlwaysApply,
  /// Refuse with [`Error::AlreadyDecided`] once a decision has been recorded.
  FirstDecisionWins,
}

impl TransitionPolicy {
  fn guard(self) -> StatusGuard {
    match self {
      Self::AlwaysApply => StatusGuard::Unconditional,
      Self::FirstDecisionWins => StatusGuard::OnlyIfPending,
    }
  }
}

/// Settings the manager needs beyond its collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowConfig {
  /// Prefix for the approve/reject links, e.g. `https://data.example.com`.
  pub base_url:          String,
  /// Operations-team recipient of submission and rejection notices.
  pub ops_address:       String,
  pub transition_policy: TransitionPolicy,
}

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// The result of a successful decision.
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
  /// The request as re-read after the update.
  pub request:  Request,
  pub decision: Decision,
}

impl TransitionOutcome {
  /// Message shown to whoever followed the action link.
  pub fn confirmation(&self) -> String {
    format!(
      "Request {} has been {}, and the requester will be notified by email.",
      self.request.id,
      self.decision.past_tense()
    )
  }
}

// ─── Manager ─────────────────────────────────────────────────────────────────

/// Creates requests, records decisions, and triggers notifications.
///
/// Cloning is cheap; the store and notifier are shared.
pub struct LifecycleManager<S, N> {
  store:    Arc<S>,
  notifier: Arc<N>,
  config:   Arc<WorkflowConfig>,
}

impl<S, N> Clone for LifecycleManager<S, N> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      notifier: Arc::clone(&self.notifier),
      config:   Arc::clone(&self.config),
    }
  }
}

impl<S, N> LifecycleManager<S, N>
where
  S: RequestStore,
  N: Notifier + 'static,
{
  pub fn new(store: Arc<S>, notifier: Arc<N>, config: WorkflowConfig) -> Self {
    Self { store, notifier, config: Arc::new(config) }
  }

  /// Validate and persist a new pending request, then notify the operations
  /// address and the approver.
  ///
  /// Fails with [`Error::Validation`] before touching the store, or with
  /// [`Error::Store`] if the insert fails; in both cases nothing is sent.
  pub async fn create_request(&self, input: CreateRequest) -> Result<RequestId> {
    let new = NewRequest::try_from(input)?;
    let request = self.store.insert(new).await.map_err(Error::store)?;

    tracing::info!(
      id = %request.id,
      approver = %request.authorized_by,
      "request created"
    );
    if request.approver().is_unknown() {
      tracing::warn!(
        id = %request.id,
        request_type = %request.request_type,
        "request type names no approver; approval mail cannot be delivered"
      );
    }

    let links = compose::ActionLinks::new(&self.config.base_url, request.id);
    self.notify(compose::submitted_summary(&self.config.ops_address, &request));
    self.notify(compose::approval_request(&request, &links));

    Ok(request.id)
  }

  /// All requests, most recent first.
  pub async fn list_requests(&self) -> Result<Vec<Request>> {
    self.store.list().await.map_err(Error::store)
  }

  pub async fn get_request(&self, id: RequestId) -> Result<Request> {
    self
      .store
      .get(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::NotFound(id))
  }

  /// Record `decision` on request `id` and notify the requester (and, for a
  /// rejection, the operations address).
  pub async fn transition_request(
    &self,
    id: RequestId,
    decision: Decision,
  ) -> Result<TransitionOutcome> {
    let target = decision.target_status();
    let guard = self.config.transition_policy.guard();

    let applied = self
      .store
      .set_status(id, target, guard)
      .await
      .map_err(Error::store)?;

    if !applied {
      return Err(match self.store.get(id).await.map_err(Error::store)? {
        Some(current) => Error::AlreadyDecided { id, status: current.status },
        None => Error::NotFound(id),
      });
    }

    // The row existed a moment ago and requests are never deleted.
    let request = self.get_request(id).await?;
    tracing::info!(%id, status = %request.status, "request decided");

    self.notify(compose::decision_notice(&request, decision));
    if decision == Decision::Reject {
      self.notify(compose::rejection_notice(&self.config.ops_address, id));
    }

    Ok(TransitionOutcome { request, decision })
  }

  fn notify(&self, message: crate::notify::Message) {
    // Detached: the caller's result never waits on delivery.
    dispatch(Arc::clone(&self.notifier), message);
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use tokio::sync::mpsc::UnboundedReceiver;

  use super::*;
  use crate::{
    memory::MemoryStore,
    notify::{ChannelNotifier, Message},
    request::{NewRequest, RequestStatus},
  };

  type Manager = LifecycleManager<MemoryStore, ChannelNotifier>;

  fn manager(policy: TransitionPolicy) -> (Manager, UnboundedReceiver<Message>) {
    let (notifier, rx) = ChannelNotifier::new();
    let manager = LifecycleManager::new(
      Arc::new(MemoryStore::new()),
      Arc::new(notifier),
      WorkflowConfig {
        base_url:          "http://localhost:3000".into(),
        ops_address:       "it@mmcwellness.ca".into(),
        transition_policy: policy,
      },
    );
    (manager, rx)
  }

  fn alice() -> CreateRequest {
    CreateRequest {
      requester_name:  "Alice".into(),
      requester_email: "alice@x.com".into(),
      request_type:    "Eva:manager@mmcwellness.ca".into(),
      requested_date:  "2025-01-10".into(),
      notes:           Some(String::new()),
    }
  }

  /// Drop the manager and collect everything that was sent. Detached tasks
  /// hold the remaining notifier references, so the channel closes only after
  /// every dispatched send has finished.
  async fn drain(manager: Manager, mut rx: UnboundedReceiver<Message>) -> Vec<Message> {
    drop(manager);
    let mut sent = Vec::new();
    while let Some(message) = rx.recv().await {
      sent.push(message);
    }
    sent
  }

  #[tokio::test]
  async fn create_persists_pending_request_with_derived_approver() {
    let (m, _rx) = manager(TransitionPolicy::AlwaysApply);
    let id = m.create_request(alice()).await.unwrap();

    let listed = m.list_requests().await.unwrap();
    let request = listed.iter().find(|r| r.id == id).unwrap();
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request.requester_name, "Alice");
    assert_eq!(request.requester_email, "alice@x.com");
    assert_eq!(request.requested_date, "2025-01-10");
    assert_eq!(request.notes.as_deref(), Some(""));
    assert_eq!(request.authorized_by, "Eva");
    assert_eq!(request.authorized_email, "manager@mmcwellness.ca");
  }

  #[tokio::test]
  async fn create_returns_fresh_ids_and_lists_newest_first() {
    let (m, _rx) = manager(TransitionPolicy::AlwaysApply);
    let mut ids = Vec::new();
    for _ in 0..5 {
      ids.push(m.create_request(alice()).await.unwrap());
    }
    let unique: HashSet<_> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len());

    let listed: Vec<_> = m.list_requests().await.unwrap().iter().map(|r| r.id).collect();
    ids.reverse();
    assert_eq!(listed, ids);
  }

  #[tokio::test]
  async fn create_notifies_ops_and_approver() {
    let (m, rx) = manager(TransitionPolicy::AlwaysApply);
    let id = m.create_request(alice()).await.unwrap();

    let sent = drain(m, rx).await;
    assert_eq!(sent.len(), 2);

    let ops = sent.iter().find(|s| s.to == "it@mmcwellness.ca").unwrap();
    assert_eq!(ops.subject, "New Data Request Submitted");

    let approver = sent.iter().find(|s| s.to == "manager@mmcwellness.ca").unwrap();
    assert!(approver.html.contains(&format!("/api/requests/{id}/approve")));
    assert!(approver.html.contains(&format!("/api/requests/{id}/reject")));
  }

  #[tokio::test]
  async fn create_without_approver_still_succeeds() {
    let (m, _rx) = manager(TransitionPolicy::AlwaysApply);
    let mut input = alice();
    input.request_type = "KPI".into();
    let id = m.create_request(input).await.unwrap();

    let request = m.get_request(id).await.unwrap();
    assert_eq!(request.authorized_by, "Unknown");
    assert_eq!(request.authorized_email, "no-email");
  }

  #[tokio::test]
  async fn invalid_input_is_rejected_without_side_effects() {
    let (m, rx) = manager(TransitionPolicy::AlwaysApply);
    let mut input = alice();
    input.requester_name = String::new();

    let err = m.create_request(input).await.unwrap_err();
    assert!(matches!(err, Error::Validation { field: "requester_name", .. }));
    assert!(m.list_requests().await.unwrap().is_empty());
    assert!(drain(m, rx).await.is_empty());
  }

  #[tokio::test]
  async fn approve_sets_status_and_notifies_requester() {
    let (m, rx) = manager(TransitionPolicy::AlwaysApply);
    let id = m.create_request(alice()).await.unwrap();

    let outcome = m.transition_request(id, Decision::Approve).await.unwrap();
    assert_eq!(outcome.request.status, RequestStatus::Approved);
    assert_eq!(
      outcome.confirmation(),
      format!("Request {id} has been approved, and the requester will be notified by email.")
    );
    assert_eq!(m.get_request(id).await.unwrap().status, RequestStatus::Approved);

    let sent = drain(m, rx).await;
    let notice = sent.iter().find(|s| s.to == "alice@x.com").unwrap();
    assert_eq!(notice.subject, "Your data request has been approved");
  }

  #[tokio::test]
  async fn reject_also_notifies_ops() {
    let (m, rx) = manager(TransitionPolicy::AlwaysApply);
    let id = m.create_request(alice()).await.unwrap();

    m.transition_request(id, Decision::Reject).await.unwrap();
    assert_eq!(m.get_request(id).await.unwrap().status, RequestStatus::Rejected);

    let sent = drain(m, rx).await;
    // Two from creation, two from the rejection.
    assert_eq!(sent.len(), 4);
    assert!(sent.iter().any(|s| s.to == "alice@x.com"
      && s.subject == "Your data request has been rejected"));
    assert!(sent.iter().any(|s| s.to == "it@mmcwellness.ca"
      && s.subject == "Data Request Rejected"));
  }

  #[tokio::test]
  async fn unknown_id_is_not_found_and_sends_nothing() {
    let (m, rx) = manager(TransitionPolicy::AlwaysApply);

    let err = m
      .transition_request(RequestId(99999), Decision::Reject)
      .await
      .unwrap_err();
    assert!(matches!(err, Error::NotFound(RequestId(99999))));
    assert!(m.list_requests().await.unwrap().is_empty());
    assert!(drain(m, rx).await.is_empty());
  }

  #[tokio::test]
  async fn always_apply_lets_a_later_decision_overwrite() {
    let (m, _rx) = manager(TransitionPolicy::AlwaysApply);
    let id = m.create_request(alice()).await.unwrap();

    m.transition_request(id, Decision::Approve).await.unwrap();
    m.transition_request(id, Decision::Reject).await.unwrap();
    assert_eq!(m.get_request(id).await.unwrap().status, RequestStatus::Rejected);
  }

  #[tokio::test]
  async fn first_decision_wins_refuses_second_decision() {
    let (m, _rx) = manager(TransitionPolicy::FirstDecisionWins);
    let id = m.create_request(alice()).await.unwrap();

    m.transition_request(id, Decision::Approve).await.unwrap();
    let err = m.transition_request(id, Decision::Reject).await.unwrap_err();
    assert!(matches!(
      err,
      Error::AlreadyDecided { status: RequestStatus::Approved, .. }
    ));
    assert_eq!(m.get_request(id).await.unwrap().status, RequestStatus::Approved);
  }

  // ── Store failure ───────────────────────────────────────────────────────────

  #[derive(Debug, thiserror::Error)]
  #[error("disk full")]
  struct DiskFull;

  struct BrokenStore;

  impl RequestStore for BrokenStore {
    type Error = DiskFull;

    async fn insert(&self, _input: NewRequest) -> Result<Request, DiskFull> {
      Err(DiskFull)
    }

    async fn get(&self, _id: RequestId) -> Result<Option<Request>, DiskFull> {
      Err(DiskFull)
    }

    async fn set_status(
      &self,
      _id: RequestId,
      _status: RequestStatus,
      _guard: StatusGuard,
    ) -> Result<bool, DiskFull> {
      Err(DiskFull)
    }

    async fn list(&self) -> Result<Vec<Request>, DiskFull> { Err(DiskFull) }
  }

  #[tokio::test]
  async fn store_failure_aborts_creation_without_notifying() {
    let (notifier, mut rx) = ChannelNotifier::new();
    let m = LifecycleManager::new(
      Arc::new(BrokenStore),
      Arc::new(notifier),
      WorkflowConfig {
        base_url:          "http://localhost:3000".into(),
        ops_address:       "it@mmcwellness.ca".into(),
        transition_policy: TransitionPolicy::AlwaysApply,
      },
    );

    let err = m.create_request(alice()).await.unwrap_err();
    assert!(matches!(err, Error::Store(_)));

    drop(m);
    assert!(rx.recv().await.is_none());
  }

  #[tokio::test]
  async fn store_failure_aborts_transition_without_notifying() {
    let (notifier, mut rx) = ChannelNotifier::new();
    let m = LifecycleManager::new(
      Arc::new(BrokenStore),
      Arc::new(notifier),
      WorkflowConfig {
        base_url:          "http://localhost:3000".into(),
        ops_address:       "it@mmcwellness.ca".into(),
        transition_policy: TransitionPolicy::FirstDecisionWins,
      },
    );

    for decision in [Decision::Approve, Decision::Reject] {
      let err = m.transition_request(RequestId(1), decision).await.unwrap_err();
      assert!(matches!(err, Error::Store(_)), "{err:?}");
    }

    drop(m);
    assert!(rx.recv().await.is_none());
  }

  // ── Notifier failure ────────────────────────────────────────────────────────

  #[derive(Debug, thiserror::Error)]
  #[error("relay unreachable")]
  struct RelayDown;

  struct FailingNotifier;

  impl Notifier for FailingNotifier {
    type Error = RelayDown;

    async fn send(&self, _message: Message) -> Result<(), RelayDown> {
      Err(RelayDown)
    }
  }

  #[tokio::test]
  async fn notifier_failure_does_not_fail_operations() {
    let m = LifecycleManager::new(
      Arc::new(MemoryStore::new()),
      Arc::new(FailingNotifier),
      WorkflowConfig {
        base_url:          "http://localhost:3000".into(),
        ops_address:       "it@mmcwellness.ca".into(),
        transition_policy: TransitionPolicy::AlwaysApply,
      },
    );

    let approved = m.create_request(alice()).await.unwrap();
    let outcome = m.transition_request(approved, Decision::Approve).await.unwrap();
    assert_eq!(outcome.request.status, RequestStatus::Approved);

    let rejected = m.create_request(alice()).await.unwrap();
    let outcome = m.transition_request(rejected, Decision::Reject).await.unwrap();
    assert_eq!(outcome.request.status, RequestStatus::Rejected);

    assert_eq!(m.get_request(approved).await.unwrap().status, RequestStatus::Approved);
  }
}
