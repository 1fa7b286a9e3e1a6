//! [`MemoryStore`]: a process-local [`RequestStore`] for tests and demos.

use std::{
  convert::Infallible,
  sync::{Mutex, MutexGuard},
};

use chrono::Utc;

use crate::{
  request::{NewRequest, Request, RequestId, RequestStatus},
  store::{RequestStore, StatusGuard},
};

/// Requests kept in a `Vec` behind a mutex, ids assigned from 1 upwards.
#[derive(Debug, Default)]
pub struct MemoryStore {
  inner: Mutex<Vec<Request>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  fn rows(&self) -> MutexGuard<'_, Vec<Request>> {
    // A poisoned lock only means another test thread panicked mid-write.
    self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}

impl RequestStore for MemoryStore {
  type Error = Infallible;

  async fn insert(&self, input: NewRequest) -> Result<Request, Infallible> {
    let mut rows = self.rows();
    let next = rows.last().map_or(1, |r| r.id.0 + 1);
    let request = Request {
      id:               RequestId(next),
      requester_name:   input.requester_name,
      requester_email:  input.requester_email,
      request_type:     input.request_type,
      authorized_by:    input.authorized_by,
      authorized_email: input.authorized_email,
      requested_date:   input.requested_date,
      notes:            input.notes,
      status:           RequestStatus::Pending,
      created_at:       Utc::now(),
    };
    rows.push(request.clone());
    Ok(request)
  }

  async fn get(&self, id: RequestId) -> Result<Option<Request>, Infallible> {
    Ok(self.rows().iter().find(|r| r.id == id).cloned())
  }

  async fn set_status(
    &self,
    id: RequestId,
    status: RequestStatus,
    guard: StatusGuard,
  ) -> Result<bool, Infallible> {
    let mut rows = self.rows();
    match rows.iter_mut().find(|r| r.id == id) {
      Some(row) if guard.permits(row.status) => {
        row.status = status;
        Ok(true)
      }
      _ => Ok(false),
    }
  }

  async fn list(&self) -> Result<Vec<Request>, Infallible> {
    Ok(self.rows().iter().rev().cloned().collect())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::request::CreateRequest;

  fn new_request(name: &str) -> NewRequest {
    NewRequest::try_from(CreateRequest {
      requester_name:  name.into(),
      requester_email: format!("{name}@x.com"),
      request_type:    "Eva:manager@x.com".into(),
      requested_date:  "2025-01-10".into(),
      notes:           None,
    })
    .unwrap()
  }

  #[tokio::test]
  async fn ids_increase_and_list_is_descending() {
    let store = MemoryStore::new();
    let a = store.insert(new_request("a")).await.unwrap();
    let b = store.insert(new_request("b")).await.unwrap();
    assert!(b.id > a.id);

    let ids: Vec<_> = store.list().await.unwrap().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![b.id, a.id]);
  }

  #[tokio::test]
  async fn guarded_update_leaves_decided_request_alone() {
    let store = MemoryStore::new();
    let r = store.insert(new_request("a")).await.unwrap();

    assert!(
      store
        .set_status(r.id, RequestStatus::Approved, StatusGuard::OnlyIfPending)
        .await
        .unwrap()
    );
    assert!(
      !store
        .set_status(r.id, RequestStatus::Rejected, StatusGuard::OnlyIfPending)
        .await
        .unwrap()
    );
    let status = store.get(r.id).await.unwrap().unwrap().status;
    assert_eq!(status, RequestStatus::Approved);
  }
}
