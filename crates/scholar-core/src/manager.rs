// ── Generic entity manager ──
//
// Owns one entity kind's cache and its mutation operations. With a
// gateway the backend is the source of truth and every successful
// mutation is followed by a full re-list; without one the cache is the
// only truth and mutations apply directly.
//
// At most one operation per kind is in flight: a second caller gets
// `CoreError::Busy` instead of racing the first. Every remote call is
// bounded by the manager's timeout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, MutexGuard, watch};
use tokio::time::error::Elapsed;
use tracing::{debug, info, warn};

use crate::entity::{Entity, LocalIdStrategy};
use crate::error::{CoreError, Operation};
use crate::gateway::Gateway;
use crate::model::{EntityId, EntityKind};
use crate::store::EntityCache;
use crate::stream::EntityStream;

/// Default bound on a single remote call.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// The last failed synchronization, kept until the next successful list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFault {
    pub message: String,
    pub at: DateTime<Utc>,
}

impl SyncFault {
    fn now(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            at: Utc::now(),
        }
    }
}

/// Cache plus mutation operations for one entity kind.
pub struct EntityManager<E: Entity> {
    cache: EntityCache<E>,
    gateway: Option<Arc<dyn Gateway<E>>>,
    timeout: Duration,
    in_flight: Mutex<()>,
    fault: watch::Sender<Option<SyncFault>>,
}

impl<E: Entity> EntityManager<E> {
    // ── Constructors ─────────────────────────────────────────────────

    /// Local-only manager seeded with `records`.
    pub fn local(records: Vec<E>) -> Self {
        Self::build(records, None, DEFAULT_OPERATION_TIMEOUT)
    }

    /// Server-backed manager. The cache starts empty until `list()`.
    pub fn remote(gateway: Arc<dyn Gateway<E>>, timeout: Duration) -> Self {
        Self::build(Vec::new(), Some(gateway), timeout)
    }

    fn build(records: Vec<E>, gateway: Option<Arc<dyn Gateway<E>>>, timeout: Duration) -> Self {
        let (fault, _) = watch::channel(None);
        Self {
            cache: EntityCache::new(records),
            gateway,
            timeout,
            in_flight: Mutex::new(()),
            fault,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn kind(&self) -> EntityKind {
        E::KIND
    }

    pub fn is_server_backed(&self) -> bool {
        self.gateway.is_some()
    }

    pub fn get(&self, id: &EntityId) -> Option<Arc<E>> {
        self.cache.get(id)
    }

    /// The cached id displayed as `text`, if any.
    pub fn find_id(&self, text: &str) -> Option<EntityId> {
        self.cache
            .snapshot()
            .iter()
            .find(|e| e.id().matches_text(text))
            .map(|e| e.id().clone())
    }

    pub fn snapshot(&self) -> Arc<Vec<Arc<E>>> {
        self.cache.snapshot()
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Subscribe to cache changes.
    pub fn subscribe(&self) -> EntityStream<E> {
        EntityStream::new(self.cache.subscribe())
    }

    /// The standing sync fault, if the last list failed.
    pub fn sync_fault(&self) -> Option<SyncFault> {
        self.fault.borrow().clone()
    }

    /// Whether an operation on this kind is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Replace the cache with the backend's collection.
    ///
    /// On failure the cache is left untouched and a `SyncFault` is
    /// recorded. Local-only managers return the cache as is.
    pub async fn list(&self) -> Result<Arc<Vec<Arc<E>>>, CoreError> {
        let _guard = self.acquire()?;
        self.refresh().await?;
        Ok(self.cache.snapshot())
    }

    /// Validate and create a record.
    ///
    /// Local-only managers append immediately and return the new id.
    /// Server-backed managers never insert optimistically: the record
    /// appears once the follow-up list returns it, and `None` is
    /// returned since the backend assigns the id.
    pub async fn create(&self, draft: &E::Draft) -> Result<Option<EntityId>, CoreError> {
        let _guard = self.acquire()?;
        let valid = E::validate(draft, &self.cache.snapshot(), None)?;

        let Some(gateway) = &self.gateway else {
            let id = self.next_local_id();
            self.cache.push(E::from_valid(id.clone(), &valid));
            info!(kind = %E::KIND, %id, "record created");
            return Ok(Some(id));
        };

        self.call(Operation::Create, gateway.create(&valid)).await?;
        info!(kind = %E::KIND, "record created remotely");
        self.refresh_after(Operation::Create).await;
        Ok(None)
    }

    /// Validate and replace the record with `id`.
    ///
    /// The new values are applied to the cache immediately; if the
    /// remote update fails the previous values are restored.
    pub async fn update(&self, id: &EntityId, draft: &E::Draft) -> Result<(), CoreError> {
        let _guard = self.acquire()?;
        let snapshot = self.cache.snapshot();
        if !snapshot.iter().any(|e| e.id() == id) {
            return Err(Self::not_found(id));
        }
        let valid = E::validate(draft, &snapshot, Some(id))?;

        let updated = Arc::new(E::from_valid(id.clone(), &valid));
        let Some(previous) = self.cache.replace(id, updated) else {
            return Err(Self::not_found(id));
        };

        if let Some(gateway) = &self.gateway {
            if let Err(e) = self.call(Operation::Update, gateway.update(id, &valid)).await {
                self.cache.replace(id, previous);
                warn!(kind = %E::KIND, %id, error = %e, "update failed, rolled back");
                return Err(e);
            }
            self.refresh_after(Operation::Update).await;
        }
        info!(kind = %E::KIND, %id, "record updated");
        Ok(())
    }

    /// Remove the record with `id`.
    ///
    /// The record leaves the cache immediately and is restored at its
    /// former position if the remote delete fails. Server-backed managers
    /// issue the delete even for an id the cache does not hold, and a
    /// backend 404 counts as already removed. Local-only managers treat
    /// an absent id as a no-op.
    pub async fn remove(&self, id: &EntityId) -> Result<(), CoreError> {
        let _guard = self.acquire()?;
        let cached = self.cache.remove(id);

        let Some(gateway) = &self.gateway else {
            if cached.is_none() {
                debug!(kind = %E::KIND, %id, "remove of absent record ignored");
            } else {
                info!(kind = %E::KIND, %id, "record removed");
            }
            return Ok(());
        };

        let outcome = tokio::time::timeout(self.timeout, gateway.delete(id)).await;
        let result = match outcome {
            Ok(Err(e)) if e.is_not_found() => {
                debug!(kind = %E::KIND, %id, "backend reports record already gone");
                Ok(())
            }
            other => self.settle(Operation::Remove, other),
        };
        if let Err(e) = result {
            if let Some((index, removed)) = cached {
                self.cache.insert_at(index, removed);
                warn!(kind = %E::KIND, %id, error = %e, "remove failed, restored");
            }
            return Err(e);
        }
        self.refresh_after(Operation::Remove).await;
        info!(kind = %E::KIND, %id, "record removed");
        Ok(())
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn acquire(&self) -> Result<MutexGuard<'_, ()>, CoreError> {
        self.in_flight
            .try_lock()
            .map_err(|_| CoreError::Busy { kind: E::KIND })
    }

    fn not_found(id: &EntityId) -> CoreError {
        debug!(kind = %E::KIND, %id, "mutation target not in cache");
        CoreError::NotFound {
            kind: E::KIND,
            id: id.clone(),
        }
    }

    /// Re-list from the backend. Caller holds the in-flight guard.
    async fn refresh(&self) -> Result<(), CoreError> {
        let Some(gateway) = &self.gateway else {
            return Ok(());
        };
        match self.call(Operation::List, gateway.list()).await {
            Ok(records) => {
                let count = records.len();
                self.cache.replace_all(records);
                self.fault.send_replace(None);
                debug!(kind = %E::KIND, count, "cache refreshed");
                Ok(())
            }
            Err(e) => {
                warn!(kind = %E::KIND, error = %e, "list failed, keeping last-known-good cache");
                self.fault.send_replace(Some(SyncFault::now(e.to_string())));
                Err(e)
            }
        }
    }

    /// Re-list after a confirmed mutation. A failure here does not undo
    /// the mutation; it only leaves a sync fault behind.
    async fn refresh_after(&self, operation: Operation) {
        if self.refresh().await.is_err() {
            warn!(kind = %E::KIND, %operation, "mutation succeeded but the follow-up list failed");
        }
    }

    async fn call<T>(
        &self,
        operation: Operation,
        request: impl Future<Output = Result<T, scholar_api::Error>>,
    ) -> Result<T, CoreError> {
        let outcome = tokio::time::timeout(self.timeout, request).await;
        self.settle(operation, outcome)
    }

    fn settle<T>(
        &self,
        operation: Operation,
        outcome: Result<Result<T, scholar_api::Error>, Elapsed>,
    ) -> Result<T, CoreError> {
        match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(CoreError::OperationFailed {
                kind: E::KIND,
                operation,
                message: e.to_string(),
            }),
            Err(_) => Err(CoreError::OperationFailed {
                kind: E::KIND,
                operation,
                message: format!("timed out after {}s", self.timeout.as_secs()),
            }),
        }
    }

    fn next_local_id(&self) -> EntityId {
        let max = self
            .cache
            .snapshot()
            .iter()
            .filter_map(|e| e.id().as_local())
            .max();
        let next = match E::LOCAL_IDS {
            LocalIdStrategy::Sequential => max.map_or(1, |m| m.saturating_add(1)),
            LocalIdStrategy::Timestamp => {
                let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
                match max {
                    Some(m) if m >= now => m.saturating_add(1),
                    _ => now,
                }
            }
        };
        EntityId::Local(next)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::draft::{StudentDraft, TeacherDraft};
    use crate::model::{Student, Teacher};

    fn teacher_draft(name: &str, email: &str) -> TeacherDraft {
        TeacherDraft {
            name: name.into(),
            email: email.into(),
            course: None,
        }
    }

    fn student(id: u64, name: &str) -> Student {
        Student {
            id: EntityId::Local(id),
            name: name.into(),
            grade: "A".into(),
            department: "Math".into(),
            status: crate::model::Status::Active,
            courses: Vec::new(),
        }
    }

    #[tokio::test]
    async fn sequential_ids_follow_the_max() {
        let manager = EntityManager::local(vec![student(4, "a"), student(2, "b")]);
        let draft = StudentDraft {
            name: "c".into(),
            grade: "B".into(),
            department: "Art".into(),
            ..StudentDraft::default()
        };
        let id = manager.create(&draft).await.unwrap();
        assert_eq!(id, Some(EntityId::Local(5)));
        assert_eq!(manager.len(), 3);
    }

    #[tokio::test]
    async fn first_sequential_id_is_one() {
        let manager: EntityManager<Student> = EntityManager::local(Vec::new());
        let draft = StudentDraft {
            name: "a".into(),
            grade: "B".into(),
            department: "Art".into(),
            ..StudentDraft::default()
        };
        assert_eq!(manager.create(&draft).await.unwrap(), Some(EntityId::Local(1)));
    }

    #[tokio::test]
    async fn timestamp_ids_never_collide() {
        let manager: EntityManager<Teacher> = EntityManager::local(Vec::new());
        let a = manager
            .create(&teacher_draft("A", "a@school.edu"))
            .await
            .unwrap()
            .unwrap();
        let b = manager
            .create(&teacher_draft("B", "b@school.edu"))
            .await
            .unwrap()
            .unwrap();
        assert_ne!(a, b);
        assert!(b.as_local().unwrap() > a.as_local().unwrap());
    }

    #[tokio::test]
    async fn local_list_is_a_noop() {
        let manager = EntityManager::local(vec![student(1, "a")]);
        let snapshot = manager.list().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert!(manager.sync_fault().is_none());
        assert!(!manager.is_server_backed());
    }

    #[tokio::test]
    async fn update_of_missing_id_is_not_found() {
        let manager = EntityManager::local(vec![student(1, "a")]);
        let draft = StudentDraft::from(&student(9, "z"));
        let err = manager.update(&EntityId::Local(9), &draft).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(manager.snapshot()[0].name, "a");
    }
}
