// ── Ordered reactive entity cache ──
//
// The manager's visible truth between synchronizations. Records keep the
// order they were inserted in (or the order the backend listed them in);
// every mutation publishes a fresh snapshot through a `watch` channel.

use std::sync::Arc;

use tokio::sync::watch;

use crate::entity::Entity;
use crate::model::EntityId;

pub(crate) struct EntityCache<T: Entity> {
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Entity> EntityCache<T> {
    pub(crate) fn new(seed: Vec<T>) -> Self {
        let records = seed.into_iter().map(Arc::new).collect();
        let (snapshot, _) = watch::channel(Arc::new(records));
        Self { snapshot }
    }

    /// Current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn get(&self, id: &EntityId) -> Option<Arc<T>> {
        self.snapshot
            .borrow()
            .iter()
            .find(|e| e.id() == id)
            .map(Arc::clone)
    }

    pub(crate) fn len(&self) -> usize {
        self.snapshot.borrow().len()
    }

    /// Replace every record (server truth after a successful list).
    pub(crate) fn replace_all(&self, records: Vec<T>) {
        let records = records.into_iter().map(Arc::new).collect();
        // `send_replace` updates unconditionally, even with zero receivers.
        self.snapshot.send_replace(Arc::new(records));
    }

    /// Append a record.
    pub(crate) fn push(&self, record: T) {
        self.snapshot.send_modify(|snap| {
            let mut next = Vec::clone(snap);
            next.push(Arc::new(record));
            *snap = Arc::new(next);
        });
    }

    /// Swap the record with `id` in place. Returns the previous value.
    pub(crate) fn replace(&self, id: &EntityId, record: Arc<T>) -> Option<Arc<T>> {
        let mut previous = None;
        self.snapshot.send_if_modified(|snap| {
            let Some(index) = snap.iter().position(|e| e.id() == id) else {
                return false;
            };
            let mut next = Vec::clone(snap);
            previous = Some(std::mem::replace(&mut next[index], record));
            *snap = Arc::new(next);
            true
        });
        previous
    }

    /// Remove the record with `id`, returning it with its former position.
    pub(crate) fn remove(&self, id: &EntityId) -> Option<(usize, Arc<T>)> {
        let mut removed = None;
        self.snapshot.send_if_modified(|snap| {
            let Some(index) = snap.iter().position(|e| e.id() == id) else {
                return false;
            };
            let mut next = Vec::clone(snap);
            removed = Some((index, next.remove(index)));
            *snap = Arc::new(next);
            true
        });
        removed
    }

    /// Put a record back at `index` (clamped to the current length).
    pub(crate) fn insert_at(&self, index: usize, record: Arc<T>) {
        self.snapshot.send_modify(|snap| {
            let mut next = Vec::clone(snap);
            next.insert(index.min(next.len()), record);
            *snap = Arc::new(next);
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Teacher;

    fn teacher(id: u64, name: &str) -> Teacher {
        Teacher {
            id: EntityId::Local(id),
            name: name.into(),
            email: format!("{name}@school.edu"),
            course: None,
        }
    }

    fn names(cache: &EntityCache<Teacher>) -> Vec<String> {
        cache.snapshot().iter().map(|t| t.name.clone()).collect()
    }

    #[test]
    fn replace_keeps_position() {
        let cache = EntityCache::new(vec![teacher(1, "a"), teacher(2, "b"), teacher(3, "c")]);
        let old = cache
            .replace(&EntityId::Local(2), Arc::new(teacher(2, "B")))
            .unwrap();
        assert_eq!(old.name, "b");
        assert_eq!(names(&cache), vec!["a", "B", "c"]);
    }

    #[test]
    fn remove_then_insert_at_restores_order() {
        let cache = EntityCache::new(vec![teacher(1, "a"), teacher(2, "b"), teacher(3, "c")]);
        let (index, removed) = cache.remove(&EntityId::Local(2)).unwrap();
        assert_eq!(names(&cache), vec!["a", "c"]);
        cache.insert_at(index, removed);
        assert_eq!(names(&cache), vec!["a", "b", "c"]);
    }

    #[test]
    fn missing_id_does_not_notify() {
        let cache = EntityCache::new(vec![teacher(1, "a")]);
        let rx = cache.subscribe();
        assert!(cache.remove(&EntityId::Local(9)).is_none());
        assert!(cache.replace(&EntityId::Local(9), Arc::new(teacher(9, "z"))).is_none());
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn push_notifies_subscribers() {
        let cache: EntityCache<Teacher> = EntityCache::new(Vec::new());
        let rx = cache.subscribe();
        cache.push(teacher(1, "a"));
        assert!(rx.has_changed().unwrap());
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&EntityId::Local(1)).is_some());
    }
}
