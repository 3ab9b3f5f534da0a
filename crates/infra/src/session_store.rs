use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

/// Key/value store for short-lived per-session state.
///
/// Sessions are process-local and disposable; nothing here survives a restart.
pub trait SessionStore<K, V>: Send + Sync {
    fn get(&self, key: &K) -> Option<V>;
    fn upsert(&self, key: K, value: V);
    /// Remove a session, returning it if it existed.
    fn remove(&self, key: &K) -> Option<V>;
    /// Apply `f` to the stored session under the write lock.
    ///
    /// Returns `None` when there is no session for `key`.
    fn update<T>(&self, key: &K, f: impl FnOnce(&mut V) -> T) -> Option<T>;
    /// Drop sessions that have been idle past the store's TTL. Returns how many went.
    fn evict_expired(&self) -> usize;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V, S> SessionStore<K, V> for Arc<S>
where
    S: SessionStore<K, V> + ?Sized,
{
    fn get(&self, key: &K) -> Option<V> {
        (**self).get(key)
    }

    fn upsert(&self, key: K, value: V) {
        (**self).upsert(key, value)
    }

    fn remove(&self, key: &K) -> Option<V> {
        (**self).remove(key)
    }

    fn update<T>(&self, key: &K, f: impl FnOnce(&mut V) -> T) -> Option<T> {
        (**self).update(key, f)
    }

    fn evict_expired(&self) -> usize {
        (**self).evict_expired()
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    last_touched: Instant,
}

/// In-memory session store guarded by a `RwLock`.
///
/// With an idle TTL, every `get`/`update` refreshes the session and a session
/// untouched for longer than the TTL reads as missing until it is evicted.
/// A panic inside an `update` closure does not take the store down: the lock
/// is recovered and the other sessions stay reachable.
#[derive(Debug)]
pub struct InMemorySessionStore<K, V> {
    inner: RwLock<HashMap<K, Entry<V>>>,
    idle_ttl: Option<Duration>,
}

impl<K, V> InMemorySessionStore<K, V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            idle_ttl: None,
        }
    }

    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            idle_ttl: Some(idle_ttl),
        }
    }

    pub fn idle_ttl(&self) -> Option<Duration> {
        self.idle_ttl
    }

    fn is_expired(&self, entry: &Entry<V>, now: Instant) -> bool {
        self.idle_ttl
            .is_some_and(|ttl| now.saturating_duration_since(entry.last_touched) > ttl)
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<K, Entry<V>>> {
        self.inner.read().unwrap_or_else(|poisoned| {
            tracing::warn!("session store lock poisoned by an earlier panic; recovering");
            self.inner.clear_poison();
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<K, Entry<V>>> {
        self.inner.write().unwrap_or_else(|poisoned| {
            tracing::warn!("session store lock poisoned by an earlier panic; recovering");
            self.inner.clear_poison();
            poisoned.into_inner()
        })
    }
}

impl<K, V> Default for InMemorySessionStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> InMemorySessionStore<K, V>
where
    K: Eq + Hash,
{
    /// Live entry for `key`, refreshed to `now`. An expired entry is dropped on the spot.
    fn touch<'a>(&self, map: &'a mut HashMap<K, Entry<V>>, key: &K, now: Instant) -> Option<&'a mut Entry<V>> {
        if map.get(key).is_some_and(|entry| self.is_expired(entry, now)) {
            map.remove(key);
            return None;
        }
        let entry = map.get_mut(key)?;
        entry.last_touched = now;
        Some(entry)
    }
}

impl<K, V> SessionStore<K, V> for InMemorySessionStore<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    fn get(&self, key: &K) -> Option<V> {
        let mut map = self.write();
        self.touch(&mut map, key, Instant::now())
            .map(|entry| entry.value.clone())
    }

    fn upsert(&self, key: K, value: V) {
        self.write().insert(
            key,
            Entry {
                value,
                last_touched: Instant::now(),
            },
        );
    }

    fn remove(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let entry = self.write().remove(key)?;
        (!self.is_expired(&entry, now)).then_some(entry.value)
    }

    fn update<T>(&self, key: &K, f: impl FnOnce(&mut V) -> T) -> Option<T> {
        let mut map = self.write();
        self.touch(&mut map, key, Instant::now())
            .map(|entry| f(&mut entry.value))
    }

    fn evict_expired(&self) -> usize {
        if self.idle_ttl.is_none() {
            return 0;
        }
        let now = Instant::now();
        let mut map = self.write();
        let before = map.len();
        map.retain(|_, entry| !self.is_expired(entry, now));
        before - map.len()
    }

    fn len(&self) -> usize {
        let now = Instant::now();
        self.read()
            .values()
            .filter(|entry| !self.is_expired(entry, now))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use summit_core::DraftId;

    #[test]
    fn upsert_get_remove() {
        let store: InMemorySessionStore<DraftId, String> = InMemorySessionStore::new();
        let id = DraftId::new();

        assert!(store.get(&id).is_none());
        store.upsert(id, "draft".to_string());
        assert_eq!(store.get(&id).as_deref(), Some("draft"));
        assert_eq!(store.len(), 1);

        assert_eq!(store.remove(&id).as_deref(), Some("draft"));
        assert!(store.is_empty());
        assert!(store.remove(&id).is_none());
    }

    #[test]
    fn update_mutates_in_place_and_reports_missing() {
        let store: Arc<InMemorySessionStore<DraftId, Vec<u32>>> = Arc::new(InMemorySessionStore::new());
        let id = DraftId::new();
        store.upsert(id, vec![1]);

        let len = store.update(&id, |v| {
            v.push(2);
            v.len()
        });
        assert_eq!(len, Some(2));
        assert_eq!(store.get(&id), Some(vec![1, 2]));

        assert_eq!(store.update(&DraftId::new(), |v| v.len()), None);
    }

    #[test]
    fn sessions_are_isolated() {
        let store: InMemorySessionStore<DraftId, u32> = InMemorySessionStore::new();
        let a = DraftId::new();
        let b = DraftId::new();
        store.upsert(a, 1);
        store.upsert(b, 2);

        store.update(&a, |v| *v += 10);
        assert_eq!(store.get(&a), Some(11));
        assert_eq!(store.get(&b), Some(2));
    }

    #[test]
    fn panicking_update_does_not_poison_other_sessions() {
        let store: InMemorySessionStore<DraftId, u32> = InMemorySessionStore::new();
        let a = DraftId::new();
        let b = DraftId::new();
        store.upsert(a, 1);
        store.upsert(b, 2);

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            store.update(&a, |_| -> u32 { panic!("edit blew up") })
        }));
        assert!(outcome.is_err());

        assert_eq!(store.get(&b), Some(2));
        assert_eq!(store.update(&b, |v| *v + 1), Some(3));

        let c = DraftId::new();
        store.upsert(c, 3);
        assert_eq!(store.get(&c), Some(3));
        assert_eq!(store.len(), 3);
        assert_eq!(store.remove(&a), Some(1));
    }

    #[test]
    fn idle_sessions_expire_and_touching_keeps_them_alive() {
        let store: InMemorySessionStore<DraftId, u32> =
            InMemorySessionStore::with_idle_ttl(Duration::from_millis(300));
        let idle = DraftId::new();
        let busy = DraftId::new();
        store.upsert(idle, 1);
        store.upsert(busy, 2);

        for _ in 0..4 {
            std::thread::sleep(Duration::from_millis(100));
            assert_eq!(store.get(&busy), Some(2));
        }

        assert_eq!(store.get(&idle), None);
        assert_eq!(store.update(&idle, |v| *v), None);
        assert_eq!(store.get(&busy), Some(2));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn evict_expired_sweeps_idle_sessions() {
        let store: InMemorySessionStore<DraftId, u32> =
            InMemorySessionStore::with_idle_ttl(Duration::from_millis(20));
        store.upsert(DraftId::new(), 1);
        store.upsert(DraftId::new(), 2);
        assert_eq!(store.evict_expired(), 0);

        std::thread::sleep(Duration::from_millis(60));
        let fresh = DraftId::new();
        store.upsert(fresh, 3);

        assert_eq!(store.evict_expired(), 2);
        assert_eq!(store.get(&fresh), Some(3));
        assert_eq!(InMemorySessionStore::<DraftId, u32>::new().evict_expired(), 0);
    }
}
