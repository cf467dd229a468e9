//! Bounded map of per-user search sessions.
//!
//! A session is dropped once it has been idle for `idle_ttl`. When the map is
//! still full after that, the least recently used session is evicted. An
//! evicted user simply starts over with a fresh session.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use stockfinder_core::UserId;

#[derive(Debug)]
struct Slot<V> {
    value: Arc<V>,
    last_used: Instant,
}

#[derive(Debug)]
pub struct SessionCache<V> {
    capacity: usize,
    idle_ttl: Duration,
    slots: HashMap<UserId, Slot<V>>,
}

impl<V> SessionCache<V> {
    /// `capacity` is raised to 1 if zero.
    pub fn new(capacity: usize, idle_ttl: Duration) -> Self {
        Self {
            capacity: capacity.max(1),
            idle_ttl,
            slots: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The live session for `user_id`, marking it used.
    pub fn get(&mut self, user_id: UserId) -> Option<Arc<V>> {
        self.get_at(user_id, Instant::now())
    }

    /// The live session for `user_id`, or a new one from `make`.
    pub fn get_or_insert_with(&mut self, user_id: UserId, make: impl FnOnce() -> V) -> Arc<V> {
        self.get_or_insert_with_at(user_id, Instant::now(), make)
    }

    fn get_at(&mut self, user_id: UserId, now: Instant) -> Option<Arc<V>> {
        let slot = self.slots.get_mut(&user_id)?;
        if now.saturating_duration_since(slot.last_used) <= self.idle_ttl {
            slot.last_used = now;
            return Some(Arc::clone(&slot.value));
        }

        self.slots.remove(&user_id);
        tracing::debug!(%user_id, "search session expired");
        None
    }

    fn get_or_insert_with_at(
        &mut self,
        user_id: UserId,
        now: Instant,
        make: impl FnOnce() -> V,
    ) -> Arc<V> {
        if let Some(value) = self.get_at(user_id, now) {
            return value;
        }

        self.prune_idle(now);
        while self.slots.len() >= self.capacity {
            let Some(oldest) = self
                .slots
                .iter()
                .min_by_key(|(_, slot)| slot.last_used)
                .map(|(id, _)| *id)
            else {
                break;
            };
            self.slots.remove(&oldest);
            tracing::debug!(user_id = %oldest, capacity = self.capacity, "evicted least recently used search session");
        }

        let value = Arc::new(make());
        self.slots.insert(
            user_id,
            Slot {
                value: Arc::clone(&value),
                last_used: now,
            },
        );
        value
    }

    fn prune_idle(&mut self, now: Instant) {
        let before = self.slots.len();
        let idle_ttl = self.idle_ttl;
        self.slots
            .retain(|_, slot| now.saturating_duration_since(slot.last_used) <= idle_ttl);
        let pruned = before - self.slots.len();
        if pruned > 0 {
            tracing::debug!(pruned, "pruned idle search sessions");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDLE: Duration = Duration::from_secs(60);

    #[test]
    fn reuses_a_live_session() {
        let mut cache = SessionCache::new(4, IDLE);
        let user = UserId::new();
        let t0 = Instant::now();

        let first = cache.get_or_insert_with_at(user, t0, || 1);
        let again = cache.get_or_insert_with_at(user, t0 + Duration::from_secs(10), || 2);

        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn stays_bounded_and_evicts_least_recently_used() {
        let mut cache = SessionCache::new(3, IDLE);
        let t0 = Instant::now();
        let users: Vec<UserId> = (0..5).map(|_| UserId::new()).collect();

        for (i, user) in users.iter().take(3).enumerate() {
            cache.get_or_insert_with_at(*user, t0 + Duration::from_secs(i as u64), || i);
        }
        // The first user searches again, so the second becomes the oldest.
        assert!(cache.get_at(users[0], t0 + Duration::from_secs(3)).is_some());

        for (i, user) in users.iter().enumerate().skip(3) {
            cache.get_or_insert_with_at(*user, t0 + Duration::from_secs(i as u64 + 1), || i);
            assert!(cache.len() <= 3);
        }

        let later = t0 + Duration::from_secs(10);
        assert!(cache.get_at(users[0], later).is_some());
        assert!(cache.get_at(users[1], later).is_none());
        assert!(cache.get_at(users[2], later).is_none());
        assert!(cache.get_at(users[4], later).is_some());
    }

    #[test]
    fn many_users_never_grow_past_capacity() {
        let mut cache = SessionCache::new(8, IDLE);
        let t0 = Instant::now();
        for i in 0..1_000u64 {
            cache.get_or_insert_with_at(UserId::new(), t0 + Duration::from_millis(i), || i);
        }
        assert_eq!(cache.len(), 8);
    }

    #[test]
    fn idle_sessions_are_pruned_on_insert() {
        let mut cache = SessionCache::new(10, IDLE);
        let t0 = Instant::now();
        let idle_user = UserId::new();
        cache.get_or_insert_with_at(idle_user, t0, || 0);
        cache.get_or_insert_with_at(UserId::new(), t0 + Duration::from_secs(30), || 1);

        cache.get_or_insert_with_at(UserId::new(), t0 + IDLE + Duration::from_secs(1), || 2);

        assert_eq!(cache.len(), 2);
        assert!(cache.get_at(idle_user, t0 + IDLE + Duration::from_secs(1)).is_none());
    }

    #[test]
    fn expired_session_is_replaced_with_a_fresh_one() {
        let mut cache = SessionCache::new(4, IDLE);
        let user = UserId::new();
        let t0 = Instant::now();

        let first = cache.get_or_insert_with_at(user, t0, || 1);
        let second = cache.get_or_insert_with_at(user, t0 + IDLE * 2, || 2);

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*second, 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn zero_capacity_still_holds_one_session() {
        let mut cache = SessionCache::new(0, IDLE);
        cache.get_or_insert_with(UserId::new(), || 1);
        cache.get_or_insert_with(UserId::new(), || 2);
        assert_eq!(cache.len(), 1);
        assert!(!cache.is_empty());
    }
}
