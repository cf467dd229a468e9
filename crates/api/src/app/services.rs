use std::sync::{Arc, Mutex, PoisonError};

use stockfinder_core::UserId;
use stockfinder_infra::{
    AppConfig, InMemoryCatalog, InMemoryHistoryStore, InMemoryReservationStore, ReservationService,
};
use stockfinder_search::{HistoryRecorder, SearchEngine};

use super::sessions::SessionCache;

pub type Catalog = Arc<InMemoryCatalog>;
pub type History = Arc<InMemoryHistoryStore>;
pub type Engine = SearchEngine<Catalog, History>;
pub type Reservations = ReservationService<Catalog, Arc<InMemoryReservationStore>>;

/// Everything the handlers need, shared behind one `Arc`.
///
/// Each identified user gets their own search session (one [`SearchEngine`]), so
/// a user's older in-flight searches can never overwrite their newer results.
/// Anonymous searches get a throwaway engine per request. Sessions are capped
/// by `max_sessions` and dropped after `session_idle` without use.
pub struct AppServices {
    pub config: AppConfig,
    pub catalog: Catalog,
    pub history: HistoryRecorder<History>,
    pub reservations: Reservations,
    history_store: History,
    sessions: Mutex<SessionCache<Engine>>,
}

impl AppServices {
    pub fn in_memory(config: AppConfig) -> Self {
        let catalog = Arc::new(InMemoryCatalog::new());
        let history_store = Arc::new(InMemoryHistoryStore::new());
        let reservations = ReservationService::new(
            catalog.clone(),
            Arc::new(InMemoryReservationStore::new()),
            config.thresholds,
        );

        Self {
            history: HistoryRecorder::new(history_store.clone(), config.store_timeout),
            catalog,
            reservations,
            history_store,
            sessions: Mutex::new(SessionCache::new(config.max_sessions, config.session_idle)),
            config,
        }
    }

    /// The search session for `user`, created on first use.
    pub fn engine_for(&self, user: Option<UserId>) -> Arc<Engine> {
        let Some(user_id) = user else {
            return Arc::new(self.new_engine());
        };

        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_or_insert_with(user_id, || self.new_engine())
    }

    /// The session for `user` if they have searched recently.
    pub fn existing_engine(&self, user_id: UserId) -> Option<Arc<Engine>> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(user_id)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn new_engine(&self) -> Engine {
        SearchEngine::new(
            self.catalog.clone(),
            self.history_store.clone(),
            self.config.search_config(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_sessions_stay_within_the_configured_cap() {
        let config = AppConfig {
            max_sessions: 3,
            ..AppConfig::default()
        };
        let services = AppServices::in_memory(config);
        let users: Vec<UserId> = (0..5).map(|_| UserId::new()).collect();

        for user in &users {
            services.engine_for(Some(*user));
            assert!(services.session_count() <= 3);
        }

        assert_eq!(services.session_count(), 3);
        assert!(services.existing_engine(users[4]).is_some());
    }

    #[test]
    fn anonymous_searches_do_not_hold_sessions() {
        let services = AppServices::in_memory(AppConfig::default());
        services.engine_for(None);
        services.engine_for(None);
        assert_eq!(services.session_count(), 0);
    }

    #[test]
    fn identified_user_keeps_one_session() {
        let services = AppServices::in_memory(AppConfig::default());
        let user = UserId::new();
        let first = services.engine_for(Some(user));
        let again = services.engine_for(Some(user));
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(services.session_count(), 1);
    }
}
