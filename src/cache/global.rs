//! Process-wide accessor for a [`CacheManager`].
//!
//! Optional convenience for code that cannot easily thread a manager through.
//! The manager is still constructed explicitly; tests should prefer owning
//! their own instance and call [`reset`] if they touch this one.

use std::sync::Arc;

use parking_lot::{const_mutex, Mutex};

use crate::cache::CacheManager;
use crate::config::Config;

static INSTANCE: Mutex<Option<Arc<CacheManager>>> = const_mutex(None);

/// Returns the installed manager, building one from `config` if none exists.
pub fn init(config: &Config) -> Arc<CacheManager> {
    INSTANCE
        .lock()
        .get_or_insert_with(|| Arc::new(CacheManager::from_config(config)))
        .clone()
}

/// Installs `manager`, returning the one it replaced.
pub fn install(manager: Arc<CacheManager>) -> Option<Arc<CacheManager>> {
    INSTANCE.lock().replace(manager)
}

pub fn get() -> Option<Arc<CacheManager>> {
    INSTANCE.lock().clone()
}

/// Removes the installed manager, stops its sweep and drops its entries.
///
/// Clearing is gated by the manager's enable switch, like any other
/// [`CacheManager::clear`].
pub fn reset() {
    if let Some(manager) = INSTANCE.lock().take() {
        manager.clear();
        manager.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::SetOptions;

    // Single test: the accessor is process-wide state.
    #[test]
    fn test_init_get_install_reset() {
        reset();
        assert!(get().is_none());

        let first = init(&Config::default());
        let again = init(&Config {
            cache_max_size: 5,
            ..Config::default()
        });
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(again.max_size(), 1000);

        first.set("k", serde_json::json!(1), None, &SetOptions::default());
        assert_eq!(get().and_then(|m| m.get("k")), Some(serde_json::json!(1)));

        let replacement = Arc::new(CacheManager::from_config(&Config::default()));
        let previous = install(replacement.clone());
        assert!(previous.is_some_and(|p| Arc::ptr_eq(&p, &first)));
        assert!(get().is_some_and(|m| Arc::ptr_eq(&m, &replacement)));

        // Holders of the reset manager see it emptied
        replacement.set("held", serde_json::json!(2), None, &SetOptions::default());
        reset();
        assert!(get().is_none());
        assert_eq!(replacement.size(), 0);

        let fresh = init(&Config::default());
        assert_eq!(fresh.get("k"), None);
        reset();
    }
}
