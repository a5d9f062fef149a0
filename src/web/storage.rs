use web_sys::Storage;

use crate::danmaku::{CacheError, KeyValueStore};

/// `window.localStorage`, which may be missing (privacy mode, sandboxed
/// iframes) or refuse writes (quota). Both surface as `CacheError`.
pub struct LocalStorageStore {
    storage: Option<Storage>,
}

impl LocalStorageStore {
    pub fn open() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        Self { storage }
    }

    fn storage(&self) -> Result<&Storage, CacheError> {
        self.storage
            .as_ref()
            .ok_or_else(|| CacheError::Unavailable("localStorage is not available".into()))
    }
}

impl KeyValueStore for LocalStorageStore {
    fn load(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.storage()?
            .get_item(key)
            .map_err(|err| CacheError::Unavailable(format!("{err:?}")))
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), CacheError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|err| CacheError::Unavailable(format!("{err:?}")))
    }
}
