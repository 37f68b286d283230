use relief_persist::{KeyValueStore, PersistError};

/// [`KeyValueStore`] over the page's `sessionStorage`.
///
/// Storage can be unavailable (privacy modes, sandboxed frames); reads then
/// find nothing and writes fail with [`PersistError::Store`].
pub struct SessionStore {
    storage: Option<web_sys::Storage>,
}

impl SessionStore {
    pub fn open() -> Self {
        let storage = web_sys::window().and_then(|w| w.session_storage().ok().flatten());
        if storage.is_none() {
            log::warn!("sessionStorage unavailable, camera will not persist");
        }
        Self { storage }
    }
}

impl KeyValueStore for SessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        let storage = self.storage.as_ref().ok_or_else(|| PersistError::Store {
            key: key.to_string(),
            message: "sessionStorage unavailable".into(),
        })?;
        storage
            .set_item(key, value)
            .map_err(|e| PersistError::Store {
                key: key.to_string(),
                message: format!("{e:?}"),
            })
    }
}
