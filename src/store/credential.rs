use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;

use super::kv::KeyValueStore;
use crate::core::ChatError;

/// Key under which the Hugging Face token is persisted.
pub const CREDENTIAL_KEY: &str = "hf_token";

/// Bearer token for the inference service. Empty means unauthenticated.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into().trim().to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "Credential(<empty>)")
        } else {
            write!(f, "Credential(<redacted>)")
        }
    }
}

/// The session's credential, cached in memory over a durable store.
pub struct CredentialStore {
    store: Arc<dyn KeyValueStore>,
    current: Mutex<Credential>,
}

impl CredentialStore {
    /// Reads the persisted credential once; later reads come from memory.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self, ChatError> {
        let current = store
            .get(CREDENTIAL_KEY)?
            .map(Credential::new)
            .unwrap_or_default();

        Ok(Self {
            store,
            current: Mutex::new(current),
        })
    }

    pub fn get(&self) -> Credential {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Persist `token` and make it current. The in-memory value only changes
    /// once the write succeeded. An empty token clears the credential.
    pub fn set(&self, token: &str) -> Result<(), ChatError> {
        let credential = Credential::new(token);
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);

        if credential.is_empty() {
            self.store.remove(CREDENTIAL_KEY)?;
        } else {
            self.store.set(CREDENTIAL_KEY, credential.expose())?;
        }

        *current = credential;
        info!(authenticated = !current.is_empty(), "Credential saved");
        Ok(())
    }

    pub fn clear(&self) -> Result<(), ChatError> {
        self.set("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::kv::MemoryStore;

    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, ChatError> {
            Ok(Some("hf_original".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), ChatError> {
            Err(ChatError::Storage {
                message: "read-only".to_string(),
                source: None,
            })
        }

        fn remove(&self, key: &str) -> Result<(), ChatError> {
            self.set(key, "")
        }
    }

    #[test]
    fn saved_credential_survives_reload() {
        let backing = MemoryStore::new();
        let credentials = CredentialStore::load(Arc::new(backing.clone())).unwrap();
        assert!(credentials.get().is_empty());

        credentials.set("hf_first").unwrap();
        credentials.set("hf_second").unwrap();

        let reloaded = CredentialStore::load(Arc::new(backing)).unwrap();
        assert_eq!(reloaded.get().expose(), "hf_second");
    }

    #[test]
    fn clearing_removes_the_persisted_key() {
        let backing = MemoryStore::new();
        let credentials = CredentialStore::load(Arc::new(backing.clone())).unwrap();

        credentials.set("hf_token_value").unwrap();
        credentials.clear().unwrap();

        assert!(credentials.get().is_empty());
        assert_eq!(backing.get(CREDENTIAL_KEY).unwrap(), None);
    }

    #[test]
    fn failed_write_leaves_memory_untouched() {
        let credentials = CredentialStore::load(Arc::new(ReadOnlyStore)).unwrap();

        let err = credentials.set("hf_new").unwrap_err();
        assert!(matches!(err, ChatError::Storage { .. }));
        assert_eq!(credentials.get().expose(), "hf_original");
    }

    #[test]
    fn tokens_are_trimmed_and_redacted() {
        let credential = Credential::new("  hf_secret\n");
        assert_eq!(credential.expose(), "hf_secret");
        assert_eq!(format!("{credential:?}"), "Credential(<redacted>)");
        assert_eq!(format!("{:?}", Credential::default()), "Credential(<empty>)");
    }
}
