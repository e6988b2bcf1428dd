use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

pub mod file_store;
pub mod in_memory_store;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Writing `{key}` needs {needed} bytes, but only {quota} are available")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },
    #[error("Failed to serialize `{key}`: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// String-keyed slots holding serialized values.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Typed JSON view over a [`KeyValueStore`].
///
/// Reads never fail: a missing, unreadable or unparsable slot yields the
/// caller's fallback. Writes report their failure and leave it to the caller
/// whether to surface it.
#[derive(Debug, Default)]
pub struct Persistence<S> {
    store: S,
}

impl<S> Persistence<S>
where
    S: KeyValueStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn load<T>(&self, key: &str, fallback: T) -> T
    where
        T: DeserializeOwned,
    {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => {
                tracing::debug!(key, "slot is empty, using default");
                return fallback;
            }
            Err(err) => {
                tracing::warn!(key, %err, "failed to read slot, using default");
                return fallback;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(key, %err, "failed to parse slot, using default");
                fallback
            }
        }
    }

    pub fn save<T>(&mut self, key: &str, value: &T) -> Result<(), StoreError>
    where
        T: Serialize + ?Sized,
    {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.store.set(key, &raw)?;
        tracing::debug!(key, bytes = raw.len(), "slot saved");
        Ok(())
    }
}
