use std::collections::HashMap;

use super::{KeyValueStore, StoreError};

/// Map-backed store. An optional byte quota covering all slots reproduces the
/// quota-exceeded failures of browser-style storage.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    slots: HashMap<String, String>,
    quota: Option<usize>,
}

impl InMemoryStore {
    pub fn with_quota(quota: usize) -> Self {
        Self {
            slots: HashMap::new(),
            quota: Some(quota),
        }
    }

    pub fn set_quota(&mut self, quota: Option<usize>) {
        self.quota = quota;
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.slots.get(key).map(String::as_str)
    }

    fn used_without(&self, key: &str) -> usize {
        self.slots
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(quota) = self.quota {
            let available = quota.saturating_sub(self.used_without(key));
            if value.len() > available {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    needed: value.len(),
                    quota: available,
                });
            }
        }
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
