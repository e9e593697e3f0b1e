use crate::domain_port::*;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry as MapEntry;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

enum Value {
    Set(HashSet<String>),
    Hash(HashMap<String, String>),
}

struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }

    fn is_empty(&self) -> bool {
        match &self.value {
            Value::Set(set) => set.is_empty(),
            Value::Hash(hash) => hash.is_empty(),
        }
    }
}

/// Process-local store with Redis-like semantics: lazy TTL expiry, and
/// sets or hashes that become empty disappear.
#[derive(Clone, Default)]
pub struct MemoryKvStore {
    entries: Arc<DashMap<String, Entry>>,
    unavailable: Arc<AtomicBool>,
}

impl Debug for MemoryKvStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryKvStore")
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with `StoreError::Unavailable` until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries.get(key).is_some_and(|e| e.is_live(now))
    }

    /// Remaining lifetime of a live key; `None` when absent or persistent.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let entry = self.entries.get(key)?;
        if !entry.is_live(now) {
            return None;
        }
        entry.expires_at.map(|at| at.saturating_duration_since(now))
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".to_string()));
        }
        Ok(())
    }

    fn wrong_type(key: &str) -> StoreError {
        StoreError::Unavailable(format!("WRONGTYPE operation against key {key}"))
    }

    fn purge_expired(&self, key: &str) {
        let now = Instant::now();
        self.entries.remove_if(key, |_, e| !e.is_live(now));
    }

    fn drop_if_empty(&self, key: &str) {
        self.entries.remove_if(key, |_, e| e.is_empty());
    }
}

#[async_trait::async_trait]
impl KvStore for MemoryKvStore {
    async fn set_add(&self, key: &str, member: &str) -> Result<(), StoreError> {
        self.check()?;
        let now = Instant::now();
        match self.entries.entry(key.to_string()) {
            MapEntry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                if !entry.is_live(now) {
                    *entry = Entry {
                        value: Value::Set(HashSet::new()),
                        expires_at: None,
                    };
                }
                match &mut entry.value {
                    Value::Set(set) => {
                        set.insert(member.to_string());
                    }
                    Value::Hash(_) => return Err(Self::wrong_type(key)),
                }
            }
            MapEntry::Vacant(vacant) => {
                vacant.insert(Entry {
                    value: Value::Set(HashSet::from([member.to_string()])),
                    expires_at: None,
                });
            }
        }
        Ok(())
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        self.check()?;
        self.purge_expired(key);
        let removed = match self.entries.get_mut(key) {
            Some(mut entry) => match &mut entry.value {
                Value::Set(set) => set.remove(member),
                Value::Hash(_) => return Err(Self::wrong_type(key)),
            },
            None => false,
        };
        self.drop_if_empty(key);
        Ok(removed)
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        self.check()?;
        self.purge_expired(key);
        match self.entries.get_mut(key) {
            Some(entry) => match &entry.value {
                Value::Set(set) => Ok(set.iter().cloned().collect()),
                Value::Hash(_) => Err(Self::wrong_type(key)),
            },
            None => Ok(Vec::new()),
        }
    }

    async fn hash_set(&self, key: &str, fields: &[(&str, &str)]) -> Result<(), StoreError> {
        self.check()?;
        let now = Instant::now();
        let mut entry = self.entries.entry(key.to_string()).or_insert_with(|| Entry {
            value: Value::Hash(HashMap::new()),
            expires_at: None,
        });
        if !entry.is_live(now) {
            *entry = Entry {
                value: Value::Hash(HashMap::new()),
                expires_at: None,
            };
        }
        match &mut entry.value {
            Value::Hash(hash) => {
                for (field, value) in fields {
                    hash.insert(field.to_string(), value.to_string());
                }
                Ok(())
            }
            Value::Set(_) => Err(Self::wrong_type(key)),
        }
    }

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>, StoreError> {
        self.check()?;
        self.purge_expired(key);
        match self.entries.get_mut(key) {
            Some(entry) => match &entry.value {
                Value::Hash(hash) => Ok(hash.get(field).cloned()),
                Value::Set(_) => Err(Self::wrong_type(key)),
            },
            None => Ok(None),
        }
    }

    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        self.check()?;
        self.purge_expired(key);
        match self.entries.get_mut(key) {
            Some(entry) => match &entry.value {
                Value::Hash(hash) => Ok(hash.clone()),
                Value::Set(_) => Err(Self::wrong_type(key)),
            },
            None => Ok(HashMap::new()),
        }
    }

    async fn hash_delete_field(&self, key: &str, field: &str) -> Result<bool, StoreError> {
        self.check()?;
        self.purge_expired(key);
        let removed = match self.entries.get_mut(key) {
            Some(mut entry) => match &mut entry.value {
                Value::Hash(hash) => hash.remove(field).is_some(),
                Value::Set(_) => return Err(Self::wrong_type(key)),
            },
            None => false,
        };
        self.drop_if_empty(key);
        Ok(removed)
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        self.check()?;
        let now = Instant::now();
        Ok(self
            .entries
            .remove(key)
            .is_some_and(|(_, entry)| entry.is_live(now)))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        self.check()?;
        self.purge_expired(key);
        match self.entries.get_mut(key) {
            Some(mut entry) => {
                entry.expires_at = Some(Instant::now() + ttl);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_operations() {
        let store = MemoryKvStore::new();
        store.set_add("s", "a").await.unwrap();
        store.set_add("s", "b").await.unwrap();
        store.set_add("s", "a").await.unwrap();

        let mut members = store.set_members("s").await.unwrap();
        members.sort();
        assert_eq!(members, vec!["a", "b"]);

        assert!(store.set_remove("s", "a").await.unwrap());
        assert!(!store.set_remove("s", "a").await.unwrap());
        assert!(store.set_remove("s", "b").await.unwrap());
        assert!(!store.contains_key("s"));
        assert!(store.set_members("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_hash_operations() {
        let store = MemoryKvStore::new();
        store
            .hash_set("h", &[("f1", "v1"), ("f2", "v2")])
            .await
            .unwrap();
        store.hash_set("h", &[("f1", "v1b")]).await.unwrap();

        assert_eq!(store.hash_get("h", "f1").await.unwrap().as_deref(), Some("v1b"));
        assert_eq!(store.hash_get("h", "nope").await.unwrap(), None);
        assert_eq!(store.hash_get_all("h").await.unwrap().len(), 2);

        assert!(store.hash_delete_field("h", "f1").await.unwrap());
        assert!(store.hash_delete_field("h", "f2").await.unwrap());
        assert!(!store.contains_key("h"));
        assert!(store.hash_get_all("h").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_wrong_type_is_an_error() {
        let store = MemoryKvStore::new();
        store.set_add("k", "a").await.unwrap();
        assert!(store.hash_get("k", "f").await.is_err());
        assert!(store.hash_set("k", &[("f", "v")]).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_reports_existence_once() {
        let store = MemoryKvStore::new();
        store.hash_set("h", &[("f", "v")]).await.unwrap();
        assert!(store.delete("h").await.unwrap());
        assert!(!store.delete("h").await.unwrap());
    }

    #[tokio::test]
    async fn test_expire() {
        let store = MemoryKvStore::new();
        assert!(!store.expire("missing", Duration::from_secs(1)).await.unwrap());

        store.hash_set("h", &[("f", "v")]).await.unwrap();
        assert_eq!(store.ttl("h"), None);
        assert!(store.expire("h", Duration::from_millis(30)).await.unwrap());
        assert!(store.contains_key("h"));
        assert!(store.ttl("h").is_some_and(|ttl| ttl <= Duration::from_millis(30)));

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!store.contains_key("h"));
        assert_eq!(store.ttl("h"), None);
        assert_eq!(store.hash_get("h", "f").await.unwrap(), None);
        assert!(!store.delete("h").await.unwrap());
    }

    #[tokio::test]
    async fn test_unavailable() {
        let store = MemoryKvStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.set_add("s", "a").await,
            Err(StoreError::Unavailable(_))
        ));
        store.set_unavailable(false);
        store.set_add("s", "a").await.unwrap();
    }
}
