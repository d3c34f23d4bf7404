use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) {
        (**self).remove(key)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(transparent)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_overwrites_and_remove_clears() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k"), None);

        store.set("k", "1".into());
        store.set("k", "2".into());
        assert_eq!(store.get("k").as_deref(), Some("2"));
        assert_eq!(store.len(), 1);

        store.remove("k");
        assert!(store.is_empty());
    }

    #[test]
    fn serializes_as_flat_object() {
        let mut store = MemoryStore::new();
        store.set("diabetes_water", "[]".into());

        let json = serde_json::to_string(&store).unwrap();
        assert_eq!(json, r#"{"diabetes_water":"[]"}"#);

        let back: MemoryStore = serde_json::from_str(&json).unwrap();
        assert_eq!(back, store);
    }
}
