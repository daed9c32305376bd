use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use session::store::KeyValueStore;

#[derive(Default, Clone)]
pub struct InMemoryKeyValueStore {
    pub map: Arc<Mutex<HashMap<String, String>>>,
}

#[allow(dead_code)]
impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.map.lock().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.map.lock().await.len()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get_many(&self, keys: &[&str]) -> anyhow::Result<HashMap<String, String>> {
        let map = self.map.lock().await;
        Ok(keys
            .iter()
            .filter_map(|k| map.get(*k).map(|v| (k.to_string(), v.clone())))
            .collect())
    }

    async fn set_many(&self, entries: &[(&str, String)]) -> anyhow::Result<()> {
        let mut map = self.map.lock().await;
        for (k, v) in entries {
            map.insert(k.to_string(), v.clone());
        }
        Ok(())
    }

    async fn remove_many(&self, keys: &[&str]) -> anyhow::Result<()> {
        let mut map = self.map.lock().await;
        for k in keys {
            map.remove(*k);
        }
        Ok(())
    }
}
